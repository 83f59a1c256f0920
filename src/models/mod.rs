pub mod analytics;
pub mod contact;
pub mod product;
pub mod purchase_order;
pub mod vendor;

pub use analytics::{DashboardStats, SpendPoint, SpendSummary, StatusCount, VendorSpend};
pub use contact::{Contact, ContactInput};
pub use product::{Product, ProductInput, ProductRow};
pub use purchase_order::{
    CreatePurchaseOrder, NewOrderItem, OrderItemInput, PurchaseOrder, PurchaseOrderDetail,
    PurchaseOrderItem, PurchaseOrderItemRow, PurchaseOrderStatus, ReplaceItems,
    UpdatePurchaseOrder,
};
pub use vendor::{Vendor, VendorInput, VendorStatus};

/// Treat blank strings from forms and JSON bodies as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
