pub mod analytics;
pub mod purchase_orders;

pub use analytics::AnalyticsService;
pub use purchase_orders::PurchaseOrderService;
