use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    Draft,
    Submitted,
    Received,
}

impl PurchaseOrderStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(PurchaseOrderStatus::Draft),
            "submitted" => Some(PurchaseOrderStatus::Submitted),
            "received" => Some(PurchaseOrderStatus::Received),
            _ => None,
        }
    }
}

impl Default for PurchaseOrderStatus {
    fn default() -> Self {
        PurchaseOrderStatus::Draft
    }
}

/// Order header joined with the owning vendor's name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseOrder {
    pub id: i64,
    pub vendor_id: i64,
    pub vendor_name: Option<String>,
    pub po_number: String,
    pub status: PurchaseOrderStatus,
    pub order_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrderItem {
    pub id: i64,
    pub purchase_order_id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub sku: Option<String>,
    pub qty: i64,
    pub unit_price: Decimal,
    /// `qty * unit_price`, never stored.
    pub line_total: Decimal,
}

#[derive(Debug, FromRow)]
pub struct PurchaseOrderItemRow {
    pub id: i64,
    pub purchase_order_id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub sku: Option<String>,
    pub qty: i64,
    pub unit_price: f64,
}

impl From<PurchaseOrderItemRow> for PurchaseOrderItem {
    fn from(row: PurchaseOrderItemRow) -> Self {
        let unit_price = money::from_storage(row.unit_price);
        Self {
            id: row.id,
            purchase_order_id: row.purchase_order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            sku: row.sku,
            qty: row.qty,
            unit_price,
            line_total: money::line_total(row.qty, unit_price),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub items: Vec<PurchaseOrderItem>,
    /// Sum of the line totals.
    pub total_amount: Decimal,
}

impl PurchaseOrderDetail {
    pub fn new(order: PurchaseOrder, items: Vec<PurchaseOrderItem>) -> Self {
        let total_amount = items.iter().map(|item| item.line_total).sum();
        Self {
            order,
            items,
            total_amount,
        }
    }

    pub fn total(&self) -> Decimal {
        self.total_amount
    }
}

/// One requested line item, as received. Presence is checked by the
/// transaction manager so that a missing field names the item problem rather
/// than failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderItemInput {
    pub product_id: Option<i64>,
    pub qty: Option<i64>,
    pub unit_price: Option<Decimal>,
}

/// A line item that passed presence, range and ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub qty: i64,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePurchaseOrder {
    pub vendor_id: Option<i64>,
    pub po_number: Option<String>,
    pub status: Option<PurchaseOrderStatus>,
    pub order_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub items: Option<Vec<OrderItemInput>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePurchaseOrder {
    pub status: Option<PurchaseOrderStatus>,
    pub order_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplaceItems {
    pub items: Option<Vec<OrderItemInput>>,
}
