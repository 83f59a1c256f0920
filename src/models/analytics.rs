use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSpend {
    pub vendor_id: i64,
    pub vendor_name: String,
    pub total_spend: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendPoint {
    /// Calendar month, `YYYY-MM`.
    pub period: String,
    pub total_spend: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendSummary {
    pub total_spend: Decimal,
    pub order_count: i64,
    pub active_vendors: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub vendors: i64,
    pub products: i64,
    pub open_purchase_orders: i64,
    pub total_purchase_orders: i64,
}
