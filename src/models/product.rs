use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::money;

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: i64,
    pub vendor_id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub unit_price: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub vendor_id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub unit_price: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            vendor_id: row.vendor_id,
            name: row.name,
            sku: row.sku,
            unit_price: money::from_storage(row.unit_price),
            active: row.active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub unit_price: Option<Decimal>,
    pub active: Option<bool>,
}
