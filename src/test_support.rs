//! Seed helpers shared by the test modules.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    database::Database,
    models::{CreatePurchaseOrder, OrderItemInput, VendorInput},
    repositories::{
        products::{self, ProductFields},
        vendors,
    },
};

pub async fn seed_vendor(db: &Database, name: &str) -> i64 {
    vendors::insert(db, name, &VendorInput::default())
        .await
        .expect("seed vendor")
}

pub async fn seed_product(db: &Database, vendor_id: i64, name: &str, price_cents: i64) -> i64 {
    let fields = ProductFields {
        name: name.to_string(),
        sku: Some(format!("SKU-{}", name)),
        unit_price: Decimal::new(price_cents, 2),
        active: true,
    };
    products::insert(db, vendor_id, &fields)
        .await
        .expect("seed product")
}

pub fn item(product_id: i64, qty: i64, price_cents: i64) -> OrderItemInput {
    OrderItemInput {
        product_id: Some(product_id),
        qty: Some(qty),
        unit_price: Some(Decimal::new(price_cents, 2)),
    }
}

pub fn order_input(vendor_id: i64, po_number: &str, items: Vec<OrderItemInput>) -> CreatePurchaseOrder {
    CreatePurchaseOrder {
        vendor_id: Some(vendor_id),
        po_number: Some(po_number.to_string()),
        status: None,
        order_date: NaiveDate::from_ymd_opt(2026, 1, 1),
        notes: None,
        items: Some(items),
    }
}

pub fn order_on(
    vendor_id: i64,
    po_number: &str,
    date: &str,
    items: Vec<OrderItemInput>,
) -> CreatePurchaseOrder {
    CreatePurchaseOrder {
        order_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        ..order_input(vendor_id, po_number, items)
    }
}
