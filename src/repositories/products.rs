use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::SqliteExecutor;

use crate::{
    models::{Product, ProductRow},
    utils::money,
};

/// Validated product fields shared by insert and update.
#[derive(Debug, Clone)]
pub struct ProductFields {
    pub name: String,
    pub sku: Option<String>,
    pub unit_price: Decimal,
    pub active: bool,
}

pub async fn list_for_vendor<'e, E>(executor: E, vendor_id: i64) -> Result<Vec<Product>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT * FROM vendor_products WHERE vendor_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(vendor_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Product::from).collect())
}

pub async fn find<'e, E>(executor: E, id: i64) -> Result<Option<Product>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM vendor_products WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(Product::from))
}

pub async fn belongs_to_vendor<'e, E>(
    executor: E,
    product_id: i64,
    vendor_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM vendor_products WHERE id = ? AND vendor_id = ?)",
    )
    .bind(product_id)
    .bind(vendor_id)
    .fetch_one(executor)
    .await
}

pub async fn is_referenced<'e, E>(executor: E, product_id: i64) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM purchase_order_items WHERE product_id = ?)",
    )
    .bind(product_id)
    .fetch_one(executor)
    .await
}

pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM vendor_products")
        .fetch_one(executor)
        .await
}

pub async fn insert<'e, E>(
    executor: E,
    vendor_id: i64,
    fields: &ProductFields,
) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO vendor_products (vendor_id, name, sku, unit_price, active, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(vendor_id)
    .bind(&fields.name)
    .bind(&fields.sku)
    .bind(money::to_storage(fields.unit_price))
    .bind(fields.active)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn update<'e, E>(executor: E, id: i64, fields: &ProductFields) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "UPDATE vendor_products SET name = ?, sku = ?, unit_price = ?, active = ? WHERE id = ?",
    )
    .bind(&fields.name)
    .bind(&fields.sku)
    .bind(money::to_storage(fields.unit_price))
    .bind(fields.active)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM vendor_products WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
