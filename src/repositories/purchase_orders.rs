use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::{
    database::Database,
    models::{NewOrderItem, PurchaseOrder, PurchaseOrderItem, PurchaseOrderItemRow, PurchaseOrderStatus},
    response::PageRequest,
    utils::money,
};

const SELECT_ORDER: &str = r#"
    SELECT po.id, po.vendor_id, v.name AS vendor_name, po.po_number, po.status,
           po.order_date, po.notes, po.created_at
    FROM purchase_orders po
    LEFT JOIN vendors v ON po.vendor_id = v.id
"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    pub vendor_id: Option<i64>,
    pub status: Option<PurchaseOrderStatus>,
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &OrderFilter) {
    query.push(" WHERE 1=1");
    if let Some(vendor_id) = filter.vendor_id {
        query.push(" AND po.vendor_id = ").push_bind(vendor_id);
    }
    if let Some(status) = filter.status {
        query.push(" AND po.status = ").push_bind(status);
    }
}

pub async fn list(
    db: &Database,
    filter: &OrderFilter,
    page: PageRequest,
) -> Result<(Vec<PurchaseOrder>, i64), sqlx::Error> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM purchase_orders po");
    push_filters(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(db).await?;

    let mut select = QueryBuilder::<Sqlite>::new(SELECT_ORDER);
    push_filters(&mut select, filter);
    select
        .push(" ORDER BY po.created_at DESC, po.id DESC LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());

    let orders = select.build_query_as::<PurchaseOrder>().fetch_all(db).await?;
    Ok((orders, total))
}

pub async fn find<'e, E>(executor: E, id: i64) -> Result<Option<PurchaseOrder>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, PurchaseOrder>(&format!("{} WHERE po.id = ?", SELECT_ORDER))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn items_for_order<'e, E>(
    executor: E,
    purchase_order_id: i64,
) -> Result<Vec<PurchaseOrderItem>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, PurchaseOrderItemRow>(
        r#"
        SELECT poi.id, poi.purchase_order_id, poi.product_id, vp.name AS product_name, vp.sku,
               poi.qty, poi.unit_price
        FROM purchase_order_items poi
        LEFT JOIN vendor_products vp ON poi.product_id = vp.id
        WHERE poi.purchase_order_id = ?
        ORDER BY poi.id
        "#,
    )
    .bind(purchase_order_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(PurchaseOrderItem::from).collect())
}

/// The owning vendor of an order, or `None` when the order does not exist.
pub async fn vendor_of<'e, E>(executor: E, id: i64) -> Result<Option<i64>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar("SELECT vendor_id FROM purchase_orders WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn exists<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM purchase_orders WHERE id = ?)")
        .bind(id)
        .fetch_one(executor)
        .await
}

pub async fn po_number_taken<'e, E>(executor: E, po_number: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM purchase_orders WHERE po_number = ?)",
    )
    .bind(po_number)
    .fetch_one(executor)
    .await
}

pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM purchase_orders")
        .fetch_one(executor)
        .await
}

pub async fn count_open<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM purchase_orders WHERE status IN ('draft', 'submitted')",
    )
    .fetch_one(executor)
    .await
}

pub async fn insert_header<'e, E>(
    executor: E,
    vendor_id: i64,
    po_number: &str,
    status: PurchaseOrderStatus,
    order_date: NaiveDate,
    notes: Option<&str>,
) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO purchase_orders (vendor_id, po_number, status, order_date, notes, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(vendor_id)
    .bind(po_number)
    .bind(status)
    .bind(order_date)
    .bind(notes)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn insert_item<'e, E>(
    executor: E,
    purchase_order_id: i64,
    item: &NewOrderItem,
) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO purchase_order_items (purchase_order_id, product_id, qty, unit_price)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(purchase_order_id)
    .bind(item.product_id)
    .bind(item.qty)
    .bind(money::to_storage(item.unit_price))
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn delete_items<'e, E>(executor: E, purchase_order_id: i64) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM purchase_order_items WHERE purchase_order_id = ?")
        .bind(purchase_order_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

pub async fn update_header<'e, E>(
    executor: E,
    id: i64,
    status: PurchaseOrderStatus,
    order_date: NaiveDate,
    notes: Option<&str>,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE purchase_orders SET status = ?, order_date = ?, notes = ? WHERE id = ?")
        .bind(status)
        .bind(order_date)
        .bind(notes)
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM purchase_orders WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
