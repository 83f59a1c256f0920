use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::{
    database::Database,
    models::{Vendor, VendorInput, VendorStatus},
    response::PageRequest,
};

#[derive(Debug, Clone, Default)]
pub struct VendorFilter {
    pub search: Option<String>,
    pub status: Option<VendorStatus>,
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &VendorFilter) {
    query.push(" WHERE 1=1");
    if let Some(search) = &filter.search {
        query.push(" AND name LIKE ").push_bind(format!("%{}%", search));
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
}

pub async fn list(
    db: &Database,
    filter: &VendorFilter,
    page: PageRequest,
) -> Result<(Vec<Vendor>, i64), sqlx::Error> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM vendors");
    push_filters(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(db).await?;

    let mut select = QueryBuilder::<Sqlite>::new("SELECT * FROM vendors");
    push_filters(&mut select, filter);
    select
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());

    let vendors = select.build_query_as::<Vendor>().fetch_all(db).await?;
    Ok((vendors, total))
}

pub async fn find<'e, E>(executor: E, id: i64) -> Result<Option<Vendor>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn exists<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM vendors WHERE id = ?)")
        .bind(id)
        .fetch_one(executor)
        .await
}

pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM vendors")
        .fetch_one(executor)
        .await
}

/// Inserts a vendor; `name` must already be validated.
pub async fn insert<'e, E>(executor: E, name: &str, input: &VendorInput) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO vendors (name, status, address, city, state, zip, notes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(input.status.unwrap_or(VendorStatus::Active))
    .bind(&input.address)
    .bind(&input.city)
    .bind(&input.state)
    .bind(&input.zip)
    .bind(&input.notes)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn update<'e, E>(
    executor: E,
    id: i64,
    name: &str,
    status: VendorStatus,
    input: &VendorInput,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE vendors
        SET name = ?, status = ?, address = ?, city = ?, state = ?, zip = ?, notes = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(status)
    .bind(&input.address)
    .bind(&input.city)
    .bind(&input.state)
    .bind(&input.zip)
    .bind(&input.notes)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(())
}

/// Removes the vendor; contacts, products, orders and their items go with it
/// through the foreign-key cascade.
pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM vendors WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
