use chrono::Utc;
use sqlx::SqliteExecutor;

use crate::models::{Contact, ContactInput};

pub async fn list_for_vendor<'e, E>(executor: E, vendor_id: i64) -> Result<Vec<Contact>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Contact>(
        "SELECT * FROM vendor_contacts WHERE vendor_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(vendor_id)
    .fetch_all(executor)
    .await
}

pub async fn find<'e, E>(executor: E, id: i64) -> Result<Option<Contact>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Contact>("SELECT * FROM vendor_contacts WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn insert<'e, E>(
    executor: E,
    vendor_id: i64,
    name: &str,
    input: &ContactInput,
) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO vendor_contacts (vendor_id, name, email, phone, role, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(vendor_id)
    .bind(name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.role)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn update<'e, E>(
    executor: E,
    id: i64,
    name: &str,
    input: &ContactInput,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE vendor_contacts SET name = ?, email = ?, phone = ?, role = ? WHERE id = ?")
        .bind(name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.role)
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM vendor_contacts WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
