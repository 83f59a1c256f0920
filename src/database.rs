use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqliteConnection};

pub type Database = Pool<Sqlite>;

pub async fn create_database_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<Database, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    // Test the connection
    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    log::info!("Connected to database at {}", database_url);
    Ok(pool)
}

pub async fn close_database_pool(db: Database) {
    db.close().await;
    log::info!("Database connections closed");
}

/// A transaction opened with `BEGIN IMMEDIATE`. The write lock is taken up
/// front, so concurrent writers wait on the busy timeout instead of failing
/// when a read snapshot is upgraded. Rolled back when dropped uncommitted.
pub struct WriteTransaction {
    conn: Option<PoolConnection<Sqlite>>,
}

impl WriteTransaction {
    pub async fn begin(db: &Database) -> Result<Self, sqlx::Error> {
        let mut conn = db.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
        Ok(Self { conn: Some(conn) })
    }

    pub async fn commit(mut self) -> Result<(), sqlx::Error> {
        sqlx::query("COMMIT").execute(&mut *self).await?;
        self.conn.take();
        Ok(())
    }
}

impl Deref for WriteTransaction {
    type Target = SqliteConnection;

    fn deref(&self) -> &SqliteConnection {
        self.conn.as_deref().expect("write transaction already finished")
    }
}

impl DerefMut for WriteTransaction {
    fn deref_mut(&mut self) -> &mut SqliteConnection {
        self.conn
            .as_deref_mut()
            .expect("write transaction already finished")
    }
}

impl Drop for WriteTransaction {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            tokio::spawn(async move {
                if let Err(err) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                    log::warn!("Rollback failed, closing connection: {}", err);
                    let _ = conn.close().await;
                }
            });
        }
    }
}

#[cfg(test)]
pub(crate) async fn test_pool() -> Database {
    // One connection so every query sees the same in-memory database.
    create_database_pool("sqlite::memory:", 1)
        .await
        .expect("in-memory database")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_create_all_tables() {
        let db = test_pool().await;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' AND name != 'sqlite_sequence' ORDER BY name",
        )
        .fetch_all(&db)
        .await
        .unwrap();

        assert_eq!(
            tables,
            vec![
                "purchase_order_items",
                "purchase_orders",
                "vendor_contacts",
                "vendor_products",
                "vendors",
            ]
        );
    }

    async fn vendor_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM vendors")
            .fetch_one(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn write_transaction_rolls_back_unless_committed() {
        let db = test_pool().await;

        {
            let mut tx = WriteTransaction::begin(&db).await.unwrap();
            sqlx::query("INSERT INTO vendors (name, status, created_at) VALUES ('Dropped', 'active', ?)")
                .bind(chrono::Utc::now())
                .execute(&mut *tx)
                .await
                .unwrap();
        }
        assert_eq!(vendor_count(&db).await, 0);

        let mut tx = WriteTransaction::begin(&db).await.unwrap();
        sqlx::query("INSERT INTO vendors (name, status, created_at) VALUES ('Kept', 'active', ?)")
            .bind(chrono::Utc::now())
            .execute(&mut *tx)
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(vendor_count(&db).await, 1);
    }

    #[tokio::test]
    async fn file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("vendors.db").display());

        let db = create_database_pool(&url, 2).await.unwrap();
        sqlx::query("INSERT INTO vendors (name, status, created_at) VALUES (?, 'active', ?)")
            .bind("Acme Supply")
            .bind(chrono::Utc::now())
            .execute(&db)
            .await
            .unwrap();
        close_database_pool(db).await;

        let db = create_database_pool(&url, 2).await.unwrap();
        let name: String = sqlx::query_scalar("SELECT name FROM vendors")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(name, "Acme Supply");
    }
}
