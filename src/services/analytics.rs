use chrono::{Days, NaiveDate, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite};

use crate::{
    database::Database,
    error::AppResult,
    models::{DashboardStats, SpendPoint, SpendSummary, StatusCount, VendorSpend},
    repositories::{products, purchase_orders, vendors},
    response::DateRange,
    utils::money,
};

const DEFAULT_WINDOW_DAYS: u64 = 30;

impl DateRange {
    /// Resolves optional `YYYY-MM-DD` bounds. Missing or unparsable values
    /// default to the 30 days ending `today`.
    pub fn resolve(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> Self {
        let parse = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
        };

        let end = parse(end).unwrap_or(today);
        let start = parse(start).unwrap_or_else(|| {
            today
                .checked_sub_days(Days::new(DEFAULT_WINDOW_DAYS))
                .unwrap_or(today)
        });

        Self { start, end }
    }

    pub fn from_query(start: Option<&str>, end: Option<&str>) -> Self {
        Self::resolve(start, end, Utc::now().date_naive())
    }
}

#[derive(FromRow)]
struct VendorSpendRow {
    vendor_id: i64,
    vendor_name: String,
    total_spend: f64,
}

#[derive(FromRow)]
struct SpendPointRow {
    period: String,
    total_spend: f64,
}

#[derive(FromRow)]
struct StatusCountRow {
    status: String,
    count: i64,
}

/// Read-only spend and status aggregates over purchase orders whose
/// `order_date` falls inside a closed date range.
#[derive(Clone)]
pub struct AnalyticsService {
    db: Database,
}

impl AnalyticsService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn spend_by_vendor(&self, range: DateRange) -> AppResult<Vec<VendorSpend>> {
        let rows = sqlx::query_as::<_, VendorSpendRow>(
            r#"
            SELECT v.id AS vendor_id, v.name AS vendor_name,
                   COALESCE(SUM(poi.qty * poi.unit_price), 0.0) AS total_spend
            FROM vendors v
            JOIN purchase_orders po ON po.vendor_id = v.id
                AND po.order_date >= ?
                AND po.order_date <= ?
            JOIN purchase_order_items poi ON poi.purchase_order_id = po.id
            GROUP BY v.id, v.name
            HAVING total_spend > 0
            ORDER BY total_spend DESC
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| VendorSpend {
                vendor_id: row.vendor_id,
                vendor_name: row.vendor_name,
                total_spend: money::from_storage(row.total_spend),
            })
            .collect())
    }

    pub async fn spend_trend(
        &self,
        range: DateRange,
        vendor_id: Option<i64>,
    ) -> AppResult<Vec<SpendPoint>> {
        let mut query = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT strftime('%Y-%m', po.order_date) AS period,
                   COALESCE(SUM(poi.qty * poi.unit_price), 0.0) AS total_spend
            FROM purchase_orders po
            JOIN purchase_order_items poi ON po.id = poi.purchase_order_id
            WHERE po.order_date >= "#,
        );
        query
            .push_bind(range.start)
            .push(" AND po.order_date <= ")
            .push_bind(range.end);
        if let Some(vendor_id) = vendor_id {
            query.push(" AND po.vendor_id = ").push_bind(vendor_id);
        }
        query.push(" GROUP BY period ORDER BY period ASC");

        let rows = query
            .build_query_as::<SpendPointRow>()
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| SpendPoint {
                period: row.period,
                total_spend: money::from_storage(row.total_spend),
            })
            .collect())
    }

    pub async fn status_counts(
        &self,
        range: DateRange,
        vendor_id: Option<i64>,
    ) -> AppResult<Vec<StatusCount>> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT status, COUNT(*) AS count FROM purchase_orders WHERE order_date >= ",
        );
        query
            .push_bind(range.start)
            .push(" AND order_date <= ")
            .push_bind(range.end);
        if let Some(vendor_id) = vendor_id {
            query.push(" AND vendor_id = ").push_bind(vendor_id);
        }
        query.push(" GROUP BY status ORDER BY status");

        let rows = query
            .build_query_as::<StatusCountRow>()
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| StatusCount {
                status: row.status,
                count: row.count,
            })
            .collect())
    }

    pub async fn summary(&self, range: DateRange) -> AppResult<SpendSummary> {
        let total_spend: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(poi.qty * poi.unit_price), 0.0)
            FROM purchase_orders po
            JOIN purchase_order_items poi ON po.id = poi.purchase_order_id
            WHERE po.order_date >= ? AND po.order_date <= ?
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.db)
        .await?;

        let (order_count, active_vendors): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(DISTINCT vendor_id)
            FROM purchase_orders
            WHERE order_date >= ? AND order_date <= ?
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.db)
        .await?;

        Ok(SpendSummary {
            total_spend: money::from_storage(total_spend),
            order_count,
            active_vendors,
        })
    }

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        Ok(DashboardStats {
            vendors: vendors::count(&self.db).await?,
            products: products::count(&self.db).await?,
            open_purchase_orders: purchase_orders::count_open(&self.db).await?,
            total_purchase_orders: purchase_orders::count(&self.db).await?,
        })
    }
}
