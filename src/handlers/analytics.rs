use axum::extract::State;
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{SpendPoint, SpendSummary, StatusCount, VendorSpend},
    params::{optional_id, Query},
    response::{ApiResponse, DateRange},
    services::AnalyticsService,
};

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(rename = "vendorId")]
    pub vendor_id: Option<String>,
}

impl AnalyticsQuery {
    fn range(&self) -> DateRange {
        DateRange::from_query(self.start.as_deref(), self.end.as_deref())
    }
}

pub async fn summary(
    State(analytics): State<AnalyticsService>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<ApiResponse<SpendSummary>> {
    let range = query.range();
    let summary = analytics.summary(range).await?;
    Ok(ApiResponse::ok(summary).with_date_range(range))
}

pub async fn spend_by_vendor(
    State(analytics): State<AnalyticsService>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<ApiResponse<Vec<VendorSpend>>> {
    let range = query.range();
    let spend = analytics.spend_by_vendor(range).await?;
    Ok(ApiResponse::ok(spend).with_date_range(range))
}

pub async fn spend_trend(
    State(analytics): State<AnalyticsService>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<ApiResponse<Vec<SpendPoint>>> {
    let range = query.range();
    let vendor_id = optional_id("vendorId", query.vendor_id.as_deref())?;
    let trend = analytics.spend_trend(range, vendor_id).await?;
    Ok(ApiResponse::ok(trend).with_date_range(range))
}

pub async fn po_status(
    State(analytics): State<AnalyticsService>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<ApiResponse<Vec<StatusCount>>> {
    let range = query.range();
    let vendor_id = optional_id("vendorId", query.vendor_id.as_deref())?;
    let counts = analytics.status_counts(range, vendor_id).await?;
    Ok(ApiResponse::ok(counts).with_date_range(range))
}
