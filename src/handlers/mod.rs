pub mod analytics;
pub mod contacts;
pub mod products;
pub mod purchase_orders;
pub mod vendors;

use axum::extract::State;
use chrono::Utc;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::DashboardStats,
    response::ApiResponse,
    services::AnalyticsService,
};

pub async fn health() -> ApiResponse<Value> {
    ApiResponse::ok(json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}

pub async fn dashboard(
    State(analytics): State<AnalyticsService>,
) -> AppResult<ApiResponse<DashboardStats>> {
    let stats = analytics.dashboard().await?;
    Ok(ApiResponse::ok(stats))
}

pub async fn not_found() -> AppError {
    AppError::not_found("Route not found")
}

#[cfg(test)]
mod tests;
