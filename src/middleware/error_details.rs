use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{error::InternalDetail, AppState};

/// Adds the internal error text to 500 bodies when the state allows it
/// (development only). The detail extension is always stripped.
pub async fn expose_error_details(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<InternalDetail>() {
        Some(InternalDetail(detail)) if state.expose_error_details => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message": "Internal Server Error",
                "detail": detail,
            })),
        )
            .into_response(),
        _ => response,
    }
}
