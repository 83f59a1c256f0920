//! Extractors whose rejections render through [`AppError`], so malformed
//! bodies, paths and query strings still get the JSON envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::extract::Json), rejection(AppError))]
pub struct Json<T>(pub T);

#[derive(Debug, Clone, Copy, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

#[derive(Debug, Clone, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

/// Parses an optional numeric id from a query string. Empty values and the
/// literal `all` mean no filter.
pub fn optional_id(name: &str, value: Option<&str>) -> Result<Option<i64>, AppError> {
    match value.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::invalid(format!("{} must be a number", name))),
    }
}
