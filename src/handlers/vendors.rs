use axum::{extract::State, Extension};
use serde::Deserialize;

use crate::{
    database::Database,
    error::{map_write_error, AppError, AppResult},
    middleware::CurrentUser,
    models::{non_blank, Vendor, VendorInput, VendorStatus},
    params::{Json, Path, Query},
    repositories::vendors::{self, VendorFilter},
    response::{ApiResponse, PageRequest},
};

const VENDOR_NOT_FOUND: &str = "Vendor not found";

#[derive(Debug, Default, Deserialize)]
pub struct VendorQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

pub async fn list_vendors(
    State(db): State<Database>,
    Query(query): Query<VendorQuery>,
) -> AppResult<ApiResponse<Vec<Vendor>>> {
    let filter = VendorFilter {
        search: non_blank(query.search),
        status: query.status.as_deref().and_then(VendorStatus::parse),
    };
    let page = PageRequest::parse(query.page.as_deref(), query.limit.as_deref());

    let (vendors, total) = vendors::list(&db, &filter, page).await?;
    Ok(ApiResponse::ok(vendors).with_pagination(page.paginate(total)))
}

pub async fn get_vendor(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Vendor>> {
    let vendor = vendors::find(&db, id)
        .await?
        .ok_or_else(|| AppError::not_found(VENDOR_NOT_FOUND))?;
    Ok(ApiResponse::ok(vendor))
}

pub async fn create_vendor(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Json(mut input): Json<VendorInput>,
) -> AppResult<ApiResponse<Vendor>> {
    let name = non_blank(input.name.take())
        .ok_or_else(|| AppError::invalid("Vendor name is required"))?;

    let id = vendors::insert(&db, &name, &input)
        .await
        .map_err(map_write_error)?;
    let vendor = vendors::find(&db, id)
        .await?
        .ok_or_else(|| AppError::not_found(VENDOR_NOT_FOUND))?;

    log::info!("User {} created vendor {} ({})", user.id, vendor.id, vendor.name);
    Ok(ApiResponse::created("Vendor created successfully", vendor))
}

pub async fn update_vendor(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(mut input): Json<VendorInput>,
) -> AppResult<ApiResponse<Vendor>> {
    let existing = vendors::find(&db, id)
        .await?
        .ok_or_else(|| AppError::not_found(VENDOR_NOT_FOUND))?;

    let name = non_blank(input.name.take())
        .ok_or_else(|| AppError::invalid("Vendor name is required"))?;
    let status = input.status.unwrap_or(existing.status);

    vendors::update(&db, id, &name, status, &input)
        .await
        .map_err(map_write_error)?;
    let vendor = vendors::find(&db, id)
        .await?
        .ok_or_else(|| AppError::not_found(VENDOR_NOT_FOUND))?;

    log::info!("User {} updated vendor {}", user.id, id);
    Ok(ApiResponse::ok(vendor).with_message("Vendor updated successfully"))
}

pub async fn delete_vendor(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    if !vendors::delete(&db, id).await? {
        return Err(AppError::not_found(VENDOR_NOT_FOUND));
    }

    log::info!("User {} deleted vendor {}", user.id, id);
    Ok(ApiResponse::message("Vendor deleted successfully"))
}
