use axum::{extract::State, Extension};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::{
        CreatePurchaseOrder, PurchaseOrder, PurchaseOrderDetail, PurchaseOrderItem,
        PurchaseOrderStatus, ReplaceItems, UpdatePurchaseOrder,
    },
    params::{optional_id, Json, Path, Query},
    repositories::purchase_orders::OrderFilter,
    response::{ApiResponse, PageRequest},
    services::PurchaseOrderService,
};

#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    #[serde(rename = "vendorId")]
    pub vendor_id: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

pub async fn list_purchase_orders(
    State(service): State<PurchaseOrderService>,
    Query(query): Query<OrderQuery>,
) -> AppResult<ApiResponse<Vec<PurchaseOrder>>> {
    // Unknown status values are dropped rather than rejected.
    let filter = OrderFilter {
        vendor_id: optional_id("vendorId", query.vendor_id.as_deref())?,
        status: query
            .status
            .as_deref()
            .and_then(|s| PurchaseOrderStatus::parse(s.trim())),
    };
    let page = PageRequest::parse(query.page.as_deref(), query.limit.as_deref());

    let result = service.list(filter, page).await?;
    Ok(ApiResponse::ok(result.items).with_pagination(result.pagination))
}

pub async fn get_purchase_order(
    State(service): State<PurchaseOrderService>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<PurchaseOrderDetail>> {
    let order = service.get(id).await?;
    Ok(ApiResponse::ok(order))
}

pub async fn create_purchase_order(
    State(service): State<PurchaseOrderService>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<CreatePurchaseOrder>,
) -> AppResult<ApiResponse<PurchaseOrderDetail>> {
    let order = service.create(input).await?;

    log::info!(
        "User {} ({}) created purchase order {}",
        user.id,
        user.name,
        order.order.po_number
    );
    Ok(ApiResponse::created(
        "Purchase order created successfully",
        order,
    ))
}

pub async fn update_purchase_order(
    State(service): State<PurchaseOrderService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(input): Json<UpdatePurchaseOrder>,
) -> AppResult<ApiResponse<PurchaseOrder>> {
    let order = service.update_header(id, input).await?;

    log::info!("User {} updated purchase order {}", user.id, id);
    Ok(ApiResponse::ok(order).with_message("Purchase order updated successfully"))
}

pub async fn replace_purchase_order_items(
    State(service): State<PurchaseOrderService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(input): Json<ReplaceItems>,
) -> AppResult<ApiResponse<Vec<PurchaseOrderItem>>> {
    let items = service.replace_items(id, input).await?;

    log::info!("User {} replaced items of purchase order {}", user.id, id);
    Ok(ApiResponse::ok(items).with_message("Purchase order items updated successfully"))
}

pub async fn delete_purchase_order(
    State(service): State<PurchaseOrderService>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    service.delete(id).await?;

    log::info!("User {} deleted purchase order {}", user.id, id);
    Ok(ApiResponse::message("Purchase order deleted successfully"))
}
