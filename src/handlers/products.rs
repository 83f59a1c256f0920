use axum::{extract::State, Extension};
use rust_decimal::Decimal;

use crate::{
    database::{Database, WriteTransaction},
    error::{map_write_error, AppError, AppResult},
    middleware::CurrentUser,
    models::{non_blank, Product, ProductInput},
    params::{Json, Path},
    repositories::{
        products::{self, ProductFields},
        vendors,
    },
    response::ApiResponse,
    utils::money,
};

const PRODUCT_NOT_FOUND: &str = "Product not found";

// Name and price checks shared by create and update. `active` defaults to true
// on both.
fn product_fields(input: ProductInput) -> AppResult<ProductFields> {
    let name = non_blank(input.name)
        .ok_or_else(|| AppError::invalid("Product name is required"))?;
    let unit_price = input
        .unit_price
        .ok_or_else(|| AppError::invalid("Unit price is required"))?;
    if unit_price < Decimal::ZERO {
        return Err(AppError::invalid(
            "Unit price must be a valid positive number",
        ));
    }
    if !money::is_whole_cents(unit_price) {
        return Err(AppError::invalid(
            "Unit price must have at most 2 decimal places",
        ));
    }

    Ok(ProductFields {
        name,
        sku: non_blank(input.sku),
        unit_price,
        active: input.active.unwrap_or(true),
    })
}

pub async fn list_products(
    State(db): State<Database>,
    Path(vendor_id): Path<i64>,
) -> AppResult<ApiResponse<Vec<Product>>> {
    if !vendors::exists(&db, vendor_id).await? {
        return Err(AppError::not_found("Vendor not found"));
    }

    let products = products::list_for_vendor(&db, vendor_id).await?;
    Ok(ApiResponse::ok(products))
}

pub async fn create_product(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(vendor_id): Path<i64>,
    Json(input): Json<ProductInput>,
) -> AppResult<ApiResponse<Product>> {
    let fields = product_fields(input)?;

    if !vendors::exists(&db, vendor_id).await? {
        return Err(AppError::not_found("Vendor not found"));
    }

    let id = products::insert(&db, vendor_id, &fields)
        .await
        .map_err(map_write_error)?;
    let product = products::find(&db, id)
        .await?
        .ok_or_else(|| AppError::not_found(PRODUCT_NOT_FOUND))?;

    log::info!("User {} added product {} to vendor {}", user.id, id, vendor_id);
    Ok(ApiResponse::created("Product created successfully", product))
}

pub async fn update_product(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(input): Json<ProductInput>,
) -> AppResult<ApiResponse<Product>> {
    let fields = product_fields(input)?;

    if products::find(&db, id).await?.is_none() {
        return Err(AppError::not_found(PRODUCT_NOT_FOUND));
    }

    products::update(&db, id, &fields)
        .await
        .map_err(map_write_error)?;
    let product = products::find(&db, id)
        .await?
        .ok_or_else(|| AppError::not_found(PRODUCT_NOT_FOUND))?;

    log::info!("User {} updated product {}", user.id, id);
    Ok(ApiResponse::ok(product).with_message("Product updated successfully"))
}

/// Products still referenced by order lines cannot be removed; the order
/// would otherwise lose a line and its spend.
pub async fn delete_product(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    let mut tx = WriteTransaction::begin(&db).await?;

    if products::find(&mut *tx, id).await?.is_none() {
        return Err(AppError::not_found(PRODUCT_NOT_FOUND));
    }
    if products::is_referenced(&mut *tx, id).await? {
        return Err(AppError::Conflict(
            "Product is used by existing purchase orders and cannot be deleted".to_string(),
        ));
    }

    products::delete(&mut *tx, id).await?;
    tx.commit().await?;

    log::info!("User {} deleted product {}", user.id, id);
    Ok(ApiResponse::message("Product deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_fields_checks_name_then_price() {
        let missing_name = product_fields(ProductInput {
            unit_price: Some(Decimal::ONE),
            ..Default::default()
        });
        assert!(matches!(missing_name, Err(AppError::InvalidInput(m)) if m == "Product name is required"));

        let missing_price = product_fields(ProductInput {
            name: Some("Bolt".to_string()),
            ..Default::default()
        });
        assert!(matches!(missing_price, Err(AppError::InvalidInput(m)) if m == "Unit price is required"));

        let negative = product_fields(ProductInput {
            name: Some("Bolt".to_string()),
            unit_price: Some(Decimal::new(-1, 2)),
            ..Default::default()
        });
        assert!(matches!(negative, Err(AppError::InvalidInput(_))));

        let sub_cent = product_fields(ProductInput {
            name: Some("Bolt".to_string()),
            unit_price: Some(Decimal::new(10005, 3)),
            ..Default::default()
        });
        assert!(matches!(sub_cent, Err(AppError::InvalidInput(m)) if m == "Unit price must have at most 2 decimal places"));
    }

    #[test]
    fn product_fields_defaults_active_and_allows_free_items() {
        let fields = product_fields(ProductInput {
            name: Some("  Sample ".to_string()),
            sku: Some("".to_string()),
            unit_price: Some(Decimal::ZERO),
            active: None,
        })
        .unwrap();

        assert_eq!(fields.name, "Sample");
        assert_eq!(fields.sku, None);
        assert_eq!(fields.unit_price, Decimal::ZERO);
        assert!(fields.active);
    }
}
