use axum::{extract::State, Extension};

use crate::{
    database::Database,
    error::{map_write_error, AppError, AppResult},
    middleware::CurrentUser,
    models::{non_blank, Contact, ContactInput},
    params::{Json, Path},
    repositories::{contacts, vendors},
    response::ApiResponse,
};

const CONTACT_NOT_FOUND: &str = "Contact not found";

pub async fn list_contacts(
    State(db): State<Database>,
    Path(vendor_id): Path<i64>,
) -> AppResult<ApiResponse<Vec<Contact>>> {
    if !vendors::exists(&db, vendor_id).await? {
        return Err(AppError::not_found("Vendor not found"));
    }

    let contacts = contacts::list_for_vendor(&db, vendor_id).await?;
    Ok(ApiResponse::ok(contacts))
}

pub async fn create_contact(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(vendor_id): Path<i64>,
    Json(mut input): Json<ContactInput>,
) -> AppResult<ApiResponse<Contact>> {
    let name = non_blank(input.name.take())
        .ok_or_else(|| AppError::invalid("Contact name is required"))?;

    if !vendors::exists(&db, vendor_id).await? {
        return Err(AppError::not_found("Vendor not found"));
    }

    let id = contacts::insert(&db, vendor_id, &name, &input)
        .await
        .map_err(map_write_error)?;
    let contact = contacts::find(&db, id)
        .await?
        .ok_or_else(|| AppError::not_found(CONTACT_NOT_FOUND))?;

    log::info!("User {} added contact {} to vendor {}", user.id, id, vendor_id);
    Ok(ApiResponse::created("Contact created successfully", contact))
}

pub async fn update_contact(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(mut input): Json<ContactInput>,
) -> AppResult<ApiResponse<Contact>> {
    let name = non_blank(input.name.take())
        .ok_or_else(|| AppError::invalid("Contact name is required"))?;

    if contacts::find(&db, id).await?.is_none() {
        return Err(AppError::not_found(CONTACT_NOT_FOUND));
    }

    contacts::update(&db, id, &name, &input)
        .await
        .map_err(map_write_error)?;
    let contact = contacts::find(&db, id)
        .await?
        .ok_or_else(|| AppError::not_found(CONTACT_NOT_FOUND))?;

    log::info!("User {} updated contact {}", user.id, id);
    Ok(ApiResponse::ok(contact).with_message("Contact updated successfully"))
}

pub async fn delete_contact(
    State(db): State<Database>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    if !contacts::delete(&db, id).await? {
        return Err(AppError::not_found(CONTACT_NOT_FOUND));
    }

    log::info!("User {} deleted contact {}", user.id, id);
    Ok(ApiResponse::message("Contact deleted successfully"))
}
