use rust_decimal::Decimal;
use sqlx::SqliteConnection;

use crate::{
    database::{Database, WriteTransaction},
    error::{map_write_error, AppError, AppResult},
    models::{
        non_blank, CreatePurchaseOrder, NewOrderItem, OrderItemInput, PurchaseOrder,
        PurchaseOrderDetail, PurchaseOrderItem, ReplaceItems, UpdatePurchaseOrder,
    },
    repositories::{
        products,
        purchase_orders::{self, OrderFilter},
        vendors,
    },
    response::{Page, PageRequest},
    utils::money,
};

const ORDER_NOT_FOUND: &str = "Purchase order not found";

/// Owns every multi-row write on purchase orders. Header and items are written
/// inside one transaction, and all items are validated before the first write,
/// so a rejected item never leaves a partial order or item set behind.
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: Database,
}

impl PurchaseOrderService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreatePurchaseOrder) -> AppResult<PurchaseOrderDetail> {
        let vendor_id = input
            .vendor_id
            .ok_or_else(|| AppError::invalid("Vendor ID is required"))?;
        let po_number = non_blank(input.po_number)
            .ok_or_else(|| AppError::invalid("PO number is required"))?;
        let order_date = input
            .order_date
            .ok_or_else(|| AppError::invalid("Order date is required"))?;
        let items = require_items(input.items)?;
        let status = input.status.unwrap_or_default();
        let notes = non_blank(input.notes);

        let mut tx = WriteTransaction::begin(&self.db).await?;

        if !vendors::exists(&mut *tx, vendor_id).await? {
            return Err(AppError::not_found("Vendor not found"));
        }

        if purchase_orders::po_number_taken(&mut *tx, &po_number).await? {
            return Err(AppError::Conflict(format!(
                "Purchase order number '{}' already exists. Please use a different PO number.",
                po_number
            )));
        }

        let items = validate_items(&mut tx, vendor_id, &items).await?;

        let id = purchase_orders::insert_header(
            &mut *tx,
            vendor_id,
            &po_number,
            status,
            order_date,
            notes.as_deref(),
        )
        .await
        .map_err(map_write_error)?;

        for item in &items {
            purchase_orders::insert_item(&mut *tx, id, item)
                .await
                .map_err(map_write_error)?;
        }

        tx.commit().await?;

        log::info!(
            "Created purchase order {} ({}) for vendor {} with {} item(s)",
            id,
            po_number,
            vendor_id,
            items.len()
        );

        self.get(id).await
    }

    pub async fn replace_items(
        &self,
        id: i64,
        input: ReplaceItems,
    ) -> AppResult<Vec<PurchaseOrderItem>> {
        let items = require_items(input.items)?;

        let mut tx = WriteTransaction::begin(&self.db).await?;

        let vendor_id = purchase_orders::vendor_of(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(ORDER_NOT_FOUND))?;

        let items = validate_items(&mut tx, vendor_id, &items).await?;

        let removed = purchase_orders::delete_items(&mut *tx, id).await?;
        for item in &items {
            purchase_orders::insert_item(&mut *tx, id, item)
                .await
                .map_err(map_write_error)?;
        }

        let stored = purchase_orders::items_for_order(&mut *tx, id).await?;
        tx.commit().await?;

        log::info!(
            "Replaced {} item(s) on purchase order {} with {}",
            removed,
            id,
            stored.len()
        );

        Ok(stored)
    }

    /// Updates status, order date and notes. An omitted status keeps the
    /// stored one; vendor and PO number never change.
    pub async fn update_header(
        &self,
        id: i64,
        input: UpdatePurchaseOrder,
    ) -> AppResult<PurchaseOrder> {
        let existing = purchase_orders::find(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found(ORDER_NOT_FOUND))?;

        let order_date = input
            .order_date
            .ok_or_else(|| AppError::invalid("Order date is required"))?;
        let status = input.status.unwrap_or(existing.status);
        let notes = non_blank(input.notes);

        purchase_orders::update_header(&self.db, id, status, order_date, notes.as_deref()).await?;

        purchase_orders::find(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found(ORDER_NOT_FOUND))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = WriteTransaction::begin(&self.db).await?;

        if !purchase_orders::exists(&mut *tx, id).await? {
            return Err(AppError::not_found(ORDER_NOT_FOUND));
        }

        purchase_orders::delete_items(&mut *tx, id).await?;
        purchase_orders::delete(&mut *tx, id).await?;

        tx.commit().await?;
        log::info!("Deleted purchase order {}", id);
        Ok(())
    }

    pub async fn list(&self, filter: OrderFilter, page: PageRequest) -> AppResult<Page<PurchaseOrder>> {
        let (items, total) = purchase_orders::list(&self.db, &filter, page).await?;
        Ok(Page {
            items,
            pagination: page.paginate(total),
        })
    }

    pub async fn get(&self, id: i64) -> AppResult<PurchaseOrderDetail> {
        let mut conn = self.db.acquire().await?;

        let order = purchase_orders::find(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::not_found(ORDER_NOT_FOUND))?;
        let items = purchase_orders::items_for_order(&mut *conn, id).await?;

        Ok(PurchaseOrderDetail::new(order, items))
    }
}

fn require_items(items: Option<Vec<OrderItemInput>>) -> AppResult<Vec<OrderItemInput>> {
    match items {
        Some(items) if !items.is_empty() => Ok(items),
        _ => Err(AppError::invalid("At least one item is required")),
    }
}

/// Presence and range checks for one line item. A zero quantity is rejected;
/// a zero unit price is a legitimate free line.
fn check_item_fields(item: &OrderItemInput) -> AppResult<NewOrderItem> {
    let (product_id, qty, unit_price) = match (item.product_id, item.qty, item.unit_price) {
        (Some(p), Some(q), Some(u)) => (p, q, u),
        _ => {
            return Err(AppError::invalid(
                "Each item must have product_id, qty, and unit_price",
            ))
        }
    };

    if qty < 1 {
        return Err(AppError::invalid(format!(
            "Item for product {} must have a qty of at least 1",
            product_id
        )));
    }

    if unit_price < Decimal::ZERO {
        return Err(AppError::invalid(format!(
            "Item for product {} must have a unit_price of 0 or more",
            product_id
        )));
    }

    if !money::is_whole_cents(unit_price) {
        return Err(AppError::invalid(format!(
            "Item for product {} must have a unit_price with at most 2 decimal places",
            product_id
        )));
    }

    Ok(NewOrderItem {
        product_id,
        qty,
        unit_price,
    })
}

/// Read-only pass over every candidate item. Runs before any write in the
/// surrounding transaction.
async fn validate_items(
    conn: &mut SqliteConnection,
    vendor_id: i64,
    items: &[OrderItemInput],
) -> AppResult<Vec<NewOrderItem>> {
    let mut validated = Vec::with_capacity(items.len());

    for item in items {
        let item = check_item_fields(item)?;

        if !products::belongs_to_vendor(&mut *conn, item.product_id, vendor_id).await? {
            return Err(AppError::invalid(format!(
                "Product {} not found or does not belong to this vendor",
                item.product_id
            )));
        }

        validated.push(item);
    }

    Ok(validated)
}
