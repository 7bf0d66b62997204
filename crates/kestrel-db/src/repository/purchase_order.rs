//! # Purchase Order Repository
//!
//! Storage for purchase orders and their lines.
//!
//! ## Tables
//! ```text
//! purchase_orders 1 ──── * purchase_order_items   (ON DELETE CASCADE)
//!   order_number UNIQUE       line_no keeps insertion order
//!   status                    received_quantity: running tally fed by GRNs
//! ```
//!
//! Creation and receipt reconciliation live in
//! [`crate::workflow::purchasing`]; this module owns the SQL they share.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kestrel_core::{Page, PageRequest, PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus};

const ORDER_COLUMNS: &str = r#"
    id, order_number, supplier_id, subtotal, tax, shipping, total_price,
    status, expected_date, notes, created_by, created_at, updated_at
"#;

/// Repository for purchase order reads and status edits.
#[derive(Debug, Clone)]
pub struct PurchaseOrderRepository {
    pool: SqlitePool,
}

impl PurchaseOrderRepository {
    /// Creates a new PurchaseOrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseOrderRepository { pool }
    }

    /// Gets a purchase order with its lines.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PurchaseOrder>> {
        let mut conn = self.pool.acquire().await?;
        fetch_purchase_order(&mut conn, id).await
    }

    /// Gets a purchase order, failing with `NotFound` when absent.
    pub async fn find_by_id(&self, id: &str) -> DbResult<PurchaseOrder> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("PurchaseOrder", id))
    }

    /// Lists purchase orders with their lines, newest first.
    pub async fn find(&self, page: PageRequest) -> DbResult<Page<PurchaseOrder>> {
        let mut conn = self.pool.acquire().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchase_orders")
            .fetch_one(&mut *conn)
            .await?;

        let mut orders = sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM purchase_orders
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1 OFFSET ?2
            "#
        ))
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;

        for order in &mut orders {
            order.items = fetch_items(&mut conn, &order.id).await?;
        }

        Ok(Page::new(orders, total, page))
    }

    /// Overwrites the status. Any status may follow any other.
    ///
    /// ## Returns
    /// * `Ok(PurchaseOrder)` - Order with the new status
    /// * `Err(DbError::NotFound)` - Order doesn't exist
    pub async fn update_status(
        &self,
        id: &str,
        status: PurchaseOrderStatus,
    ) -> DbResult<PurchaseOrder> {
        debug!(id = %id, status = ?status, "Updating purchase order status");

        let mut conn = self.pool.acquire().await?;
        set_status(&mut conn, id, status).await?;

        fetch_purchase_order(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("PurchaseOrder", id))
    }

    /// Deletes a purchase order and its lines. GRNs keep the dangling id.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting purchase order");

        let result = sqlx::query("DELETE FROM purchase_orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PurchaseOrder", id));
        }

        Ok(())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

pub(crate) async fn fetch_purchase_order(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<PurchaseOrder>> {
    let order = sqlx::query_as::<_, PurchaseOrder>(&format!(
        "SELECT {ORDER_COLUMNS} FROM purchase_orders WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match order {
        Some(mut order) => {
            order.items = fetch_items(conn, &order.id).await?;
            Ok(Some(order))
        }
        None => Ok(None),
    }
}

async fn fetch_items(
    conn: &mut SqliteConnection,
    purchase_order_id: &str,
) -> DbResult<Vec<PurchaseOrderItem>> {
    let items = sqlx::query_as::<_, PurchaseOrderItem>(
        r#"
        SELECT id, product_id, quantity, price, received_quantity, total
        FROM purchase_order_items
        WHERE purchase_order_id = ?1
        ORDER BY line_no
        "#,
    )
    .bind(purchase_order_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Inserts a purchase order header and all of its lines.
pub(crate) async fn insert_purchase_order(
    conn: &mut SqliteConnection,
    order: &PurchaseOrder,
) -> DbResult<()> {
    debug!(id = %order.id, order_number = %order.order_number, "Inserting purchase order");

    sqlx::query(
        r#"
        INSERT INTO purchase_orders (
            id, order_number, supplier_id, subtotal, tax, shipping, total_price,
            status, expected_date, notes, created_by, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7,
            ?8, ?9, ?10, ?11, ?12, ?13
        )
        "#,
    )
    .bind(&order.id)
    .bind(&order.order_number)
    .bind(&order.supplier_id)
    .bind(order.subtotal)
    .bind(order.tax)
    .bind(order.shipping)
    .bind(order.total_price)
    .bind(order.status)
    .bind(order.expected_date)
    .bind(&order.notes)
    .bind(&order.created_by)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    for (line_no, item) in order.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO purchase_order_items (
                id, purchase_order_id, line_no, product_id,
                quantity, price, received_quantity, total
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&order.id)
        .bind(line_no as i64)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.received_quantity)
        .bind(item.total)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Writes back the received tallies and the derived status.
pub(crate) async fn save_receipt_progress(
    conn: &mut SqliteConnection,
    order: &PurchaseOrder,
) -> DbResult<()> {
    for item in &order.items {
        sqlx::query("UPDATE purchase_order_items SET received_quantity = ?2 WHERE id = ?1")
            .bind(&item.id)
            .bind(item.received_quantity)
            .execute(&mut *conn)
            .await?;
    }

    set_status(conn, &order.id, order.status).await
}

async fn set_status(
    conn: &mut SqliteConnection,
    id: &str,
    status: PurchaseOrderStatus,
) -> DbResult<()> {
    let result =
        sqlx::query("UPDATE purchase_orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("PurchaseOrder", id));
    }

    Ok(())
}
