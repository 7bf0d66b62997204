//! # Sales Order Repository
//!
//! Storage for sales orders and their lines.
//!
//! ## Status Fields
//! ```text
//! status          draft ─► pending ─► confirmed ─► shipped ─► delivered
//!                                  └─────────────────────────► cancelled
//! payment_status  unpaid ⇄ partial ⇄ paid     (invoice creation → unpaid)
//! ```
//! Both are free overwrites: no transition is rejected.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kestrel_core::{
    Page, PageRequest, PaymentStatus, SalesOrder, SalesOrderItem, SalesOrderStatusUpdate,
};

const ORDER_COLUMNS: &str = r#"
    id, order_number, customer_id, subtotal, tax, shipping, total_price,
    status, payment_status, delivery_date, notes, created_by, created_at, updated_at
"#;

/// Repository for sales order reads and status edits.
#[derive(Debug, Clone)]
pub struct SalesOrderRepository {
    pool: SqlitePool,
}

impl SalesOrderRepository {
    /// Creates a new SalesOrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SalesOrderRepository { pool }
    }

    /// Gets a sales order with its lines.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SalesOrder>> {
        let mut conn = self.pool.acquire().await?;
        fetch_sales_order(&mut conn, id).await
    }

    /// Gets a sales order, failing with `NotFound` when absent.
    pub async fn find_by_id(&self, id: &str) -> DbResult<SalesOrder> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("SalesOrder", id))
    }

    /// Lists sales orders with their lines, newest first.
    pub async fn find(&self, page: PageRequest) -> DbResult<Page<SalesOrder>> {
        let mut conn = self.pool.acquire().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales_orders")
            .fetch_one(&mut *conn)
            .await?;

        let mut orders = sqlx::query_as::<_, SalesOrder>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM sales_orders
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

    /// Overwrites `status` and/or `payment_status`, whichever is supplied.
    ///
    /// ## Returns
    /// * `Ok(SalesOrder)` - The updated order
    /// * `Err(DbError::NotFound)` - Order doesn't exist
    pub async fn update_status(
        &self,
        id: &str,
        update: SalesOrderStatusUpdate,
    ) -> DbResult<SalesOrder> {
        debug!(
            id = %id,
            status = ?update.status,
            payment_status = ?update.payment_status,
            "Updating sales order status"
        );

        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query(
            r#"
            UPDATE sales_orders SET
                status = COALESCE(?2, status),
                payment_status = COALESCE(?3, payment_status),
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.status)
        .bind(update.payment_status)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SalesOrder", id));
        }

        fetch_sales_order(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("SalesOrder", id))
    }

    /// Deletes a sales order and its lines. Stock is not restored and
    /// invoices keep the dangling id.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sales order");

        let result = sqlx::query("DELETE FROM sales_orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SalesOrder", id));
        }

        Ok(())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

pub(crate) async fn fetch_sales_order(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<SalesOrder>> {
    let order = sqlx::query_as::<_, SalesOrder>(&format!(
        "SELECT {ORDER_COLUMNS} FROM sales_orders WHERE id = ?1"
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
    sales_order_id: &str,
) -> DbResult<Vec<SalesOrderItem>> {
    let items = sqlx::query_as::<_, SalesOrderItem>(
        r#"
        SELECT id, product_id, quantity, price, discount, total
        FROM sales_order_items
        WHERE sales_order_id = ?1
        ORDER BY line_no
        "#,
    )
    .bind(sales_order_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Inserts a sales order header and all of its lines.
pub(crate) async fn insert_sales_order(
    conn: &mut SqliteConnection,
    order: &SalesOrder,
) -> DbResult<()> {
    debug!(id = %order.id, order_number = %order.order_number, "Inserting sales order");

    sqlx::query(
        r#"
        INSERT INTO sales_orders (
            id, order_number, customer_id, subtotal, tax, shipping, total_price,
            status, payment_status, delivery_date, notes, created_by, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7,
            ?8, ?9, ?10, ?11, ?12, ?13, ?14
        )
        "#,
    )
    .bind(&order.id)
    .bind(&order.order_number)
    .bind(&order.customer_id)
    .bind(order.subtotal)
    .bind(order.tax)
    .bind(order.shipping)
    .bind(order.total_price)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(order.delivery_date)
    .bind(&order.notes)
    .bind(&order.created_by)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    for (line_no, item) in order.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO sales_order_items (
                id, sales_order_id, line_no, product_id, quantity, price, discount, total
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&order.id)
        .bind(line_no as i64)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.discount)
        .bind(item.total)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub(crate) async fn set_payment_status(
    conn: &mut SqliteConnection,
    id: &str,
    payment_status: PaymentStatus,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE sales_orders SET payment_status = ?2, updated_at = ?3 WHERE id = ?1",
    )
    .bind(id)
    .bind(payment_status)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("SalesOrder", id));
    }

    Ok(())
}
