//! # Report Repository
//!
//! Read-only aggregates over sales orders and the catalog.
//!
//! ## Profit Aggregation
//! ```text
//! sales_orders ──┬── sales_order_items ──JOIN── products   (deleted products drop out)
//!                │
//!  revenue = Σ order.total_price   once per joined LINE
//!  cost    = Σ line.quantity × product.cost
//!  profit  = revenue − cost
//! ```
//! An order with three surviving lines contributes its total three times,
//! so revenue over-counts multi-line orders.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use kestrel_core::{InventoryItem, ProfitSummary, SalesByDay};

/// Repository for report queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sales totals per UTC calendar day, oldest day first.
    pub async fn sales_by_day(&self) -> DbResult<Vec<SalesByDay>> {
        debug!("Building sales report");

        // created_at is RFC 3339 in UTC, so the first ten characters are the day.
        let rows = sqlx::query_as::<_, SalesByDay>(
            r#"
            SELECT
                substr(created_at, 1, 10) AS date,
                CAST(COALESCE(SUM(total_price), 0) AS REAL) AS total_sales,
                COUNT(*) AS order_count
            FROM sales_orders
            GROUP BY substr(created_at, 1, 10)
            ORDER BY date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Stock snapshot of every product with its low-stock flag.
    pub async fn inventory(&self) -> DbResult<Vec<InventoryItem>> {
        debug!("Building inventory report");

        let rows = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT
                id, title, sku, stock, reorder_level, price, category,
                stock <= reorder_level AS low_stock
            FROM products
            ORDER BY title, rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Revenue, cost of goods and profit over all sales orders.
    ///
    /// All zeros when no order line resolves to an existing product.
    pub async fn profit(&self) -> DbResult<ProfitSummary> {
        debug!("Building profit report");

        let summary = sqlx::query_as::<_, ProfitSummary>(
            r#"
            SELECT
                CAST(COALESCE(SUM(so.total_price), 0) AS REAL) AS total_revenue,
                CAST(COALESCE(SUM(i.quantity * p.cost), 0) AS REAL) AS total_cost,
                CAST(COALESCE(SUM(so.total_price), 0) - COALESCE(SUM(i.quantity * p.cost), 0) AS REAL) AS profit
            FROM sales_orders so
            INNER JOIN sales_order_items i ON i.sales_order_id = so.id
            INNER JOIN products p ON p.id = i.product_id
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}
