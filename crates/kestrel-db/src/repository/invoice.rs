//! # Invoice Repository
//!
//! Storage for invoices and their lines. Invoices are created by
//! [`crate::workflow::sales::SalesWorkflow::create_invoice`]; several
//! invoices may point at the same sales order.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kestrel_core::{Invoice, InvoiceItem, Page, PageRequest};

const INVOICE_COLUMNS: &str = r#"
    id, invoice_number, sales_order_id, customer_id, invoice_date, due_date,
    subtotal, tax, shipping, total_amount, paid_amount, status, payment_method,
    notes, terms, created_by, created_at, updated_at
"#;

/// Repository for invoice reads.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let mut conn = self.pool.acquire().await?;

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match invoice {
            Some(mut invoice) => {
                invoice.items = fetch_items(&mut conn, &invoice.id).await?;
                Ok(Some(invoice))
            }
            None => Ok(None),
        }
    }

    /// Gets an invoice, failing with `NotFound` when absent.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Invoice> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", id))
    }

    /// Lists invoices with their lines, newest first.
    pub async fn find(&self, page: PageRequest) -> DbResult<Page<Invoice>> {
        let mut conn = self.pool.acquire().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&mut *conn)
            .await?;

        let mut invoices = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS} FROM invoices
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1 OFFSET ?2
            "#
        ))
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;

        for invoice in &mut invoices {
            invoice.items = fetch_items(&mut conn, &invoice.id).await?;
        }

        Ok(Page::new(invoices, total, page))
    }

    /// Number of invoices raised against a sales order.
    pub async fn count_for_sales_order(&self, sales_order_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE sales_order_id = ?1")
                .bind(sales_order_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn fetch_items(conn: &mut SqliteConnection, invoice_id: &str) -> DbResult<Vec<InvoiceItem>> {
    let items = sqlx::query_as::<_, InvoiceItem>(
        r#"
        SELECT id, product_id, description, quantity, price, discount, total
        FROM invoice_items
        WHERE invoice_id = ?1
        ORDER BY line_no
        "#,
    )
    .bind(invoice_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Inserts an invoice header and all of its lines.
pub(crate) async fn insert_invoice(conn: &mut SqliteConnection, invoice: &Invoice) -> DbResult<()> {
    debug!(id = %invoice.id, invoice_number = %invoice.invoice_number, "Inserting invoice");

    sqlx::query(
        r#"
        INSERT INTO invoices (
            id, invoice_number, sales_order_id, customer_id, invoice_date, due_date,
            subtotal, tax, shipping, total_amount, paid_amount, status, payment_method,
            notes, terms, created_by, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10, ?11, ?12, ?13,
            ?14, ?15, ?16, ?17, ?18
        )
        "#,
    )
    .bind(&invoice.id)
    .bind(&invoice.invoice_number)
    .bind(&invoice.sales_order_id)
    .bind(&invoice.customer_id)
    .bind(invoice.invoice_date)
    .bind(invoice.due_date)
    .bind(invoice.subtotal)
    .bind(invoice.tax)
    .bind(invoice.shipping)
    .bind(invoice.total_amount)
    .bind(invoice.paid_amount)
    .bind(invoice.status)
    .bind(invoice.payment_method)
    .bind(&invoice.notes)
    .bind(&invoice.terms)
    .bind(&invoice.created_by)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .execute(&mut *conn)
    .await?;

    for (line_no, item) in invoice.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO invoice_items (
                id, invoice_id, line_no, product_id, description,
                quantity, price, discount, total
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&item.id)
        .bind(&invoice.id)
        .bind(line_no as i64)
        .bind(&item.product_id)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.discount)
        .bind(item.total)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
