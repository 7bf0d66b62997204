//! # Sales Workflow
//!
//! Sales orders take stock; invoices bill a sales order.
//!
//! ## Stock Decrement
//! ```text
//! line 1: UPDATE products SET stock = stock - q WHERE id = ? AND stock >= q
//!           ├── 1 row  → next line
//!           └── 0 rows → NotFound / InsufficientStock, transaction dropped
//! line 2: ...
//! ```
//! The check and the decrement are one statement, and the whole order is one
//! transaction. Two orders racing for the last unit cannot both succeed, and
//! a failing line leaves earlier lines' stock untouched.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::invoice::insert_invoice;
use crate::repository::product::take_stock;
use crate::repository::sales_order::{fetch_sales_order, insert_sales_order, set_payment_status};
use crate::repository::sequence::next_number;
use kestrel_core::pricing::{line_total, resolve_totals};
use kestrel_core::validation::{
    validate_amount, validate_invoice_items, validate_required, validate_sales_order_items,
};
use kestrel_core::{
    DocumentKind, Invoice, InvoiceItem, NewInvoice, NewSalesOrder, PaymentStatus, SalesOrder,
    SalesOrderItem, TotalsInput,
};

/// Sales-side document flows.
#[derive(Debug, Clone)]
pub struct SalesWorkflow {
    pool: SqlitePool,
}

impl SalesWorkflow {
    pub fn new(pool: SqlitePool) -> Self {
        SalesWorkflow { pool }
    }

    /// Creates a sales order and takes its quantities out of stock.
    ///
    /// ## Returns
    /// * `Ok(SalesOrder)` - Stored order, `pending` / `unpaid` by default
    /// * `Err(DbError::NotFound)` - A line names a product that doesn't exist
    /// * `Err(DbError::Domain)` - A line asks for more than is on hand, or
    ///   the order has no lines
    ///
    /// On any error no stock has moved and no number was consumed.
    pub async fn create_sales_order(
        &self,
        input: NewSalesOrder,
        created_by: Option<&str>,
    ) -> DbResult<SalesOrder> {
        validate_required("customerId", &input.customer_id)?;
        validate_sales_order_items(&input.items)?;

        let mut tx = self.pool.begin().await?;

        let order_number = next_number(&mut tx, DocumentKind::SalesOrder).await?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            take_stock(&mut tx, &item.product_id, item.quantity).await?;
            debug!(
                product_id = %item.product_id,
                quantity = item.quantity,
                "Stock taken for sales line"
            );

            items.push(SalesOrderItem {
                id: Uuid::new_v4().to_string(),
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                price: item.price,
                discount: item.discount,
                total: line_total(item.quantity, item.price, item.discount, item.total),
            });
        }

        let totals = resolve_totals(&input.totals, items.iter().map(|i| i.total));
        let now = Utc::now();
        let order = SalesOrder {
            id: Uuid::new_v4().to_string(),
            order_number,
            customer_id: input.customer_id,
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            shipping: totals.shipping,
            total_price: totals.total,
            status: input.status.unwrap_or_default(),
            payment_status: PaymentStatus::Unpaid,
            delivery_date: input.delivery_date,
            notes: input.notes,
            created_by: created_by.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        insert_sales_order(&mut tx, &order).await?;
        tx.commit().await?;

        info!(
            order_number = %order.order_number,
            lines = order.items.len(),
            total = order.total_price,
            "Sales order created"
        );
        Ok(order)
    }

    /// Raises an invoice against a sales order and marks the order unpaid.
    ///
    /// ## Defaults
    /// - customer: the sales order's customer
    /// - lines: copied from the sales order when none are given, together
    ///   with its tax and shipping
    /// - paid amount 0, status `draft`, invoice date now
    ///
    /// Any number of invoices may point at the same order.
    pub async fn create_invoice(
        &self,
        input: NewInvoice,
        created_by: Option<&str>,
    ) -> DbResult<Invoice> {
        validate_required("salesOrderId", &input.sales_order_id)?;
        validate_invoice_items(&input.items)?;
        if let Some(paid) = input.paid_amount {
            validate_amount("paidAmount", paid)?;
        }

        let mut tx = self.pool.begin().await?;

        let invoice_number = next_number(&mut tx, DocumentKind::Invoice).await?;

        let order = fetch_sales_order(&mut tx, &input.sales_order_id)
            .await?
            .ok_or_else(|| DbError::not_found("SalesOrder", &input.sales_order_id))?;

        let (items, totals_input) = if input.items.is_empty() {
            let items: Vec<InvoiceItem> = order
                .items
                .iter()
                .map(|line| InvoiceItem {
                    id: Uuid::new_v4().to_string(),
                    product_id: line.product_id.clone(),
                    description: None,
                    quantity: line.quantity,
                    price: line.price,
                    discount: line.discount,
                    total: line.total,
                })
                .collect();
            let totals = TotalsInput {
                tax: input.totals.tax.or(Some(order.tax)),
                shipping: input.totals.shipping.or(Some(order.shipping)),
                ..input.totals
            };
            (items, totals)
        } else {
            let items = input
                .items
                .iter()
                .map(|item| InvoiceItem {
                    id: Uuid::new_v4().to_string(),
                    product_id: item.product_id.clone(),
                    description: item.description.clone(),
                    quantity: item.quantity,
                    price: item.price,
                    discount: item.discount,
                    total: line_total(item.quantity, item.price, item.discount, item.total),
                })
                .collect();
            (items, input.totals)
        };

        let totals = resolve_totals(&totals_input, items.iter().map(|i| i.total));
        let now = Utc::now();
        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            invoice_number,
            sales_order_id: order.id.clone(),
            customer_id: input.customer_id.unwrap_or(order.customer_id),
            invoice_date: input.invoice_date.unwrap_or(now),
            due_date: input.due_date,
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            shipping: totals.shipping,
            total_amount: totals.total,
            paid_amount: input.paid_amount.unwrap_or(0.0),
            status: input.status.unwrap_or_default(),
            payment_method: input.payment_method,
            notes: input.notes,
            terms: input.terms,
            created_by: created_by.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        insert_invoice(&mut tx, &invoice).await?;
        set_payment_status(&mut tx, &order.id, PaymentStatus::Unpaid).await?;
        tx.commit().await?;

        info!(
            invoice_number = %invoice.invoice_number,
            sales_order = %order.order_number,
            total = invoice.total_amount,
            "Invoice created"
        );
        Ok(invoice)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
