//! # Domain Types
//!
//! Core domain types used throughout Kestrel ERP.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog            Partners            Documents (own their lines)     │
//! │  ───────            ────────            ───────────────────────────     │
//! │  Product            Customer            PurchaseOrder ─► PO lines       │
//! │  (stock counter)    Supplier            Grn           ─► GRN lines      │
//! │                     (Address)           SalesOrder    ─► SO lines       │
//! │                                         Invoice       ─► invoice lines  │
//! │                                                                         │
//! │  Identity           Reports             Paging                          │
//! │  ────────           ───────             ──────                          │
//! │  User, Role         SalesByDay          PageRequest ─► Page<T>          │
//! │                     InventoryItem                                       │
//! │                     ProfitSummary                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 string, immutable, used for cross references
//! - Business key where one exists: `sku`, `email`, or a document number
//!
//! Cross references (`product_id`, `customer_id`, ...) are plain ids. Nothing
//! stops a referenced product or partner from being deleted, so readers must
//! tolerate ids that no longer resolve.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

// =============================================================================
// Role
// =============================================================================

/// Access role carried by every user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unrestricted access, including deletes and user management.
    Admin,
    /// Customers, sales orders, invoices.
    Sales,
    /// Suppliers, purchase orders, goods receipts.
    Purchase,
    /// Products, goods receipts, reports.
    Inventory,
    /// Read-only.
    Viewer,
}

impl Role {
    /// Lowercase wire/storage name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Sales => "sales",
            Role::Purchase => "purchase",
            Role::Inventory => "inventory",
            Role::Viewer => "viewer",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Viewer
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Status Enums
// =============================================================================

/// Purchase order lifecycle.
///
/// ```text
/// draft ─► pending ─► approved ─► partial ⇄ received
///                  └────────────► cancelled
/// ```
/// Only `partial`/`received` are set automatically (by goods receipt);
/// every other move is a manual status edit with no transition checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Draft,
    #[default]
    Pending,
    Approved,
    Received,
    Partial,
    Cancelled,
}

/// Goods receipt note status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum GrnStatus {
    #[default]
    Pending,
    Partial,
    Completed,
}

/// Sales order fulfilment lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SalesOrderStatus {
    Draft,
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

/// Payment tracking on a sales order, orthogonal to its fulfilment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

/// Invoice lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Partial,
    Overdue,
    Cancelled,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    BankTransfer,
    Cheque,
    Other,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog item with its on-hand stock counter.
///
/// `stock` is the only field mutated by both the purchase and the sales
/// workflow. It never goes below zero.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub title: String,

    /// Stock Keeping Unit, stored trimmed and upper-cased. Unique.
    pub sku: String,

    pub description: Option<String>,

    pub category: String,

    /// Unit of measure ("pcs", "box", ...).
    pub unit: String,

    /// Selling price.
    pub price: f64,

    /// Acquisition cost, used by the profit report.
    pub cost: f64,

    /// Units on hand.
    pub stock: i64,

    /// Low-stock threshold.
    pub reorder_level: i64,

    pub is_active: bool,

    /// Id of the user who created the product.
    pub created_by: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks if the product is at or below its reorder level.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.reorder_level
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    pub sku: String,
    pub description: Option<String>,
    pub category: String,
    /// Defaults to "pcs".
    pub unit: Option<String>,
    pub price: f64,
    /// Defaults to 0.
    pub cost: Option<f64>,
    /// Opening stock, defaults to 0.
    pub stock: Option<i64>,
    /// Defaults to 10.
    pub reorder_level: Option<i64>,
    pub is_active: Option<bool>,
}

/// Partial product update. `None` leaves a field unchanged; an explicit
/// JSON `null` clears `description`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub title: Option<String>,
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub stock: Option<i64>,
    pub reorder_level: Option<i64>,
    pub is_active: Option<bool>,
}

// =============================================================================
// Partners
// =============================================================================

/// Postal address embedded in customer and supplier records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// A customer that sales orders and invoices point at.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Stored lower-cased.
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub address: Address,
    pub tax_id: Option<String>,
    pub credit_limit: f64,
    /// Reserved. No workflow reads or writes it.
    pub outstanding_balance: f64,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    #[serde(default)]
    pub address: Address,
    pub tax_id: Option<String>,
    pub credit_limit: Option<f64>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

/// Partial customer update. The outstanding balance is not patchable.
/// An explicit `null` clears one of the optional text fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub company: Option<Option<String>>,
    pub address: Option<Address>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub tax_id: Option<Option<String>>,
    pub credit_limit: Option<f64>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub notes: Option<Option<String>>,
}

/// A supplier that purchase orders and goods receipts point at.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
    /// Stored lower-cased.
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub address: Address,
    pub tax_id: Option<String>,
    pub payment_terms: String,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    pub name: String,
    pub contact_person: Option<String>,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    #[serde(default)]
    pub address: Address,
    pub tax_id: Option<String>,
    /// Defaults to "Net 30".
    pub payment_terms: Option<String>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

/// Partial supplier update. An explicit `null` clears one of the optional
/// text fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub contact_person: Option<Option<String>>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub company: Option<Option<String>>,
    pub address: Option<Address>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub tax_id: Option<Option<String>>,
    pub payment_terms: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub notes: Option<Option<String>>,
}

/// Reads a patch field where an absent key leaves the column alone and
/// `null` clears it.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Document Totals
// =============================================================================

/// Caller-supplied header amounts for an order or invoice.
///
/// Anything left out is derived from the lines by [`crate::pricing`]:
/// `subtotal = Σ line totals`, `total = subtotal + tax + shipping`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TotalsInput {
    pub subtotal: Option<f64>,
    pub tax: Option<f64>,
    pub shipping: Option<f64>,
    /// Grand total (`totalPrice` on orders, `totalAmount` on invoices).
    #[serde(alias = "totalPrice", alias = "totalAmount")]
    pub total: Option<f64>,
}

/// Resolved header amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total: f64,
}

// =============================================================================
// Purchase Order
// =============================================================================

/// A line of a purchase order with its running received tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderItem {
    pub id: String,
    pub product_id: String,
    /// Units ordered (≥ 1).
    pub quantity: i64,
    /// Unit price.
    pub price: f64,
    /// Units received so far across all GRNs.
    pub received_quantity: i64,
    pub total: f64,
}

impl PurchaseOrderItem {
    /// Checks if every ordered unit has arrived.
    pub fn is_fully_received(&self) -> bool {
        self.received_quantity >= self.quantity
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: String,
    /// `PO-000001`, unique.
    pub order_number: String,
    pub supplier_id: String,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<PurchaseOrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total_price: f64,
    pub status: PurchaseOrderStatus,
    #[ts(as = "Option<String>")]
    pub expected_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchaseOrderItem {
    #[serde(alias = "product")]
    pub product_id: String,
    pub quantity: i64,
    pub price: f64,
    /// Defaults to `quantity × price`.
    pub total: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchaseOrder {
    #[serde(alias = "supplier")]
    pub supplier_id: String,
    #[serde(default)]
    pub items: Vec<NewPurchaseOrderItem>,
    #[serde(flatten)]
    pub totals: TotalsInput,
    /// Defaults to `pending`.
    pub status: Option<PurchaseOrderStatus>,
    #[ts(as = "Option<String>")]
    pub expected_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

// =============================================================================
// Goods Receipt Note
// =============================================================================

/// One received line of a GRN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GrnItem {
    pub id: String,
    pub product_id: String,
    /// Ordered quantity of the matched PO line at receipt time.
    pub ordered_quantity: i64,
    pub received_quantity: i64,
    pub rejected_quantity: i64,
    pub remarks: Option<String>,
}

/// A goods receipt note. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Grn {
    pub id: String,
    /// `GRN-000001`, unique.
    pub grn_number: String,
    pub purchase_order_id: String,
    pub supplier_id: String,
    #[ts(as = "String")]
    pub received_date: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<GrnItem>,
    pub status: GrnStatus,
    pub notes: Option<String>,
    pub received_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A received line as submitted by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    #[serde(alias = "product")]
    pub product_id: String,
    /// Snapshot of the ordered quantity; taken from the PO line when omitted.
    pub ordered_quantity: Option<i64>,
    pub received_quantity: i64,
    #[serde(default)]
    pub rejected_quantity: i64,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewGrn {
    #[serde(alias = "purchaseOrder")]
    pub purchase_order_id: String,
    /// Defaults to the purchase order's supplier.
    #[serde(alias = "supplier")]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub items: Vec<ReceiptLine>,
    /// Defaults to `pending`.
    pub status: Option<GrnStatus>,
    #[ts(as = "Option<String>")]
    pub received_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

// =============================================================================
// Sales Order
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderItem {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub price: f64,
    pub discount: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrder {
    pub id: String,
    /// `SO-000001`, unique.
    pub order_number: String,
    pub customer_id: String,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<SalesOrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total_price: f64,
    pub status: SalesOrderStatus,
    pub payment_status: PaymentStatus,
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewSalesOrderItem {
    #[serde(alias = "product")]
    pub product_id: String,
    pub quantity: i64,
    pub price: f64,
    #[serde(default)]
    pub discount: f64,
    /// Defaults to `quantity × price − discount`.
    pub total: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewSalesOrder {
    #[serde(alias = "customer")]
    pub customer_id: String,
    #[serde(default)]
    pub items: Vec<NewSalesOrderItem>,
    #[serde(flatten)]
    pub totals: TotalsInput,
    /// Defaults to `pending`.
    pub status: Option<SalesOrderStatus>,
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Independent overwrite of either sales order status field.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderStatusUpdate {
    pub status: Option<SalesOrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

// =============================================================================
// Invoice
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: String,
    pub product_id: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: f64,
    pub discount: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    /// `INV-000001`, unique.
    pub invoice_number: String,
    pub sales_order_id: String,
    pub customer_id: String,
    #[ts(as = "String")]
    pub invoice_date: DateTime<Utc>,
    #[ts(as = "String")]
    pub due_date: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<InvoiceItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub status: InvoiceStatus,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoiceItem {
    #[serde(alias = "product")]
    pub product_id: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: f64,
    #[serde(default)]
    pub discount: f64,
    pub total: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    #[serde(alias = "salesOrder")]
    pub sales_order_id: String,
    /// Defaults to the sales order's customer.
    #[serde(alias = "customer")]
    pub customer_id: Option<String>,
    /// When empty, the sales order's lines are copied.
    #[serde(default)]
    pub items: Vec<NewInvoiceItem>,
    #[serde(flatten)]
    pub totals: TotalsInput,
    pub paid_amount: Option<f64>,
    /// Defaults to `draft`.
    pub status: Option<InvoiceStatus>,
    pub payment_method: Option<PaymentMethod>,
    #[ts(as = "Option<String>")]
    pub invoice_date: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub terms: Option<String>,
}

// =============================================================================
// User
// =============================================================================

/// A user account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    /// Stored lower-cased. Unique.
    pub email: String,
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to `viewer`.
    pub role: Option<Role>,
}

/// Admin-side account update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

// =============================================================================
// Reports
// =============================================================================

/// One day of sales, keyed by the UTC calendar date (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesByDay {
    pub date: String,
    pub total_sales: f64,
    pub order_count: i64,
}

/// Inventory snapshot row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub title: String,
    pub sku: String,
    pub stock: i64,
    pub reorder_level: i64,
    pub price: f64,
    pub category: String,
    /// `stock <= reorderLevel`.
    pub low_stock: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProfitSummary {
    pub total_revenue: f64,
    pub total_cost: f64,
    pub profit: f64,
}

// =============================================================================
// Paging
// =============================================================================

/// Normalized page request (0-based page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Builds a page request from optional query values.
    ///
    /// Missing or non-positive limits fall back to [`DEFAULT_PAGE_LIMIT`],
    /// large ones are capped at [`MAX_PAGE_LIMIT`], negative pages become 0.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => l.min(MAX_PAGE_LIMIT),
            _ => DEFAULT_PAGE_LIMIT,
        };
        PageRequest {
            page: page.unwrap_or(0).max(0),
            limit,
        }
    }

    /// Row offset of the first record on this page.
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None)
    }
}

/// One page of a list plus the total number of matching records.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        Page {
            data,
            total,
            page: request.page,
            limit: request.limit,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
