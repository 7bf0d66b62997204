//! # kestrel-db: Database Layer for Kestrel ERP
//!
//! This crate provides database access for Kestrel ERP.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kestrel ERP Data Flow                            │
//! │                                                                         │
//! │  HTTP handler (POST /api/sales-orders)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kestrel-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Workflows   │  │   │
//! │  │   │   (pool.rs)   │    │               │    │              │  │   │
//! │  │   │               │    │ ProductRepo   │    │ Purchasing   │  │   │
//! │  │   │ SqlitePool    │◄───│ CustomerRepo  │◄───│  PO, GRN     │  │   │
//! │  │   │ Connection    │    │ SalesOrderRepo│    │ Sales        │  │   │
//! │  │   │ Management    │    │ ReportRepo …  │    │  SO, invoice │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │   ./kestrel.db  (migrations embedded from migrations/sqlite)    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Per-entity repositories and report queries
//! - [`workflow`] - Stock-moving document flows, one transaction each
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kestrel_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("kestrel.db")).await?;
//!
//! let page = db.products().find(Some("mouse"), PageRequest::default()).await?;
//! let order = db.sales().create_sales_order(new_order, Some(&user.id)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod workflow;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::grn::GrnRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::product::ProductRepository;
pub use repository::purchase_order::PurchaseOrderRepository;
pub use repository::report::ReportRepository;
pub use repository::sales_order::SalesOrderRepository;
pub use repository::supplier::SupplierRepository;
pub use repository::user::{hash_password, verify_password, UserRepository};

pub use workflow::purchasing::PurchasingWorkflow;
pub use workflow::sales::SalesWorkflow;
