//! # Repository Module
//!
//! Database repository implementations for Kestrel ERP.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().find(Some("mouse"), page)                       │
//! │       ▼                                                                 │
//! │  ProductRepository (owns a SqlitePool clone)                           │
//! │  ├── create / get_by_id / find_by_id / find                            │
//! │  ├── update / adjust_stock / delete                                    │
//! │  └── pub(crate) fns on &mut SqliteConnection                           │
//! │       │        (used by workflows inside one transaction)              │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Workflow code never calls the pool-backed methods while it holds a
//! transaction: with a single-connection pool (in-memory tests) that would
//! wait forever on its own connection.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD, search, stock counter
//! - [`customer::CustomerRepository`] / [`supplier::SupplierRepository`] - Partners
//! - [`user::UserRepository`] - Accounts and password checks
//! - [`purchase_order::PurchaseOrderRepository`] / [`grn::GrnRepository`] - Purchasing reads
//! - [`sales_order::SalesOrderRepository`] / [`invoice::InvoiceRepository`] - Sales reads
//! - [`report::ReportRepository`] - Aggregates

pub mod customer;
pub mod grn;
pub mod invoice;
pub mod product;
pub mod purchase_order;
pub mod report;
pub mod sales_order;
pub mod sequence;
pub mod supplier;
pub mod user;

/// Turns a search keyword into a `LIKE` pattern (`ESCAPE '\'`).
///
/// `%` and `_` in the keyword match literally.
pub(crate) fn like_pattern(keyword: Option<&str>) -> Option<String> {
    keyword.map(|k| {
        let escaped = k
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    })
}
