//! # kestrel-core: Pure Business Logic for Kestrel ERP
//!
//! This crate holds the domain model of Kestrel ERP and every rule that can
//! be expressed without touching storage or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kestrel ERP Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser client                               │   │
//! │  │   Products ── Orders ── GRN ── Invoices ── Reports             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kestrel-api (axum)                           │   │
//! │  │   auth extractor ─► access check ─► handler ─► ApiError         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kestrel-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐   │   │
//! │  │  │  types  │ │ access  │ │receiving│ │ pricing │ │numbering│   │   │
//! │  │  │ Product │ │ Role ×  │ │ PO line │ │ line &  │ │ PO-0001 │   │   │
//! │  │  │ Orders  │ │ Resource│ │ tallies │ │ totals  │ │ SO-0001 │   │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kestrel-db (Database Layer)                  │   │
//! │  │        SQLite queries, migrations, repositories, workflows      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities, line items, create/patch payloads, report rows
//! - [`access`] - Declarative role policy table and the single access check
//! - [`receiving`] - Goods-receipt reconciliation against purchase order lines
//! - [`pricing`] - Line and document totals
//! - [`numbering`] - Human-readable document numbers (`PO-000001`)
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod numbering;
pub mod pricing;
pub mod receiving;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{Action, Resource};
pub use error::{CoreError, CoreResult, ValidationError};
pub use numbering::DocumentKind;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when a list request does not name one.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Largest page a list request may ask for.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Largest quantity a single line, receipt or stock figure may carry.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Low-stock threshold given to products created without one.
pub const DEFAULT_REORDER_LEVEL: i64 = 10;

/// Unit of measure given to products created without one.
pub const DEFAULT_UNIT: &str = "pcs";

/// Payment terms given to suppliers created without any.
pub const DEFAULT_PAYMENT_TERMS: &str = "Net 30";
