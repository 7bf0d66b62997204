//! # Error Types
//!
//! Domain-specific error types for kestrel-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kestrel-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule and identity failures            │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kestrel-db errors (separate crate)                                    │
//! │  └── DbError          - Database failures (wraps CoreError)            │
//! │                                                                         │
//! │  kestrel-api errors (in app)                                           │
//! │  └── ApiError         - Status + code + message sent to the client     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → HTTP         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::access::{Action, Resource};
use crate::types::Role;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sales order line asks for more units than are on hand.
    ///
    /// ## When This Occurs
    /// ```text
    /// Sales order line (qty: 6)
    ///      │
    ///      ▼
    /// Conditional decrement: stock=5, 5 >= 6? no
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Wireless Mouse", available: 5, requested: 6 }
    ///      │
    ///      ▼
    /// Whole order rolled back, stock still 5
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Credentials were missing, malformed, expired or did not match.
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but their role may not do this.
    #[error("Role {role} may not {action} {resource}")]
    Forbidden {
        role: Role,
        resource: Resource,
        action: Action,
    },

    /// A request is well-formed but breaks a business rule.
    ///
    /// ## When This Occurs
    /// - Deleting an admin account
    #[error("{0}")]
    BusinessRule(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any row is written.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is below its floor.
    #[error("{field} must be at least {min}")]
    BelowMinimum { field: String, min: i64 },

    /// Numeric value is above its ceiling.
    #[error("{field} must be at most {max}")]
    AboveMaximum { field: String, max: i64 },

    /// Money value is negative or not a finite number.
    #[error("{field} must be a non-negative amount")]
    InvalidAmount { field: String },

    /// Invalid format (e.g., invalid email, invalid SKU characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A document needs at least one line item.
    #[error("No {document} items")]
    NoItems { document: String },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
