//! # Validation Module
//!
//! Input validation and normalization for Kestrel ERP.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum Json / Query)                           │
//! │  └── Shape and type checks (deserialization)                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, formats                                 │
//! │  ├── Non-negative money, quantities in 1..=MAX_QUANTITY                │
//! │  └── Normalization (SKU upper-case, email lower-case)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (sku, email, document numbers)                             │
//! │  └── CHECK (stock >= 0, status values)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_QUANTITY;
use crate::types::{
    CustomerPatch, NewCustomer, NewInvoiceItem, NewProduct, NewPurchaseOrderItem,
    NewSalesOrderItem, NewSupplier, NewUser, ProductPatch, ReceiptLine, SupplierPatch,
    UserPatch,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_SKU_LEN: usize = 50;
const MAX_EMAIL_LEN: usize = 254;
const MAX_QUERY_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// Normalization
// =============================================================================

/// Canonical SKU form: trimmed and upper-cased.
///
/// ## Example
/// ```rust
/// use kestrel_core::validation::normalize_sku;
///
/// assert_eq!(normalize_sku("  hp-lap-001 "), "HP-LAP-001");
/// ```
pub fn normalize_sku(sku: &str) -> String {
    sku.trim().to_uppercase()
}

/// Canonical email form: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-text field (names, titles, categories).
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only letters, digits, hyphens, underscores
///
/// ## Example
/// ```rust
/// use kestrel_core::validation::validate_sku;
///
/// assert!(validate_sku("HP-LAP-001").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::required("sku"));
    }

    if sku.len() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address (shape only: `local@domain`).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        }),
    }
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Validates a search keyword.
///
/// ## Returns
/// The trimmed keyword, or `None` when it is empty (no filtering).
pub fn validate_search_query(keyword: Option<&str>) -> ValidationResult<Option<String>> {
    let keyword = keyword.map(str::trim).unwrap_or_default();

    if keyword.is_empty() {
        return Ok(None);
    }

    if keyword.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "keyword".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(Some(keyword.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a money amount: finite and ≥ 0.
pub fn validate_amount(field: &str, amount: f64) -> ValidationResult<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::InvalidAmount {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an integer counter (stock, reorder level, received units)
/// lies in `0..=MAX_QUANTITY`.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    validate_range(field, value, 0)
}

/// Validates an ordered/sold quantity lies in `1..=MAX_QUANTITY`.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    validate_range("quantity", quantity, 1)
}

fn validate_range(field: &str, value: i64, min: i64) -> ValidationResult<()> {
    if value < min {
        return Err(ValidationError::BelowMinimum {
            field: field.to_string(),
            min,
        });
    }
    if value > MAX_QUANTITY {
        return Err(ValidationError::AboveMaximum {
            field: field.to_string(),
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

fn validate_optional_amount(field: &str, amount: Option<f64>) -> ValidationResult<()> {
    amount.map_or(Ok(()), |a| validate_amount(field, a))
}

fn validate_optional_required(field: &str, value: Option<&String>) -> ValidationResult<()> {
    value.map_or(Ok(()), |v| validate_required(field, v))
}

// =============================================================================
// Entity Validators
// =============================================================================

pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_required("title", &product.title)?;
    validate_sku(&product.sku)?;
    validate_required("category", &product.category)?;
    validate_amount("price", product.price)?;
    validate_optional_amount("cost", product.cost)?;
    if let Some(stock) = product.stock {
        validate_non_negative("stock", stock)?;
    }
    if let Some(level) = product.reorder_level {
        validate_non_negative("reorderLevel", level)?;
    }
    Ok(())
}

pub fn validate_product_patch(patch: &ProductPatch) -> ValidationResult<()> {
    validate_optional_required("title", patch.title.as_ref())?;
    if let Some(sku) = &patch.sku {
        validate_sku(sku)?;
    }
    validate_optional_required("category", patch.category.as_ref())?;
    validate_optional_amount("price", patch.price)?;
    validate_optional_amount("cost", patch.cost)?;
    if let Some(stock) = patch.stock {
        validate_non_negative("stock", stock)?;
    }
    if let Some(level) = patch.reorder_level {
        validate_non_negative("reorderLevel", level)?;
    }
    Ok(())
}

pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_required("name", &customer.name)?;
    validate_email(&customer.email)?;
    validate_required("phone", &customer.phone)?;
    validate_optional_amount("creditLimit", customer.credit_limit)
}

pub fn validate_customer_patch(patch: &CustomerPatch) -> ValidationResult<()> {
    validate_optional_required("name", patch.name.as_ref())?;
    if let Some(email) = &patch.email {
        validate_email(email)?;
    }
    validate_optional_required("phone", patch.phone.as_ref())?;
    validate_optional_amount("creditLimit", patch.credit_limit)
}

pub fn validate_new_supplier(supplier: &NewSupplier) -> ValidationResult<()> {
    validate_required("name", &supplier.name)?;
    validate_email(&supplier.email)?;
    validate_required("phone", &supplier.phone)
}

pub fn validate_supplier_patch(patch: &SupplierPatch) -> ValidationResult<()> {
    validate_optional_required("name", patch.name.as_ref())?;
    if let Some(email) = &patch.email {
        validate_email(email)?;
    }
    validate_optional_required("phone", patch.phone.as_ref())
}

pub fn validate_new_user(user: &NewUser) -> ValidationResult<()> {
    validate_required("name", &user.name)?;
    validate_email(&user.email)?;
    validate_password(&user.password)
}

pub fn validate_user_patch(patch: &UserPatch) -> ValidationResult<()> {
    validate_optional_required("name", patch.name.as_ref())?;
    if let Some(email) = &patch.email {
        validate_email(email)?;
    }
    Ok(())
}

// =============================================================================
// Line Item Validators
// =============================================================================

fn require_items<T>(document: &str, items: &[T]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::NoItems {
            document: document.to_string(),
        });
    }
    Ok(())
}

/// Purchase order lines: at least one, quantity ≥ 1, price ≥ 0.
pub fn validate_purchase_order_items(items: &[NewPurchaseOrderItem]) -> ValidationResult<()> {
    require_items("order", items)?;
    for item in items {
        validate_required("productId", &item.product_id)?;
        validate_quantity(item.quantity)?;
        validate_amount("price", item.price)?;
        validate_optional_amount("total", item.total)?;
    }
    Ok(())
}

/// Sales order lines: at least one, quantity ≥ 1, price and discount ≥ 0.
///
/// ## Example
/// ```rust
/// use kestrel_core::validation::validate_sales_order_items;
///
/// let err = validate_sales_order_items(&[]).unwrap_err();
/// assert_eq!(err.to_string(), "No order items");
/// ```
pub fn validate_sales_order_items(items: &[NewSalesOrderItem]) -> ValidationResult<()> {
    require_items("order", items)?;
    for item in items {
        validate_required("productId", &item.product_id)?;
        validate_quantity(item.quantity)?;
        validate_amount("price", item.price)?;
        validate_amount("discount", item.discount)?;
        validate_optional_amount("total", item.total)?;
    }
    Ok(())
}

/// Goods receipt lines: at least one, received and rejected in
/// `0..=MAX_QUANTITY`.
pub fn validate_receipt_lines(lines: &[ReceiptLine]) -> ValidationResult<()> {
    require_items("receipt", lines)?;
    for line in lines {
        validate_required("productId", &line.product_id)?;
        validate_non_negative("receivedQuantity", line.received_quantity)?;
        validate_non_negative("rejectedQuantity", line.rejected_quantity)?;
        if let Some(ordered) = line.ordered_quantity {
            validate_non_negative("orderedQuantity", ordered)?;
        }
    }
    Ok(())
}

/// Invoice lines. An empty list is allowed (the order's lines are copied).
pub fn validate_invoice_items(items: &[NewInvoiceItem]) -> ValidationResult<()> {
    for item in items {
        validate_required("productId", &item.product_id)?;
        validate_quantity(item.quantity)?;
        validate_amount("price", item.price)?;
        validate_amount("discount", item.discount)?;
        validate_optional_amount("total", item.total)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> NewProduct {
        NewProduct {
            title: "HP Laptop".to_string(),
            sku: "hp-lap-001".to_string(),
            category: "Electronics".to_string(),
            price: 899.99,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("COKE-330").is_ok());
        assert!(validate_sku("product_1").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_normalization() {
        assert_eq!(normalize_sku(" mou-002"), "MOU-002");
        assert_eq!(normalize_email(" Admin@ERP.com "), "admin@erp.com");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("sales@erp.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@erp.com").is_err());
    }

    #[test]
    fn test_validate_amount_rejects_negative_and_nan() {
        assert!(validate_amount("price", 0.0).is_ok());
        assert!(validate_amount("price", -0.01).is_err());
        assert!(validate_amount("price", f64::NAN).is_err());
        assert!(validate_amount("price", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        assert!(validate_new_product(&product()).is_ok());

        let mut p = product();
        p.stock = Some(-1);
        assert!(validate_new_product(&p).is_err());

        let mut p = product();
        p.title = "  ".to_string();
        assert!(matches!(
            validate_new_product(&p),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_empty_orders_are_rejected() {
        assert!(validate_purchase_order_items(&[]).is_err());
        assert!(validate_sales_order_items(&[]).is_err());
        assert!(validate_receipt_lines(&[]).is_err());
        assert!(validate_invoice_items(&[]).is_ok());
    }

    #[test]
    fn test_order_line_quantity_must_be_positive() {
        let line = NewSalesOrderItem {
            product_id: "p1".to_string(),
            quantity: 0,
            price: 1.0,
            discount: 0.0,
            total: None,
        };
        assert!(matches!(
            validate_sales_order_items(&[line]),
            Err(ValidationError::BelowMinimum { min: 1, .. })
        ));
    }

    #[test]
    fn test_quantities_are_capped() {
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(MAX_QUANTITY + 1),
            Err(ValidationError::AboveMaximum { .. })
        ));
        assert!(validate_non_negative("stock", i64::MAX).is_err());

        let line = ReceiptLine {
            product_id: "p1".to_string(),
            ordered_quantity: None,
            received_quantity: i64::MAX,
            rejected_quantity: 0,
            remarks: None,
        };
        let err = validate_receipt_lines(&[line]).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("receivedQuantity must be at most {MAX_QUANTITY}")
        );
    }

    #[test]
    fn test_search_query_trims_to_none() {
        assert_eq!(validate_search_query(None).unwrap(), None);
        assert_eq!(validate_search_query(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_search_query(Some(" mouse ")).unwrap(),
            Some("mouse".to_string())
        );
        assert!(validate_search_query(Some(&"x".repeat(101))).is_err());
    }
}
