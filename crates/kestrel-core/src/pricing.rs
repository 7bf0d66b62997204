//! # Pricing
//!
//! Line and document totals for orders and invoices.
//!
//! Amounts are plain `f64`, matching how the browser client computes them.
//! Callers may send their own figures; only the missing ones are derived.
//!
//! ```text
//! line total     = quantity × price − discount
//! subtotal       = Σ line totals
//! total          = subtotal + tax + shipping
//! ```

use crate::types::{Totals, TotalsInput};

/// Computes the total of one line unless the caller supplied it.
///
/// ## Example
/// ```rust
/// use kestrel_core::pricing::line_total;
///
/// assert_eq!(line_total(3, 2.5, 1.0, None), 6.5);
/// assert_eq!(line_total(3, 2.5, 0.0, Some(7.0)), 7.0);
/// ```
pub fn line_total(quantity: i64, price: f64, discount: f64, supplied: Option<f64>) -> f64 {
    supplied.unwrap_or_else(|| quantity as f64 * price - discount)
}

/// Resolves document totals from the caller's figures and the line totals.
pub fn resolve_totals<I>(input: &TotalsInput, line_totals: I) -> Totals
where
    I: IntoIterator<Item = f64>,
{
    let subtotal = input
        .subtotal
        .unwrap_or_else(|| line_totals.into_iter().sum());
    let tax = input.tax.unwrap_or(0.0);
    let shipping = input.shipping.unwrap_or(0.0);
    let total = input.total.unwrap_or(subtotal + tax + shipping);

    Totals {
        subtotal,
        tax,
        shipping,
        total,
    }
}
