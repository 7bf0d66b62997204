//! # Document Numbering
//!
//! Human-readable numbers for purchase orders, goods receipts, sales orders
//! and invoices: `"<prefix>-" + six-digit zero-padded sequence`.
//!
//! ```text
//! DocumentKind::PurchaseOrder + 1   ──►  PO-000001
//! DocumentKind::GoodsReceipt  + 42  ──►  GRN-000042
//! DocumentKind::SalesOrder    + 7   ──►  SO-000007
//! DocumentKind::Invoice       + 1e6 ──►  INV-1000000   (widens, never truncates)
//! ```
//!
//! The sequence value itself comes from an atomic per-kind counter in
//! kestrel-db; this module only owns the prefixes and the format.

use serde::{Deserialize, Serialize};

/// The kinds of numbered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    PurchaseOrder,
    GoodsReceipt,
    SalesOrder,
    Invoice,
}

impl DocumentKind {
    /// Prefix placed before the sequence. Also the counter's key in storage.
    pub const fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::PurchaseOrder => "PO",
            DocumentKind::GoodsReceipt => "GRN",
            DocumentKind::SalesOrder => "SO",
            DocumentKind::Invoice => "INV",
        }
    }

    /// Formats the `sequence`-th document number of this kind.
    ///
    /// ## Example
    /// ```rust
    /// use kestrel_core::DocumentKind;
    ///
    /// assert_eq!(DocumentKind::PurchaseOrder.format(1), "PO-000001");
    /// assert_eq!(DocumentKind::Invoice.format(123), "INV-000123");
    /// ```
    pub fn format(&self, sequence: i64) -> String {
        format!("{}-{:06}", self.prefix(), sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_pads_to_six_digits() {
        assert_eq!(DocumentKind::PurchaseOrder.format(1), "PO-000001");
        assert_eq!(DocumentKind::GoodsReceipt.format(1), "GRN-000001");
        assert_eq!(DocumentKind::SalesOrder.format(15), "SO-000015");
        assert_eq!(DocumentKind::Invoice.format(999_999), "INV-999999");
    }

    #[test]
    fn test_large_sequences_widen() {
        assert_eq!(DocumentKind::SalesOrder.format(1_000_000), "SO-1000000");
    }
}
