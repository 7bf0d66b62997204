//! # Goods Receipt Reconciliation
//!
//! Pure rules for folding a goods receipt into its purchase order.
//!
//! ## Reconciliation Step
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PO-000001                         GRN lines                            │
//! │  ┌──────────┬─────┬──────────┐     ┌──────────┬──────────┐              │
//! │  │ product  │ qty │ received │     │ product  │ received │              │
//! │  ├──────────┼─────┼──────────┤     ├──────────┼──────────┤              │
//! │  │ P1       │ 20  │ 12 ──────┼─────┤ P1       │ 8        │              │
//! │  │ P2       │  5  │  5       │     │ P9       │ 3        │ ← no PO line │
//! │  └──────────┴─────┴──────────┘     └──────────┴──────────┘   ignored    │
//! │                                                                         │
//! │  After apply_receipt:  P1 received 20, P2 received 5                    │
//! │  derive_status:        every line received ≥ qty  →  received           │
//! │                        otherwise                  →  partial            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock increments are a storage concern and happen in kestrel-db for every
//! GRN line whose product still exists, matched or not.

use crate::error::ValidationError;
use crate::types::{PurchaseOrderItem, PurchaseOrderStatus, ReceiptLine};
use crate::validation::ValidationResult;

/// Adds each receipt line to the first PO line with the same product.
///
/// The tally is all-or-nothing: when any line would push a running total
/// past `i64::MAX`, `items` is left untouched.
///
/// ## Returns
/// For every receipt line, the index of the PO line it was added to, or
/// `None` when the PO has no line for that product.
pub fn apply_receipt(
    items: &mut [PurchaseOrderItem],
    lines: &[ReceiptLine],
) -> ValidationResult<Vec<Option<usize>>> {
    let mut tally: Vec<i64> = items.iter().map(|item| item.received_quantity).collect();
    let mut matches = Vec::with_capacity(lines.len());

    for line in lines {
        let matched = items
            .iter()
            .position(|item| item.product_id == line.product_id);
        if let Some(index) = matched {
            tally[index] = tally[index]
                .checked_add(line.received_quantity)
                .ok_or_else(|| ValidationError::AboveMaximum {
                    field: "receivedQuantity".to_string(),
                    max: i64::MAX,
                })?;
        }
        matches.push(matched);
    }

    for (item, received) in items.iter_mut().zip(tally) {
        item.received_quantity = received;
    }
    Ok(matches)
}

/// Status of a purchase order after a receipt.
pub fn derive_status(items: &[PurchaseOrderItem]) -> PurchaseOrderStatus {
    if items.iter().all(PurchaseOrderItem::is_fully_received) {
        PurchaseOrderStatus::Received
    } else {
        PurchaseOrderStatus::Partial
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn po_line(product_id: &str, quantity: i64, received: i64) -> PurchaseOrderItem {
        PurchaseOrderItem {
            id: format!("line-{product_id}"),
            product_id: product_id.to_string(),
            quantity,
            price: 1.0,
            received_quantity: received,
            total: quantity as f64,
        }
    }

    fn received(product_id: &str, quantity: i64) -> ReceiptLine {
        ReceiptLine {
            product_id: product_id.to_string(),
            ordered_quantity: None,
            received_quantity: quantity,
            rejected_quantity: 0,
            remarks: None,
        }
    }

    #[test]
    fn test_receipts_accumulate_to_received() {
        let mut items = vec![po_line("P1", 20, 0)];

        apply_receipt(&mut items, &[received("P1", 12)]).unwrap();
        assert_eq!(items[0].received_quantity, 12);
        assert_eq!(derive_status(&items), PurchaseOrderStatus::Partial);

        apply_receipt(&mut items, &[received("P1", 8)]).unwrap();
        assert_eq!(items[0].received_quantity, 20);
        assert_eq!(derive_status(&items), PurchaseOrderStatus::Received);
    }

    #[test]
    fn test_unmatched_line_is_ignored() {
        let mut items = vec![po_line("P1", 5, 0)];
        let matches =
            apply_receipt(&mut items, &[received("P9", 3), received("P1", 5)]).unwrap();

        assert_eq!(matches, vec![None, Some(0)]);
        assert_eq!(items[0].received_quantity, 5);
        assert_eq!(derive_status(&items), PurchaseOrderStatus::Received);
    }

    #[test]
    fn test_duplicate_product_lines_fill_first_match() {
        let mut items = vec![po_line("P1", 5, 0), po_line("P1", 5, 0)];
        apply_receipt(&mut items, &[received("P1", 4)]).unwrap();

        assert_eq!(items[0].received_quantity, 4);
        assert_eq!(items[1].received_quantity, 0);
    }

    #[test]
    fn test_over_receipt_counts_as_received() {
        let mut items = vec![po_line("P1", 5, 0), po_line("P2", 2, 2)];
        apply_receipt(&mut items, &[received("P1", 7)]).unwrap();
        assert_eq!(derive_status(&items), PurchaseOrderStatus::Received);
    }

    #[test]
    fn test_tally_overflow_leaves_order_untouched() {
        let mut items = vec![po_line("P1", 5, 1), po_line("P2", 5, 0)];

        let err = apply_receipt(&mut items, &[received("P2", 3), received("P1", i64::MAX)])
            .unwrap_err();

        assert!(matches!(err, ValidationError::AboveMaximum { .. }));
        assert_eq!(items[0].received_quantity, 1);
        assert_eq!(items[1].received_quantity, 0);
    }
}
