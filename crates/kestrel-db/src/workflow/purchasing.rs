//! # Purchasing Workflow
//!
//! Purchase order creation and goods receipt reconciliation.
//!
//! ## Goods Receipt
//! ```text
//! NewGrn { purchaseOrderId, items: [{productId, receivedQuantity}] }
//!      │
//!      ▼
//! ┌──────────────────────── one transaction ────────────────────────┐
//! │ GRN-000042 allocated                                            │
//! │ PO loaded ───────────────────────────── missing → NotFound      │
//! │ for each line:                                                  │
//! │   products.stock += receivedQuantity   (missing product: skip)  │
//! │   first PO line with same product: receivedQuantity += ...      │
//! │ PO status = received if every line complete, else partial       │
//! │ GRN + lines inserted                                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::grn::insert_grn;
use crate::repository::product::receive_stock;
use crate::repository::purchase_order::{
    fetch_purchase_order, insert_purchase_order, save_receipt_progress,
};
use crate::repository::sequence::next_number;
use kestrel_core::pricing::{line_total, resolve_totals};
use kestrel_core::receiving::{apply_receipt, derive_status};
use kestrel_core::validation::{
    validate_purchase_order_items, validate_receipt_lines, validate_required,
};
use kestrel_core::{
    DocumentKind, Grn, GrnItem, NewGrn, NewPurchaseOrder, PurchaseOrder, PurchaseOrderItem,
};

/// Purchase-side document flows.
#[derive(Debug, Clone)]
pub struct PurchasingWorkflow {
    pool: SqlitePool,
}

impl PurchasingWorkflow {
    pub fn new(pool: SqlitePool) -> Self {
        PurchasingWorkflow { pool }
    }

    /// Creates a purchase order. No stock moves until goods are received.
    ///
    /// ## Returns
    /// * `Ok(PurchaseOrder)` - Stored order (`pending` unless a status was given)
    /// * `Err(DbError::Domain)` - No lines, or a line with quantity < 1 / negative price
    pub async fn create_purchase_order(
        &self,
        input: NewPurchaseOrder,
        created_by: Option<&str>,
    ) -> DbResult<PurchaseOrder> {
        validate_required("supplierId", &input.supplier_id)?;
        validate_purchase_order_items(&input.items)?;

        let items: Vec<PurchaseOrderItem> = input
            .items
            .iter()
            .map(|item| PurchaseOrderItem {
                id: Uuid::new_v4().to_string(),
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                price: item.price,
                received_quantity: 0,
                total: line_total(item.quantity, item.price, 0.0, item.total),
            })
            .collect();
        let totals = resolve_totals(&input.totals, items.iter().map(|i| i.total));

        let mut tx = self.pool.begin().await?;

        let order_number = next_number(&mut tx, DocumentKind::PurchaseOrder).await?;
        let now = Utc::now();
        let order = PurchaseOrder {
            id: Uuid::new_v4().to_string(),
            order_number,
            supplier_id: input.supplier_id,
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            shipping: totals.shipping,
            total_price: totals.total,
            status: input.status.unwrap_or_default(),
            expected_date: input.expected_date,
            notes: input.notes,
            created_by: created_by.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        insert_purchase_order(&mut tx, &order).await?;
        tx.commit().await?;

        info!(
            order_number = %order.order_number,
            lines = order.items.len(),
            total = order.total_price,
            "Purchase order created"
        );
        Ok(order)
    }

    /// Records a goods receipt against a purchase order.
    ///
    /// ## Returns
    /// The stored GRN and the purchase order after reconciliation.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - The purchase order doesn't exist
    /// * `DbError::Domain` - No lines, a quantity out of range, or stock
    ///   that would overflow
    pub async fn record_goods_receipt(
        &self,
        input: NewGrn,
        received_by: Option<&str>,
    ) -> DbResult<(Grn, PurchaseOrder)> {
        validate_required("purchaseOrderId", &input.purchase_order_id)?;
        validate_receipt_lines(&input.items)?;

        let mut tx = self.pool.begin().await?;

        let grn_number = next_number(&mut tx, DocumentKind::GoodsReceipt).await?;

        let mut order = fetch_purchase_order(&mut tx, &input.purchase_order_id)
            .await?
            .ok_or_else(|| DbError::not_found("PurchaseOrder", &input.purchase_order_id))?;

        let matches = apply_receipt(&mut order.items, &input.items)?;

        for line in &input.items {
            if line.received_quantity == 0 {
                continue;
            }
            if !receive_stock(&mut tx, &line.product_id, line.received_quantity).await? {
                warn!(
                    product_id = %line.product_id,
                    grn_number = %grn_number,
                    "Received product no longer exists; stock not updated"
                );
            }
        }

        order.status = derive_status(&order.items);
        order.updated_at = Utc::now();
        save_receipt_progress(&mut tx, &order).await?;

        let items = input
            .items
            .into_iter()
            .zip(matches)
            .map(|(line, matched)| GrnItem {
                id: Uuid::new_v4().to_string(),
                ordered_quantity: line
                    .ordered_quantity
                    .or_else(|| matched.map(|index| order.items[index].quantity))
                    .unwrap_or(0),
                product_id: line.product_id,
                received_quantity: line.received_quantity,
                rejected_quantity: line.rejected_quantity,
                remarks: line.remarks,
            })
            .collect();

        let now = Utc::now();
        let grn = Grn {
            id: Uuid::new_v4().to_string(),
            grn_number,
            purchase_order_id: order.id.clone(),
            supplier_id: input
                .supplier_id
                .unwrap_or_else(|| order.supplier_id.clone()),
            received_date: input.received_date.unwrap_or(now),
            items,
            status: input.status.unwrap_or_default(),
            notes: input.notes,
            received_by: received_by.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        insert_grn(&mut tx, &grn).await?;
        tx.commit().await?;

        info!(
            grn_number = %grn.grn_number,
            order_number = %order.order_number,
            status = ?order.status,
            "Goods receipt recorded"
        );
        debug!(lines = grn.items.len(), "GRN lines stored");

        Ok((grn, order))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use kestrel_core::{
        CoreError, NewProduct, NewPurchaseOrderItem, PageRequest, PurchaseOrderStatus,
        ReceiptLine, TotalsInput, ValidationError,
    };

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .create(
                NewProduct {
                    title: "Mechanical Keyboard".to_string(),
                    sku: "KEY-003".to_string(),
                    category: "Electronics".to_string(),
                    price: 4500.0,
                    cost: Some(3200.0),
                    stock: Some(0),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        (db, product.id)
    }

    fn order_for(product_id: &str, quantity: i64) -> NewPurchaseOrder {
        NewPurchaseOrder {
            supplier_id: "supplier-1".to_string(),
            items: vec![NewPurchaseOrderItem {
                product_id: product_id.to_string(),
                quantity,
                price: 3200.0,
                total: None,
            }],
            ..Default::default()
        }
    }

    fn receipt(po: &PurchaseOrder, product_id: &str, received: i64) -> NewGrn {
        NewGrn {
            purchase_order_id: po.id.clone(),
            items: vec![ReceiptLine {
                product_id: product_id.to_string(),
                ordered_quantity: None,
                received_quantity: received,
                rejected_quantity: 0,
                remarks: None,
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_purchase_order_numbers_and_totals() {
        let (db, product_id) = setup().await;
        let mut input = order_for(&product_id, 2);
        input.totals = TotalsInput {
            tax: Some(100.0),
            ..Default::default()
        };

        let first = db.purchasing().create_purchase_order(input, Some("u1")).await.unwrap();
        assert_eq!(first.order_number, "PO-000001");
        assert_eq!(first.status, PurchaseOrderStatus::Pending);
        assert_eq!(first.subtotal, 6400.0);
        assert_eq!(first.total_price, 6500.0);

        let second = db
            .purchasing()
            .create_purchase_order(order_for(&product_id, 1), None)
            .await
            .unwrap();
        assert_eq!(second.order_number, "PO-000002");

        // Creating a PO never moves stock.
        assert_eq!(db.products().find_by_id(&product_id).await.unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_empty_purchase_order_is_rejected() {
        let (db, _) = setup().await;
        let mut input = order_for("p", 1);
        input.items.clear();

        let err = db.purchasing().create_purchase_order(input, None).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));
        assert_eq!(db.purchase_orders().find(PageRequest::default()).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_receipts_accumulate_until_received() {
        let (db, product_id) = setup().await;
        let po = db
            .purchasing()
            .create_purchase_order(order_for(&product_id, 20), None)
            .await
            .unwrap();

        let (grn, po_after) = db
            .purchasing()
            .record_goods_receipt(receipt(&po, &product_id, 12), Some("u2"))
            .await
            .unwrap();
        assert_eq!(grn.grn_number, "GRN-000001");
        assert_eq!(grn.supplier_id, "supplier-1");
        assert_eq!(grn.items[0].ordered_quantity, 20);
        assert_eq!(po_after.status, PurchaseOrderStatus::Partial);
        assert_eq!(po_after.items[0].received_quantity, 12);

        db.purchasing()
            .record_goods_receipt(receipt(&po, &product_id, 8), None)
            .await
            .unwrap();

        let stored = db.purchase_orders().find_by_id(&po.id).await.unwrap();
        assert_eq!(stored.status, PurchaseOrderStatus::Received);
        assert_eq!(stored.items[0].received_quantity, 20);
        assert_eq!(db.products().find_by_id(&product_id).await.unwrap().stock, 20);
        assert_eq!(db.grns().find_by_purchase_order(&po.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_receipt_for_missing_order_changes_nothing() {
        let (db, product_id) = setup().await;
        let input = NewGrn {
            purchase_order_id: "missing".to_string(),
            supplier_id: Some("s".to_string()),
            items: vec![ReceiptLine {
                product_id: product_id.clone(),
                ordered_quantity: Some(5),
                received_quantity: 5,
                rejected_quantity: 0,
                remarks: None,
            }],
            ..Default::default()
        };

        let err = db.purchasing().record_goods_receipt(input, None).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "PurchaseOrder"));
        assert_eq!(db.products().find_by_id(&product_id).await.unwrap().stock, 0);
        assert_eq!(db.grns().find(PageRequest::default()).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_oversized_receipt_is_rejected() {
        let (db, product_id) = setup().await;
        let po = db
            .purchasing()
            .create_purchase_order(order_for(&product_id, 5), None)
            .await
            .unwrap();
        db.purchasing()
            .record_goods_receipt(receipt(&po, &product_id, 1), None)
            .await
            .unwrap();

        let err = db
            .purchasing()
            .record_goods_receipt(receipt(&po, &product_id, i64::MAX), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::AboveMaximum { .. }))
        ));

        // Catalog reads still decode and nothing moved.
        assert_eq!(db.products().find_by_id(&product_id).await.unwrap().stock, 1);
        assert_eq!(db.products().find(None, PageRequest::default()).await.unwrap().total, 1);
        let po = db.purchase_orders().find_by_id(&po.id).await.unwrap();
        assert_eq!(po.items[0].received_quantity, 1);
        assert_eq!(db.grns().find(PageRequest::default()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_receipt_overflowing_stock_rolls_back() {
        let (db, product_id) = setup().await;
        let near_max = i64::MAX - 10;
        sqlx::query("UPDATE products SET stock = ?2 WHERE id = ?1")
            .bind(&product_id)
            .bind(near_max)
            .execute(db.pool())
            .await
            .unwrap();
        let po = db
            .purchasing()
            .create_purchase_order(order_for(&product_id, 100), None)
            .await
            .unwrap();

        let err = db
            .purchasing()
            .record_goods_receipt(receipt(&po, &product_id, 100), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::AboveMaximum { ref field, .. }))
                if field == "stock"
        ));

        assert_eq!(db.products().find_by_id(&product_id).await.unwrap().stock, near_max);
        let po = db.purchase_orders().find_by_id(&po.id).await.unwrap();
        assert_eq!(po.status, PurchaseOrderStatus::Pending);
        assert_eq!(po.items[0].received_quantity, 0);
        assert_eq!(db.grns().find(PageRequest::default()).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_unmatched_line_still_adds_stock() {
        let (db, keyboard) = setup().await;
        let mouse = db
            .products()
            .create(
                NewProduct {
                    title: "Wireless Mouse".to_string(),
                    sku: "MOU-002".to_string(),
                    category: "Electronics".to_string(),
                    price: 1200.0,
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        let po = db
            .purchasing()
            .create_purchase_order(order_for(&keyboard, 5), None)
            .await
            .unwrap();

        let (grn, po_after) = db
            .purchasing()
            .record_goods_receipt(receipt(&po, &mouse.id, 3), None)
            .await
            .unwrap();

        assert_eq!(grn.items[0].ordered_quantity, 0);
        assert_eq!(po_after.items[0].received_quantity, 0);
        assert_eq!(po_after.status, PurchaseOrderStatus::Partial);
        assert_eq!(db.products().find_by_id(&mouse.id).await.unwrap().stock, 3);
    }

    #[tokio::test]
    async fn test_receipt_for_deleted_product_skips_stock() {
        let (db, product_id) = setup().await;
        let po = db
            .purchasing()
            .create_purchase_order(order_for(&product_id, 4), None)
            .await
            .unwrap();
        db.products().delete(&product_id).await.unwrap();

        let (_, po_after) = db
            .purchasing()
            .record_goods_receipt(receipt(&po, &product_id, 4), None)
            .await
            .unwrap();

        assert_eq!(po_after.status, PurchaseOrderStatus::Received);
    }

    #[tokio::test]
    async fn test_status_overwrite_has_no_transition_rules() {
        let (db, product_id) = setup().await;
        let po = db
            .purchasing()
            .create_purchase_order(order_for(&product_id, 1), None)
            .await
            .unwrap();

        let repo = db.purchase_orders();
        let cancelled = repo
            .update_status(&po.id, PurchaseOrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, PurchaseOrderStatus::Cancelled);

        let draft = repo.update_status(&po.id, PurchaseOrderStatus::Draft).await.unwrap();
        assert_eq!(draft.status, PurchaseOrderStatus::Draft);
        assert_eq!(draft.items.len(), 1);

        assert!(matches!(
            repo.update_status("missing", PurchaseOrderStatus::Approved)
                .await
                .unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
