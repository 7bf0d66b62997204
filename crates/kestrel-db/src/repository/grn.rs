//! # Goods Receipt Repository
//!
//! Storage for goods receipt notes. A GRN is written once, by
//! [`crate::workflow::purchasing::PurchasingWorkflow::record_goods_receipt`],
//! and only read afterwards.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kestrel_core::{Grn, GrnItem, Page, PageRequest};

const GRN_COLUMNS: &str = r#"
    id, grn_number, purchase_order_id, supplier_id, received_date,
    status, notes, received_by, created_at, updated_at
"#;

/// Repository for GRN reads.
#[derive(Debug, Clone)]
pub struct GrnRepository {
    pool: SqlitePool,
}

impl GrnRepository {
    /// Creates a new GrnRepository.
    pub fn new(pool: SqlitePool) -> Self {
        GrnRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Grn>> {
        let mut conn = self.pool.acquire().await?;

        let grn = sqlx::query_as::<_, Grn>(&format!(
            "SELECT {GRN_COLUMNS} FROM grns WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match grn {
            Some(mut grn) => {
                grn.items = fetch_items(&mut conn, &grn.id).await?;
                Ok(Some(grn))
            }
            None => Ok(None),
        }
    }

    /// Gets a GRN, failing with `NotFound` when absent.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Grn> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("GRN", id))
    }

    /// Lists GRNs with their lines, newest first.
    pub async fn find(&self, page: PageRequest) -> DbResult<Page<Grn>> {
        let mut conn = self.pool.acquire().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM grns")
            .fetch_one(&mut *conn)
            .await?;

        let mut grns = sqlx::query_as::<_, Grn>(&format!(
            r#"
            SELECT {GRN_COLUMNS} FROM grns
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1 OFFSET ?2
            "#
        ))
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;

        for grn in &mut grns {
            grn.items = fetch_items(&mut conn, &grn.id).await?;
        }

        Ok(Page::new(grns, total, page))
    }

    /// All GRNs recorded against one purchase order, oldest first.
    pub async fn find_by_purchase_order(&self, purchase_order_id: &str) -> DbResult<Vec<Grn>> {
        let mut conn = self.pool.acquire().await?;

        let mut grns = sqlx::query_as::<_, Grn>(&format!(
            r#"
            SELECT {GRN_COLUMNS} FROM grns
            WHERE purchase_order_id = ?1
            ORDER BY created_at, rowid
            "#
        ))
        .bind(purchase_order_id)
        .fetch_all(&mut *conn)
        .await?;

        for grn in &mut grns {
            grn.items = fetch_items(&mut conn, &grn.id).await?;
        }

        Ok(grns)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn fetch_items(conn: &mut SqliteConnection, grn_id: &str) -> DbResult<Vec<GrnItem>> {
    let items = sqlx::query_as::<_, GrnItem>(
        r#"
        SELECT id, product_id, ordered_quantity, received_quantity, rejected_quantity, remarks
        FROM grn_items
        WHERE grn_id = ?1
        ORDER BY line_no
        "#,
    )
    .bind(grn_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Inserts a GRN header and all of its lines.
pub(crate) async fn insert_grn(conn: &mut SqliteConnection, grn: &Grn) -> DbResult<()> {
    debug!(id = %grn.id, grn_number = %grn.grn_number, "Inserting GRN");

    sqlx::query(
        r#"
        INSERT INTO grns (
            id, grn_number, purchase_order_id, supplier_id, received_date,
            status, notes, received_by, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&grn.id)
    .bind(&grn.grn_number)
    .bind(&grn.purchase_order_id)
    .bind(&grn.supplier_id)
    .bind(grn.received_date)
    .bind(grn.status)
    .bind(&grn.notes)
    .bind(&grn.received_by)
    .bind(grn.created_at)
    .bind(grn.updated_at)
    .execute(&mut *conn)
    .await?;

    for (line_no, item) in grn.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO grn_items (
                id, grn_id, line_no, product_id,
                ordered_quantity, received_quantity, rejected_quantity, remarks
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&grn.id)
        .bind(line_no as i64)
        .bind(&item.product_id)
        .bind(item.ordered_quantity)
        .bind(item.received_quantity)
        .bind(item.rejected_quantity)
        .bind(&item.remarks)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
