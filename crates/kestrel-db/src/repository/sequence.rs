//! # Document Number Sequences
//!
//! Allocates `PO-000001`-style numbers from the `sequences` table.
//!
//! ```text
//! tx.begin()
//!   UPDATE sequences SET value = value + 1 WHERE name = 'SO' RETURNING value  → 7
//!   ... insert SO-000007 and its lines ...
//! tx.commit()        (rollback returns the number to the counter)
//! ```
//!
//! Workflows allocate the number as the first statement of their
//! transaction, so the transaction holds the SQLite write lock from the
//! start and never has to upgrade a read snapshot.

use kestrel_core::DocumentKind;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Advances the counter for `kind` and returns the formatted number.
pub async fn next_number(conn: &mut SqliteConnection, kind: DocumentKind) -> DbResult<String> {
    let value: Option<i64> = sqlx::query_scalar(
        "UPDATE sequences SET value = value + 1 WHERE name = ?1 RETURNING value",
    )
    .bind(kind.prefix())
    .fetch_optional(&mut *conn)
    .await?;

    let value = value
        .ok_or_else(|| DbError::Internal(format!("Missing sequence row: {}", kind.prefix())))?;

    let number = kind.format(value);
    debug!(number = %number, "Allocated document number");
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_numbers_are_sequential_per_kind() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        assert_eq!(
            next_number(&mut conn, DocumentKind::PurchaseOrder).await.unwrap(),
            "PO-000001"
        );
        assert_eq!(
            next_number(&mut conn, DocumentKind::PurchaseOrder).await.unwrap(),
            "PO-000002"
        );
        assert_eq!(
            next_number(&mut conn, DocumentKind::Invoice).await.unwrap(),
            "INV-000001"
        );
    }

    #[tokio::test]
    async fn test_rolled_back_number_is_reissued() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let first = next_number(&mut tx, DocumentKind::SalesOrder).await.unwrap();
        tx.rollback().await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let again = next_number(&mut conn, DocumentKind::SalesOrder).await.unwrap();
        assert_eq!(first, again);
    }
}
