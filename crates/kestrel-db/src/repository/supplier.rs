//! # Supplier Repository
//!
//! Database operations for suppliers.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::like_pattern;
use kestrel_core::validation::{
    normalize_email, validate_new_supplier, validate_search_query, validate_supplier_patch,
};
use kestrel_core::{NewSupplier, Page, PageRequest, Supplier, SupplierPatch, DEFAULT_PAYMENT_TERMS};

const SUPPLIER_COLUMNS: &str = r#"
    id, name, contact_person, email, phone, company,
    street, city, state, zip_code, country,
    tax_id, payment_terms, is_active, notes,
    created_by, created_at, updated_at
"#;

const SEARCH_FILTER: &str = r#"
    ?1 IS NULL
    OR name LIKE ?1 ESCAPE '\'
    OR email LIKE ?1 ESCAPE '\'
    OR company LIKE ?1 ESCAPE '\'
"#;

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Creates a supplier. Payment terms default to "Net 30".
    pub async fn create(&self, input: NewSupplier, created_by: Option<&str>) -> DbResult<Supplier> {
        validate_new_supplier(&input)?;

        let now = Utc::now();
        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            contact_person: input.contact_person,
            email: normalize_email(&input.email),
            phone: input.phone.trim().to_string(),
            company: input.company,
            address: input.address,
            tax_id: input.tax_id,
            payment_terms: input
                .payment_terms
                .unwrap_or_else(|| DEFAULT_PAYMENT_TERMS.to_string()),
            is_active: input.is_active.unwrap_or(true),
            notes: input.notes,
            created_by: created_by.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %supplier.id, email = %supplier.email, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, name, contact_person, email, phone, company,
                street, city, state, zip_code, country,
                tax_id, payment_terms, is_active, notes,
                created_by, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15,
                ?16, ?17, ?18
            )
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.company)
        .bind(&supplier.address.street)
        .bind(&supplier.address.city)
        .bind(&supplier.address.state)
        .bind(&supplier.address.zip_code)
        .bind(&supplier.address.country)
        .bind(&supplier.tax_id)
        .bind(&supplier.payment_terms)
        .bind(supplier.is_active)
        .bind(&supplier.notes)
        .bind(&supplier.created_by)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Gets a supplier by ID, failing with `NotFound` when absent.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Supplier> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Lists suppliers, newest first, filtered by name/email/company.
    pub async fn find(&self, keyword: Option<&str>, page: PageRequest) -> DbResult<Page<Supplier>> {
        let keyword = validate_search_query(keyword)?;
        let pattern = like_pattern(keyword.as_deref());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM suppliers WHERE {SEARCH_FILTER}"
        ))
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            SELECT {SUPPLIER_COLUMNS} FROM suppliers
            WHERE {SEARCH_FILTER}
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(&pattern)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(suppliers, total, page))
    }

    /// Applies a partial update. A supplied `address` replaces the stored one
    /// and `Some(None)` clears an optional text field.
    pub async fn update(&self, id: &str, patch: SupplierPatch) -> DbResult<Supplier> {
        validate_supplier_patch(&patch)?;

        debug!(id = %id, "Updating supplier");

        let replace_address = patch.address.is_some();
        let address = patch.address.unwrap_or_default();

        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            UPDATE suppliers SET
                name = COALESCE(?2, name),
                contact_person = CASE WHEN ?18 THEN ?3 ELSE contact_person END,
                email = COALESCE(?4, email),
                phone = COALESCE(?5, phone),
                company = CASE WHEN ?19 THEN ?6 ELSE company END,
                street = CASE WHEN ?7 THEN ?8 ELSE street END,
                city = CASE WHEN ?7 THEN ?9 ELSE city END,
                state = CASE WHEN ?7 THEN ?10 ELSE state END,
                zip_code = CASE WHEN ?7 THEN ?11 ELSE zip_code END,
                country = CASE WHEN ?7 THEN ?12 ELSE country END,
                tax_id = CASE WHEN ?20 THEN ?13 ELSE tax_id END,
                payment_terms = COALESCE(?14, payment_terms),
                is_active = COALESCE(?15, is_active),
                notes = CASE WHEN ?21 THEN ?16 ELSE notes END,
                updated_at = ?17
            WHERE id = ?1
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.contact_person.as_ref().and_then(|v| v.as_deref()))
        .bind(patch.email.as_deref().map(normalize_email))
        .bind(patch.phone.as_deref().map(str::trim))
        .bind(patch.company.as_ref().and_then(|v| v.as_deref()))
        .bind(replace_address)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip_code)
        .bind(&address.country)
        .bind(patch.tax_id.as_ref().and_then(|v| v.as_deref()))
        .bind(&patch.payment_terms)
        .bind(patch.is_active)
        .bind(patch.notes.as_ref().and_then(|v| v.as_deref()))
        .bind(Utc::now())
        .bind(patch.contact_person.is_some())
        .bind(patch.company.is_some())
        .bind(patch.tax_id.is_some())
        .bind(patch.notes.is_some())
        .fetch_optional(&self.pool)
        .await?;

        supplier.ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Deletes a supplier. Purchase orders and GRNs keep the dangling id.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting supplier");

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn global_it() -> NewSupplier {
        NewSupplier {
            name: "Global IT Suppliers".to_string(),
            email: "orders@globalit.com".to_string(),
            phone: "9988776655".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_payment_terms_default() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().suppliers();
        let supplier = repo.create(global_it(), Some("admin")).await.unwrap();

        assert_eq!(supplier.payment_terms, "Net 30");
        assert_eq!(repo.find_by_id(&supplier.id).await.unwrap().payment_terms, "Net 30");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().suppliers();
        let supplier = repo.create(global_it(), None).await.unwrap();

        let updated = repo
            .update(
                &supplier.id,
                SupplierPatch {
                    contact_person: Some(Some("Neha".to_string())),
                    payment_terms: Some("Net 45".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.contact_person.as_deref(), Some("Neha"));
        assert_eq!(updated.payment_terms, "Net 45");
        assert_eq!(updated.email, "orders@globalit.com");

        let cleared = repo
            .update(
                &supplier.id,
                SupplierPatch {
                    contact_person: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.contact_person, None);
        assert_eq!(cleared.payment_terms, "Net 45");

        repo.delete(&supplier.id).await.unwrap();
        let page = repo.find(None, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }
}
