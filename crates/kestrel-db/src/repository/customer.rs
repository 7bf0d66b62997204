//! # Customer Repository
//!
//! Database operations for customers.
//!
//! `outstanding_balance` is written once (0) at insert and never again:
//! neither invoices nor payments touch it, and the patch type has no field
//! for it.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::like_pattern;
use kestrel_core::validation::{
    normalize_email, validate_customer_patch, validate_new_customer, validate_search_query,
};
use kestrel_core::{Customer, CustomerPatch, NewCustomer, Page, PageRequest};

const CUSTOMER_COLUMNS: &str = r#"
    id, name, email, phone, company,
    street, city, state, zip_code, country,
    tax_id, credit_limit, outstanding_balance, is_active, notes,
    created_by, created_at, updated_at
"#;

const SEARCH_FILTER: &str = r#"
    ?1 IS NULL
    OR name LIKE ?1 ESCAPE '\'
    OR email LIKE ?1 ESCAPE '\'
    OR company LIKE ?1 ESCAPE '\'
"#;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Creates a customer. The email is stored lower-cased.
    pub async fn create(&self, input: NewCustomer, created_by: Option<&str>) -> DbResult<Customer> {
        validate_new_customer(&input)?;

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            email: normalize_email(&input.email),
            phone: input.phone.trim().to_string(),
            company: input.company,
            address: input.address,
            tax_id: input.tax_id,
            credit_limit: input.credit_limit.unwrap_or(0.0),
            outstanding_balance: 0.0,
            is_active: input.is_active.unwrap_or(true),
            notes: input.notes,
            created_by: created_by.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %customer.id, email = %customer.email, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, email, phone, company,
                street, city, state, zip_code, country,
                tax_id, credit_limit, outstanding_balance, is_active, notes,
                created_by, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15,
                ?16, ?17, ?18
            )
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.company)
        .bind(&customer.address.street)
        .bind(&customer.address.city)
        .bind(&customer.address.state)
        .bind(&customer.address.zip_code)
        .bind(&customer.address.country)
        .bind(&customer.tax_id)
        .bind(customer.credit_limit)
        .bind(customer.outstanding_balance)
        .bind(customer.is_active)
        .bind(&customer.notes)
        .bind(&customer.created_by)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by ID, failing with `NotFound` when absent.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Customer> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Lists customers, newest first, filtered by name/email/company.
    pub async fn find(&self, keyword: Option<&str>, page: PageRequest) -> DbResult<Page<Customer>> {
        let keyword = validate_search_query(keyword)?;
        let pattern = like_pattern(keyword.as_deref());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM customers WHERE {SEARCH_FILTER}"
        ))
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let customers = sqlx::query_as::<_, Customer>(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS} FROM customers
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

        Ok(Page::new(customers, total, page))
    }

    /// Applies a partial update.
    ///
    /// A supplied `address` replaces the stored address as a whole.
    /// `Some(None)` clears `company`, `taxId` or `notes`.
    pub async fn update(&self, id: &str, patch: CustomerPatch) -> DbResult<Customer> {
        validate_customer_patch(&patch)?;

        debug!(id = %id, "Updating customer");

        let replace_address = patch.address.is_some();
        let address = patch.address.unwrap_or_default();

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers SET
                name = COALESCE(?2, name),
                email = COALESCE(?3, email),
                phone = COALESCE(?4, phone),
                company = CASE WHEN ?17 THEN ?5 ELSE company END,
                street = CASE WHEN ?6 THEN ?7 ELSE street END,
                city = CASE WHEN ?6 THEN ?8 ELSE city END,
                state = CASE WHEN ?6 THEN ?9 ELSE state END,
                zip_code = CASE WHEN ?6 THEN ?10 ELSE zip_code END,
                country = CASE WHEN ?6 THEN ?11 ELSE country END,
                tax_id = CASE WHEN ?18 THEN ?12 ELSE tax_id END,
                credit_limit = COALESCE(?13, credit_limit),
                is_active = COALESCE(?14, is_active),
                notes = CASE WHEN ?19 THEN ?15 ELSE notes END,
                updated_at = ?16
            WHERE id = ?1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
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
        .bind(patch.credit_limit)
        .bind(patch.is_active)
        .bind(patch.notes.as_ref().and_then(|v| v.as_deref()))
        .bind(Utc::now())
        .bind(patch.company.is_some())
        .bind(patch.tax_id.is_some())
        .bind(patch.notes.is_some())
        .fetch_optional(&self.pool)
        .await?;

        customer.ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Deletes a customer. Orders and invoices keep the dangling id.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use kestrel_core::Address;

    fn technova() -> NewCustomer {
        NewCustomer {
            name: "TechNova Pvt Ltd".to_string(),
            email: "Contact@TechNova.com".to_string(),
            phone: "9876543210".to_string(),
            company: Some("TechNova Pvt Ltd".to_string()),
            address: Address {
                city: Some("Pune".to_string()),
                country: Some("India".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().customers();
        let created = repo.create(technova(), None).await.unwrap();

        assert_eq!(created.email, "contact@technova.com");
        assert_eq!(created.outstanding_balance, 0.0);

        let fetched = repo.find_by_id(&created.id).await.unwrap();
        assert_eq!(fetched.address.city.as_deref(), Some("Pune"));
        assert_eq!(fetched.address.street, None);
    }

    #[tokio::test]
    async fn test_missing_phone_is_rejected() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().customers();
        let mut input = technova();
        input.phone = String::new();

        assert!(matches!(
            repo.create(input, None).await.unwrap_err(),
            DbError::Domain(_)
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_address_and_keeps_rest() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().customers();
        let created = repo.create(technova(), None).await.unwrap();

        let updated = repo
            .update(
                &created.id,
                CustomerPatch {
                    address: Some(Address {
                        city: Some("Mumbai".to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.address.city.as_deref(), Some("Mumbai"));
        assert_eq!(updated.address.country, None);
        assert_eq!(updated.name, "TechNova Pvt Ltd");
    }

    #[tokio::test]
    async fn test_update_clears_optional_fields() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().customers();
        let mut input = technova();
        input.notes = Some("Prefers email".to_string());
        let created = repo.create(input, None).await.unwrap();

        let updated = repo
            .update(
                &created.id,
                CustomerPatch {
                    company: Some(None),
                    tax_id: Some(Some("27AAACT1234A1Z5".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.company, None);
        assert_eq!(updated.tax_id.as_deref(), Some("27AAACT1234A1Z5"));
        assert_eq!(updated.notes.as_deref(), Some("Prefers email"));
        assert_eq!(updated.address.city.as_deref(), Some("Pune"));
    }

    #[tokio::test]
    async fn test_search_by_company() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().customers();
        repo.create(technova(), None).await.unwrap();

        let page = repo.find(Some("technova"), PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        let page = repo.find(Some("digital"), PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_customer() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().customers();
        assert!(matches!(
            repo.delete("nope").await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
