//! # User Repository
//!
//! Accounts, password hashing and credential checks.
//!
//! ## Login Flow
//! ```text
//! POST /api/auth/login { email, password }
//!      │
//!      ▼
//! verify_credentials(email, password)
//!      ├── email normalized (trim + lowercase)
//!      ├── no such user        ─┐
//!      ├── user inactive        ├──► CoreError::Unauthorized("Invalid email or password")
//!      ├── argon2 mismatch     ─┘
//!      ▼
//! User  ──► JwtManager::generate_token (kestrel-api)
//! ```
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) with a per-user random salt.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kestrel_core::validation::{normalize_email, validate_new_user, validate_user_patch};
use kestrel_core::{CoreError, NewUser, Page, PageRequest, Role, User, UserPatch};

const USER_COLUMNS: &str = r#"
    id, name, email, password_hash, role, is_active, created_at, updated_at
"#;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored hash. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates an account. The role defaults to `viewer`.
    ///
    /// ## Returns
    /// * `Ok(User)` - Stored account
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn create(&self, input: NewUser) -> DbResult<User> {
        validate_new_user(&input)?;

        let email = normalize_email(&input.email);
        let password_hash = hash_password(&input.password)?;
        let now = Utc::now();

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            email,
            password_hash,
            role: input.role.unwrap_or_default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(email = %user.email, role = %user.role, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, email, password_hash, role, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate("email", &user.email))?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by ID, failing with `NotFound` when absent.
    pub async fn find_by_id(&self, id: &str) -> DbResult<User> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Checks a login attempt.
    ///
    /// Unknown email, inactive account and wrong password all produce the
    /// same `Unauthorized` error.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> DbResult<User> {
        let user = match self.get_by_email(email).await? {
            Some(user) => user,
            None => {
                debug!("Login for unknown email");
                return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
            }
        };

        if !user.is_active || !verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, "Rejected login");
            return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
        }

        Ok(user)
    }

    /// Lists accounts, newest first.
    pub async fn find(&self, page: PageRequest) -> DbResult<Page<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1 OFFSET ?2
            "#
        ))
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(users, total, page))
    }

    /// Admin-side update of name, email, role and active flag.
    pub async fn update(&self, id: &str, patch: UserPatch) -> DbResult<User> {
        validate_user_patch(&patch)?;

        debug!(id = %id, role = ?patch.role, "Updating user");

        let email = patch.email.as_deref().map(normalize_email);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                name = COALESCE(?2, name),
                email = COALESCE(?3, email),
                role = COALESCE(?4, role),
                is_active = COALESCE(?5, is_active),
                updated_at = ?6
            WHERE id = ?1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(&email)
        .bind(patch.role)
        .bind(patch.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate("email", email.as_deref().unwrap_or_default()))?;

        user.ok_or_else(|| DbError::not_found("User", id))
    }

    /// Deletes an account. Admin accounts cannot be deleted.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let user = self.find_by_id(id).await?;

        if user.role == Role::Admin {
            return Err(CoreError::BusinessRule("Cannot delete admin user".to_string()).into());
        }

        debug!(id = %id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn new_user(email: &str, role: Option<Role>) -> NewUser {
        NewUser {
            name: "Amit Sharma".to_string(),
            email: email.to_string(),
            password: "Sales@123".to_string(),
            role,
        }
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("Admin@123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Admin@123", &hash));
        assert!(!verify_password("admin@123", &hash));
        assert!(!verify_password("Admin@123", "not-a-hash"));
    }

    #[tokio::test]
    async fn test_role_defaults_to_viewer() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().users();
        let user = repo.create(new_user("a@erp.com", None)).await.unwrap();

        assert_eq!(user.role, Role::Viewer);
        assert_eq!(repo.find_by_id(&user.id).await.unwrap().role, Role::Viewer);
    }

    #[tokio::test]
    async fn test_duplicate_email_ignoring_case() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().users();
        repo.create(new_user("sales@erp.com", None)).await.unwrap();

        let err = repo.create(new_user("SALES@erp.com", None)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().users();
        let user = repo
            .create(new_user("sales@erp.com", Some(Role::Sales)))
            .await
            .unwrap();

        let ok = repo.verify_credentials(" Sales@ERP.com", "Sales@123").await.unwrap();
        assert_eq!(ok.id, user.id);

        for (email, password) in [("sales@erp.com", "wrong"), ("nobody@erp.com", "Sales@123")] {
            let err = repo.verify_credentials(email, password).await.unwrap_err();
            assert!(matches!(err, DbError::Domain(CoreError::Unauthorized(_))));
        }

        repo.update(
            &user.id,
            UserPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(repo.verify_credentials("sales@erp.com", "Sales@123").await.is_err());
    }

    #[tokio::test]
    async fn test_admin_cannot_be_deleted() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().users();
        let admin = repo
            .create(new_user("admin@erp.com", Some(Role::Admin)))
            .await
            .unwrap();
        let viewer = repo.create(new_user("viewer@erp.com", None)).await.unwrap();

        let err = repo.delete(&admin.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::BusinessRule(_))));

        repo.delete(&viewer.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_promotes_role() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().users();
        let user = repo.create(new_user("x@erp.com", None)).await.unwrap();

        let updated = repo
            .update(
                &user.id,
                UserPatch {
                    role: Some(Role::Inventory),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Inventory);
        assert_eq!(updated.name, "Amit Sharma");
    }
}
