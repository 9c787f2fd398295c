//! User accounts.

use super::{DbPool, SQL_NOW};
use crate::{AskarError, Result};

const USER_COLUMNS: &str =
    "id, email, name, password_hash, google_id, created_at, last_login, is_active";

/// A registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Email address (unique, case-insensitive).
    pub email: String,
    /// Display name.
    pub name: String,
    /// Argon2 hash; `None` for accounts that only sign in with Google.
    pub password_hash: Option<String>,
    /// Google subject id, once linked.
    pub google_id: Option<String>,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last login timestamp.
    pub last_login: Option<String>,
    /// Whether the account may sign in.
    pub is_active: bool,
}

impl User {
    /// Whether the account can sign in with a password.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address, stored lower-cased.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Pre-hashed password.
    pub password_hash: Option<String>,
    /// Google subject id.
    pub google_id: Option<String>,
}

impl NewUser {
    /// Create a new user with the required fields.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_lowercase(),
            name: name.into(),
            password_hash: None,
            google_id: None,
        }
    }

    /// Set the password hash.
    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    /// Link a Google account.
    pub fn with_google_id(mut self, google_id: impl Into<String>) -> Self {
        self.google_id = Some(google_id.into());
        self
    }
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// Fails with a validation error when the email is already registered.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (email, name, password_hash, google_id)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .bind(&new_user.google_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AskarError::Validation("email is already registered".to_string())
            }
            other => AskarError::Database(other.to_string()),
        })?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AskarError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| AskarError::Database(e.to_string()))?;
        Ok(user)
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1 COLLATE NOCASE");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email.trim())
            .fetch_optional(self.pool)
            .await
            .map_err(|e| AskarError::Database(e.to_string()))?;
        Ok(user)
    }

    /// Get a user by Google subject id.
    pub async fn get_by_google_id(&self, google_id: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE google_id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(google_id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| AskarError::Database(e.to_string()))?;
        Ok(user)
    }

    /// Find or create the account for a Google login.
    ///
    /// Looks up by subject id first, then by email (linking the subject id to
    /// the existing account), and creates a password-less account otherwise.
    pub async fn upsert_google(&self, google_id: &str, email: &str, name: &str) -> Result<User> {
        if let Some(user) = self.get_by_google_id(google_id).await? {
            return Ok(user);
        }

        if let Some(user) = self.get_by_email(email).await? {
            sqlx::query("UPDATE users SET google_id = $1 WHERE id = $2")
                .bind(google_id)
                .bind(user.id)
                .execute(self.pool)
                .await
                .map_err(|e| AskarError::Database(e.to_string()))?;
            return self
                .get_by_id(user.id)
                .await?
                .ok_or_else(|| AskarError::NotFound("user".to_string()));
        }

        self.create(&NewUser::new(email, name).with_google_id(google_id))
            .await
    }

    /// Replace a user's password hash.
    ///
    /// Returns false if the user does not exist.
    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| AskarError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Update the last login timestamp.
    pub async fn update_last_login(&self, id: i64) -> Result<()> {
        let sql = format!("UPDATE users SET last_login = {SQL_NOW} WHERE id = $1");
        sqlx::query(&sql)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| AskarError::Database(e.to_string()))?;
        Ok(())
    }

    /// Enable or disable an account.
    pub async fn set_active(&self, id: i64, active: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET is_active = $1 WHERE id = $2")
            .bind(active)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| AskarError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await
            .map_err(|e| AskarError::Database(e.to_string()))?;
        Ok(count.0)
    }
}
