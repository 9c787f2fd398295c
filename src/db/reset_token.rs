//! Password reset tokens.
//!
//! Only the SHA-256 of a token is stored; the plaintext exists in the emailed
//! link and nowhere else.

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};

use super::{DbPool, SQL_NOW};
use crate::datetime::to_sql_datetime;
use crate::{AskarError, Result};

/// Stored reset token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PasswordResetToken {
    /// Token ID.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// SHA-256 hex of the token.
    pub token_hash: String,
    /// Expiration timestamp.
    pub expires_at: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Used timestamp (None if not used).
    pub used_at: Option<String>,
}

impl PasswordResetToken {
    /// Check if the token has been used.
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }
}

/// SHA-256 hex digest of a plaintext token.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Repository for reset token operations.
pub struct PasswordResetRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PasswordResetRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Issue a token for a user, valid for `ttl_secs`.
    ///
    /// Returns the plaintext token.
    pub async fn issue(&self, user_id: i64, ttl_secs: u64) -> Result<String> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let expires_at = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                AskarError::Config(format!("reset token lifetime out of range: {ttl_secs}s"))
            })?;
        self.create(user_id, &hash_token(&token), &to_sql_datetime(&expires_at))
            .await?;
        Ok(token)
    }

    /// Store a token hash.
    pub async fn create(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: &str,
    ) -> Result<PasswordResetToken> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| AskarError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AskarError::NotFound("password reset token".into()))
    }

    /// Get a token by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<PasswordResetToken>> {
        let token = sqlx::query_as::<_, PasswordResetToken>(
            "SELECT id, user_id, token_hash, expires_at, created_at, used_at
             FROM password_reset_tokens WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| AskarError::Database(e.to_string()))?;

        Ok(token)
    }

    /// Mark a valid (unused, unexpired) token as used and return it.
    ///
    /// A single UPDATE ... RETURNING, so concurrent requests cannot both
    /// consume the same token.
    pub async fn consume(&self, token: &str) -> Result<Option<PasswordResetToken>> {
        let sql = format!(
            "UPDATE password_reset_tokens
             SET used_at = {SQL_NOW}
             WHERE token_hash = $1
               AND used_at IS NULL
               AND expires_at > {SQL_NOW}
             RETURNING id, user_id, token_hash, expires_at, created_at, used_at"
        );

        sqlx::query_as::<_, PasswordResetToken>(&sql)
            .bind(hash_token(token))
            .fetch_optional(self.pool)
            .await
            .map_err(|e| AskarError::Database(e.to_string()))
    }

    /// Invalidate every outstanding token of a user.
    pub async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64> {
        let sql = format!(
            "UPDATE password_reset_tokens SET used_at = {SQL_NOW}
             WHERE user_id = $1 AND used_at IS NULL"
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .execute(self.pool)
            .await
            .map_err(|e| AskarError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Delete expired and used tokens.
    pub async fn cleanup(&self) -> Result<u64> {
        let sql = format!(
            "DELETE FROM password_reset_tokens WHERE expires_at < {SQL_NOW} OR used_at IS NOT NULL"
        );
        let result = sqlx::query(&sql)
            .execute(self.pool)
            .await
            .map_err(|e| AskarError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, NewUser, UserRepository};

    async fn setup_db() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        UserRepository::new(db.pool())
            .create(&NewUser::new("reset@example.com", "Reset").with_password_hash("hash"))
            .await
            .unwrap();
        db
    }

    #[test]
    fn test_hash_token() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_issue_stores_only_hash() {
        let db = setup_db().await;
        let repo = PasswordResetRepository::new(db.pool());

        let token = repo.issue(1, 3600).await.unwrap();
        let stored = repo.get_by_id(1).await.unwrap().unwrap();

        assert_ne!(stored.token_hash, token);
        assert_eq!(stored.token_hash, hash_token(&token));
        assert!(!stored.is_used());
    }

    #[tokio::test]
    async fn test_issue_rejects_unrepresentable_lifetime() {
        let db = setup_db().await;
        let repo = PasswordResetRepository::new(db.pool());

        for ttl in [u64::MAX, i64::MAX as u64] {
            let result = repo.issue(1, ttl).await;
            assert!(matches!(result, Err(AskarError::Config(_))));
        }
        assert!(repo.get_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_consume_once() {
        let db = setup_db().await;
        let repo = PasswordResetRepository::new(db.pool());
        let token = repo.issue(1, 3600).await.unwrap();

        let consumed = repo.consume(&token).await.unwrap().unwrap();
        assert_eq!(consumed.user_id, 1);
        assert!(consumed.is_used());

        assert!(repo.consume(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_consume_unknown_token() {
        let db = setup_db().await;
        let repo = PasswordResetRepository::new(db.pool());
        assert!(repo.consume("never-issued").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_consume_expired_token() {
        let db = setup_db().await;
        let repo = PasswordResetRepository::new(db.pool());
        repo.create(1, &hash_token("old"), "2000-01-01 00:00:00")
            .await
            .unwrap();

        assert!(repo.consume("old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_all_for_user() {
        let db = setup_db().await;
        let repo = PasswordResetRepository::new(db.pool());
        let first = repo.issue(1, 3600).await.unwrap();
        let second = repo.issue(1, 3600).await.unwrap();

        assert_eq!(repo.revoke_all_for_user(1).await.unwrap(), 2);
        assert!(repo.consume(&first).await.unwrap().is_none());
        assert!(repo.consume(&second).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cleanup() {
        let db = setup_db().await;
        let repo = PasswordResetRepository::new(db.pool());

        repo.create(1, &hash_token("expired"), "2000-01-01 00:00:00")
            .await
            .unwrap();
        let used = repo.issue(1, 3600).await.unwrap();
        repo.consume(&used).await.unwrap();
        let valid = repo.issue(1, 3600).await.unwrap();

        assert_eq!(repo.cleanup().await.unwrap(), 2);
        assert!(repo.consume(&valid).await.unwrap().is_some());
    }
}
