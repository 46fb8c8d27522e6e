//! Refresh token repository (the refresh store).
//!
//! A refresh token row either exists live or does not exist at all:
//! rotation and logout delete rows, there is no revoked/used flag.
//! Expired rows are treated as absent on read and only removed by the
//! explicit cleanup sweep.

use super::DbPool;
use crate::{PlazaError, Result};

/// Refresh token entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    /// Token ID.
    pub id: i64,
    /// Owning user ID.
    pub user_id: i64,
    /// Opaque token string (unique).
    pub token: String,
    /// Absolute expiry timestamp.
    pub expires_at: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// New refresh token for creation.
pub struct NewRefreshToken {
    /// Owning user ID.
    pub user_id: i64,
    /// Opaque token string.
    pub token: String,
    /// Absolute expiry timestamp.
    pub expires_at: String,
}

/// Repository for refresh token operations.
pub struct RefreshTokenRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> RefreshTokenRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new refresh token.
    ///
    /// The token string carries a UNIQUE constraint: a collision fails the
    /// create instead of silently overwriting the existing row.
    pub async fn create(&self, new_token: &NewRefreshToken) -> Result<RefreshToken> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO refresh_tokens (user_id, token, expires_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(new_token.user_id)
        .bind(&new_token.token)
        .bind(&new_token.expires_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| PlazaError::NotFound("refresh token".to_string()))
    }

    /// Get a refresh token by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<RefreshToken>> {
        let token = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token, expires_at, created_at
             FROM refresh_tokens WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(token)
    }

    /// Get a refresh token by token string, regardless of expiry.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let result = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token, expires_at, created_at
             FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get a live (not expired) refresh token.
    ///
    /// Expired rows are treated as absent; this read does not delete them.
    pub async fn get_valid(&self, token: &str) -> Result<Option<RefreshToken>> {
        let result = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token, expires_at, created_at
             FROM refresh_tokens
             WHERE token = ? AND expires_at > datetime('now')",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Atomically consume a live refresh token for rotation.
    ///
    /// The conditional DELETE is the serialization point for concurrent
    /// refresh calls presenting the same token string: exactly one caller
    /// observes a deleted row, every other caller gets false.
    pub async fn consume(&self, token: &str) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens WHERE token = ? AND expires_at > datetime('now')",
        )
        .bind(token)
        .execute(self.pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a refresh token by token string.
    ///
    /// Idempotent: deleting a token that does not exist is not an error.
    pub async fn delete(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = ?")
            .bind(token)
            .execute(self.pool)
            .await
            .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all tokens for a user (global sign-out).
    pub async fn delete_all_for_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool)
            .await
            .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Delete expired tokens (cleanup sweep).
    ///
    /// Optional: expired rows are already rejected on read, so correctness
    /// does not depend on this running.
    pub async fn cleanup_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < datetime('now')")
            .execute(self.pool)
            .await
            .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
