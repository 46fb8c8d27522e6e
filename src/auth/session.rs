//! Session lifecycle management for plaza.
//!
//! Orchestrates login (verify then issue), refresh (validate, rotate,
//! issue) and logout (revoke). A refresh token moves one-way through
//! Issued -> Consumed | Revoked | Expired; rotation always produces a new
//! token identity, never reuses the old one.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use super::credentials::verify_credentials;
use super::token::{SessionTokens, TokenIssuer};
use crate::db::{NewRefreshToken, RefreshTokenRepository, User, UserRepository};
use crate::PlazaError;

/// Authentication errors surfaced to callers.
///
/// The taxonomy is deliberately coarse: login failures of every kind are
/// `InvalidCredentials`, refresh failures of every kind are
/// `InvalidOrExpiredToken`. Nothing finer (expired vs unknown vs deleted
/// user) is exposed.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Wrong email or password (login only).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Unknown, expired, or already-consumed refresh token (refresh only).
    #[error("invalid or expired refresh token")]
    InvalidOrExpiredToken,

    /// Underlying store failure; mapped to an internal error by callers.
    #[error(transparent)]
    Store(#[from] PlazaError),
}

/// A successful login or refresh: token pair plus the authenticated user.
#[derive(Debug)]
pub struct AuthenticatedSession {
    /// Freshly issued token pair.
    pub tokens: SessionTokens,
    /// The authenticated user.
    pub user: User,
}

/// Orchestrates the session lifecycle over the refresh store.
pub struct SessionService {
    pool: SqlitePool,
    issuer: TokenIssuer,
}

impl SessionService {
    /// Create a new session service.
    pub fn new(pool: SqlitePool, issuer: TokenIssuer) -> Self {
        Self { pool, issuer }
    }

    /// Get the token issuer.
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Log in with an email/password pair.
    ///
    /// No refresh row is ever written for a failed login.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedSession, AuthError> {
        let user = verify_credentials(&self.pool, email, password).await?;

        let tokens = self.issuer.issue(&self.pool, &user).await?;

        // Best-effort; a failed stamp must not fail the login.
        let _ = UserRepository::new(&self.pool).update_last_login(user.id).await;

        info!(user_id = user.id, email = %user.email, "Login successful");

        Ok(AuthenticatedSession { tokens, user })
    }

    /// Rotate a refresh token: validate, consume the old row, issue a new pair.
    ///
    /// Two concurrent calls presenting the same token race on the store's
    /// conditional delete; exactly one wins, the loser observes "not
    /// found" and fails with `InvalidOrExpiredToken`.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthenticatedSession, AuthError> {
        let repo = RefreshTokenRepository::new(&self.pool);

        let stored = repo
            .get_valid(refresh_token)
            .await?
            .ok_or(AuthError::InvalidOrExpiredToken)?;

        // A token whose owner is gone (or suspended) is indistinguishable
        // from an invalid token to the caller.
        let user = match UserRepository::new(&self.pool).get_by_id(stored.user_id).await? {
            Some(u) if u.is_active => u,
            _ => {
                warn!(user_id = stored.user_id, "Refresh rejected: owner missing or suspended");
                return Err(AuthError::InvalidOrExpiredToken);
            }
        };

        // Atomic consume; losing the rotation race lands here too.
        if !repo.consume(refresh_token).await? {
            warn!(user_id = user.id, "Refresh rejected: token already consumed");
            return Err(AuthError::InvalidOrExpiredToken);
        }

        match self.issuer.issue(&self.pool, &user).await {
            Ok(tokens) => {
                info!(user_id = user.id, "Session refreshed");
                Ok(AuthenticatedSession { tokens, user })
            }
            Err(e) => {
                // Best-effort rollback: recreate the consumed row so the
                // session is not lost to a partial failure.
                let restore = repo
                    .create(&NewRefreshToken {
                        user_id: stored.user_id,
                        token: stored.token.clone(),
                        expires_at: stored.expires_at.clone(),
                    })
                    .await;
                if restore.is_err() {
                    warn!(user_id = user.id, "Failed to restore consumed refresh token");
                }
                Err(e)
            }
        }
    }

    /// Log out by revoking a refresh token.
    ///
    /// Always succeeds, whether or not the token string was ever valid;
    /// the response must not reveal token validity.
    pub async fn logout(&self, refresh_token: &str) {
        let repo = RefreshTokenRepository::new(&self.pool);
        match repo.delete(refresh_token).await {
            Ok(true) => info!("Session logged out"),
            Ok(false) => {}
            Err(e) => warn!("Logout token delete failed: {}", e),
        }
    }

    /// Revoke every outstanding refresh token for a user (global sign-out).
    pub async fn logout_all(&self, user_id: i64) -> Result<u64, AuthError> {
        let count = RefreshTokenRepository::new(&self.pool)
            .delete_all_for_user(user_id)
            .await?;
        if count > 0 {
            info!(user_id = user_id, count = count, "All user sessions revoked");
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::db::{NewUser, Role};
    use crate::Database;

    async fn setup_service() -> (Database, SessionService) {
        let db = Database::open_in_memory().await.unwrap();
        let issuer = TokenIssuer::new("test-secret", 900, 7);
        let service = SessionService::new(db.pool().clone(), issuer);
        (db, service)
    }

    async fn create_user(db: &Database, email: &str, password: &str) -> User {
        let repo = UserRepository::new(db.pool());
        repo.create(
            &NewUser::new(email, hash_password(password).unwrap(), "Test User")
                .with_role(Role::Client),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_login_success() {
        let (db, service) = setup_service().await;
        create_user(&db, "login@example.com", "password123").await;

        let session = service.login("login@example.com", "password123").await.unwrap();
        assert_eq!(session.user.email, "login@example.com");
        assert!(!session.tokens.access_token.is_empty());
        assert!(!session.tokens.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_login_stamps_last_login() {
        let (db, service) = setup_service().await;
        let user = create_user(&db, "stamp@example.com", "password123").await;
        assert!(user.last_login.is_none());

        service.login("stamp@example.com", "password123").await.unwrap();

        let user = UserRepository::new(db.pool())
            .get_by_id(user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(user.last_login.is_some());
    }

    #[tokio::test]
    async fn test_failed_login_writes_no_refresh_row() {
        let (db, service) = setup_service().await;
        create_user(&db, "fail@example.com", "password123").await;

        let err = service.login("fail@example.com", "wrongpassword").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM refresh_tokens")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_refresh_rotates_token() {
        let (db, service) = setup_service().await;
        create_user(&db, "rotate@example.com", "password123").await;

        let session = service.login("rotate@example.com", "password123").await.unwrap();
        let old_token = session.tokens.refresh_token.clone();

        let refreshed = service.refresh(&old_token).await.unwrap();
        assert_ne!(refreshed.tokens.refresh_token, old_token);

        // The old token identity is gone.
        let repo = RefreshTokenRepository::new(db.pool());
        assert!(repo.get_by_token(&old_token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_single_use() {
        let (db, service) = setup_service().await;
        create_user(&db, "single@example.com", "password123").await;

        let session = service.login("single@example.com", "password123").await.unwrap();
        let token = session.tokens.refresh_token.clone();

        service.refresh(&token).await.unwrap();

        let err = service.refresh(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrExpiredToken));
    }

    #[tokio::test]
    async fn test_refresh_unknown_token() {
        let (_db, service) = setup_service().await;

        let err = service.refresh("never-issued").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrExpiredToken));
    }

    #[tokio::test]
    async fn test_refresh_expired_token() {
        let (db, service) = setup_service().await;
        let user = create_user(&db, "expired@example.com", "password123").await;

        let repo = RefreshTokenRepository::new(db.pool());
        repo.create(&NewRefreshToken {
            user_id: user.id,
            token: "expired-token-string".to_string(),
            expires_at: "2000-01-01 00:00:00".to_string(),
        })
        .await
        .unwrap();

        let err = service.refresh("expired-token-string").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrExpiredToken));

        // Expired rows are rejected, not deleted, by the refresh path.
        assert!(repo.get_by_token("expired-token-string").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_refresh_deleted_user() {
        let (db, service) = setup_service().await;
        let user = create_user(&db, "gone@example.com", "password123").await;

        let session = service.login("gone@example.com", "password123").await.unwrap();
        UserRepository::new(db.pool()).delete(user.id).await.unwrap();

        let err = service.refresh(&session.tokens.refresh_token).await.unwrap_err();
        // Not surfaced as a distinct "user gone" error.
        assert!(matches!(err, AuthError::InvalidOrExpiredToken));
    }

    #[tokio::test]
    async fn test_logout_idempotent() {
        let (db, service) = setup_service().await;
        create_user(&db, "out@example.com", "password123").await;

        let session = service.login("out@example.com", "password123").await.unwrap();
        let token = session.tokens.refresh_token.clone();

        // Valid, repeated, and garbage logouts all succeed silently.
        service.logout(&token).await;
        service.logout(&token).await;
        service.logout("garbage-token").await;

        let err = service.refresh(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrExpiredToken));
    }

    #[tokio::test]
    async fn test_logout_all() {
        let (db, service) = setup_service().await;
        let user = create_user(&db, "all@example.com", "password123").await;

        service.login("all@example.com", "password123").await.unwrap();
        service.login("all@example.com", "password123").await.unwrap();

        let count = service.logout_all(user.id).await.unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_auth_error_display() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "invalid credentials");
        assert_eq!(
            AuthError::InvalidOrExpiredToken.to_string(),
            "invalid or expired refresh token"
        );
    }
}
