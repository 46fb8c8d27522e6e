//! Credential verification for plaza.
//!
//! Checks a submitted email/password pair against the stored Argon2 hash.
//! Every failure mode that reveals account state (unknown email, wrong
//! password, malformed stored hash, suspended account) collapses into the
//! single `InvalidCredentials` error so callers cannot enumerate accounts.

use sqlx::SqlitePool;
use tracing::warn;

use super::session::AuthError;
use crate::auth::verify_password;
use crate::db::{User, UserRepository};

/// Verify an email/password pair.
///
/// Returns the matching user on success. No side effects beyond reads.
pub async fn verify_credentials(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    let repo = UserRepository::new(pool);

    let user = match repo.get_by_email(email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        }
    };

    if verify_password(password, &user.password).is_err() {
        warn!(email = %email, "Login failed: password mismatch");
        return Err(AuthError::InvalidCredentials);
    }

    if !user.is_active {
        warn!(email = %email, "Login failed: account suspended");
        return Err(AuthError::InvalidCredentials);
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::db::{NewUser, Role, UserUpdate};
    use crate::Database;

    async fn setup_user(db: &Database, email: &str, password: &str) -> User {
        let repo = UserRepository::new(db.pool());
        let hash = hash_password(password).unwrap();
        repo.create(&NewUser::new(email, hash, "Test User").with_role(Role::Client))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_verify_success() {
        let db = Database::open_in_memory().await.unwrap();
        setup_user(&db, "test@example.com", "password123").await;

        let user = verify_credentials(db.pool(), "test@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(user.email, "test@example.com");
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_identical() {
        let db = Database::open_in_memory().await.unwrap();
        setup_user(&db, "known@example.com", "password123").await;

        let unknown = verify_credentials(db.pool(), "unknown@example.com", "password123")
            .await
            .unwrap_err();
        let wrong = verify_credentials(db.pool(), "known@example.com", "wrongpassword")
            .await
            .unwrap_err();

        // Identical error kind and message, no enumeration signal.
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_malformed_stored_hash() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("broken@example.com", "not-a-phc-hash", "Broken"))
            .await
            .unwrap();

        let err = verify_credentials(db.pool(), "broken@example.com", "password123")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_suspended_account() {
        let db = Database::open_in_memory().await.unwrap();
        let user = setup_user(&db, "suspended@example.com", "password123").await;

        let repo = UserRepository::new(db.pool());
        repo.update(user.id, &UserUpdate::new().is_active(false))
            .await
            .unwrap();

        let err = verify_credentials(db.pool(), "suspended@example.com", "password123")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
