//! Token issuance for plaza.
//!
//! Mints short-lived signed access tokens and long-lived opaque refresh
//! tokens. Access tokens are stateless and not revocable; the refresh
//! token row in the store is the revocable half of the pair.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use super::session::AuthError;
use crate::db::{DbPool, NewRefreshToken, RefreshTokenRepository, User};
use crate::PlazaError;

/// Timestamp format used for refresh token expiry in the store.
pub(crate) const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// Login email.
    pub email: String,
    /// Marketplace role.
    pub role: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// Token ID.
    pub jti: String,
}

/// An issued access/refresh token pair.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    /// Signed access token (JWT).
    pub access_token: String,
    /// Opaque refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Issues access/refresh token pairs for verified identities.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    access_expiry_secs: u64,
    refresh_expiry_days: u64,
}

impl TokenIssuer {
    /// Create a new issuer from the signing secret and expiry settings.
    pub fn new(jwt_secret: &str, access_expiry_secs: u64, refresh_expiry_days: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            access_expiry_secs,
            refresh_expiry_days,
        }
    }

    /// Mint a signed access token for a user.
    pub fn mint_access_token(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now().timestamp() as u64;
        let claims = AccessClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.to_string(),
            iat: now,
            exp: now + self.access_expiry_secs,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            error!("Failed to encode access token: {}", e);
            AuthError::Store(PlazaError::Auth("failed to encode access token".into()))
        })
    }

    /// Generate a fresh opaque refresh token string.
    pub fn generate_refresh_token(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Refresh token expiry timestamp for a token issued now.
    pub fn refresh_expiry(&self) -> String {
        (Utc::now() + Duration::days(self.refresh_expiry_days as i64))
            .format(EXPIRY_FORMAT)
            .to_string()
    }

    /// Access token lifetime in seconds.
    pub fn access_expiry_secs(&self) -> u64 {
        self.access_expiry_secs
    }

    /// Issue a new access/refresh pair for a verified identity.
    ///
    /// The refresh row is persisted before the pair is returned; if the
    /// store write fails the whole issuance fails and nothing is handed
    /// out. Exactly one refresh row is written per successful issuance.
    pub async fn issue(&self, pool: &DbPool, user: &User) -> Result<SessionTokens, AuthError> {
        let access_token = self.mint_access_token(user)?;
        let refresh_token = self.generate_refresh_token();

        let repo = RefreshTokenRepository::new(pool);
        repo.create(&NewRefreshToken {
            user_id: user.id,
            token: refresh_token.clone(),
            expires_at: self.refresh_expiry(),
        })
        .await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
            expires_in: self.access_expiry_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::db::{NewUser, Role, UserRepository};
    use crate::Database;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    async fn setup() -> (Database, User) {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        let user = repo
            .create(
                &NewUser::new(
                    "issuer@example.com",
                    hash_password("password123").unwrap(),
                    "Issuer User",
                )
                .with_role(Role::Supplier),
            )
            .await
            .unwrap();
        (db, user)
    }

    #[tokio::test]
    async fn test_issue_writes_refresh_row() {
        let (db, user) = setup().await;
        let issuer = TokenIssuer::new("test-secret", 900, 7);

        let tokens = issuer.issue(db.pool(), &user).await.unwrap();

        assert!(!tokens.access_token.is_empty());
        assert_eq!(tokens.expires_in, 900);

        let repo = RefreshTokenRepository::new(db.pool());
        let stored = repo.get_valid(&tokens.refresh_token).await.unwrap();
        assert!(stored.is_some());
        assert_eq!(stored.unwrap().user_id, user.id);
    }

    #[tokio::test]
    async fn test_access_token_claims() {
        let (db, user) = setup().await;
        let issuer = TokenIssuer::new("test-secret", 600, 7);

        let tokens = issuer.issue(db.pool(), &user).await.unwrap();

        let decoded = decode::<AccessClaims>(
            &tokens.access_token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, user.id);
        assert_eq!(decoded.claims.email, "issuer@example.com");
        assert_eq!(decoded.claims.role, "supplier");
        assert_eq!(decoded.claims.exp - decoded.claims.iat, 600);
        assert!(!decoded.claims.jti.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_tokens_unique_per_issue() {
        let (db, user) = setup().await;
        let issuer = TokenIssuer::new("test-secret", 900, 7);

        let first = issuer.issue(db.pool(), &user).await.unwrap();
        let second = issuer.issue(db.pool(), &user).await.unwrap();

        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[test]
    fn test_refresh_expiry_format() {
        let issuer = TokenIssuer::new("s", 900, 7);
        let expiry = issuer.refresh_expiry();
        // "YYYY-MM-DD HH:MM:SS"
        assert_eq!(expiry.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(&expiry, EXPIRY_FORMAT).is_ok());
    }
}
