//! Authentication module for plaza.
//!
//! This module provides password hashing, credential verification,
//! token issuance, session lifecycle management, and the rule-based
//! permission engine.

mod credentials;
mod password;
mod permission;
mod provider;
mod session;
mod token;

pub use credentials::verify_credentials;
pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use permission::{
    can, Condition, PermissionBundle, PermissionRule, WILDCARD_SUBJECT,
};
pub use provider::bundle_for_user;
pub use session::{AuthError, AuthenticatedSession, SessionService};
pub use token::{AccessClaims, SessionTokens, TokenIssuer};
