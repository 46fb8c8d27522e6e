//! plaza - B2B services marketplace authentication core
//!
//! Session/token lifecycle management and rule-based permission
//! evaluation for a multi-role marketplace (clients, suppliers, admins).

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    bundle_for_user, can, hash_password, validate_password, verify_credentials, verify_password,
    AccessClaims, AuthError, Condition, PasswordError, PermissionBundle, PermissionRule,
    SessionService, SessionTokens, TokenIssuer,
};
pub use config::Config;
pub use db::{Database, NewRefreshToken, NewUser, RefreshToken, Role, User};
pub use error::{PlazaError, Result};
