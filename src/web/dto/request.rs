//! Request DTOs for the Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::registration_role;

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login email.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Logout request.
#[derive(Debug, Deserialize, Validate)]
pub struct LogoutRequest {
    /// Refresh token to revoke (optional; logout succeeds without one).
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Token refresh request.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    /// Refresh token.
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// User registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login email.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: String,
    /// Requested role (client or supplier; admin accounts are not
    /// self-registerable).
    #[validate(custom(function = registration_role))]
    pub role: String,
    /// Company name (optional).
    #[serde(default)]
    pub company: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let req = LoginRequest {
            email: "user@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(req.validate().is_ok());

        let req = LoginRequest {
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
        };
        assert!(req.validate().is_err());

        let req = LoginRequest {
            email: "user@example.com".to_string(),
            password: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            email: "new@example.com".to_string(),
            password: "password123".to_string(),
            display_name: "New User".to_string(),
            role: "client".to_string(),
            company: None,
        };
        assert!(req.validate().is_ok());

        let req = RegisterRequest {
            email: "new@example.com".to_string(),
            password: "password123".to_string(),
            display_name: "New User".to_string(),
            role: "admin".to_string(),
            company: None,
        };
        assert!(req.validate().is_err());

        let req = RegisterRequest {
            email: "new@example.com".to_string(),
            password: "short".to_string(),
            display_name: "New User".to_string(),
            role: "supplier".to_string(),
            company: None,
        };
        assert!(req.validate().is_err());
    }
}
