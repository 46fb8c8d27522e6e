//! Validation utilities for Web API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// Deserializes the request body as JSON, then validates it with the
/// `validator` crate. Validation failures yield a 422 response with
/// field-level details.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

/// Validate a registration role: only client and supplier accounts can be
/// self-registered.
pub fn registration_role(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "client" | "supplier" => Ok(()),
        _ => {
            let mut err = validator::ValidationError::new("registration_role");
            err.message = Some("Role must be client or supplier".into());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_role() {
        assert!(registration_role("client").is_ok());
        assert!(registration_role("supplier").is_ok());
        assert!(registration_role("admin").is_err());
        assert!(registration_role("").is_err());
        assert!(registration_role("root").is_err());
    }
}
