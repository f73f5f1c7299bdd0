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
/// This extractor deserializes the request body as JSON and then validates it
/// using the `validator` crate. If validation fails, it returns a detailed
/// error response with field-level error information.
///
/// # Example
///
/// ```ignore
/// use agora::web::dto::ValidatedJson;
///
/// async fn create_forum(
///     ValidatedJson(payload): ValidatedJson<CreateForumRequest>,
/// ) -> Result<Json<Forum>, ApiError> {
///     // payload is already validated
///     // ...
/// }
/// ```
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

/// A JSON extractor for arrays whose elements are validated one by one.
pub struct ValidatedJsonList<T>(pub Vec<T>);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJsonList<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<Vec<T>>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(values) = Json::<Vec<T>>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        for value in &values {
            value.validate().map_err(ApiError::from_validation_errors)?;
        }

        Ok(ValidatedJsonList(values))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Validate that a string does not contain control characters or NULL bytes.
pub fn no_control_chars(value: &str) -> Result<(), validator::ValidationError> {
    if value
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t')
    {
        return Err(validator::ValidationError::new("no_control_chars")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}

/// Validate that a string is not empty after trimming whitespace.
pub fn not_empty_trimmed(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_empty_trimmed")
            .with_message("Must not be empty".into()));
    }
    Ok(())
}

/// Validate a forum or thread slug.
///
/// Letters, digits, `-` and `_`, with at least one non-digit so a slug can
/// never be mistaken for a thread id.
pub fn slug_chars(value: &str) -> Result<(), validator::ValidationError> {
    let allowed = value
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    let has_non_digit = value.chars().any(|c| !c.is_ascii_digit());

    if value.is_empty() || !allowed || !has_non_digit {
        return Err(validator::ValidationError::new("slug_chars")
            .with_message("Slug must use letters, digits, '-' or '_' and not be numeric".into()));
    }
    Ok(())
}

/// Validate a user nickname: letters, digits, `_` and `.`.
pub fn nickname_chars(value: &str) -> Result<(), validator::ValidationError> {
    if value.is_empty()
        || !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return Err(validator::ValidationError::new("nickname_chars")
            .with_message("Nickname must use letters, digits, '_' or '.'".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_control_chars_valid() {
        assert!(no_control_chars("Hello, world!").is_ok());
        assert!(no_control_chars("Line 1\nLine 2").is_ok());
        assert!(no_control_chars("Tab\there").is_ok());
    }

    #[test]
    fn test_no_control_chars_invalid() {
        assert!(no_control_chars("Hello\x00World").is_err()); // NULL byte
        assert!(no_control_chars("Hello\x1bWorld").is_err()); // Escape
    }

    #[test]
    fn test_not_empty_trimmed() {
        assert!(not_empty_trimmed("  Hello  ").is_ok());
        assert!(not_empty_trimmed("").is_err());
        assert!(not_empty_trimmed("\t\n").is_err());
    }

    #[test]
    fn test_slug_chars() {
        assert!(slug_chars("rust-lang_2024").is_ok());
        assert!(slug_chars("x").is_ok());
        assert!(slug_chars("").is_err());
        assert!(slug_chars("12345").is_err());
        assert!(slug_chars("has space").is_err());
        assert!(slug_chars("slash/es").is_err());
    }

    #[test]
    fn test_nickname_chars() {
        assert!(nickname_chars("john.doe_42").is_ok());
        assert!(nickname_chars("").is_err());
        assert!(nickname_chars("john doe").is_err());
        assert!(nickname_chars("john-doe").is_err());
    }
}
