//! Core error types for formextra.
//!
//! [`ValidationError`] is the data-flow error produced by field and list
//! validation. It is either a single message or an ordered list of child
//! errors, which lets a list field report every failing item at once.
//! [`FormExtraError`] covers everything else that can go wrong: bad
//! configuration, template lookup and rendering, serialization and IO.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A validation failure with an optional list of child failures.
///
/// # Examples
///
/// ```
/// use formextra_core::error::ValidationError;
///
/// let err = ValidationError::new("Enter a whole number.", "invalid");
/// assert_eq!(err.messages(), vec!["Enter a whole number.".to_string()]);
///
/// let list = ValidationError::from_list(
///     vec![
///         ValidationError::new("Index 0: Enter a whole number.", "invalid"),
///         ValidationError::new("Index 2: Enter a whole number.", "invalid"),
///     ],
///     "invalid",
/// );
/// assert_eq!(list.messages().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error message. Empty for list errors.
    pub message: String,
    /// A short code identifying the failure (e.g. "required", "invalid").
    pub code: String,
    /// Parameters that were interpolated into the message.
    pub params: HashMap<String, String>,
    /// Child errors, in the order they were collected.
    pub errors: Vec<Self>,
}

impl ValidationError {
    /// Creates a single-message `ValidationError`.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
            errors: Vec::new(),
        }
    }

    /// Creates a `ValidationError` wrapping an ordered list of child errors.
    pub fn from_list(errors: Vec<Self>, code: impl Into<String>) -> Self {
        Self {
            message: String::new(),
            code: code.into(),
            params: HashMap::new(),
            errors,
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Returns `true` if this error aggregates child errors.
    pub fn is_list(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Flattens this error into its messages, depth first, preserving order.
    pub fn messages(&self) -> Vec<String> {
        if self.errors.is_empty() {
            return vec![self.message.clone()];
        }
        self.errors.iter().flat_map(Self::messages).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for formextra.
#[derive(Error, Debug)]
pub enum FormExtraError {
    /// One or more values failed validation.
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    /// A field, widget, or form was set up in a way that cannot work.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The requested template was not registered.
    #[error("Template does not exist: {0}")]
    TemplateDoesNotExist(String),

    /// A template failed to parse or render.
    #[error("Template error: {0}")]
    TemplateError(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ValidationError> for FormExtraError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<serde_json::Error> for FormExtraError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, FormExtraError>`.
pub type FormExtraResult<T> = Result<T, FormExtraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_simple() {
        let err = ValidationError::new("This field is required.", "required");
        assert_eq!(err.to_string(), "This field is required.");
        assert!(!err.is_list());
    }

    #[test]
    fn test_validation_error_list_messages_keep_order() {
        let err = ValidationError::from_list(
            vec![
                ValidationError::new("Index 1: bad", "invalid"),
                ValidationError::new("Index 4: worse", "invalid"),
            ],
            "invalid",
        );
        assert!(err.is_list());
        assert_eq!(
            err.messages(),
            vec!["Index 1: bad".to_string(), "Index 4: worse".to_string()]
        );
        assert_eq!(err.to_string(), "Index 1: bad; Index 4: worse");
    }

    #[test]
    fn test_validation_error_nested_lists_flatten() {
        let inner = ValidationError::from_list(
            vec![
                ValidationError::new("a", "x"),
                ValidationError::new("b", "x"),
            ],
            "x",
        );
        let outer = ValidationError::from_list(vec![inner, ValidationError::new("c", "x")], "x");
        assert_eq!(outer.messages(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_validation_error_with_param() {
        let err = ValidationError::new("Index 2: nope", "invalid").with_param("index", "2");
        assert_eq!(err.params.get("index").unwrap(), "2");
    }

    #[test]
    fn test_from_validation_error() {
        let err: FormExtraError = ValidationError::new("x", "invalid").into();
        assert!(matches!(err, FormExtraError::Validation(_)));
        assert_eq!(err.to_string(), "Validation error: x");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FormExtraError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: FormExtraError = json_err.into();
        assert!(matches!(err, FormExtraError::SerializationError(_)));
    }
}
