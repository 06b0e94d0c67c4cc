use serde::Serialize;
use std::fmt;

/// A single inline validation message, keyed by the flat form field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SellingError {
    /// Malformed or missing form input, caught before any remote call.
    LocalValidation(Vec<FieldError>),

    /// The Selling API rejected the request schema.
    RemoteValidation {
        operation: &'static str,
        message: String,
    },

    /// Any other remote failure (auth, throttling, not found, ...).
    RemoteService {
        operation: &'static str,
        code: String,
        message: String,
    },
}

impl SellingError {
    /// Classifies a vendor error code the way the Selling API reports it.
    pub fn remote(operation: &'static str, code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == "ValidationException" {
            SellingError::RemoteValidation { operation, message }
        } else {
            SellingError::RemoteService {
                operation,
                code: code.to_string(),
                message,
            }
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            SellingError::LocalValidation(errors) => errors,
            _ => &[],
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, SellingError::LocalValidation(_))
    }

    /// Page-level message shown for a failed call.
    pub fn banner(&self) -> String {
        match self {
            SellingError::LocalValidation(errors) => {
                format!("Please fix {} invalid field(s) before submitting", errors.len())
            }
            SellingError::RemoteValidation { operation, message } => {
                format!("Error: {operation} request was rejected: {message}")
            }
            SellingError::RemoteService {
                operation, message, ..
            } => format!("Error: {operation} failed: {message}"),
        }
    }
}

impl fmt::Display for SellingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SellingError::LocalValidation(errors) => {
                write!(f, "local validation failed:")?;
                for e in errors {
                    write!(f, " {}: {};", e.field, e.message)?;
                }
                Ok(())
            }
            SellingError::RemoteValidation { operation, message } => {
                write!(f, "remote validation error (operation={operation}): {message}")
            }
            SellingError::RemoteService {
                operation,
                code,
                message,
            } => write!(
                f,
                "remote service error (operation={operation}, code={code}): {message}"
            ),
        }
    }
}

impl std::error::Error for SellingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_classifies_validation_exception() {
        let err = SellingError::remote("CreateOpportunity", "ValidationException", "bad Duns");
        assert!(matches!(err, SellingError::RemoteValidation { .. }));

        let err = SellingError::remote("GetOpportunity", "ResourceNotFoundException", "nope");
        match err {
            SellingError::RemoteService { code, .. } => assert_eq!(code, "ResourceNotFoundException"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn survives_anyhow_round_trip() {
        let err: anyhow::Error =
            SellingError::LocalValidation(vec![FieldError::new("Duns", "DUNS must be exactly 9 digits")])
                .into();
        let back = err.downcast_ref::<SellingError>().unwrap();
        assert_eq!(back.field_errors()[0].field, "Duns");
        assert!(back.to_string().contains("Duns"));
    }
}
