use serde::Serialize;
use std::fmt;

/// A calendar key that is not a canonical `YYYY-MM-DD` day.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[error("invalid calendar date: {input}")]
pub struct FormatError {
    pub input: String,
}

impl FormatError {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Failures raised by the storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    InvalidDate(#[from] FormatError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ServiceError {
    /// Message suitable for showing to the person at the counter.
    /// Storage internals are not leaked.
    pub fn response_message(&self) -> String {
        match self {
            Self::InvalidDate(_) => "Select a valid date.".to_string(),
            Self::Storage(_) => "Inventory data could not be saved or loaded".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Why an order could not be placed. A normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    InvalidDate,
    Weekend,
}

impl RejectionReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidDate => "Select a valid order date.",
            Self::Weekend => "Orders can only be placed Monday through Friday.",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_date_hides_details_in_response() {
        let err = ServiceError::from(FormatError::new("2024-13-40"));
        assert_eq!(err.to_string(), "invalid calendar date: 2024-13-40");
        assert_eq!(err.response_message(), "Select a valid date.");
    }

    #[test]
    fn storage_errors_use_generic_message() {
        let err = ServiceError::from(StorageError::Unavailable("disk full".into()));
        assert_eq!(
            err.response_message(),
            "Inventory data could not be saved or loaded"
        );
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn rejection_reasons_render_user_text() {
        assert_eq!(
            RejectionReason::Weekend.to_string(),
            "Orders can only be placed Monday through Friday."
        );
        assert_eq!(
            RejectionReason::InvalidDate.to_string(),
            "Select a valid order date."
        );
    }
}
