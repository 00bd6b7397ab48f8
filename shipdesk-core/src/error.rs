//! Error types for Shipdesk core operations

use thiserror::Error;

/// Schema integrity violations. Registry content is static, so any of these
/// is a defect in the registry itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate column id '{column}' in schema for {state}")]
    DuplicateColumn { state: &'static str, column: String },

    #[error("Duplicate filter param '{param}' in schema for {state}")]
    DuplicateParam { state: &'static str, param: String },

    #[error("Schema for {state} declares {count} search filters")]
    MultipleSearch { state: &'static str, count: usize },

    #[error("Search filter in schema for {state} uses param '{param}'")]
    MisnamedSearch { state: &'static str, param: String },

    #[error("Duplicate row action or hotkey for '{action}' in schema for {state}")]
    DuplicateAction {
        state: &'static str,
        action: &'static str,
    },

    #[error("Default sort column '{column}' is not defined in schema for {state}")]
    UnknownDefaultSort { state: &'static str, column: String },

    #[error("Default sort column '{column}' in schema for {state} is not sortable")]
    UnsortableDefault { state: &'static str, column: String },
}

/// Failures talking to the backend, collapsed to the three shapes the
/// controller distinguishes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request failed with status {status}: {message}")]
    Application { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Malformed(String),

    #[error("{0} is not available for this resource")]
    Unsupported(&'static str),
}

impl ApiError {
    /// Text suitable for the list error banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => "Could not reach the server. Check your connection.".to_string(),
            ApiError::Application { message, .. } if !message.trim().is_empty() => message.clone(),
            ApiError::Application { status, .. } => format!("Request failed ({})", status),
            ApiError::Malformed(_) => "The server sent an unexpected response.".to_string(),
            ApiError::Unsupported(what) => format!("{} is not available here", what),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_never_empty() {
        let errors = [
            ApiError::Transport(String::new()),
            ApiError::Application {
                status: 500,
                message: "  ".to_string(),
            },
            ApiError::Application {
                status: 422,
                message: "Invalid pincode".to_string(),
            },
            ApiError::Malformed(String::new()),
            ApiError::Unsupported("AWB generation"),
        ];
        for error in errors {
            assert!(!error.user_message().trim().is_empty(), "{:?}", error);
        }
    }
}
