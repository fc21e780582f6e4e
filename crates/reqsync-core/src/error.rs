//! Error types for reqsync

use thiserror::Error;

/// Result type alias using reqsync's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Reqsync error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Session errors (E001-E099)
    #[error("Not logged in. Run `reqsync login <email>` to authenticate.")]
    AuthRequired,

    #[error("The server rejected the stored session. Run `reqsync login <email>` to re-authenticate.")]
    SessionRejected,

    // Network errors (E100-E199)
    #[error("Network error: {0}. Check your connection and `reqsync config get api.base_url`.")]
    Network(#[from] reqwest::Error),

    #[error("The server responded with status {0}: {1}")]
    RequestFailed(u16, String),

    // Generation errors (E200-E299)
    #[error("Document generation timed out after {0} seconds")]
    GenerationTimeout(u64),

    #[error("The server returned an empty document")]
    EmptyDocument,

    // Selection errors (E300-E399)
    #[error("No project selected. Run `reqsync select <project-id>` first.")]
    NoProjectSelected,

    #[error("Project '{0}' not found. Run `reqsync projects list` to see all projects.")]
    ProjectNotFound(String),

    #[error("Requirement '{0}' not found. Run `reqsync requirements list` to see the current list.")]
    RequirementNotFound(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    Config(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthRequired => "E001",
            Self::SessionRejected => "E002",
            Self::Network(_) => "E100",
            Self::RequestFailed(..) => "E101",
            Self::GenerationTimeout(_) => "E200",
            Self::EmptyDocument => "E201",
            Self::NoProjectSelected => "E300",
            Self::ProjectNotFound(_) => "E301",
            Self::RequirementNotFound(_) => "E302",
            Self::Config(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::AuthRequired | Self::SessionRejected => {
                Some("reqsync login <email>".to_string())
            }
            Self::Network(_) => Some("reqsync config get api.base_url".to_string()),
            Self::GenerationTimeout(_) => {
                Some("reqsync config set generation.timeout_secs <secs>".to_string())
            }
            Self::NoProjectSelected => Some("reqsync select <project-id>".to_string()),
            Self::ProjectNotFound(_) => Some("reqsync projects list".to_string()),
            Self::RequirementNotFound(_) => Some("reqsync requirements list".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(Error::AuthRequired.code(), "E001");
        assert_eq!(Error::SessionRejected.code(), "E002");
        assert_eq!(Error::RequestFailed(500, String::new()).code(), "E101");
        assert_eq!(Error::GenerationTimeout(120).code(), "E200");
        assert_eq!(Error::EmptyDocument.code(), "E201");
        assert_eq!(Error::NoProjectSelected.code(), "E300");
    }

    #[test]
    fn test_suggestions() {
        assert_eq!(
            Error::AuthRequired.suggestion().as_deref(),
            Some("reqsync login <email>")
        );
        assert_eq!(
            Error::NoProjectSelected.suggestion().as_deref(),
            Some("reqsync select <project-id>")
        );
        assert!(Error::EmptyDocument.suggestion().is_none());
    }

    #[test]
    fn test_request_failed_display() {
        let err = Error::RequestFailed(422, "missing field".to_string());
        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("missing field"));
    }
}
