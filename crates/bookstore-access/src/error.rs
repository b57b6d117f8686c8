//! Failure taxonomy shared by identity resolution, page loads and mutations.

use thiserror::Error;

/// Generic message shown when the backend did not explain a failure.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Classified failure of a backend interaction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request needs a valid credential (HTTP 401).
    #[error("authentication required")]
    AuthRequired {
        /// Backend-supplied explanation, if any.
        message: Option<String>,
    },
    /// The credential is valid but the role is insufficient (HTTP 403).
    #[error("access denied")]
    Forbidden {
        /// Backend-supplied explanation, if any.
        message: Option<String>,
    },
    /// The addressed resource does not exist (HTTP 404).
    #[error("resource not found")]
    NotFound {
        /// Backend-supplied explanation, if any.
        message: Option<String>,
    },
    /// Any other rejected request.
    #[error("request rejected with status {status}")]
    ValidationFailed {
        /// HTTP status returned by the backend.
        status: u16,
        /// Backend-supplied explanation, if any.
        message: Option<String>,
    },
    /// The request never produced a usable response.
    #[error("transport failure: {detail}")]
    Transport {
        /// Diagnostic detail; never shown verbatim to users.
        detail: String,
    },
}

impl ApiError {
    /// Map an HTTP status and optional backend message into the taxonomy.
    #[must_use]
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => Self::AuthRequired { message },
            403 => Self::Forbidden { message },
            404 => Self::NotFound { message },
            _ => Self::ValidationFailed { status, message },
        }
    }

    /// Construct a transport failure.
    #[must_use]
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    /// Backend-supplied message, if the failure carried one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::AuthRequired { message }
            | Self::Forbidden { message }
            | Self::NotFound { message }
            | Self::ValidationFailed { message, .. } => message.as_deref(),
            Self::Transport { .. } => None,
        }
    }

    /// Message suitable for showing to the person at the keyboard.
    #[must_use]
    pub fn user_message(&self) -> String {
        if let Some(message) = self.backend_message() {
            return message.to_string();
        }
        match self {
            Self::AuthRequired { .. } => "Please log in to continue.".to_string(),
            Self::Forbidden { .. } => "You do not have permission to do that.".to_string(),
            Self::NotFound { .. } => "Not found.".to_string(),
            Self::ValidationFailed { .. } | Self::Transport { .. } => GENERIC_FAILURE.to_string(),
        }
    }

    /// Whether the failure means the resource is missing rather than unreachable.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
