//! Session primitives for a single page load.
//!
//! # Design
//! - Keep the session as plain data so callers construct it once and pass it down.
//! - Treat blank credentials as anonymous at construction time.
//! - Leave transport concerns to clients; the session only renders the header value.

use std::fmt::{self, Formatter};

/// Opaque bearer credential issued by the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token, returning `None` for blank input.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Raw token value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value carrying this credential.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("Credential(<redacted>)")
    }
}

/// Authentication state for one page load; never mutated after construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    credential: Option<Credential>,
}

impl Session {
    /// Session without a credential.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { credential: None }
    }

    /// Session carrying the given credential.
    #[must_use]
    pub const fn with_credential(credential: Credential) -> Self {
        Self {
            credential: Some(credential),
        }
    }

    /// Build a session from a stored raw value; blank or absent means anonymous.
    #[must_use]
    pub fn from_stored(raw: Option<String>) -> Self {
        Self {
            credential: raw.and_then(Credential::new),
        }
    }

    /// Credential presented to the backend, if any.
    #[must_use]
    pub const fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Whether this session carries usable credentials.
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.credential.is_some()
    }

    /// `Authorization` header value, when a credential is present.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.credential.as_ref().map(Credential::bearer)
    }
}
