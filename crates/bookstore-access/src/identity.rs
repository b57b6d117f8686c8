//! Identity resolution for the current page load.

use async_trait::async_trait;
use bookstore_api_models::{Role, UserProfile};

use crate::error::ApiError;
use crate::session::{Credential, Session};

/// Who is looking at the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    /// No credential, or the credential was not accepted.
    Anonymous,
    /// The backend vouched for this profile.
    Identified(UserProfile),
}

impl Identity {
    /// Role of the identified user, if any.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::Anonymous => None,
            Self::Identified(profile) => Some(profile.role),
        }
    }

    /// Profile of the identified user, if any.
    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::Anonymous => None,
            Self::Identified(profile) => Some(profile),
        }
    }

    /// Whether a user was identified.
    #[must_use]
    pub const fn is_identified(&self) -> bool {
        matches!(self, Self::Identified(_))
    }
}

/// Backend endpoint that exchanges a credential for the caller's profile.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    /// Ask the backend who owns `credential`.
    async fn who_am_i(&self, credential: &Credential) -> Result<UserProfile, ApiError>;
}

/// Resolve the identity behind `session`.
///
/// An absent credential short-circuits to [`Identity::Anonymous`] without a
/// call. Every failure also degrades to anonymous; the error is only logged.
pub async fn resolve_identity<S>(session: &Session, source: &S) -> Identity
where
    S: IdentitySource + ?Sized,
{
    let Some(credential) = session.credential() else {
        return Identity::Anonymous;
    };
    match source.who_am_i(credential).await {
        Ok(profile) => {
            tracing::debug!(user_id = profile.id, role = %profile.role, "identity resolved");
            Identity::Identified(profile)
        }
        Err(err @ (ApiError::AuthRequired { .. } | ApiError::Forbidden { .. })) => {
            tracing::debug!(error = %err, "stored credential rejected; continuing anonymously");
            Identity::Anonymous
        }
        Err(err) => {
            tracing::warn!(error = %err, "identity lookup failed; continuing anonymously");
            Identity::Anonymous
        }
    }
}
