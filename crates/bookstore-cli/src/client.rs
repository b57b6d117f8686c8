//! Shared page context, error types, and argument parsers for the CLI.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use bookstore_access::{ApiError, CredentialStore, Denial, StoreError, ViewController};
use bookstore_api_models::{ModelError, Role};
use bookstore_client::{ApiClient, ClientConfig};
use url::Url;

use crate::cli::OutputFormat;

/// CLI-level error type to distinguish refusals from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Denied(Denial),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::Denied(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Denied(denial) => denial.to_string(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport { ref detail } => {
                tracing::warn!(detail = %detail, "backend unreachable");
                Self::failure(anyhow!(err.user_message()))
            }
            other => Self::validation(other.user_message()),
        }
    }
}

impl From<Denial> for CliError {
    fn from(denial: Denial) -> Self {
        Self::Denied(denial)
    }
}

impl From<ModelError> for CliError {
    fn from(err: ModelError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::failure(err)
    }
}

/// Credential persistence shared by every page.
pub(crate) type SharedStore = Arc<dyn CredentialStore + Send + Sync>;

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) api: ApiClient,
    pub(crate) store: SharedStore,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Build the context for one invocation from the stored credential.
    pub(crate) fn new(
        config: &ClientConfig,
        store: SharedStore,
        output: OutputFormat,
    ) -> CliResult<Self> {
        let session = store.session()?;
        let api = ApiClient::new(config, session)?;
        tracing::debug!(
            request_id = api.request_id(),
            signed_in = api.session().has_credentials(),
            "page context ready"
        );
        Ok(Self { api, store, output })
    }

    /// Controller for the page this invocation renders.
    pub(crate) fn controller(&self) -> ViewController<'_, ApiClient> {
        ViewController::new(self.api.session().clone(), &self.api)
    }
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

/// Parse a role name in any case.
pub(crate) fn parse_role(input: &str) -> Result<Role, String> {
    input.parse::<Role>().map_err(|err| err.to_string())
}

/// `$HOME/.bookstore/credentials.json`, or a relative fallback without a home directory.
#[must_use]
pub(crate) fn default_credentials_path() -> PathBuf {
    std::env::var_os("HOME")
        .map_or_else(PathBuf::new, PathBuf::from)
        .join(".bookstore")
        .join("credentials.json")
}
