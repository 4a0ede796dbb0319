//! Error taxonomy for the gateway.
//!
//! Three classes matter to callers:
//!
//! - [`ConfigError`] — a provider could not be constructed (missing
//!   credential). Only surfaces during registry construction; the affected
//!   provider is skipped and the process continues.
//! - [`ProviderError`] — a backend call failed. Always a server-class error.
//! - [`GatewayError`] — the request-level error the transport maps to an
//!   HTTP status. Wraps `ProviderError` and adds the client-class variants.

use thiserror::Error;

/// A provider family could not be initialized.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{env_var} is not set and no API key is configured for the {provider} provider")]
    MissingCredential {
        provider: &'static str,
        env_var: &'static str,
    },
}

/// A backend call inside `generate_code` failed.
///
/// Never retried, never downgraded to an empty result.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The backend answered with a non-success status.
    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The backend answered 2xx but the payload did not have the expected shape.
    #[error("unexpected response format from {provider} API")]
    Malformed { provider: &'static str },

    /// The request never produced a usable response (DNS, TLS, timeout, ...).
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Request-level error surfaced to the transport layer.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No registered provider declares the requested model id.
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    /// The request itself is malformed (e.g. empty prompt).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A workspace path that does not exist.
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Workspace I/O failure other than a missing file.
    #[error("workspace error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Whether the caller, not a backend, caused this error.
    ///
    /// The transport maps client errors to 4xx and everything else to 5xx.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedModel(_) | Self::InvalidRequest(_) | Self::NotFound(_)
        )
    }
}
