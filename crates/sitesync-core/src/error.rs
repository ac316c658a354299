// ── Core error types ──
//
// Consumer-facing errors from sitesync-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<sitesync_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the store at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// An elevated write was rejected (wrong shared password, or the
    /// procedure returned a falsy result).
    #[error("Not authorized: {message}")]
    AuthorizationFailed { message: String },

    #[error("Store client is not connected")]
    Disconnected,

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {kind} with id {identifier}")]
    NotFound { kind: String, identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Store errors (wrapped, not exposed raw) ──────────────────────
    #[error("Store error: {message}")]
    Store {
        message: String,
        /// The store-side error code (e.g. `"23505"` for unique violations).
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<sitesync_api::Error> for CoreError {
    fn from(err: sitesync_api::Error) -> Self {
        match err {
            sitesync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            sitesync_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            sitesync_api::Error::InvalidApiKey => CoreError::Config {
                message: "Invalid API key".into(),
            },
            sitesync_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Store {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            sitesync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            sitesync_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            sitesync_api::Error::Store {
                message,
                code,
                status,
            } => {
                if status == 404 {
                    CoreError::NotFound {
                        kind: "resource".into(),
                        identifier: message,
                    }
                } else {
                    CoreError::Store {
                        message,
                        code,
                        status: Some(status),
                    }
                }
            }
            sitesync_api::Error::EmptyRepresentation { table } => CoreError::Store {
                message: format!("write against {table} returned no representation"),
                code: None,
                status: None,
            },
            sitesync_api::Error::Rpc { procedure, message } => CoreError::Store {
                message: format!("procedure {procedure}: {message}"),
                code: None,
                status: None,
            },
            sitesync_api::Error::RealtimeConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("Realtime channel connection failed: {reason}"),
            },
            sitesync_api::Error::RealtimeClosed { code, reason } => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("Realtime channel closed (code {code}): {reason}"),
            },
            sitesync_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Internal(format!("Shape error: {err}"))
    }
}
