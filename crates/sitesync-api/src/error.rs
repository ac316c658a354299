use thiserror::Error;

/// Top-level error type for the `sitesync-api` crate.
///
/// Covers every failure mode across all remote surfaces: authentication,
/// HTTP transport, table operations, remote procedures, and the realtime
/// channel. `sitesync-core` maps these into consumer-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Sign-in failed (wrong credentials, account disabled, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Session has expired (token expired or revoked).
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// The project API key was rejected or is not a valid header value.
    #[error("Invalid API key")]
    InvalidApiKey,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Table operations ────────────────────────────────────────────
    /// Structured error from the store's REST surface
    /// (parsed from the `{message, code, details}` body).
    #[error("Store error (HTTP {status}): {message}")]
    Store {
        message: String,
        code: Option<String>,
        status: u16,
    },

    /// A write with `return=representation` came back empty.
    #[error("Store returned no representation for {table}")]
    EmptyRepresentation { table: String },

    // ── Remote procedures ───────────────────────────────────────────
    /// A named procedure failed or returned an unusable payload.
    #[error("Procedure {procedure} failed: {message}")]
    Rpc { procedure: String, message: String },

    // ── Realtime channel ────────────────────────────────────────────
    /// Realtime channel connection failed.
    #[error("Realtime channel connection failed: {0}")]
    RealtimeConnect(String),

    /// Realtime channel closed unexpectedly.
    #[error("Realtime channel closed (code {code}): {reason}")]
    RealtimeClosed { code: u16, reason: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::RealtimeConnect(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Store { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Extract the store error code, if available
    /// (e.g. `"23505"` for a unique violation).
    pub fn store_error_code(&self) -> Option<&str> {
        match self {
            Self::Store { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
