// Authentication client and identity types.
//
// Password-grant sign-in against the store's auth surface. The rest of
// the stack only ever asks one question -- "is there a live session?" --
// and falls back to a fixed local-admin identity when there isn't, so
// consumers never observe a null identity.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::error::Error;
use crate::transport::TransportConfig;

// ── Session ─────────────────────────────────────────────────────────

/// A live authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer token for subsequent REST requests.
    pub access_token: SecretString,
    pub user_id: Uuid,
    pub email: Option<String>,
    /// Store-side role claim (e.g. `"authenticated"`).
    pub role: String,
}

// ── Identity ────────────────────────────────────────────────────────

/// Identity surfaced to consumers.
///
/// Always concrete: derived from the session when one exists, otherwise
/// the fixed guest/local-admin shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
    pub is_guest: bool,
}

impl Identity {
    /// The fixed fallback identity used when no session exists.
    pub fn local_admin() -> Self {
        Self {
            id: "local-admin".into(),
            display_name: "Administrator".into(),
            is_guest: true,
        }
    }
}

impl From<&Session> for Identity {
    fn from(s: &Session) -> Self {
        Self {
            id: s.user_id.to_string(),
            display_name: s.email.clone().unwrap_or_else(|| s.user_id.to_string()),
            is_guest: false,
        }
    }
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    #[serde(alias = "error_description", alias = "msg")]
    message: Option<String>,
}

// ── AuthClient ──────────────────────────────────────────────────────

/// Client for the store's auth surface (`/auth/v1/`).
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AuthClient {
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create an auth client with a pre-built `reqwest::Client` (tests).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Sign in with email + password, returning the session on success.
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, Error> {
        let mut url = self.base_url.join("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        debug!(%email, "signing in");
        let resp = self
            .http
            .post(url)
            .json(&serde_json::json!({
                "email": email,
                "password": password.expose_secret(),
            }))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            let message = serde_json::from_str::<AuthErrorBody>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| status.to_string());
            return Err(Error::Authentication { message });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;

        Ok(Session {
            access_token: SecretString::from(token.access_token),
            user_id: token.user.id,
            email: token.user.email,
            role: token.user.role.unwrap_or_else(|| "authenticated".into()),
        })
    }

    /// Revoke the session's token. Failure is reported but the local
    /// session is gone either way -- callers treat this as best-effort.
    pub async fn sign_out(&self, session: &Session) -> Result<(), Error> {
        let url = self.base_url.join("auth/v1/logout")?;

        let resp = self
            .http
            .post(url)
            .bearer_auth(session.access_token.expose_secret())
            .send()
            .await
            .map_err(Error::Transport)?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Error::SessionExpired)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_admin_identity_is_guest() {
        let id = Identity::local_admin();
        assert!(id.is_guest);
        assert_eq!(id.id, "local-admin");
    }

    #[test]
    fn session_identity_prefers_email() {
        let session = Session {
            access_token: SecretString::from("tok".to_owned()),
            user_id: Uuid::nil(),
            email: Some("admin@lumeo.academy".into()),
            role: "authenticated".into(),
        };
        let id = Identity::from(&session);
        assert!(!id.is_guest);
        assert_eq!(id.display_name, "admin@lumeo.academy");
    }
}
