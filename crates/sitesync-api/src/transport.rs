// Shared transport configuration for building reqwest::Client instances.
//
// The REST and auth clients share timeout and header settings through
// this module, avoiding duplicated builder logic. Every request carries
// the project API key; the bearer token is either the key itself
// (anonymous access) or a session access token.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Header carrying the project API key on every request.
pub const API_KEY_HEADER: &str = "apikey";

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Project API key (anonymous role).
    pub api_key: SecretString,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl TransportConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            timeout: Duration::from_secs(30),
        }
    }

    /// Build a `reqwest::Client` authorized with the anonymous key.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        self.build_with_bearer(self.api_key.expose_secret())
    }

    /// Build a `reqwest::Client` authorized with a session access token.
    ///
    /// The API key header is still attached -- the store requires it on
    /// every request regardless of the bearer.
    pub fn build_client_with_token(&self, token: &SecretString) -> Result<reqwest::Client, Error> {
        self.build_with_bearer(token.expose_secret())
    }

    fn build_with_bearer(&self, bearer: &str) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();

        let mut key = HeaderValue::from_str(self.api_key.expose_secret())
            .map_err(|_| Error::InvalidApiKey)?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let mut auth = HeaderValue::from_str(&format!("Bearer {bearer}"))
            .map_err(|_| Error::InvalidApiKey)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("sitesync/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }
}
