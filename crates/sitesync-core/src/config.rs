// ── Runtime store configuration ──
//
// These types describe *how* to reach the remote store. They carry the
// project key and connection tuning, but never touch disk -- the
// embedding application constructs a `StoreConfig` and hands it in.

use secrecy::SecretString;
use url::Url;

/// Configuration for connecting to the remote store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project base URL (e.g. `https://abc.example.co`).
    pub url: Url,
    /// Project API key (anonymous role).
    pub api_key: SecretString,
    /// Request timeout.
    pub timeout: std::time::Duration,
    /// Subscribe to the realtime change channel on connect.
    pub realtime_enabled: bool,
}

impl StoreConfig {
    pub fn new(url: Url, api_key: SecretString) -> Self {
        Self {
            url,
            api_key,
            timeout: std::time::Duration::from_secs(30),
            realtime_enabled: true,
        }
    }

    /// The realtime websocket endpoint derived from the base URL.
    pub(crate) fn realtime_url(&self) -> Result<Url, url::ParseError> {
        let mut ws = self.url.join("realtime/v1/websocket")?;
        let scheme = if self.url.scheme() == "http" { "ws" } else { "wss" };
        // set_scheme only rejects cross-category changes, which can't
        // happen for http(s) -> ws(s).
        let _ = ws.set_scheme(scheme);
        ws.query_pairs_mut().append_pair("vsn", "1.0.0");
        Ok(ws)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn realtime_url_switches_scheme() {
        let cfg = StoreConfig::new(
            Url::parse("https://abc.example.co").unwrap(),
            SecretString::from("anon-key".to_owned()),
        );
        let ws = cfg.realtime_url().unwrap();
        assert_eq!(ws.scheme(), "wss");
        assert!(ws.path().ends_with("realtime/v1/websocket"));
    }

    #[test]
    fn realtime_url_keeps_plain_ws_for_http() {
        let cfg = StoreConfig::new(
            Url::parse("http://localhost:54321").unwrap(),
            SecretString::from("anon-key".to_owned()),
        );
        assert_eq!(cfg.realtime_url().unwrap().scheme(), "ws");
    }
}
