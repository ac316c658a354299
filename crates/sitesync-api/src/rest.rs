// REST table client
//
// Wraps `reqwest::Client` with store-specific URL construction, error
// envelope parsing, and the `Prefer` header dance for writes that return
// their representation. Rows travel as `serde_json::Value` maps in store
// shape (snake_case columns) -- the core crate owns the translation to
// domain types.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the store's REST surface.
///
/// Handles the `{message, code, details}` error envelope, table-scoped
/// URL construction, and representation unwrapping. Write methods return
/// the single created/updated row -- the surrounding array is stripped
/// before the caller sees it.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

/// Error body the store returns on non-2xx responses.
#[derive(Debug, serde::Deserialize)]
struct StoreErrorBody {
    message: Option<String>,
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl RestClient {
    /// Create a new REST client from a `TransportConfig`.
    ///
    /// The `base_url` is the project root (e.g. `https://xyz.example.co`);
    /// table paths are appended under `/rest/v1/`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a REST client with a pre-built `reqwest::Client`.
    ///
    /// Use this when you already have a client carrying a session bearer
    /// token in its default headers (e.g. after sign-in), or in tests.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The project base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a table: `{base}/rest/v1/{table}`
    pub(crate) fn table_url(&self, table: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(&format!("rest/v1/{table}"))?)
    }

    /// Build a full URL for a procedure: `{base}/rest/v1/rpc/{name}`
    pub(crate) fn rpc_url(&self, name: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(&format!("rest/v1/rpc/{name}"))?)
    }

    // ── Table operations ─────────────────────────────────────────────

    /// Select all rows of a table, optionally ordered
    /// (`order` takes the store's `column.asc` / `column.desc` syntax).
    pub async fn select(&self, table: &str, order: Option<&str>) -> Result<Vec<Value>, Error> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("select", "*");
        if let Some(order) = order {
            url.query_pairs_mut().append_pair("order", order);
        }

        debug!("GET {url}");
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        self.parse_body(resp).await
    }

    /// Insert a single row, returning the created row (with its
    /// store-assigned identifier).
    pub async fn insert(&self, table: &str, row: &Value) -> Result<Value, Error> {
        let url = self.table_url(table)?;

        debug!("POST {url}");
        let resp = self
            .http
            .post(url)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.single_row(table, resp).await
    }

    /// Update the row where `{pk} = eq.{id}`, returning the updated row.
    pub async fn update(
        &self,
        table: &str,
        pk: &str,
        id: i64,
        patch: &Value,
    ) -> Result<Value, Error> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair(pk, &format!("eq.{id}"));

        debug!("PATCH {url}");
        let resp = self
            .http
            .patch(url)
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.single_row(table, resp).await
    }

    /// Delete the row where `{pk} = eq.{id}`.
    pub async fn delete(&self, table: &str, pk: &str, id: i64) -> Result<(), Error> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair(pk, &format!("eq.{id}"));

        debug!("DELETE {url}");
        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.check_status(resp).await?;
        Ok(())
    }

    /// Insert-or-update keyed on `on_conflict` (merge-duplicates
    /// resolution), returning the resulting row.
    pub async fn upsert(&self, table: &str, on_conflict: &str, row: &Value) -> Result<Value, Error> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("on_conflict", on_conflict);

        debug!("POST {url} (upsert)");
        let resp = self
            .http
            .post(url)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(row)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.single_row(table, resp).await
    }

    // ── Remote procedures ────────────────────────────────────────────

    /// Call a procedure that returns a boolean.
    pub async fn rpc_bool(&self, name: &str, args: &impl Serialize) -> Result<bool, Error> {
        self.rpc(name, args).await
    }

    /// Call a procedure that returns a scalar string.
    pub async fn rpc_scalar(&self, name: &str, args: &impl Serialize) -> Result<String, Error> {
        self.rpc(name, args).await
    }

    async fn rpc<T: DeserializeOwned>(
        &self,
        name: &str,
        args: &impl Serialize,
    ) -> Result<T, Error> {
        let url = self.rpc_url(name)?;

        debug!("POST {url} (rpc)");
        let resp = self
            .http
            .post(url)
            .json(args)
            .send()
            .await
            .map_err(Error::Transport)?;

        let body = self.check_status(resp).await?;
        serde_json::from_str(&body).map_err(|e| Error::Rpc {
            procedure: name.to_owned(),
            message: format!("unusable result: {e}"),
        })
    }

    // ── Response handling ────────────────────────────────────────────

    /// Check the status, returning the raw body on success and a parsed
    /// `Error::Store` on failure.
    async fn check_status(&self, resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if status.is_success() {
            return Ok(body);
        }

        let parsed: Option<StoreErrorBody> = serde_json::from_str(&body).ok();
        let (message, code) = match parsed {
            Some(e) => {
                let mut msg = e.message.unwrap_or_else(|| status.to_string());
                if let Some(details) = e.details {
                    msg = format!("{msg} ({details})");
                }
                (msg, e.code)
            }
            None => (
                if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
                None,
            ),
        };

        Err(Error::Store {
            message,
            code,
            status: status.as_u16(),
        })
    }

    /// Parse a JSON body into the requested type.
    async fn parse_body<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let body = self.check_status(resp).await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Unwrap the single-row representation array a write returns.
    async fn single_row(&self, table: &str, resp: reqwest::Response) -> Result<Value, Error> {
        let mut rows: Vec<Value> = self.parse_body(resp).await?;
        if rows.is_empty() {
            return Err(Error::EmptyRepresentation {
                table: table.to_owned(),
            });
        }
        Ok(rows.swap_remove(0))
    }
}
