//! HTTP client for the hospital data API's table endpoints.

use serde_json::Value;

use super::types::Row;

/// Errors from a single table fetch. Any of these fails the whole
/// snapshot build; there are no retries.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("cannot reach table source at {0}")]
    Connection(String),
    #[error("table fetch timed out after {0}s")]
    Timeout(u64),
    #[error("table fetch failed: {0}")]
    Http(String),
    #[error("table source returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected table payload: {0}")]
    Decode(String),
}

/// Client for `GET {base}/table/{name}` on the remote hospital API.
///
/// One instance is shared across requests so reqwest can pool
/// connections; each snapshot build issues its six fetches through
/// the same client.
pub struct TableClient {
    base_url: String,
    bearer_token: Option<String>,
    timeout_secs: u64,
    http: reqwest::Client,
}

impl TableClient {
    /// Create a client for the given base URL with a per-request
    /// timeout. The bearer token, when configured, is sent on every
    /// table fetch.
    pub fn new(base_url: &str, bearer_token: Option<String>, timeout_secs: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token,
            timeout_secs,
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one named table as a row collection.
    ///
    /// Accepts either a bare JSON array or an envelope object with a
    /// `data` array. Non-2xx responses are hard failures carrying the
    /// upstream status and body.
    pub async fn fetch_table(&self, name: &str) -> Result<Vec<Row>, SourceError> {
        let url = format!("{}/table/{name}", self.base_url);
        let mut request = self.http.get(&url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                SourceError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                SourceError::Timeout(self.timeout_secs)
            } else {
                SourceError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        unwrap_rows(payload)
    }
}

/// Unwrap a table payload into rows: a bare array, or an envelope
/// object exposing a `data` array.
fn unwrap_rows(payload: Value) -> Result<Vec<Row>, SourceError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(SourceError::Decode(
                    "expected a row array or a `data` envelope".into(),
                ))
            }
        },
        _ => {
            return Err(SourceError::Decode(
                "expected a row array or a `data` envelope".into(),
            ))
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map),
            _ => Err(SourceError::Decode("table row is not an object".into())),
        })
        .collect()
}
