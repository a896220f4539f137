// Monitoring backend HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, JSON decoding, and
// backend error extraction. Endpoint methods live in sibling modules
// (dashboard, live, facilities, alerts, analytics) as inherent impls so
// this file stays focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::query::ListQuery;
use crate::transport::TransportConfig;

/// Upper bound on how much of an unexpected body ends up in error messages.
const BODY_PREVIEW_CHARS: usize = 200;

/// The backend reports failures as `{"error": "..."}`; framework-level
/// errors use `{"detail": "..."}`.
#[derive(serde::Deserialize)]
struct BackendError {
    error: Option<String>,
    detail: Option<String>,
}

/// Async client for the parking monitoring REST API.
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted. No
/// retry and no caching; every call is a fresh request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(
            http,
            normalize_base(base_url)?,
            transport.timeout.as_secs(),
        ))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, timeout_secs: u64) -> Self {
        Self {
            http,
            base_url,
            timeout_secs,
        }
    }

    /// The API root every path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path such as `alerts/`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Build a URL with the query's filter parameters appended.
    pub(crate) fn url_with_query(&self, path: &str, query: &ListQuery) -> Result<Url, Error> {
        let mut url = self.url(path)?;
        query.apply(&mut url);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let path = url.path().to_owned();
        let result = self.http.get(url).send().await;
        self.finish(path, result).await
    }

    pub(crate) async fn patch<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("PATCH {}", url);
        let path = url.path().to_owned();
        let result = self.http.patch(url).send().await;
        self.finish(path, result).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let path = url.path().to_owned();
        let result = self.http.post(url).json(body).send().await;
        self.finish(path, result).await
    }

    /// Decode a response, logging any failure before handing it back.
    async fn finish<T: DeserializeOwned>(
        &self,
        path: String,
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, Error> {
        let outcome = match result {
            Ok(resp) => parse_response(&path, resp)
                .await
                .map_err(|e| self.transport_error(e)),
            Err(e) => Err(self.transport_error(Error::Transport(e))),
        };
        if let Err(ref e) = outcome {
            warn!(path = %path, error = %e, "request failed");
        }
        outcome
    }

    /// A timeout can fire while sending or while reading the body; both
    /// report the configured limit.
    fn transport_error(&self, err: Error) -> Error {
        match err {
            Error::Transport(e) if e.is_timeout() => Error::Timeout {
                timeout_secs: self.timeout_secs,
            },
            other => other,
        }
    }
}

/// Parse a base URL and make sure it ends with `/` so `Url::join` appends
/// rather than replacing the last segment.
fn normalize_base(base_url: &str) -> Result<Url, Error> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    Ok(Url::parse(&with_slash)?)
}

async fn parse_response<T: DeserializeOwned>(
    path: &str,
    resp: reqwest::Response,
) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        let backend_message = backend_message(&body);
        if status == reqwest::StatusCode::NOT_FOUND && backend_message.is_none() {
            return Err(Error::NotFound {
                path: path.to_owned(),
            });
        }
        return Err(Error::Http {
            status: status.as_u16(),
            message: backend_message.unwrap_or_else(|| preview(&body)),
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    })
}

fn backend_message(body: &str) -> Option<String> {
    let parsed: BackendError = serde_json::from_str(body).ok()?;
    parsed.error.or(parsed.detail)
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
