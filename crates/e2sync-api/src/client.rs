// Preset server HTTP client
//
// Wraps `reqwest::Client` with `/api/v1/` URL construction and status
// handling. Every method is a single request: retries are a policy
// decision that belongs to the caller.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{SeqRequest, SeqResponse, SourcesResponse, StateResponse, TransitionRequest};
use crate::transport::TransportConfig;

const API_PREFIX: &str = "api/v1/";

/// Raw HTTP client for the preset server's JSON API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the server root, e.g. `http://10.0.0.5:8081/`; the
    /// `/api/v1/` prefix is appended here.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: normalize_base(base_url),
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: normalize_base(base_url),
            timeout_secs: 0,
        }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the full state snapshot.
    ///
    /// `GET /api/v1/`
    pub async fn get_state(&self) -> Result<StateResponse, Error> {
        let url = self.api_url("")?;
        self.get(url).await
    }

    /// Fetch the auxiliary sources listing.
    ///
    /// `GET /api/v1/sources/`
    pub async fn get_sources(&self) -> Result<SourcesResponse, Error> {
        let url = self.api_url("sources/")?;
        self.get(url).await
    }

    /// Activate a preset against the given expected sequence.
    ///
    /// `POST /api/v1/preset/{id}` with `{"seq": n}`
    pub async fn activate_preset(&self, id: &str, seq: u64) -> Result<SeqResponse, Error> {
        let url = self.api_url(&format!("preset/{id}"))?;
        self.post(url, &SeqRequest { seq }).await
    }

    /// Submit a transition (cut or autotrans).
    ///
    /// `POST /api/v1/preset/` with `{"seq": n, "cut": true}` or `{"seq": n, "autotrans": true}`
    pub async fn transition(&self, request: &TransitionRequest) -> Result<SeqResponse, Error> {
        let url = self.api_url("preset/")?;
        self.post(url, request).await
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL under the API prefix: `{base}api/v1/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(API_PREFIX)?.join(path)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.parse_response(resp).await
    }

    async fn post<T: DeserializeOwned>(&self, url: Url, body: &impl Serialize) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.parse_response(resp).await
    }

    fn map_send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() && self.timeout_secs > 0 {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Turn a non-2xx status into `Error::Rejected`, otherwise parse the body.
    async fn parse_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_owned()
            } else {
                body.trim().to_owned()
            };
            return Err(Error::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// Ensure the base URL ends with `/` so relative joins append rather than replace.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn api_url_appends_prefix() {
        let c = client("http://e2.local:8081");
        assert_eq!(c.api_url("").unwrap().as_str(), "http://e2.local:8081/api/v1/");
        assert_eq!(
            c.api_url("preset/1.2").unwrap().as_str(),
            "http://e2.local:8081/api/v1/preset/1.2"
        );
    }

    #[test]
    fn api_url_keeps_base_path() {
        let c = client("http://proxy.local/e2");
        assert_eq!(
            c.api_url("sources/").unwrap().as_str(),
            "http://proxy.local/e2/api/v1/sources/"
        );
    }
}
