// Drone HTTP client
//
// Wraps `reqwest::Client` with URL construction and status checking.
// Endpoint groups live in sibling modules as inherent methods.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the drone's embedded server.
#[derive(Debug, Clone)]
pub struct DroneClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DroneClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the server root, e.g. `http://192.168.42.1`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a server path (leading `/` optional).
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET a JSON document.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        let body = check_status(resp).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    /// GET a resource and write its body to `destination`.
    pub(crate) async fn download(&self, url: Url, destination: &Path) -> Result<(), Error> {
        debug!("GET {} -> {}", url, destination.display());
        let resp = self.http.get(url).send().await?;
        let bytes = check_status(resp).await?.bytes().await?;
        tokio::fs::write(destination, &bytes).await?;
        Ok(())
    }

    /// PUT a local file as the raw request body.
    pub(crate) async fn put_file(&self, url: Url, source: &Path) -> Result<(), Error> {
        debug!("PUT {} <- {}", url, source.display());
        let body = tokio::fs::read(source).await?;
        let resp = self.http.put(url).body(body).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    /// DELETE a resource.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url);
        let resp = self.http.delete(url).send().await?;
        check_status(resp).await?;
        Ok(())
    }
}

/// Map non-success statuses to [`Error::Http`] with a body preview.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Http {
        status: status.as_u16(),
        message: body.chars().take(200).collect(),
    })
}
