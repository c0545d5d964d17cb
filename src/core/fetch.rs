//! HTTP fetching for web manifests and icons.
//!
//! Network access goes through the [`Fetch`] trait so the generator can be
//! exercised in tests without a server. The real implementation is a blocking
//! `reqwest` client with a configurable timeout; there is no retry.

use std::time::Duration;

use anyhow::Context;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use super::manifest::web::WebManifest;

/// Default timeout for a single request. Overridable through the tool config.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to download `{url}`. Responded with status {status}")]
    BadStatus { url: String, status: u16 },
    #[error("Received `{url}` with Content-Type {content_type:?}. Expected an image")]
    NotAnImage {
        url: String,
        content_type: Option<String>,
    },
    #[error("Received `{url}` as an SVG. SVG images are not supported")]
    SvgUnsupported { url: String },
    #[error("Request to `{url}` failed: {message}")]
    Transport { url: String, message: String },
    #[error("`{url}` is not valid JSON: {message}")]
    InvalidJson { url: String, message: String },
}

#[derive(Clone, Debug)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Building the HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        log::debug!("Fetching {url}");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| FetchError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .map_err(|err| FetchError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            })?
            .to_vec();

        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Downloads and parses a JSON document, failing on any non-200 status.
pub fn fetch_json(fetcher: &dyn Fetch, url: &Url) -> Result<Value, FetchError> {
    let response = fetcher.fetch(url.as_str())?;
    if response.status != 200 {
        return Err(FetchError::BadStatus {
            url: url.to_string(),
            status: response.status,
        });
    }
    serde_json::from_slice(&response.body).map_err(|err| FetchError::InvalidJson {
        url: url.to_string(),
        message: err.to_string(),
    })
}

/// Downloads and parses a web app manifest.
pub fn fetch_web_manifest(fetcher: &dyn Fetch, url: &Url) -> Result<WebManifest, FetchError> {
    let json = fetch_json(fetcher, url)?;
    serde_json::from_value(json).map_err(|err| FetchError::InvalidJson {
        url: url.to_string(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticFetcher(FetchResponse);

    impl Fetch for StaticFetcher {
        fn fetch(&self, _url: &str) -> Result<FetchResponse, FetchError> {
            Ok(self.0.clone())
        }
    }

    fn url() -> Url {
        Url::parse("https://pwa.example/manifest.json").unwrap()
    }

    #[test]
    fn rejects_non_200_statuses() {
        let fetcher = StaticFetcher(FetchResponse {
            status: 404,
            content_type: None,
            body: vec![],
        });
        let err = fetch_json(&fetcher, &url()).unwrap_err();
        assert!(matches!(err, FetchError::BadStatus { status: 404, .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let fetcher = StaticFetcher(FetchResponse {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: b"{not json".to_vec(),
        });
        let err = fetch_web_manifest(&fetcher, &url()).unwrap_err();
        assert!(matches!(err, FetchError::InvalidJson { .. }));
    }

    #[test]
    fn parses_a_web_manifest() {
        let fetcher = StaticFetcher(FetchResponse {
            status: 200,
            content_type: Some("application/manifest+json".to_string()),
            body: br#"{"name": "App", "start_url": "/app"}"#.to_vec(),
        });
        let manifest = fetch_web_manifest(&fetcher, &url()).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("App"));
        assert_eq!(manifest.start_url.as_deref(), Some("/app"));
    }
}
