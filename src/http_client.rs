//! Fetch gateway: the single point through which all upstream I/O passes
//!
//! Requests carry browser-like headers and are individually time-bounded.
//! There is no retry logic here: trying an alternate mirror or strategy is
//! a caller-level policy, and a single mirror is attempted at most once
//! per request.

use crate::config::FetchConfig;
use crate::error::ScrapeError;
use rand::Rng;
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// User agents to rotate through to avoid bot detection
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// HTTP client with browser header shaping and per-request timeouts
pub struct FetchClient {
    client: Client,
    timeout: Duration,
    probe_timeout: Duration,
}

impl FetchClient {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"
                .parse()
                .unwrap(),
        );
        headers.insert("Accept-Language", "es-ES,es;q=0.9,en;q=0.8".parse().unwrap());

        let client = ClientBuilder::new()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(config.timeout_secs),
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
        })
    }

    /// Get a random user agent from the pool
    fn random_user_agent() -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())]
    }

    /// Fetch a URL and return the response body as text
    pub async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
        self.request_text(url, None).await
    }

    /// Fetch a URL with a referer matching the origin site
    pub async fn fetch_text_with_referer(
        &self,
        url: &str,
        referer: &str,
    ) -> Result<String, ScrapeError> {
        self.request_text(url, Some(referer)).await
    }

    async fn request_text(&self, url: &str, referer: Option<&str>) -> Result<String, ScrapeError> {
        let mut request = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header("User-Agent", Self::random_user_agent());
        if let Some(referer) = referer {
            request = request.header("Referer", referer);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// Fetch a URL and decode the response body as JSON
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ScrapeError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header("User-Agent", Self::random_user_agent())
            .header("Accept", "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response.json::<T>().await?)
    }

    /// Fetch raw bytes plus the upstream content type, spoofing the referer.
    /// Used by the image proxy; the upstream body is forwarded as-is.
    pub async fn fetch_bytes(
        &self,
        url: &str,
        referer: Option<&str>,
    ) -> Result<(Vec<u8>, String), ScrapeError> {
        let mut request = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header("User-Agent", Self::random_user_agent());
        if let Some(referer) = referer {
            request = request.header("Referer", referer);
        }
        let response = request.send().await?;
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response.bytes().await?;
        Ok((bytes.to_vec(), content_type))
    }

    /// Probe whether a constructed URL resolves to real content without
    /// downloading it fully: HEAD first; on an ambiguous status (403/405,
    /// some CDNs block HEAD but serve GET) or a transport error, fall back
    /// to a ranged GET. A definitive HEAD status such as 404 is final.
    pub async fn image_exists(&self, url: &str) -> bool {
        match self
            .client
            .head(url)
            .timeout(self.probe_timeout)
            .header("User-Agent", Self::random_user_agent())
            .send()
            .await
        {
            Ok(response) => {
                if response.status().is_success() {
                    return true;
                }
                if !probe_needs_get(response.status()) {
                    return false;
                }
            }
            Err(_) => {} // fall through to the GET probe
        }

        match self
            .client
            .get(url)
            .timeout(self.probe_timeout)
            .header("User-Agent", Self::random_user_agent())
            .header("Range", "bytes=0-0")
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Whether a HEAD probe status is ambiguous enough to warrant a GET follow-up
pub fn probe_needs_get(status: StatusCode) -> bool {
    matches!(status.as_u16(), 403 | 405)
}
