//! Async HTTP client wrapping reqwest.
//!
//! Read-only GETs against the hosting provider. Handles timeouts, bearer
//! auth, retry on 5xx and transport errors, and backoff on 429.

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("mockcraft/", env!("CARGO_PKG_VERSION"));

/// Response from an HTTP GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client for the scanner.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    token: Option<String>,
    max_retries: u32,
}

impl HttpClient {
    pub fn new(config: &ScanConfig) -> ScanResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            token: config.token.clone(),
            max_retries: config.max_retries,
        })
    }

    /// A client for endpoints that must be tried once: no status or transport retries.
    pub fn single_attempt(&self) -> Self {
        Self {
            max_retries: 0,
            ..self.clone()
        }
    }

    /// Send a GET with retry on 5xx and backoff on 429, leaving the body unread.
    async fn send(&self, url: &str, accept: Option<&str>) -> ScanResult<reqwest::Response> {
        let mut retries = 0u32;

        loop {
            let mut req = self.client.get(url);
            if let Some(accept) = accept {
                req = req.header(reqwest::header::ACCEPT, accept);
            }
            if let Some(token) = &self.token {
                req = req.bearer_auth(token);
            }

            match req.send().await {
                Ok(r) => {
                    let status = r.status().as_u16();

                    if status >= 500 && retries < self.max_retries {
                        retries += 1;
                        let delay = Duration::from_millis(500 * 2u64.pow(retries - 1));
                        tracing::debug!("HTTP {status} for {url}, retry {retries} in {delay:?}");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    if status == 429 && retries < self.max_retries {
                        retries += 1;
                        let retry_after = r
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(2);
                        let delay = Duration::from_secs(retry_after.min(10));
                        tracing::debug!("rate limited on {url}, waiting {delay:?}");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    return Ok(r);
                }
                Err(e) => {
                    if retries < self.max_retries && !e.is_timeout() {
                        retries += 1;
                        let delay = Duration::from_millis(500 * 2u64.pow(retries - 1));
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    /// Perform a GET and read the whole body.
    ///
    /// Non-success statuses that are not retried are returned as-is; callers
    /// decide what a 404 means.
    pub async fn get(&self, url: &str, accept: Option<&str>) -> ScanResult<HttpResponse> {
        let r = self.send(url, accept).await?;
        let status = r.status().as_u16();
        let body = r.text().await?;
        Ok(HttpResponse {
            url: url.to_string(),
            status,
            body,
        })
    }

    /// GET and decode a JSON body, failing on any non-2xx status.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ScanResult<T> {
        let resp = self.get(url, Some("application/vnd.github.v3+json")).await?;
        if !resp.is_success() {
            return Err(ScanError::Status {
                status: resp.status,
                url: resp.url,
            });
        }
        Ok(serde_json::from_str(&resp.body)?)
    }

    /// GET a text body, failing on non-2xx or when it exceeds `max_bytes`.
    ///
    /// A declared `Content-Length` over the limit fails before any body is
    /// read; otherwise the body is read chunk by chunk and abandoned as soon
    /// as it passes the limit.
    pub async fn get_text(&self, url: &str, max_bytes: usize) -> ScanResult<String> {
        let mut r = self.send(url, None).await?;
        let status = r.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(ScanError::Status {
                status,
                url: url.to_string(),
            });
        }

        let too_large = |size: u64| ScanError::FileFetchFailed {
            path: url.to_string(),
            reason: format!("{size} bytes exceeds limit of {max_bytes}"),
        };

        if let Some(len) = r.content_length() {
            if len > max_bytes as u64 {
                return Err(too_large(len));
            }
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = r.chunk().await? {
            if body.len() + chunk.len() > max_bytes {
                return Err(too_large((body.len() + chunk.len()) as u64));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new(&ScanConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_single_attempt_drops_retries() {
        let config = ScanConfig {
            max_retries: 3,
            ..ScanConfig::default()
        };
        let client = HttpClient::new(&config).unwrap();
        assert_eq!(client.max_retries, 3);
        assert_eq!(client.single_attempt().max_retries, 0);
    }

    #[test]
    fn test_response_success_range() {
        let mut resp = HttpResponse {
            url: "https://example.com".to_string(),
            status: 204,
            body: String::new(),
        };
        assert!(resp.is_success());
        resp.status = 404;
        assert!(!resp.is_success());
    }
}
