//! HTTP fetch client
//!
//! This module handles every outbound request of the pipeline, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with query parameters
//! - Retry with exponential backoff on transient failures
//! - Error classification into `FetchError` variants

use crate::config::{FetchConfig, UserAgentConfig};
use crate::{FetchError, FetchResult};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - Client identification
/// * `fetch` - Timeouts
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch: &FetchConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// GET-only client with bounded retries
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    config: FetchConfig,
}

impl FetchClient {
    pub fn new(user_agent: &UserAgentConfig, config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, config)?,
            config: config.clone(),
        })
    }

    /// Delay before retry number `attempt` (1-based)
    ///
    /// `backoff_factor * 2^(attempt - 1)` seconds: 1s, 2s, 4s at the default factor.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16) as i32;
        Duration::from_secs_f64(self.config.backoff_factor * 2f64.powi(exponent))
    }

    fn should_retry_status(&self, status: u16) -> bool {
        self.config.retry_statuses.contains(&status)
    }

    /// Sends a GET request, retrying transient failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return the response |
    /// | Status in `retry_statuses` | Retry up to `max_retries`, then `RateLimited` (429) or `Transient` |
    /// | Timeout / connection error | Retry up to `max_retries`, then `Transient` |
    /// | Any other status (404, 400, ...) | Immediate `NotFoundOrEmpty` |
    /// | Request could not be built | Immediate `Malformed` |
    ///
    /// The returned error is keyed by `url`; callers re-key it with
    /// [`FetchError::for_item`].
    pub async fn get(&self, url: &str, params: &[(&str, &str)]) -> FetchResult<Response> {
        let mut retries = 0;
        loop {
            tracing::debug!("GET {} (attempt {})", url, retries + 1);

            let failure = match self.client.get(url).query(params).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let code = status.as_u16();
                    if !self.should_retry_status(code) {
                        return Err(FetchError::NotFoundOrEmpty {
                            item: url.to_string(),
                            reason: format!("HTTP {}", code),
                        });
                    }

                    if code == 429 {
                        FetchError::RateLimited {
                            item: url.to_string(),
                        }
                    } else {
                        FetchError::Transient {
                            item: url.to_string(),
                            reason: format!("HTTP {}", code),
                        }
                    }
                }
                Err(e) if e.is_builder() => {
                    return Err(FetchError::Malformed {
                        item: url.to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    let reason = if e.is_timeout() {
                        "request timeout".to_string()
                    } else if e.is_connect() {
                        "connection failed".to_string()
                    } else {
                        e.to_string()
                    };
                    FetchError::Transient {
                        item: url.to_string(),
                        reason,
                    }
                }
            };

            if retries >= self.config.max_retries {
                return Err(failure);
            }

            retries += 1;
            let delay = self.backoff_delay(retries);
            tracing::debug!(
                "Retrying {} in {:?} after: {} ({}/{})",
                url,
                delay,
                failure,
                retries,
                self.config.max_retries
            );
            sleep(delay).await;
        }
    }

    /// GET and decode a JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> FetchResult<T> {
        let response = self.get(url, params).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Malformed {
                item: url.to_string(),
                reason: e.to_string(),
            })
    }

    /// GET a text body
    pub async fn get_text(&self, url: &str, params: &[(&str, &str)]) -> FetchResult<String> {
        let response = self.get(url, params).await?;
        response.text().await.map_err(|e| FetchError::Transient {
            item: url.to_string(),
            reason: e.to_string(),
        })
    }
}
