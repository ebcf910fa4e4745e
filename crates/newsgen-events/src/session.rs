//! Run-scoped HTTP session for the events API.
//!
//! One [`ApiSession`] owns one connection pool and is created per harvest run.
//! GET requests are retried on connection failures and on the throttling and
//! gateway statuses; the JSON body is parsed before the status is checked so
//! that API error payloads are reported with their content.

use std::time::Duration;

use newsgen_core::app_config::DEFAULT_USER_AGENT;
use newsgen_core::AppConfig;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::HarvestError;
use crate::retry::RetryPolicy;

/// Maximum number of characters of a response body kept in error messages.
const EXCERPT_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first one.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 45,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_retries: 5,
            backoff_base_ms: 700,
        }
    }
}

impl From<&AppConfig> for SessionConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.api_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.api_max_retries,
            backoff_base_ms: config.api_backoff_base_ms,
        }
    }
}

/// A completed response: status, final URL and text body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub url: String,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct ApiSession {
    client: Client,
    retry: RetryPolicy,
}

impl ApiSession {
    /// # Errors
    ///
    /// Returns [`HarvestError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &SessionConfig) -> Result<Self, HarvestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff_base_ms: config.backoff_base_ms,
            },
        })
    }

    /// GETs `url`, retrying transient failures.
    ///
    /// A retriable status that persists through every retry is returned as a
    /// normal response.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Transport`] when the request still fails at
    /// the network level after all retries.
    pub async fn get(&self, url: &Url) -> Result<ApiResponse, HarvestError> {
        self.retry.send(|| self.send_once(url)).await
    }

    /// GETs `url` with `params` appended to its query and parses the body as
    /// JSON.
    ///
    /// # Errors
    ///
    /// - [`HarvestError::Transport`] on network failure after retries.
    /// - [`HarvestError::Parse`] if the body is not JSON, whatever the status.
    /// - [`HarvestError::Http`] if the body is JSON but the status is not 2xx.
    pub async fn get_json(&self, url: &Url, params: &[(&str, &str)]) -> Result<Value, HarvestError> {
        let mut url = url.clone();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        let response = self.get(&url).await?;
        let value: Value =
            serde_json::from_str(&response.body).map_err(|source| HarvestError::Parse {
                status: response.status,
                url: response.url.clone(),
                excerpt: excerpt(&response.body),
                source,
            })?;

        if !response.is_success() {
            return Err(HarvestError::Http {
                status: response.status,
                url: response.url,
                excerpt: excerpt(&value.to_string()),
            });
        }
        Ok(value)
    }

    async fn send_once(&self, url: &Url) -> Result<ApiResponse, HarvestError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;
        Ok(ApiResponse {
            status,
            url: final_url,
            body,
        })
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}
