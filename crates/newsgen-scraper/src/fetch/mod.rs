//! Single-shot page fetching with anti-bot detection and transport fallback.

mod fallback;
mod origin;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, CONTENT_TYPE};
use reqwest::Client;

use crate::antibot::{AntiBotClassifier, SignalScoreClassifier};
use crate::error::FetchError;

pub use fallback::{BrowserProfileTransport, FallbackTransport};
pub(crate) use origin::extract_origin;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_RU: &str = "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7";

/// Outcome of one logical fetch, after any fallback has been resolved.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// URL as requested by the caller.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    pub status: u16,
    /// `Content-Type` header value, empty when absent.
    pub content_type: String,
    pub body: String,
    /// `true` when `body` came from the fallback transport.
    pub fallback_used: bool,
    /// `true` when `body` looks like an anti-bot interstitial.
    pub antibot: bool,
}

impl FetchResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Per-call fetch settings.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Applied to the primary and the fallback request alike.
    pub timeout: Duration,
    /// Retry anti-bot responses through the fallback transport.
    pub allow_fallback: bool,
    /// Sleep before issuing the request, for pacing.
    pub pre_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            allow_fallback: true,
            pre_delay: Duration::ZERO,
        }
    }
}

/// Status, final URL, content type and text of a completed response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub final_url: String,
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

impl TransportResponse {
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let body = response.text().await?;
        Ok(Self {
            final_url,
            status,
            content_type,
            body,
        })
    }
}

/// Fetches pages with a browser-like identity and falls back to a heavier
/// transport when the response is an anti-bot interstitial.
///
/// Never retries: one call issues at most one primary and one fallback
/// request.
pub struct ResilientFetcher<T = BrowserProfileTransport> {
    client: Client,
    headers: HeaderMap,
    classifier: Box<dyn AntiBotClassifier + Send + Sync>,
    fallback: Option<T>,
}

impl ResilientFetcher<BrowserProfileTransport> {
    /// Creates a fetcher whose fallback is a [`BrowserProfileTransport`].
    ///
    /// If the fallback client cannot be built the fetcher still works, it just
    /// returns anti-bot responses as they are.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the primary client cannot be built.
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let fallback = match BrowserProfileTransport::new(user_agent) {
            Ok(transport) => Some(transport),
            Err(e) => {
                tracing::warn!(error = %e, "fallback transport unavailable — continuing without it");
                None
            }
        };
        Self::with_fallback(user_agent, fallback)
    }

    /// Creates a fetcher that never falls back.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the primary client cannot be built.
    pub fn without_fallback(user_agent: &str) -> Result<Self, FetchError> {
        Self::with_fallback(user_agent, None)
    }
}

impl<T: FallbackTransport + Sync> ResilientFetcher<T> {
    /// Creates a fetcher with an explicit (possibly absent) fallback transport.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the primary client cannot be built.
    pub fn with_fallback(user_agent: &str, fallback: Option<T>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            headers: browser_headers(),
            classifier: Box::new(SignalScoreClassifier::default()),
            fallback,
        })
    }

    /// Replaces the anti-bot classifier.
    #[must_use]
    pub fn with_classifier<C>(mut self, classifier: C) -> Self
    where
        C: AntiBotClassifier + Send + Sync + 'static,
    {
        self.classifier = Box::new(classifier);
        self
    }

    /// Whether a fallback transport is configured.
    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Fetches `url` once, then re-fetches through the fallback transport if
    /// the body is an anti-bot page and `options.allow_fallback` is set.
    ///
    /// Non-2xx statuses are returned as results, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Unreachable`] when the primary request fails at
    /// the network level (connect, timeout, truncated body).
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchResult, FetchError> {
        if !options.pre_delay.is_zero() {
            tokio::time::sleep(options.pre_delay).await;
        }

        let unreachable = |source| FetchError::Unreachable {
            url: url.to_owned(),
            source,
        };
        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .timeout(options.timeout)
            .send()
            .await
            .map_err(unreachable)?;
        let primary = TransportResponse::read(response)
            .await
            .map_err(unreachable)?;
        let antibot = self.classifier.is_antibot(&primary.body);

        if !antibot || !options.allow_fallback {
            return Ok(build_result(url, primary, false, antibot));
        }

        let Some(fallback) = &self.fallback else {
            tracing::debug!(url, "anti-bot page detected but no fallback transport configured");
            return Ok(build_result(url, primary, false, antibot));
        };

        tracing::info!(url, status = primary.status, "anti-bot page detected — retrying via fallback transport");
        match fallback.get(url, &self.headers, options.timeout).await {
            Ok(second) => {
                let antibot = self.classifier.is_antibot(&second.body);
                if antibot {
                    tracing::warn!(url, "fallback transport also received an anti-bot page");
                }
                Ok(build_result(url, second, true, antibot))
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "fallback transport failed — keeping primary response");
                Ok(build_result(url, primary, false, antibot))
            }
        }
    }
}

fn build_result(
    url: &str,
    response: TransportResponse,
    fallback_used: bool,
    antibot: bool,
) -> FetchResult {
    FetchResult {
        url: url.to_owned(),
        final_url: response.final_url,
        status: response.status,
        content_type: response.content_type,
        body: response.body,
        fallback_used,
        antibot,
    }
}

/// Header set sent with every page request. The user agent is set on the
/// client itself.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_RU));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}
