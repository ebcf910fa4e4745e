//! Heavier second-chance transport used when the primary response is an
//! anti-bot interstitial.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Client;

use super::{extract_origin, TransportResponse};

/// A transport able to re-issue a page request that the primary client got
/// blocked on.
pub trait FallbackTransport {
    fn get(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> impl Future<Output = Result<TransportResponse, reqwest::Error>> + Send;
}

/// Cookie-keeping client that visits the site origin once before requesting
/// the page, so challenge cookies set on the landing page are replayed.
pub struct BrowserProfileTransport {
    client: Client,
    primed_origins: Mutex<HashSet<String>>,
}

impl BrowserProfileTransport {
    /// # Errors
    ///
    /// Returns the underlying `reqwest` error if the client cannot be built.
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            primed_origins: Mutex::new(HashSet::new()),
        })
    }

    /// Returns `true` the first time it is called for `origin`.
    fn claim_priming(&self, origin: &str) -> bool {
        match self.primed_origins.lock() {
            Ok(mut primed) => primed.insert(origin.to_owned()),
            // poisoned by a panicking fetch; the set itself is still usable
            Err(poisoned) => poisoned.into_inner().insert(origin.to_owned()),
        }
    }

    async fn prime(&self, origin: &str, headers: &HeaderMap, timeout: Duration) {
        let landing = format!("{origin}/");
        match self
            .client
            .get(&landing)
            .headers(headers.clone())
            .timeout(timeout)
            .send()
            .await
        {
            Ok(resp) => {
                tracing::debug!(url = %landing, status = resp.status().as_u16(), "primed fallback cookies");
            }
            Err(e) => {
                tracing::debug!(url = %landing, error = %e, "priming request failed");
            }
        }
    }
}

impl FallbackTransport for BrowserProfileTransport {
    async fn get(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<TransportResponse, reqwest::Error> {
        if let Some(origin) = extract_origin(url) {
            if self.claim_priming(&origin) {
                self.prime(&origin, headers, timeout).await;
            }
        }

        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .timeout(timeout)
            .send()
            .await?;
        TransportResponse::read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_priming_is_once_per_origin() {
        let transport = BrowserProfileTransport::new("test/0.1").unwrap();
        assert!(transport.claim_priming("https://example.com"));
        assert!(!transport.claim_priming("https://example.com"));
        assert!(transport.claim_priming("https://other.example.com"));
    }
}
