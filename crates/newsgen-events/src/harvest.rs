//! Paginated event harvesting from the public events API.

use std::time::Duration;

use futures::stream::{self, Stream, TryStreamExt};
use futures::TryFutureExt;
use reqwest::Url;
use serde_json::Value;

use crate::error::HarvestError;
use crate::session::ApiSession;
use crate::types::RawEvent;

pub const DEFAULT_EVENTS_URL: &str = "https://kudago.com/public-api/v1.4/events/";

/// Fields requested for every event.
const EVENT_FIELDS: &str = "id,title,short_title,description,dates,place,site_url,categories,tags";

/// What to harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// Location code, e.g. `msk` or `spb`.
    pub location: String,
    /// Upper bound on pages requested. Pages are 1-based.
    pub pages: u32,
    pub page_size: u32,
    pub lang: String,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            location: "msk".to_owned(),
            pages: 5,
            page_size: 100,
            lang: "ru".to_owned(),
        }
    }
}

/// Client for the paginated events endpoint.
pub struct EventHarvester {
    session: ApiSession,
    endpoint: Url,
    page_delay: Duration,
}

impl EventHarvester {
    /// # Errors
    ///
    /// Returns [`HarvestError::InvalidUrl`] if `endpoint` is not an absolute
    /// URL.
    pub fn new(session: ApiSession, endpoint: &str) -> Result<Self, HarvestError> {
        let endpoint = Url::parse(endpoint).map_err(|e| HarvestError::InvalidUrl {
            url: endpoint.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            session,
            endpoint,
            page_delay: Duration::ZERO,
        })
    }

    /// Sleep between consecutive page requests.
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Fetches one page of events.
    ///
    /// Returns `None` when the page has no `results` list or the list is
    /// empty, which marks the end of the data. Non-object items are skipped.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiSession::get_json`] errors.
    pub async fn fetch_page(
        &self,
        query: &EventQuery,
        page: u32,
    ) -> Result<Option<Vec<RawEvent>>, HarvestError> {
        let page_str = page.to_string();
        let page_size = query.page_size.to_string();
        let params = [
            ("location", query.location.as_str()),
            ("lang", query.lang.as_str()),
            ("page", page_str.as_str()),
            ("page_size", page_size.as_str()),
            ("fields", EVENT_FIELDS),
            ("text_format", "text"),
        ];

        let body = self.session.get_json(&self.endpoint, &params).await?;
        let Some(results) = body
            .get("results")
            .and_then(Value::as_array)
            .filter(|results| !results.is_empty())
        else {
            tracing::debug!(page, "no results — end of events");
            return Ok(None);
        };

        let events: Vec<RawEvent> = results
            .iter()
            .filter(|item| item.is_object())
            .filter_map(|item| match serde_json::from_value(item.clone()) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::debug!(page, error = %e, "skipping undecodable event");
                    None
                }
            })
            .collect();
        tracing::debug!(page, received = results.len(), kept = events.len(), "fetched events page");
        Ok(Some(events))
    }

    /// Events of `page` and the number of the page after it, or `None` once
    /// the pages are exhausted.
    async fn next_page(
        &self,
        query: &EventQuery,
        page: u32,
    ) -> Result<Option<(Vec<RawEvent>, u32)>, HarvestError> {
        if page > query.pages {
            return Ok(None);
        }
        if page > 1 && !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }
        let events = self.fetch_page(query, page).await?;
        Ok(events.map(|events| (events, page + 1)))
    }

    /// Streams raw events page by page, in order.
    ///
    /// Pages are requested lazily, one at a time. The stream ends after
    /// `query.pages` pages, at the first page without results, or after
    /// yielding the first error. Each call starts again from page 1.
    pub fn iter_events<'a>(
        &'a self,
        query: &'a EventQuery,
    ) -> impl Stream<Item = Result<RawEvent, HarvestError>> + 'a {
        stream::try_unfold(1u32, move |page| {
            self.next_page(query, page).map_ok(|next| {
                next.map(|(events, page)| {
                    let items = events.into_iter().map(Ok::<_, HarvestError>);
                    (stream::iter(items), page)
                })
            })
        })
        .try_flatten()
    }
}
