use serde::{Deserialize, Serialize};

/// One event from the events API after normalization.
///
/// Serialized field order and names form the persisted raw-event schema, so
/// renaming a field is a dataset format change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    /// Plain-text title. Never empty: events without one are dropped upstream.
    pub title: String,
    pub short_title: String,
    /// Description with HTML removed and whitespace collapsed.
    pub description: String,
    /// Location code the event was harvested for (e.g. `"msk"`).
    pub location: String,
    pub site_url: String,
    /// Start of the chosen date range, epoch seconds.
    pub start_ts: Option<i64>,
    /// End of the chosen date range, epoch seconds. Never before `start_ts`.
    pub end_ts: Option<i64>,
    /// `start_ts` rendered as `YYYY-MM-DD HH:MM`, or empty.
    pub start_str: String,
    /// `end_ts` rendered as `YYYY-MM-DD HH:MM`, or empty.
    pub end_str: String,
    /// Venue title.
    pub place: String,
    /// Venue street address.
    pub address: String,
    /// Category slugs joined with `", "`.
    pub categories: String,
    /// Tags joined with `", "`.
    pub tags: String,
}

/// A single `plan -> news` training row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPair {
    pub id: i64,
    pub location: String,
    /// Structured event plan (model input).
    pub source: String,
    /// Factual news text (model target).
    pub target: String,
    pub site_url: String,
    pub start_str: String,
    pub end_str: String,
}
