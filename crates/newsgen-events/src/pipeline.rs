//! One harvest run: stream, normalize, pair.

use std::pin::pin;

use futures::TryStreamExt;
use newsgen_core::{build_pair, DatasetPair, EventRecord};

use crate::error::HarvestError;
use crate::harvest::{EventHarvester, EventQuery};
use crate::normalize::{normalize_event, NormalizeOptions};

/// Everything a harvest run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestedDataset {
    /// Raw events received from the API, before normalization.
    pub fetched: usize,
    /// Events that survived normalization.
    pub events: Vec<EventRecord>,
    /// Training pairs; empty unless pairs were requested.
    pub pairs: Vec<DatasetPair>,
}

/// Harvests `query`, normalizes every event and, when `make_pairs` is set,
/// renders a training pair for each retained event.
///
/// # Errors
///
/// Returns the first [`HarvestError`] from the event stream. Events
/// collected before the failure are discarded.
pub async fn harvest_dataset(
    harvester: &EventHarvester,
    query: &EventQuery,
    options: &NormalizeOptions,
    make_pairs: bool,
) -> Result<HarvestedDataset, HarvestError> {
    tracing::info!(
        location = %query.location,
        pages = query.pages,
        page_size = query.page_size,
        "harvesting events"
    );

    let mut events = pin!(harvester.iter_events(query));
    let mut dataset = HarvestedDataset::default();

    while let Some(raw) = events.try_next().await? {
        dataset.fetched += 1;
        let Some(event) = normalize_event(&raw, options) else {
            continue;
        };
        if make_pairs {
            match build_pair(&event) {
                Some(pair) => dataset.pairs.push(pair),
                None => tracing::debug!(id = event.id, "event rendered an empty text — no pair"),
            }
        }
        dataset.events.push(event);
    }

    tracing::info!(
        fetched = dataset.fetched,
        kept = dataset.events.len(),
        pairs = dataset.pairs.len(),
        "harvest finished"
    );
    Ok(dataset)
}
