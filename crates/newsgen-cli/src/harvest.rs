//! `newsgen harvest`: events API -> JSONL dataset.

use std::time::Duration;

use anyhow::Context;
use newsgen_core::AppConfig;
use newsgen_events::{
    harvest_dataset, ApiSession, EventHarvester, EventQuery, NormalizeOptions, SessionConfig,
};

use crate::output::{write_jsonl, OutputPaths, RUN_STAMP_FORMAT};
use crate::HarvestArgs;

/// Merges CLI overrides into the configured query. Pages and page size are
/// at least 1.
pub(crate) fn build_query(config: &AppConfig, args: &HarvestArgs) -> EventQuery {
    EventQuery {
        location: args
            .location
            .clone()
            .unwrap_or_else(|| config.location.clone()),
        pages: args.pages.unwrap_or(config.pages).max(1),
        page_size: args.page_size.unwrap_or(config.page_size).max(1),
        lang: args.lang.clone().unwrap_or_else(|| config.lang.clone()),
    }
}

/// Runs one harvest and writes the raw events (and, on request, the pairs).
///
/// # Errors
///
/// Returns an error if the session cannot be built, any page fails after
/// retries, or an output file cannot be written.
pub(crate) async fn run_harvest(config: &AppConfig, args: HarvestArgs) -> anyhow::Result<()> {
    let query = build_query(config, &args);
    let out_dir = args.out.unwrap_or_else(|| config.output_dir.clone());

    let session = ApiSession::new(&SessionConfig::from(config))
        .context("failed to build events API session")?;
    let harvester = EventHarvester::new(session, &config.events_api_url)?
        .with_page_delay(Duration::from_millis(config.api_page_delay_ms));

    let mut options = NormalizeOptions::new(&query.location, config.utc_offset_hours)
        .with_context(|| format!("UTC offset {}h is out of range", config.utc_offset_hours))?;
    options.min_description_chars = config.min_description_chars;

    let dataset = harvest_dataset(&harvester, &query, &options, args.make_pairs)
        .await
        .context("events harvest failed")?;

    let stamp = chrono::Local::now().format(RUN_STAMP_FORMAT).to_string();
    let paths = OutputPaths::new(&out_dir, &query.location, &stamp);

    write_jsonl(&paths.raw, &dataset.events)?;
    println!("Fetched events: {}", dataset.fetched);
    println!("Saved events: {}", dataset.events.len());
    println!("RAW: {}", paths.raw.display());

    if args.make_pairs {
        write_jsonl(&paths.pairs, &dataset.pairs)?;
        println!("Saved pairs: {}", dataset.pairs.len());
        println!("PAIRS JSONL: {}", paths.pairs.display());
    }

    Ok(())
}
