//! Normalization of raw API payloads into [`EventRecord`]s.
//!
//! Timestamps arrive as seconds or milliseconds, as numbers or strings, and
//! occasionally as garbage; every conversion here is total and returns
//! `None` rather than failing.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use newsgen_core::EventRecord;
use regex::Regex;
use serde_json::Value;

use crate::types::RawEvent;

/// Values above this are treated as milliseconds.
const MILLIS_THRESHOLD: i64 = 10_000_000_000;

/// 2100-01-01T00:00:00Z. Later timestamps are rejected.
const MAX_TIMESTAMP: i64 = 4_102_444_800;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Entity replacements applied after tag removal. `&amp;` comes last so that
/// `&amp;lt;` decodes to `&lt;` and not to `<`.
const ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&quot;", "\""),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Settings that shape every normalized record.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Location code copied into each record.
    pub location: String,
    /// Offset used for `start_str`/`end_str`.
    pub utc_offset: FixedOffset,
    /// Drop events whose description has fewer characters than this.
    pub min_description_chars: Option<usize>,
}

impl NormalizeOptions {
    /// Options for `location` with display strings in `utc_offset_hours`.
    ///
    /// Returns `None` if the offset is outside ±23 hours.
    #[must_use]
    pub fn new(location: &str, utc_offset_hours: i32) -> Option<Self> {
        let utc_offset = FixedOffset::east_opt(utc_offset_hours.checked_mul(3600)?)?;
        Some(Self {
            location: location.to_owned(),
            utc_offset,
            min_description_chars: None,
        })
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            location: "msk".to_owned(),
            utc_offset: FixedOffset::east_opt(3 * 3600).unwrap_or_else(|| Utc.fix()),
            min_description_chars: None,
        }
    }
}

/// Removes HTML tags, decodes the common entities and collapses whitespace.
#[must_use]
pub fn strip_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out = TAG_RE.replace_all(text, " ").into_owned();
    for (entity, replacement) in ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, replacement);
        }
    }
    WS_RE.replace_all(&out, " ").trim().to_owned()
}

/// Integers, integral strings and floats (truncated toward zero). Booleans
/// are not numbers here.
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_f64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn truncate_f64(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

/// Converts a seconds-or-milliseconds epoch value into seconds.
///
/// Values above 10¹⁰ are taken as milliseconds. Results outside
/// `[0, 2100-01-01]` and non-numeric input yield `None`.
#[must_use]
pub fn normalize_timestamp(value: &Value) -> Option<i64> {
    let raw = coerce_int(value)?;
    let secs = if raw > MILLIS_THRESHOLD { raw / 1000 } else { raw };
    (0..=MAX_TIMESTAMP).contains(&secs).then_some(secs)
}

/// Chooses one `(start, end)` pair from a list of `{start, end}` objects.
///
/// The start is the earliest valid start. The end is the first valid end
/// paired with that start, or else the smallest end not before it.
#[must_use]
pub fn pick_best_date_range(dates: &Value) -> (Option<i64>, Option<i64>) {
    let Some(entries) = dates.as_array() else {
        return (None, None);
    };

    let ranges: Vec<(i64, Option<i64>)> = entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let start = entry.get("start").and_then(normalize_timestamp)?;
            Some((start, entry.get("end").and_then(normalize_timestamp)))
        })
        .collect();

    let Some(start) = ranges.iter().map(|&(s, _)| s).min() else {
        return (None, None);
    };

    let end = ranges
        .iter()
        .filter(|&&(s, _)| s == start)
        .find_map(|&(_, e)| e.filter(|&e| e >= start))
        .or_else(|| {
            ranges
                .iter()
                .filter_map(|&(_, e)| e)
                .filter(|&e| e >= start)
                .min()
        });

    (Some(start), end)
}

/// Normalizes one raw event. `None` when the id is not an integer or the
/// title is empty after HTML stripping, or when the description is shorter
/// than the configured minimum.
#[must_use]
pub fn normalize_event(raw: &RawEvent, options: &NormalizeOptions) -> Option<EventRecord> {
    let Some(id) = coerce_int(&raw.id) else {
        tracing::debug!(id = %raw.id, "dropping event without integer id");
        return None;
    };

    let title = strip_html(&scalar_text(&raw.title));
    if title.is_empty() {
        tracing::debug!(id, "dropping event with empty title");
        return None;
    }

    let description = strip_html(&scalar_text(&raw.description));
    if let Some(min) = options.min_description_chars {
        if description.chars().count() < min {
            tracing::debug!(id, min, "dropping event with short description");
            return None;
        }
    }

    let (start_ts, end_ts) = pick_best_date_range(&raw.dates);
    let (place, address) = match raw.place.as_object() {
        Some(place) => (
            place.get("title").map(|v| strip_html(&scalar_text(v))).unwrap_or_default(),
            place.get("address").map(|v| strip_html(&scalar_text(v))).unwrap_or_default(),
        ),
        None => (String::new(), String::new()),
    };

    Some(EventRecord {
        id,
        title,
        short_title: strip_html(&scalar_text(&raw.short_title)),
        description,
        location: options.location.clone(),
        site_url: scalar_text(&raw.site_url).trim().to_owned(),
        start_ts,
        end_ts,
        start_str: format_timestamp(start_ts, options.utc_offset),
        end_str: format_timestamp(end_ts, options.utc_offset),
        place,
        address,
        categories: join_list(&raw.categories),
        tags: join_list(&raw.tags),
    })
}

fn format_timestamp(ts: Option<i64>, offset: FixedOffset) -> String {
    ts.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.with_timezone(&offset).format(DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}

/// `null`, `false`, `0` and empty strings/lists/objects carry no text.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(true) => false,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        _ if is_blank(value) => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Lists are joined with `", "` skipping blank items; anything else is taken
/// as a single value.
fn join_list(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|item| !is_blank(item))
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
