//! Deterministic rendering of an [`EventRecord`] into a training pair.
//!
//! The plan text is the model input: one labelled field per line. The news
//! text is the target: a short factual paragraph assembled from the same
//! fields. Both are pure functions of the record so that re-running a harvest
//! over identical API data reproduces the dataset byte for byte.

use crate::events::{DatasetPair, EventRecord};

/// Character budget for the description teaser in the plan text.
pub const PLAN_DESCRIPTION_CHARS: usize = 320;
/// Character budget for the description excerpt in the news text.
pub const NEWS_DESCRIPTION_CHARS: usize = 420;

/// Renders the structured event plan.
///
/// Fields appear in a fixed order and empty fields are omitted entirely.
#[must_use]
pub fn render_plan(event: &EventRecord) -> String {
    let mut lines = vec![format!("Событие: {}", event.title)];

    if !event.location.is_empty() {
        lines.push(format!("Город: {}", event.location));
    }
    if !event.place.is_empty() {
        lines.push(format!("Место: {}", event.place));
    }
    if !event.address.is_empty() {
        lines.push(format!("Адрес: {}", event.address));
    }
    if !event.start_str.is_empty() {
        if !event.end_str.is_empty() && event.end_str != event.start_str {
            lines.push(format!(
                "Дата и время: {} — {}",
                event.start_str, event.end_str
            ));
        } else {
            lines.push(format!("Дата и время: {}", event.start_str));
        }
    }
    if !event.categories.is_empty() {
        lines.push(format!("Категории: {}", event.categories));
    }
    if !event.tags.is_empty() {
        lines.push(format!("Теги: {}", event.tags));
    }
    if !event.description.is_empty() {
        let teaser = truncate_chars(&event.description, PLAN_DESCRIPTION_CHARS);
        lines.push(format!("Описание: {}", teaser.trim()));
    }

    lines.join("\n").trim().to_string()
}

/// Renders the factual news paragraph.
#[must_use]
pub fn render_news(event: &EventRecord) -> String {
    let lead = if event.short_title.is_empty() {
        &event.title
    } else {
        &event.short_title
    };

    let mut pieces = vec![format!("{}.", lead.trim_end_matches('.'))];

    if !event.start_str.is_empty() {
        if event.end_str.is_empty() {
            pieces.push(format!("Дата: {}.", event.start_str));
        } else {
            pieces.push(format!("Дата: {}—{}.", event.start_str, event.end_str));
        }
    }
    if !event.place.is_empty() {
        pieces.push(format!("Место: {}.", event.place));
    }
    if !event.description.is_empty() {
        let excerpt = truncate_chars(&event.description, NEWS_DESCRIPTION_CHARS);
        pieces.push(format!("{}.", excerpt.trim().trim_end_matches('.')));
    }
    if !event.site_url.is_empty() {
        pieces.push(format!("Подробнее: {}", event.site_url));
    }

    collapse_whitespace(&pieces.join(" "))
}

/// Builds a training pair, or `None` when either rendered text is empty.
#[must_use]
pub fn build_pair(event: &EventRecord) -> Option<DatasetPair> {
    let source = render_plan(event);
    let target = render_news(event);
    if source.is_empty() || target.is_empty() {
        return None;
    }

    Some(DatasetPair {
        id: event.id,
        location: event.location.clone(),
        source,
        target,
        site_url: event.site_url.clone(),
        start_str: event.start_str.clone(),
        end_str: event.end_str.clone(),
    })
}

/// Makes a string safe to embed in a file name.
///
/// Runs of characters outside `[A-Za-z0-9_-]` become a single `_`, leading
/// and trailing underscores are dropped, and an empty result becomes `"file"`.
#[must_use]
pub fn safe_filename(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        let ch = if ch.is_ascii_alphanumeric() || ch == '-' {
            ch
        } else {
            '_'
        };
        if ch == '_' && out.ends_with('_') {
            continue;
        }
        out.push(ch);
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "dataset_test.rs"]
mod tests;
