use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One event object exactly as the events API returned it.
///
/// Every field is kept as an untyped JSON value: the API is inconsistent
/// about types (ids as strings, timestamps in seconds or milliseconds, lists
/// or plain strings), so interpretation happens in
/// [`normalize_event`](crate::normalize::normalize_event).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    pub id: Value,
    pub title: Value,
    pub short_title: Value,
    pub description: Value,
    /// List of `{ "start": .., "end": .. }` objects.
    pub dates: Value,
    /// Nested object with `title` and `address`.
    pub place: Value,
    pub site_url: Value,
    pub categories: Value,
    pub tags: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_partial_object() {
        let raw: RawEvent = serde_json::from_str(r#"{"id": 5, "title": "Концерт"}"#).unwrap();
        assert_eq!(raw.id, Value::from(5));
        assert_eq!(raw.title, Value::from("Концерт"));
        assert!(raw.dates.is_null());
        assert!(raw.place.is_null());
    }

    #[test]
    fn ignores_unknown_fields() {
        let raw: RawEvent =
            serde_json::from_str(r#"{"id": "7", "favorites_count": 12, "images": []}"#).unwrap();
        assert_eq!(raw.id, Value::from("7"));
    }
}
