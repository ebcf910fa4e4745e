//! URL origin helpers.

/// Extracts the scheme+host(+port) origin from a URL.
///
/// Given `"https://www.muiv.ru/about/news/"`, returns `"https://www.muiv.ru"`.
/// Returns `None` for unparseable or opaque-origin URLs.
pub(crate) fn extract_origin(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let origin = parsed.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}
