//! `robots.txt` sitemap directive extraction.

use reqwest::Url;

const SITEMAP_DIRECTIVE: &str = "sitemap:";

/// Returns every `Sitemap:` directive value in `robots`, in file order.
///
/// The directive name is matched case-insensitively. Relative values are
/// resolved against `base`; values that still do not form a URL are dropped.
pub(crate) fn parse_robots_sitemaps(robots: &str, base: &str) -> Vec<String> {
    robots
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let directive = line.get(..SITEMAP_DIRECTIVE.len())?;
            if !directive.eq_ignore_ascii_case(SITEMAP_DIRECTIVE) {
                return None;
            }
            let value = line[SITEMAP_DIRECTIVE.len()..].trim();
            if value.is_empty() {
                return None;
            }
            resolve(value, base)
        })
        .collect()
}

fn resolve(value: &str, base: &str) -> Option<String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(value.to_owned());
    }
    let base = Url::parse(base).ok()?;
    base.join(value).ok().map(String::from)
}

/// Order-preserving deduplication.
pub(crate) fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
