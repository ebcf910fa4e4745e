//! Sitemap document sniffing and parsing.

use quick_xml::errors::IllFormedError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Root element of a fetched sitemap candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapKind {
    /// `<urlset>`: locs are content pages.
    UrlSet,
    /// `<sitemapindex>`: locs are further sitemaps.
    SitemapIndex,
    /// Not XML, unparseable, or some other root element.
    NotSitemap,
}

/// A fetched sitemap candidate, classified by its root element.
#[derive(Debug, Clone)]
pub struct SitemapDocument {
    pub source_url: String,
    pub body: String,
    pub kind: SitemapKind,
    /// `<loc>` values in document order. Empty for [`SitemapKind::NotSitemap`].
    pub locs: Vec<String>,
}

impl SitemapDocument {
    /// Classifies a response body.
    ///
    /// HTML served in place of the sitemap (anti-bot pages, error pages) and
    /// malformed XML both come out as [`SitemapKind::NotSitemap`].
    #[must_use]
    pub fn classify(source_url: impl Into<String>, body: impl Into<String>) -> Self {
        let source_url = source_url.into();
        let body = body.into();

        let (kind, locs) = if is_xml_like(&body) {
            match parse_sitemap_xml(&body) {
                Ok((root, locs)) => match root.as_str() {
                    "urlset" => (SitemapKind::UrlSet, locs),
                    "sitemapindex" => (SitemapKind::SitemapIndex, locs),
                    _ => (SitemapKind::NotSitemap, Vec::new()),
                },
                Err(e) => {
                    tracing::debug!(url = %source_url, error = %e, "sitemap XML failed to parse");
                    (SitemapKind::NotSitemap, Vec::new())
                }
            }
        } else {
            (SitemapKind::NotSitemap, Vec::new())
        };

        Self {
            source_url,
            body,
            kind,
            locs,
        }
    }
}

/// Cheap check that a body is an XML sitemap and not an HTML page served with
/// a 200 in its place.
#[must_use]
pub(crate) fn is_xml_like(body: &str) -> bool {
    let head = body.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<?xml") || head.starts_with("<urlset") || head.starts_with("<sitemapindex")
}

/// Parses a sitemap into its lower-cased root local name and every `<loc>`
/// value, ignoring namespaces.
///
/// A document that ends with elements still open (a body cut off in transit)
/// is an error, not a short sitemap.
pub(crate) fn parse_sitemap_xml(xml: &str) -> Result<(String, Vec<String>), quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root: Option<String> = None;
    let mut open: Vec<String> = Vec::new();
    let mut locs = Vec::new();
    let mut in_loc = false;
    let mut current = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase();
                if name == "loc" {
                    in_loc = true;
                    current.clear();
                }
                root.get_or_insert_with(|| name.clone());
                open.push(name);
            }
            Event::Empty(e) => {
                root.get_or_insert_with(|| {
                    String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase()
                });
            }
            Event::Text(e) if in_loc => {
                let text = e
                    .unescape()
                    .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned().into());
                current.push_str(&text);
            }
            Event::CData(e) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&e));
            }
            Event::End(e) => {
                open.pop();
                if in_loc && e.local_name().as_ref().eq_ignore_ascii_case(b"loc") {
                    in_loc = false;
                    let loc = current.trim();
                    if !loc.is_empty() {
                        locs.push(loc.to_owned());
                    }
                }
            }
            Event::Eof => {
                if let Some(unclosed) = open.pop() {
                    return Err(quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(
                        unclosed,
                    )));
                }
                break;
            }
            _ => {}
        }
    }

    Ok((root.unwrap_or_default(), locs))
}
