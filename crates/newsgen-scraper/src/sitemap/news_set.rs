use std::collections::BTreeSet;

/// Whether `url` is an article inside the news section rooted at `prefix`.
///
/// The section index itself (with or without trailing slash) is not an
/// article.
#[must_use]
pub fn is_news_url(url: &str, prefix: &str) -> bool {
    url.starts_with(prefix) && url.trim_end_matches('/') != prefix.trim_end_matches('/')
}

/// Size-bounded, deduplicated accumulator of article URLs. Iterates sorted.
#[derive(Debug, Clone)]
pub struct NewsUrlSet {
    urls: BTreeSet<String>,
    max: usize,
}

impl NewsUrlSet {
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self {
            urls: BTreeSet::new(),
            max,
        }
    }

    /// Adds `url` (trimmed). Returns `false` if it was already present or
    /// the set is full.
    pub fn insert(&mut self, url: &str) -> bool {
        if self.is_full() {
            return false;
        }
        self.urls.insert(url.trim().to_owned())
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.urls.len() >= self.max
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    #[must_use]
    pub fn into_sorted_vec(self) -> Vec<String> {
        self.urls.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "https://www.muiv.ru/about/news/";

    #[test]
    fn news_predicate_accepts_articles() {
        assert!(is_news_url("https://www.muiv.ru/about/news/den-otkrytykh-dverey/", PREFIX));
    }

    #[test]
    fn news_predicate_rejects_section_index() {
        assert!(!is_news_url("https://www.muiv.ru/about/news/", PREFIX));
        assert!(!is_news_url("https://www.muiv.ru/about/news", PREFIX));
    }

    #[test]
    fn news_predicate_rejects_other_sections() {
        assert!(!is_news_url("https://www.muiv.ru/abiturientam/", PREFIX));
        assert!(!is_news_url("http://www.muiv.ru/about/news/x/", PREFIX));
    }

    #[test]
    fn set_never_exceeds_its_cap() {
        let mut set = NewsUrlSet::new(2);
        assert!(set.insert("c"));
        assert!(set.insert("a"));
        assert!(set.is_full());
        assert!(!set.insert("b"));
        assert_eq!(set.len(), 2);
        assert_eq!(set.into_sorted_vec(), vec!["a".to_owned(), "c".to_owned()]);
    }

    #[test]
    fn set_deduplicates_after_trimming() {
        let mut set = NewsUrlSet::new(10);
        assert!(set.insert("https://x/a"));
        assert!(!set.insert("  https://x/a \n"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn zero_capacity_set_is_born_full() {
        let mut set = NewsUrlSet::new(0);
        assert!(set.is_full());
        assert!(set.is_empty());
        assert!(!set.insert("a"));
    }
}
