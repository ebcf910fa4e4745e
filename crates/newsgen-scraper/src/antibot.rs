//! Heuristic detection of anti-bot interstitial pages.
//!
//! Interstitials are served with a 200 status, so they can only be told apart
//! from real pages by their content. Each signature below also shows up on
//! ordinary pages now and then, which is why a page is only flagged when
//! several independent signatures match at once.

/// Decides whether a response body is an anti-bot interstitial rather than
/// the requested content.
pub trait AntiBotClassifier {
    fn is_antibot(&self, body: &str) -> bool;
}

/// Default classifier: counts independent content signatures and flags the
/// page when at least `min_signals` of them match.
#[derive(Debug, Clone, Copy)]
pub struct SignalScoreClassifier {
    pub min_signals: usize,
}

impl Default for SignalScoreClassifier {
    fn default() -> Self {
        Self { min_signals: 2 }
    }
}

impl SignalScoreClassifier {
    /// Number of signatures matched by `body`.
    #[must_use]
    pub fn score(body: &str) -> usize {
        let lower = body.to_lowercase();
        let signals = [
            // robots meta that hides the interstitial from search engines
            lower.contains("noindex") && lower.contains("noarchive"),
            // obfuscated layout class used by the challenge page
            lower.contains("gorizontal-vertikal"),
            // inline placeholder image
            lower.contains("data:image/gif;base64"),
            // also covers "please enable javascript"
            lower.contains("enable javascript"),
        ];
        signals.into_iter().filter(|matched| *matched).count()
    }
}

impl AntiBotClassifier for SignalScoreClassifier {
    fn is_antibot(&self, body: &str) -> bool {
        if body.is_empty() {
            return false;
        }
        Self::score(body) >= self.min_signals
    }
}

/// Classifies `body` with the default two-signal rule.
#[must_use]
pub fn classify_antibot(body: &str) -> bool {
    SignalScoreClassifier::default().is_antibot(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const META_NOINDEX: &str = r#"<meta name="robots" content="noindex, noarchive">"#;
    const OBFUSCATED: &str = r#"<div class="gorizontal-vertikal"></div>"#;
    const GIF: &str = r#"<img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=">"#;

    #[test]
    fn empty_body_is_not_antibot() {
        assert!(!classify_antibot(""));
    }

    #[test]
    fn two_signals_trip_classification() {
        let body = format!("<html><head>{META_NOINDEX}</head><body>{OBFUSCATED}</body></html>");
        assert!(classify_antibot(&body));
    }

    #[test]
    fn single_meta_signal_does_not_trip() {
        let body = format!("<html><head>{META_NOINDEX}</head><body>Новости</body></html>");
        assert!(!classify_antibot(&body));
    }

    #[test]
    fn single_marker_signal_does_not_trip() {
        let body = format!("<html><body>{OBFUSCATED}<p>real article</p></body></html>");
        assert!(!classify_antibot(&body));
    }

    #[test]
    fn noindex_without_noarchive_is_not_a_signal() {
        let body = format!(r#"<meta name="robots" content="noindex">{GIF}"#);
        assert_eq!(SignalScoreClassifier::score(&body), 1);
        assert!(!classify_antibot(&body));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let body = "<P>Please ENABLE JavaScript</P><img src='DATA:IMAGE/GIF;BASE64,xyz'>";
        assert_eq!(SignalScoreClassifier::score(body), 2);
        assert!(classify_antibot(body));
    }

    #[test]
    fn score_counts_every_signature() {
        let body = format!("{META_NOINDEX}{OBFUSCATED}{GIF}<noscript>enable javascript</noscript>");
        assert_eq!(SignalScoreClassifier::score(&body), 4);
    }

    #[test]
    fn custom_threshold_is_respected() {
        let strict = SignalScoreClassifier { min_signals: 3 };
        let body = format!("{META_NOINDEX}{OBFUSCATED}");
        assert!(!strict.is_antibot(&body));
        let lenient = SignalScoreClassifier { min_signals: 1 };
        assert!(lenient.is_antibot(OBFUSCATED));
    }
}
