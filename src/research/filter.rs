use std::collections::HashSet;
use std::fmt;

use super::search::RawResult;
use super::{DENYLIST, MAGAZINE_DOMAINS, REGIONAL_PRESS_DOMAINS};

/// Trust/source tag attached to a piece of evidence, derived from its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLabel {
    GoogleReviews,
    Booking,
    MichelinGuide,
    GaultMillau,
    TripAdvisor,
    RegionalPress,
    LifestyleMagazine,
    GeneralWeb,
}

impl SourceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLabel::GoogleReviews => "Google Reviews (Trusted)",
            SourceLabel::Booking => "Booking.com (Trusted)",
            SourceLabel::MichelinGuide => "Michelin Guide (Authoritative)",
            SourceLabel::GaultMillau => "Gault&Millau (Authoritative)",
            SourceLabel::TripAdvisor => "TripAdvisor (Review Aggregator)",
            SourceLabel::RegionalPress => "Regional Press",
            SourceLabel::LifestyleMagazine => "Lifestyle Magazine",
            SourceLabel::GeneralWeb => "General Web",
        }
    }
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain keyword rows, first match wins.
const LABEL_RULES: &[(&[&str], SourceLabel)] = &[
    (&["google"], SourceLabel::GoogleReviews),
    (&["booking.com"], SourceLabel::Booking),
    (&["michelin"], SourceLabel::MichelinGuide),
    (&["gaultmillau"], SourceLabel::GaultMillau),
    (&["tripadvisor"], SourceLabel::TripAdvisor),
    (REGIONAL_PRESS_DOMAINS, SourceLabel::RegionalPress),
    (MAGAZINE_DOMAINS, SourceLabel::LifestyleMagazine),
];

/// A search result that survived filtering, with its source label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledEvidence {
    pub source_label: SourceLabel,
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// Host part of a URL: the text between the first `//` and the next `/`.
/// Strings without `//` are returned whole.
pub fn extract_domain(url: &str) -> &str {
    match url.find("//") {
        Some(pos) => {
            let rest = &url[pos + 2..];
            rest.find('/').map_or(rest, |end| &rest[..end])
        }
        None => url,
    }
}

pub fn is_denied(domain: &str) -> bool {
    DENYLIST.iter().any(|d| domain.contains(d))
}

pub fn label_for(domain: &str) -> SourceLabel {
    LABEL_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| domain.contains(k)))
        .map(|(_, label)| *label)
        .unwrap_or(SourceLabel::GeneralWeb)
}

/// Deduplicate, drop denylisted domains and label what remains, keeping
/// first-seen order.
///
/// A URL is marked seen before the denylist check, so a denied URL stays
/// suppressed if another query returns it again.
pub fn filter_and_label(raw_results: impl IntoIterator<Item = RawResult>) -> Vec<LabeledEvidence> {
    let mut seen = HashSet::new();
    let mut evidence = Vec::new();

    for raw in raw_results {
        if !seen.insert(raw.url.clone()) {
            continue;
        }

        let domain = extract_domain(&raw.url).to_lowercase();
        if is_denied(&domain) {
            continue;
        }

        evidence.push(LabeledEvidence {
            source_label: label_for(&domain),
            url: raw.url,
            title: raw.title,
            snippet: raw.snippet,
        });
    }

    evidence
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(url: &str) -> RawResult {
        RawResult {
            url: url.to_string(),
            title: format!("title {}", url),
            snippet: format!("snippet {}", url),
        }
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(extract_domain("https://www.booking.com/hotel/ch/x.html"), "www.booking.com");
        assert_eq!(extract_domain("http://a.com"), "a.com");
        assert_eq!(extract_domain("a.com/path"), "a.com/path");
        assert_eq!(extract_domain(""), "");
    }

    #[test]
    fn test_dedup_keeps_first_label() {
        let out = filter_and_label(vec![raw("https://www.tripadvisor.com/r/1"), raw("https://www.tripadvisor.com/r/1")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_label, SourceLabel::TripAdvisor);
    }

    #[test]
    fn test_order_preserved_across_queries() {
        // Q1 -> [A, B], Q2 -> [C, A]
        let q1 = vec![raw("https://a.ch/"), raw("https://b.ch/")];
        let q2 = vec![raw("https://c.ch/"), raw("https://a.ch/")];
        let out = filter_and_label(q1.into_iter().chain(q2));
        let urls: Vec<_> = out.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.ch/", "https://b.ch/", "https://c.ch/"]);
    }

    #[test]
    fn test_denylist_dropped() {
        let out = filter_and_label(vec![
            raw("https://www.facebook.com/lepetitcafe"),
            raw("https://www.deindeal.ch/deals/le-petit-cafe"),
            raw("https://m.facebook.com/other"),
            raw("https://lepetitcafe.ch/"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://lepetitcafe.ch/");
    }

    #[test]
    fn test_denied_url_stays_suppressed() {
        let out = filter_and_label(vec![raw("https://groupon.ch/x"), raw("https://groupon.ch/x")]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_label_priority() {
        assert_eq!(label_for("www.booking.com"), SourceLabel::Booking);
        assert_eq!(label_for("maps.google.com"), SourceLabel::GoogleReviews);
        assert_eq!(label_for("guide.michelin.com"), SourceLabel::MichelinGuide);
        assert_eq!(label_for("www.gaultmillau.ch"), SourceLabel::GaultMillau);
        assert_eq!(label_for("www.tdg.ch"), SourceLabel::RegionalPress);
        assert_eq!(label_for("www.vogue.fr"), SourceLabel::LifestyleMagazine);
        assert_eq!(label_for("example.com"), SourceLabel::GeneralWeb);
    }

    #[test]
    fn test_label_is_domain_level() {
        let out = filter_and_label(vec![raw("http://a.com/1"), raw("http://a.com/2")]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].source_label, out[1].source_label);
        assert_eq!(out[0].source_label, SourceLabel::GeneralWeb);
    }

    #[test]
    fn test_label_ignores_path() {
        // "google" in the path must not make this a Google result
        let out = filter_and_label(vec![raw("https://blog.example.com/why-google-reviews")]);
        assert_eq!(out[0].source_label, SourceLabel::GeneralWeb);
    }

    #[test]
    fn test_empty_fields_pass_through() {
        let out = filter_and_label(vec![RawResult::default()]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "");
        assert_eq!(out[0].source_label, SourceLabel::GeneralWeb);
    }
}
