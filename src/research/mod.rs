pub mod filter;
pub mod format;
pub mod planner;
pub mod search;

use std::fmt;

use tracing::{debug, info, warn};

use filter::LabeledEvidence;
use search::EvidenceSource;

/// Michelin guide site used for restaurant lookups.
pub const MICHELIN_SITE: &str = "guide.michelin.com";
/// Gault&Millau site used for restaurant lookups.
pub const GAULT_MILLAU_SITE: &str = "gaultmillau.ch";
pub const BOOKING_SITE: &str = "booking.com";
pub const TRIPADVISOR_SITE: &str = "tripadvisor.com";

/// Regional press trusted for restaurant coverage.
pub const REGIONAL_PRESS_DOMAINS: &[&str] = &["letemps.ch", "tdg.ch", "24heures.ch", "lematin.ch"];

/// Lifestyle and fashion publications searched for spa treatments.
pub const MAGAZINE_DOMAINS: &[&str] = &["vogue.fr", "elle.fr", "marieclaire.fr", "harpersbazaar.com"];

/// Domains whose results never become evidence: deal platforms (including our
/// own listings) and social networks.
pub const DENYLIST: &[&str] = &[
    "deindeal",
    "groupon",
    "facebook.com",
    "instagram.com",
    "tiktok.com",
    "pinterest",
];

/// Category vocabulary offered to operators. Any label resolves to a
/// [`Category`] through [`Category::resolve`].
pub const CATEGORY_VOCABULARY: &[&str] = &[
    "Restaurant",
    "Restaurant & Bar",
    "Hotel",
    "Hotel & Spa",
    "Spa & Wellness",
    "Beauty",
    "Leisure & Activities",
    "Retail",
    "Other",
];

/// Merchant category, resolved once from the operator-chosen label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Restaurant,
    Hotel,
    /// Treatment names, only meaningful for spa research.
    Spa { treatments: Vec<String> },
    Leisure,
    Retail,
    General,
}

impl Category {
    /// Resolve a free-text category label. Matching is a case-sensitive
    /// substring test, Restaurant before Hotel before Spa, so "Hotel & Spa"
    /// is a hotel.
    pub fn resolve(label: &str, qualifiers: Option<&str>) -> Self {
        if label.contains("Restaurant") {
            Category::Restaurant
        } else if label.contains("Hotel") {
            Category::Hotel
        } else if label.contains("Spa") {
            Category::Spa {
                treatments: parse_qualifiers(qualifiers.unwrap_or("")),
            }
        } else if label.contains("Leisure") || label.contains("Activit") {
            Category::Leisure
        } else if label.contains("Retail") {
            Category::Retail
        } else {
            Category::General
        }
    }

    /// Canonical name, also the key for category rules.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Restaurant => "Restaurant",
            Category::Hotel => "Hotel",
            Category::Spa { .. } => "Spa",
            Category::Leisure => "Leisure",
            Category::Retail => "Retail",
            Category::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Split comma-separated qualifiers, trimming and dropping empty terms.
fn parse_qualifiers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// The merchant being researched for one analysis request.
#[derive(Debug, Clone)]
pub struct ResearchTarget {
    pub merchant: String,
    pub location: String,
    pub category: Category,
}

/// Everything the research pass produced for one request.
#[derive(Debug, Clone, Default)]
pub struct EvidenceBundle {
    pub queries: Vec<String>,
    pub evidence: Vec<LabeledEvidence>,
    /// Queries whose search call failed and contributed nothing.
    pub failed_queries: Vec<String>,
}

impl EvidenceBundle {
    pub fn render(&self) -> String {
        format::format_evidence(&self.evidence)
    }
}

/// Plan queries for `target`, run them one at a time against `source`, and
/// filter the combined results into labeled evidence.
///
/// A failing query is recorded in [`EvidenceBundle::failed_queries`] and
/// otherwise skipped; it never aborts the remaining queries.
pub async fn gather_evidence(source: &dyn EvidenceSource, target: &ResearchTarget) -> EvidenceBundle {
    let queries = planner::plan(target);
    let mut raw = Vec::new();
    let mut failed_queries = Vec::new();

    for query in &queries {
        match source.search(query).await {
            Ok(results) => {
                debug!(query, count = results.len(), "evidence query returned");
                raw.extend(results);
            }
            Err(e) => {
                warn!(query, error = %e, "Evidence query failed, continuing without it");
                failed_queries.push(query.clone());
            }
        }
    }

    let raw_count = raw.len();
    let evidence = filter::filter_and_label(raw);

    info!(
        merchant = %target.merchant,
        category = %target.category,
        queries = queries.len(),
        failed = failed_queries.len(),
        raw = raw_count,
        kept = evidence.len(),
        "Research complete"
    );

    EvidenceBundle {
        queries,
        evidence,
        failed_queries,
    }
}
