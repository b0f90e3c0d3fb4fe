use super::{
    Category, ResearchTarget, BOOKING_SITE, GAULT_MILLAU_SITE, MAGAZINE_DOMAINS, MICHELIN_SITE,
    REGIONAL_PRESS_DOMAINS, TRIPADVISOR_SITE,
};

/// Phrase TripAdvisor attaches to consistently well-reviewed hotels.
const EXCELLENCE_PHRASE: &str = "Certificate of Excellence";

/// Build the ordered search queries for one research target.
///
/// The generic query always comes first; category add-ons follow.
pub fn plan(target: &ResearchTarget) -> Vec<String> {
    let merchant = target.merchant.trim();
    let location = target.location.trim();

    let mut queries = vec![format!("{} {} reviews official website", merchant, location)];

    match &target.category {
        Category::Restaurant => {
            queries.push(format!("site:{} \"{}\"", MICHELIN_SITE, merchant));
            queries.push(format!("site:{} \"{}\"", GAULT_MILLAU_SITE, merchant));
            queries.push(format!("\"{}\" ({})", merchant, site_clause(REGIONAL_PRESS_DOMAINS)));
        }
        Category::Hotel => {
            queries.push(format!("site:{} \"{}\" {}", BOOKING_SITE, merchant, location));
            queries.push(format!(
                "site:{} \"{}\" \"{}\"",
                TRIPADVISOR_SITE, merchant, EXCELLENCE_PHRASE
            ));
        }
        Category::Spa { treatments } => {
            let term = if treatments.is_empty() {
                format!("\"{}\"", merchant)
            } else {
                let quoted: Vec<String> = treatments.iter().map(|t| format!("\"{}\"", t)).collect();
                format!("({})", quoted.join(" OR "))
            };
            queries.push(format!("{} ({})", term, site_clause(MAGAZINE_DOMAINS)));
        }
        Category::Leisure | Category::Retail | Category::General => {}
    }

    queries
}

/// `site:a OR site:b ...`
fn site_clause(domains: &[&str]) -> String {
    domains
        .iter()
        .map(|d| format!("site:{}", d))
        .collect::<Vec<_>>()
        .join(" OR ")
}
