use std::sync::LazyLock;

use regex::Regex;

/// Score when the report carries none.
pub const NO_SCORE: &str = "N/A";

static RE_SCORE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Score[:\s]+(\d{1,3})").unwrap());

/// Best-effort score pulled from free-text model output: the first
/// `Score: NN` token. Markdown bold markers are ignored.
pub fn extract_score(report: &str) -> String {
    let plain = report.replace('*', "");
    RE_SCORE
        .captures(&plain)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| NO_SCORE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_score() {
        assert_eq!(extract_score("Score: 87/100 — Needs Review"), "87");
        assert_eq!(extract_score("## Verdict\nScore 100\n"), "100");
        assert_eq!(extract_score("**Score:** 42/100"), "42");
    }

    #[test]
    fn test_extract_score_first_match_wins() {
        assert_eq!(extract_score("Score: 60\n...\nScore: 90"), "60");
    }

    #[test]
    fn test_extract_score_missing() {
        assert_eq!(extract_score("The page looks compliant."), "N/A");
        assert_eq!(extract_score("score: 80"), "N/A");
        assert_eq!(extract_score(""), "N/A");
    }
}
