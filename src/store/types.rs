use serde::{Deserialize, Serialize};

/// A reviewer note carried into every future report prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: String,
    pub timestamp: i64,
    pub author: String,
    pub text: String,
}

/// An archived report, appended when a reviewer approves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub id: String,
    pub timestamp: i64,
    pub deal_name: String,
    pub category: String,
    /// Extracted score, or "N/A".
    pub score: String,
    pub report: String,
}

/// The three rule blocks a report prompt is built from.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub general: String,
    pub category: String,
    pub feedback: String,
}

/// Render feedback entries oldest first, one bullet each.
pub fn render_feedback(entries: &[FeedbackEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            let date = chrono::DateTime::from_timestamp(e.timestamp, 0)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            format!("- [{}] {}", date, e.text.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_feedback() {
        let entries = vec![
            FeedbackEntry {
                id: "a".to_string(),
                timestamp: 1_700_000_000,
                author: "rev".to_string(),
                text: "Do not flag VAT wording.\n".to_string(),
            },
            FeedbackEntry {
                id: "b".to_string(),
                timestamp: 1_700_086_400,
                author: "rev".to_string(),
                text: "Check opening hours against contract.".to_string(),
            },
        ];
        assert_eq!(
            render_feedback(&entries),
            "- [2023-11-14] Do not flag VAT wording.\n- [2023-11-15] Check opening hours against contract."
        );
    }

    #[test]
    fn test_render_feedback_empty() {
        assert_eq!(render_feedback(&[]), "");
    }
}
