use super::filter::LabeledEvidence;

/// Render evidence as prompt text, one block per entry.
/// No evidence renders as an empty string.
pub fn format_evidence(evidence: &[LabeledEvidence]) -> String {
    evidence
        .iter()
        .map(|e| {
            format!(
                "SOURCE: {}\nURL: {}\nTITLE: {}\nSNIPPET: {}\n---",
                e.source_label, e.url, e.title, e.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::filter::SourceLabel;

    #[test]
    fn test_format_empty() {
        assert_eq!(format_evidence(&[]), "");
    }

    #[test]
    fn test_format_blocks_in_order() {
        let evidence = vec![
            LabeledEvidence {
                source_label: SourceLabel::MichelinGuide,
                url: "https://guide.michelin.com/x".to_string(),
                title: "Le Petit Cafe".to_string(),
                snippet: "Bib Gourmand".to_string(),
            },
            LabeledEvidence {
                source_label: SourceLabel::GeneralWeb,
                url: "https://lepetitcafe.ch".to_string(),
                title: String::new(),
                snippet: String::new(),
            },
        ];

        let text = format_evidence(&evidence);
        assert_eq!(
            text,
            "SOURCE: Michelin Guide (Authoritative)\nURL: https://guide.michelin.com/x\n\
             TITLE: Le Petit Cafe\nSNIPPET: Bib Gourmand\n---\n\
             SOURCE: General Web\nURL: https://lepetitcafe.ch\nTITLE: \nSNIPPET: \n---"
        );
    }
}
