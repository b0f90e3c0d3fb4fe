pub mod prompts;
pub mod score;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::llm::{LlmClient, Message};
use crate::research::{Category, EvidenceBundle};
use crate::scrape::PageText;
use crate::store::types::RuleSet;

/// Everything assembled for one compliance report.
pub struct ReportRequest<'a> {
    pub deal_name: &'a str,
    pub category: &'a Category,
    pub rules: &'a RuleSet,
    pub instructions: Option<&'a str>,
    pub contract: Option<&'a str>,
    pub previous_page: Option<&'a PageText>,
    pub current_page: &'a PageText,
    pub evidence: &'a EvidenceBundle,
}

pub struct Report {
    pub text: String,
    /// Extracted score, or [`score::NO_SCORE`].
    pub score: String,
}

/// Section body, or the "none provided" placeholder when blank.
fn or_placeholder(text: Option<&str>) -> &str {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => prompts::NONE_PROVIDED,
    }
}

fn evidence_section(bundle: &EvidenceBundle) -> String {
    let mut section = if bundle.evidence.is_empty() {
        prompts::NO_EVIDENCE.to_string()
    } else {
        bundle.render()
    };
    if !bundle.failed_queries.is_empty() {
        section.push_str(&format!(
            "\n({} of {} searches failed and returned nothing.)",
            bundle.failed_queries.len(),
            bundle.queries.len()
        ));
    }
    section
}

/// Build the `[system, user]` conversation for a report.
pub fn build_messages(req: &ReportRequest<'_>) -> Vec<Message> {
    let previous = req.previous_page.map(|p| p.to_string());
    let current = req.current_page.to_string();

    let user = format!(
        "DEAL: {deal}\nCATEGORY: {category}\n\n\
         ## CATEGORY RULES ({category})\n{category_rules}\n\n\
         ## GENERAL RULES\n{general_rules}\n\n\
         ## REVIEWER FEEDBACK LOG\n{feedback}\n\n\
         ## SPECIFIC INSTRUCTIONS\n{instructions}\n\n\
         ## CONTRACT\n{contract}\n\n\
         ## PREVIOUS PAGE VERSION\n{previous}\n\n\
         ## CURRENT PAGE\n{current}\n\n\
         ## EXTERNAL EVIDENCE\n{evidence}",
        deal = req.deal_name,
        category = req.category,
        category_rules = or_placeholder(Some(req.rules.category.as_str())),
        general_rules = or_placeholder(Some(req.rules.general.as_str())),
        feedback = or_placeholder(Some(req.rules.feedback.as_str())),
        instructions = or_placeholder(req.instructions),
        contract = or_placeholder(req.contract),
        previous = or_placeholder(previous.as_deref()),
        current = or_placeholder(Some(current.as_str())),
        evidence = evidence_section(req.evidence),
    );

    vec![Message::system(prompts::SYSTEM_PROMPT), Message::user(user)]
}

pub struct ReportGenerator {
    llm: Arc<LlmClient>,
}

impl ReportGenerator {
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }

    /// Generate the report. Any LLM failure, including an empty completion,
    /// is returned to the caller; nothing is retried.
    pub async fn generate(&self, req: &ReportRequest<'_>) -> Result<Report> {
        let messages = build_messages(req);
        let text = self.llm.chat(&messages, 0.2).await?;
        if text.trim().is_empty() {
            anyhow::bail!("LLM returned an empty report");
        }

        let score = score::extract_score(&text);
        info!(
            deal = req.deal_name,
            category = %req.category,
            score = %score,
            report_len = text.len(),
            "Report generated"
        );
        Ok(Report { text, score })
    }
}
