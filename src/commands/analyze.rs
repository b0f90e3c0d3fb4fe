use std::time::Duration;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

use super::{autocomplete_category, send_chunked};
use crate::report::ReportRequest;
use crate::research::{self, Category, ResearchTarget};
use crate::scrape;
use crate::state::Context;

/// Audit a deal page against the rule base, contract and web evidence
#[poise::command(slash_command, guild_only)]
pub async fn analyze(
    ctx: Context<'_>,
    #[description = "Deal name"] deal_name: String,
    #[description = "URL of the deal page under review"] url: String,
    #[description = "Merchant category"]
    #[autocomplete = "autocomplete_category"]
    category: String,
    #[description = "Merchant city"] location: String,
    #[description = "Merchant name, if different from the deal name"] merchant: Option<String>,
    #[description = "Treatments to research, comma separated (spa only)"] qualifiers: Option<String>,
    #[description = "URL of the previous page version"] previous_url: Option<String>,
    #[description = "Signed contract (PDF or text)"] contract: Option<serenity::Attachment>,
    #[description = "Specific instructions for this review"] instructions: Option<String>,
) -> Result<(), anyhow::Error> {
    if !ctx.data().can_audit(ctx.author().id.get()) {
        ctx.say("You are not on the reviewer list.").await?;
        return Ok(());
    }

    ctx.defer().await?;

    // Read current config
    let config = ctx.data().audit_config.read().await;
    let max_chars = config.max_page_chars;
    let archive_timeout = config.archive_timeout_secs;
    drop(config);

    let target = ResearchTarget {
        merchant: merchant.unwrap_or_else(|| deal_name.clone()),
        location,
        category: Category::resolve(&category, qualifiers.as_deref()),
    };

    info!(
        user = ctx.author().name,
        deal = deal_name,
        category = %target.category,
        url,
        "Audit started"
    );

    let data = ctx.data();

    let current_page = data.fetcher.fetch_page(&url, max_chars).await;
    let previous_page = match &previous_url {
        Some(prev) => Some(data.fetcher.fetch_page(prev, max_chars).await),
        None => None,
    };
    let contract_text = match &contract {
        Some(attachment) => Some(read_contract(attachment, max_chars).await),
        None => None,
    };

    let evidence = research::gather_evidence(data.search.as_ref(), &target).await;
    let rules = data.store.load_rules(&target.category).await?;

    let request = ReportRequest {
        deal_name: &deal_name,
        category: &target.category,
        rules: &rules,
        instructions: instructions.as_deref(),
        contract: contract_text.as_deref(),
        previous_page: previous_page.as_ref(),
        current_page: &current_page,
        evidence: &evidence,
    };

    let report = match data.reports.generate(&request).await {
        Ok(report) => report,
        Err(e) => {
            error!(deal = deal_name, error = %e, "Report generation failed");
            ctx.say(format!(
                "Report generation failed for **{}**: {:#}\nNothing was archived. Run the command again to retry.",
                deal_name, e
            ))
            .await?;
            return Ok(());
        }
    };

    let mut summary = format!(
        "**{}** | {} | **Score: {}**\nEvidence: {} source(s) from {} search(es)",
        deal_name,
        category,
        report.score,
        evidence.evidence.len(),
        evidence.queries.len()
    );
    if !evidence.failed_queries.is_empty() {
        summary.push_str(&format!(", {} failed", evidence.failed_queries.len()));
    }
    summary.push_str("\n\n");
    summary.push_str(&report.text);

    send_chunked(&ctx, &summary).await?;

    // Archival is offered on this invocation only; the report is not kept anywhere else.
    let archive_id = format!("{}-archive", ctx.id());
    let prompt = ctx
        .send(
            poise::CreateReply::default()
                .content("Archive this report?")
                .components(vec![serenity::CreateActionRow::Buttons(vec![
                    serenity::CreateButton::new(archive_id.clone())
                        .label("Archive report")
                        .style(serenity::ButtonStyle::Success),
                ])]),
        )
        .await?;

    let pressed = serenity::ComponentInteractionCollector::new(ctx.serenity_context())
        .author_id(ctx.author().id)
        .channel_id(ctx.channel_id())
        .timeout(Duration::from_secs(archive_timeout))
        .filter(move |mci| mci.data.custom_id == archive_id)
        .await;

    match pressed {
        Some(mci) => {
            let record = data
                .store
                .archive(&deal_name, &category, &report.score, &report.text)
                .await?;
            info!(archive_id = %record.id, deal = deal_name, score = %report.score, "Report archived");
            mci.create_response(
                ctx,
                serenity::CreateInteractionResponse::UpdateMessage(
                    serenity::CreateInteractionResponseMessage::new()
                        .content(format!("Archived as `{}`.", record.id))
                        .components(vec![]),
                ),
            )
            .await?;
        }
        None => {
            prompt
                .edit(
                    ctx,
                    poise::CreateReply::default()
                        .content("Not archived.")
                        .components(vec![]),
                )
                .await?;
        }
    }

    Ok(())
}

/// Download and extract an uploaded contract. A failure becomes a visible
/// placeholder so the report states the contract could not be read.
async fn read_contract(attachment: &serenity::Attachment, max_chars: usize) -> String {
    let result: anyhow::Result<String> = async {
        let bytes = attachment
            .download()
            .await
            .context("Failed to download contract")?;
        scrape::extract_contract_text(
            bytes,
            attachment.content_type.as_deref(),
            &attachment.filename,
            max_chars,
        )
        .await
    }
    .await;

    match result {
        Ok(text) => text,
        Err(e) => {
            warn!(filename = attachment.filename, error = %e, "Contract extraction failed");
            format!("[Contract could not be read: {:#}]", e)
        }
    }
}
