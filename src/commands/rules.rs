use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use tracing::info;

use super::{autocomplete_category, require_admin, send_chunked};
use crate::research::Category;
use crate::state::Context;

/// Show the rule base (general rules, category rules, feedback log)
#[poise::command(slash_command, guild_only)]
pub async fn rules(
    ctx: Context<'_>,
    #[description = "Only show rules for this category"]
    #[autocomplete = "autocomplete_category"]
    category: Option<String>,
) -> Result<(), anyhow::Error> {
    let store = &ctx.data().store;

    let mut output = String::from("**General Rules**\n");
    output.push_str(&block_or_empty(&store.general_rules().await?));

    let categories = match &category {
        Some(label) => vec![Category::resolve(label, None).name().to_string()],
        None => store.rule_categories().await?,
    };
    for name in &categories {
        output.push_str(&format!("\n**Category Rules: {}**\n", name));
        output.push_str(&block_or_empty(&store.category_rules(name).await?));
    }

    let feedback = store.feedback_log().await?;
    output.push_str(&format!("\n**Feedback Log** ({} entries)\n", feedback.len()));
    for entry in &feedback {
        output.push_str(&format!("- {} ({}): {}\n", entry.author, entry.id, entry.text.trim()));
    }

    send_chunked(&ctx, &output).await
}

fn block_or_empty(text: &str) -> String {
    if text.trim().is_empty() {
        "_(empty)_\n".to_string()
    } else {
        format!("{}\n", text.trim_end())
    }
}

/// Replace the general rules, or one category's rules (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn setrules(
    ctx: Context<'_>,
    #[description = "Category to set; omit for the general rules"]
    #[autocomplete = "autocomplete_category"]
    category: Option<String>,
    #[description = "Rules text"] text: Option<String>,
    #[description = "Rules as a text file (for long rule sets)"] file: Option<serenity::Attachment>,
) -> Result<(), anyhow::Error> {
    if !require_admin(&ctx).await? {
        return Ok(());
    }

    let text = match (text, file) {
        (_, Some(file)) => {
            let bytes = file.download().await.context("Failed to download rules file")?;
            String::from_utf8_lossy(&bytes).into_owned()
        }
        (Some(text), None) => text,
        (None, None) => {
            ctx.say("Provide either `text` or `file`.").await?;
            return Ok(());
        }
    };

    let store = &ctx.data().store;
    let scope = match &category {
        Some(label) => {
            let name = Category::resolve(label, None).name();
            store.set_category_rules(name, &text).await?;
            name
        }
        None => {
            store.set_general_rules(&text).await?;
            "General Rules"
        }
    };

    info!(user = ctx.author().name, scope, len = text.len(), "Rules updated");
    ctx.say(format!("Updated **{}** ({} chars).", scope, text.len())).await?;
    Ok(())
}

/// Add an entry to the reviewer feedback log (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn feedback(
    ctx: Context<'_>,
    #[description = "Correction or guidance for future reports"] text: String,
) -> Result<(), anyhow::Error> {
    if !require_admin(&ctx).await? {
        return Ok(());
    }

    let entry = ctx
        .data()
        .store
        .add_feedback(&ctx.author().name, &text)
        .await?;

    info!(feedback_id = %entry.id, user = ctx.author().name, "Feedback added");
    ctx.say(format!("Feedback recorded (`{}`). It applies to all future reports.", entry.id))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_or_empty() {
        assert_eq!(block_or_empty("  \n"), "_(empty)_\n");
        assert_eq!(block_or_empty("R1. No fake urgency.\n\n"), "R1. No fake urgency.\n");
    }
}
