mod analyze;
mod config;
mod history;
mod models;
mod rules;

use crate::research::CATEGORY_VOCABULARY;
use crate::state::Context;

/// Deal page compliance auditor
#[poise::command(
    slash_command,
    subcommands(
        "analyze::analyze",
        "rules::rules",
        "rules::setrules",
        "rules::feedback",
        "history::history",
        "models::models",
        "config::config"
    )
)]
pub async fn audit(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}

/// Reply that the command is admin-only and return false for non-admins.
async fn require_admin(ctx: &Context<'_>) -> Result<bool, anyhow::Error> {
    if ctx.data().is_admin(ctx.author().id.get()) {
        return Ok(true);
    }
    ctx.say("This command is admin-only.").await?;
    Ok(false)
}

/// Send a message in Discord-safe chunks (max 1990 chars).
/// Uses ctx.say() for all chunks — poise routes follow-ups through the
/// interaction webhook, which doesn't require Send Messages channel permission.
async fn send_chunked(ctx: &Context<'_>, text: &str) -> Result<(), anyhow::Error> {
    for chunk in split_chunks(text, 1990) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

/// Split on the last newline (or space) before `max` bytes, never inside a
/// UTF-8 character.
fn split_chunks(text: &str, max: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let mut chunk_len = remaining.len().min(max);
        while !remaining.is_char_boundary(chunk_len) {
            chunk_len -= 1;
        }
        let split_at = if chunk_len < remaining.len() {
            remaining[..chunk_len]
                .rfind('\n')
                .or_else(|| remaining[..chunk_len].rfind(' '))
                .map(|i| i + 1)
                .unwrap_or(chunk_len)
        } else {
            chunk_len
        };
        chunks.push(&remaining[..split_at]);
        remaining = &remaining[split_at..];
    }
    chunks
}

/// Autocomplete for the category vocabulary.
async fn autocomplete_category(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    CATEGORY_VOCABULARY
        .iter()
        .filter(|c| c.to_lowercase().contains(&partial.to_lowercase()))
        .map(|c| c.to_string())
        .collect()
}
