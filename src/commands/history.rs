use super::send_chunked;
use crate::state::Context;

/// List archived reports
#[poise::command(slash_command, guild_only)]
pub async fn history(
    ctx: Context<'_>,
    #[description = "Max reports to show"] limit: Option<u32>,
) -> Result<(), anyhow::Error> {
    let limit = limit.unwrap_or(10) as usize;
    let records = ctx.data().store.list_archive(limit).await?;

    if records.is_empty() {
        ctx.say("No reports archived yet. Use `/audit analyze` and press **Archive report**.")
            .await?;
        return Ok(());
    }

    let mut output = String::from("**Archived Reports**\n\n");
    for record in &records {
        let when = chrono::DateTime::from_timestamp(record.timestamp, 0)
            .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| record.timestamp.to_string());
        output.push_str(&format!(
            "- {} — **{}** ({}) — Score: {} — `{}`\n",
            when, record.deal_name, record.category, record.score, record.id
        ));
    }

    send_chunked(&ctx, &output).await
}
