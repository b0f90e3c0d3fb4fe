use tracing::{info, warn};

use super::send_chunked;
use crate::state::Context;

/// Check which models the configured LLM endpoint offers
#[poise::command(slash_command, guild_only)]
pub async fn models(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    let llm = &ctx.data().llm;
    let models = match llm.list_models().await {
        Ok(models) => models,
        Err(e) => {
            warn!(error = %e, "Model listing failed");
            ctx.say(format!(
                "Could not list models: {:#}\nCheck `LLM_BASE_URL` and `LLM_API_KEY`.",
                e
            ))
            .await?;
            return Ok(());
        }
    };

    info!(count = models.len(), "Model listing complete");

    if models.is_empty() {
        ctx.say("Connected, but the endpoint lists no models. The API key may lack access.")
            .await?;
        return Ok(());
    }

    let configured = llm.model();
    let mut output = format!("**Available models** (configured: `{}`)\n", configured);
    for model in &models {
        let marker = if model == configured { " ← in use" } else { "" };
        output.push_str(&format!("- `{}`{}\n", model, marker));
    }
    if !models.iter().any(|m| m == configured) {
        output.push_str("\nThe configured model is not in this list.");
    }

    send_chunked(&ctx, &output).await
}
