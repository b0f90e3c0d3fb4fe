use tracing::info;

use super::require_admin;
use crate::state::{ConfigParam, Context, MAX_ARCHIVE_TIMEOUT_SECS};

/// Show or change audit parameters (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn config(
    ctx: Context<'_>,
    #[description = "Parameter to show or change; omit to list all"] param: Option<ConfigParam>,
    #[description = "New value"] value: Option<u32>,
) -> Result<(), anyhow::Error> {
    if !require_admin(&ctx).await? {
        return Ok(());
    }

    let reply = match (param, value) {
        (Some(param), Some(value)) => {
            let stored = ctx.data().audit_config.write().await.set(param, value);
            info!(user = ctx.author().name, param = param.key(), stored, "Audit config changed");
            let mut reply = format!("`{}` set to {}", param.key(), stored);
            if param == ConfigParam::ArchiveTimeoutSecs && u64::from(value) != stored {
                reply.push_str(&format!(" (allowed range 1 to {})", MAX_ARCHIVE_TIMEOUT_SECS));
            }
            reply
        }
        (Some(param), None) => {
            let current = ctx.data().audit_config.read().await.get(param);
            format!("`{}`: {}", param.key(), current)
        }
        (None, _) => ctx.data().audit_config.read().await.describe(),
    };

    ctx.say(reply).await?;
    Ok(())
}
