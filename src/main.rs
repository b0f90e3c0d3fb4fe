mod commands;
mod llm;
mod report;
mod research;
mod scrape;
mod state;
mod store;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use poise::{Framework, FrameworkOptions};
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use llm::LlmClient;
use report::ReportGenerator;
use research::search::{EvidenceSource, TavilySource, UnconfiguredSource};
use scrape::PageFetcher;
use state::{AppState, AuditConfig};
use store::AuditStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load env
    let _ = dotenv::dotenv();
    let token = dotenv::var("DISCORD_TOKEN").context("DISCORD_TOKEN required")?;
    let guild_id: Option<serenity::GuildId> = dotenv::var("DISCORD_GUILD_ID")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(serenity::GuildId::new);

    // Init storage
    let data_dir = std::path::PathBuf::from(
        dotenv::var("DATA_DIR").unwrap_or_else(|_| "./data/audit".to_string()),
    );
    let store = Arc::new(AuditStore::new(&data_dir).await?);
    info!("Audit store initialized at {:?}", data_dir);

    // Init LLM client
    let llm_client = Arc::new(LlmClient::from_env()?);
    info!(model = llm_client.model(), "LLM client initialized");

    let search: Arc<dyn EvidenceSource> = match dotenv::var("TAVILY_API_KEY") {
        Ok(key) if !key.is_empty() => Arc::new(TavilySource::new(key)?),
        _ => {
            warn!("TAVILY_API_KEY not set — reports will carry no external evidence");
            Arc::new(UnconfiguredSource)
        }
    };

    let fetcher = Arc::new(PageFetcher::new(Duration::from_secs(30))?);
    let reports = Arc::new(ReportGenerator::new(llm_client.clone()));

    // Parse admin user IDs from env
    let admin_ids: HashSet<u64> = dotenv::var("ADMIN_USER_IDS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse::<u64>().ok())
        .collect();
    if admin_ids.is_empty() {
        warn!("ADMIN_USER_IDS empty — anyone can run audits and nobody can edit rules");
    } else {
        info!(count = admin_ids.len(), "Admin users configured");
    }

    let app_state = AppState {
        store,
        llm: llm_client,
        search,
        fetcher,
        reports,
        admin_ids,
        audit_config: Arc::new(RwLock::new(AuditConfig::default())),
    };

    let intents = serenity::GatewayIntents::GUILDS | serenity::GatewayIntents::GUILD_MESSAGES;

    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: vec![commands::audit()],
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as: {} ({})", ready.user.name, ready.user.id);

                let commands = &framework.options().commands;
                info!("Registering {} top-level command(s):", commands.len());
                for cmd in commands {
                    info!("  /{} ({} subcommands)", cmd.name, cmd.subcommands.len());
                    for sub in &cmd.subcommands {
                        info!("    /{} {}", cmd.name, sub.name);
                    }
                }

                if let Some(gid) = guild_id {
                    info!("Registering to guild {} (instant)", gid);
                    poise::builtins::register_in_guild(ctx, &framework.options().commands, gid)
                        .await?;
                } else {
                    info!("Registering globally (up to 1 hour delay)");
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                }

                Ok(app_state)
            })
        })
        .build();

    info!("Starting deal auditor bot...");

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }

    Ok(())
}
