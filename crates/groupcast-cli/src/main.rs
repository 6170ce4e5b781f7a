mod cli;
mod commands;

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use groupcast_core::ports::HostBridge;
use groupcast_core::services::DispatchTiming;
use groupcast_core::GroupSession;
use groupcast_infrastructure::{HttpWebhookSender, PostgrestGroupRepository, TelegramWebApp};
use groupcast_shared::config::AppConfig;

use crate::cli::Args;
use crate::commands::CommandContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before telemetry so RUST_LOG and LOG_* apply
    dotenvy::dotenv().ok();

    // Initialize telemetry
    groupcast_shared::telemetry::init_telemetry()?;

    let args = Args::parse();

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("{} starting ({})", config.app.name, config.app.env);

    let repo = Arc::new(PostgrestGroupRepository::from_settings(&config.store)?);
    let webhook = HttpWebhookSender::from_settings(&config.webhook).map(Arc::new);
    let host = TelegramWebApp::from_settings(&config.host)?.map(Arc::new);

    let session = GroupSession::new(
        repo,
        webhook,
        host.clone().map(|h| h as Arc<dyn HostBridge>),
        DispatchTiming {
            close_delay: config.dispatch.close_delay(),
            reset_delay: config.dispatch.reset_delay(),
        },
    );

    commands::load_groups(&session).await;

    let ctx = CommandContext {
        session,
        host,
        close_delay: config.dispatch.close_delay(),
        json: args.json,
    };
    commands::run(&ctx, args.command).await
}
