use smtpd_rs::config::Config;
use smtpd_rs::SmtpServer;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(Path::new(&path))?,
        None if Path::new("config.toml").exists() => Config::from_file("config.toml")?,
        None => Config::default(),
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("smtpd_rs={}", config.logging.level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }

    info!("Starting smtpd-rs v{}", env!("CARGO_PKG_VERSION"));
    info!("  Hostname: {}", config.server.hostname);
    info!("  Users: {}, lists: {}", config.users.len(), config.lists.len());

    let server = SmtpServer::listen_with_config(&config).await?;
    info!("SMTP listening on {}", server.local_addr());

    server
        .handle(|message| {
            info!(
                sender = %message.sender,
                recipients = ?message.recipients,
                bytes = message.data.len(),
                "Message received"
            );
        })
        .await;

    let config = Arc::new(config);
    let users = Arc::clone(&config);
    server.verify(move |arg| users.find_user(arg)).await;
    let lists = Arc::clone(&config);
    server.expand(move |arg| lists.list_members(arg)).await;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    server.close().await?;

    Ok(())
}
