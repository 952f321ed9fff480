use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use restock_monitor::api::ShopClient;
use restock_monitor::config::{AppConfig, CONFIG_PATH};
use restock_monitor::monitor::Monitor;
use restock_monitor::notify::{DiscordWebhook, Fanout};
use restock_monitor::proxy::ProxySelector;
use restock_monitor::reporter::StdoutReporter;

#[derive(Parser)]
#[command(name = "restock-monitor", about = "Supreme shop restock monitor")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Load config
    let mut config = AppConfig::load(&args.config).with_context(|| {
        format!(
            "{} not found, run setup-monitor or copy config.toml.template first",
            args.config.display()
        )
    })?;
    config.apply_env();
    info!("Loaded config from {}", args.config.display());

    info!(
        "Starting restock monitor: shop={} monitor={}ms restock={}ms error={}ms proxies={} webhook={}",
        config.base_url(),
        config.monitor.monitor_delay_ms,
        config.monitor.restock_delay_ms,
        config.monitor.error_delay_ms,
        config.proxies.use_proxies,
        !config.discord.webhook.is_empty(),
    );

    // Proxy file problems are fatal
    let selector = ProxySelector::from_config(&config.proxies)?;
    let api = ShopClient::new(config.base_url(), selector)?;

    let mut notifier = Fanout::new().with(StdoutReporter);
    if config.discord.webhook.is_empty() {
        warn!("No webhook configured, restocks are only reported on stdout");
    } else {
        notifier = notifier.with(DiscordWebhook::new(&config.discord.webhook));
    }

    let mut monitor = Monitor::new(api, notifier, &config);

    info!("Entering monitor loop. Press Ctrl+C to stop.");
    tokio::select! {
        _ = monitor.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
