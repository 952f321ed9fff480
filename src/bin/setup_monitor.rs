//! setup-monitor: first-time setup for the restock monitor.
//!
//! Creates `config.toml` with defaults if it does not exist yet, optionally
//! stores the Discord webhook URL, checks the proxy list when proxies are
//! enabled, and probes the shop endpoint before writing the config back.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use url::Url;

use restock_monitor::api::{ShopApi, ShopClient};
use restock_monitor::config::{AppConfig, CONFIG_PATH};
use restock_monitor::engine::catalog_entries;
use restock_monitor::proxy::{ProxyPool, ProxySelector};

#[derive(Parser)]
#[command(
    name = "setup-monitor",
    about = "Validate settings, probe the shop, and save config.toml"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Discord webhook URL to store in the config
    #[arg(long)]
    webhook: Option<String>,

    /// Skip the live request against the shop
    #[arg(long)]
    skip_probe: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_path();

    println!("=== Restock Monitor Setup ===\n");

    // ── Step 1: Load or create config ──────────────────────────────
    let mut app_config = if config_path.exists() {
        println!("Loading {}...", config_path.display());
        AppConfig::load(config_path)?
    } else {
        println!("{} not found, starting from defaults", config_path.display());
        AppConfig::default()
    };
    println!();

    // ── Step 2: Webhook ────────────────────────────────────────────
    if let Some(webhook) = cli.webhook {
        let url = Url::parse(webhook.trim()).context("invalid webhook URL")?;
        if url.scheme() != "https" {
            bail!("webhook URL must use https, got {}", url.scheme());
        }
        app_config.discord.webhook = url.to_string();
        println!("Webhook set");
    } else if app_config.discord.webhook.is_empty() {
        println!("WARNING: No webhook configured, restocks will only be printed to stdout");
    }
    println!();

    // ── Step 3: Shop base URL ──────────────────────────────────────
    Url::parse(app_config.base_url())
        .with_context(|| format!("invalid shop base_url {}", app_config.shop.base_url))?;

    // ── Step 4: Proxies ────────────────────────────────────────────
    let selector = if app_config.proxies.use_proxies {
        println!("Reading {}...", app_config.proxies.proxy_file.display());
        let pool = ProxyPool::load(&app_config.proxies.proxy_file)?;
        println!("  Entries:        {}", pool.len());
        println!("  Distinct proxies: {}", pool.routes().len());
        println!();
        ProxySelector::with_pool(pool)
    } else {
        ProxySelector::disabled()
    };

    // ── Step 5: Probe shop ─────────────────────────────────────────
    if !cli.skip_probe {
        println!("Probing {}/shop.json...", app_config.base_url());
        let client = ShopClient::new(app_config.base_url(), selector)?;
        let start = Instant::now();
        let shop = client.shop().await.context("shop probe failed")?;
        println!("  Release week: {}", shop.release_week);
        println!("  Products:     {}", catalog_entries(&shop).len());
        println!("  Latency:      {:?}", start.elapsed());
        println!();
    }

    // ── Step 6: Save ───────────────────────────────────────────────
    println!("Writing {}...", config_path.display());
    app_config.save(config_path)?;
    println!("  Config saved");
    println!();

    println!("=== Setup Complete ===");
    println!();
    println!("Next steps:");
    println!("  cargo run --bin restock-monitor -- --config {}", config_path.display());

    Ok(())
}
