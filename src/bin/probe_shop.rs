//! Probe: shop catalog and product stock endpoints
//!
//! Hits GET {base}/shop.json and GET {base}/shop/{id}.json and documents:
//! - Release week token and its JSON type
//! - Categories and product counts
//! - Style/size ordering and stock levels of one product
//! - Latency over repeated product requests

use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use clap::Parser;
use serde_json::Value;

use restock_monitor::SHOP_BASE_URL;
use restock_monitor::api::{ShopApi, ShopClient};
use restock_monitor::engine::catalog_entries;
use restock_monitor::proxy::ProxySelector;
use restock_monitor::types::{ProductId, StyleRecord};

#[derive(Parser)]
#[command(name = "probe_shop", about = "Inspect the shop catalog endpoints")]
struct Args {
    /// Shop base URL
    #[arg(long, default_value = SHOP_BASE_URL)]
    base_url: String,

    /// Product to inspect (defaults to the first catalog entry)
    #[arg(long)]
    product: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = ShopClient::new(&args.base_url, ProxySelector::disabled())?;

    println!("=== Probe: shop.json ===");
    println!("Base: {}", client.base_url());
    println!();

    // 1. Raw release week type
    println!("--- 1. Catalog ---");
    let start = Instant::now();
    let raw: Value = reqwest::get(format!("{}/shop.json", client.base_url()))
        .await?
        .json()
        .await?;
    println!("Latency: {:?}", start.elapsed());
    match raw.get("release_week") {
        Some(week) => println!("release_week: {week} ({})", json_type(week)),
        None => println!("release_week: <missing>"),
    }
    println!();

    // 2. Categories
    println!("--- 2. Categories ---");
    let shop = client.shop().await?;
    for (category, entries) in &shop.products_and_categories {
        println!("  {category}: {} products", entries.len());
    }
    let entries = catalog_entries(&shop);
    println!("Distinct products: {}", entries.len());
    println!();

    // 3. One product's stock
    let id = match args.product {
        Some(id) => ProductId::from(id.as_str()),
        None => match entries.first() {
            Some(entry) => entry.id.clone(),
            None => bail!("catalog is empty"),
        },
    };
    println!("--- 3. Stock for {id} ---");
    let detail = client.product(&id).await?;
    for (j, style) in detail.styles.iter().enumerate() {
        println!("  [{j}] {}", style.name);
        for (i, size) in style.sizes.iter().enumerate() {
            println!("      [{i}] {:<8} stock_level={}", size.name, size.stock_level);
        }
    }
    println!();

    // 4. Ordering stability and latency over 5 requests
    println!("--- 4. Ordering + latency over 5 requests ---");
    let mut latencies = Vec::new();
    let mut reordered = 0;
    for i in 0..5 {
        let start = Instant::now();
        let again = client.product(&id).await?;
        let latency = start.elapsed();
        println!("  Request {}: {:?}", i + 1, latency);
        latencies.push(latency);
        if !same_layout(&detail.styles, &again.styles) {
            reordered += 1;
        }
    }
    let avg = latencies.iter().sum::<Duration>() / latencies.len() as u32;
    println!("  Average: {:?}", avg);
    println!("  Responses with a different style/size layout: {reordered}");
    println!();

    println!("=== Probe Complete ===");
    Ok(())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Null => "null",
        _ => "other",
    }
}

fn same_layout(a: &[StyleRecord], b: &[StyleRecord]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            x.name == y.name
                && x.sizes.len() == y.sizes.len()
                && x.sizes.iter().zip(&y.sizes).all(|(s, t)| s.name == t.name)
        })
}
