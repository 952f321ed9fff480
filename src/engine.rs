use std::collections::HashSet;

use tracing::debug;

use crate::config::DiscordConfig;
use crate::types::{
    CatalogEntry, IN_STOCK, ProductDetail, RestockEvent, ShopResponse, SizeRestock, StockSnapshot,
    StyleRecord,
};

/// Flatten the catalog into one entry per product.
///
/// Products listed under several categories (e.g. "new" and their own
/// category) are kept once, at their first position.
pub fn catalog_entries(shop: &ShopResponse) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    shop.products_and_categories
        .values()
        .flatten()
        .filter(|entry| seen.insert(entry.id.clone()))
        .cloned()
        .collect()
}

/// Combine a catalog entry with its freshly fetched styles.
pub fn build_snapshot(product: CatalogEntry, detail: ProductDetail) -> StockSnapshot {
    StockSnapshot {
        product,
        styles: detail.styles,
    }
}

/// A cell restocks iff its level changed and the new level is [`IN_STOCK`].
pub fn is_restock(old_level: i64, new_level: i64) -> bool {
    old_level != new_level && new_level == IN_STOCK
}

/// Compare fresh styles against stored ones cell by cell.
///
/// Matching is positional: style `j`, size `i` in `fresh` is compared with
/// style `j`, size `i` in `stored`. This assumes the shop keeps its style and
/// size order stable between polls. Cells with no stored counterpart are
/// skipped.
pub fn detect_restocks(stored: &[StyleRecord], fresh: &[StyleRecord]) -> Vec<SizeRestock> {
    let mut restocks = Vec::new();

    for (j, fresh_style) in fresh.iter().enumerate() {
        let Some(stored_style) = stored.get(j) else {
            debug!("Style {j} ({}) not in snapshot, skipping", fresh_style.name);
            continue;
        };
        for (i, fresh_size) in fresh_style.sizes.iter().enumerate() {
            let Some(stored_size) = stored_style.sizes.get(i) else {
                debug!(
                    "Size {i} ({}) of style {} not in snapshot, skipping",
                    fresh_size.name, fresh_style.name
                );
                continue;
            };
            if is_restock(stored_size.stock_level, fresh_size.stock_level) {
                restocks.push(SizeRestock {
                    style_index: j,
                    size_index: i,
                    style: fresh_style.name.clone(),
                    size: fresh_size.name.clone(),
                    old_level: stored_size.stock_level,
                    new_level: fresh_size.stock_level,
                });
            }
        }
    }

    restocks
}

/// Product page URL.
pub fn product_url(base_url: &str, product: &CatalogEntry) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), product.detail_path())
}

/// The shop serves protocol-relative image URLs (`//assets...`).
pub fn image_url(raw: &str) -> String {
    if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        raw.to_string()
    }
}

/// Build the notification payload for one restocked size.
pub fn restock_event(
    snapshot: &StockSnapshot,
    restock: &SizeRestock,
    base_url: &str,
    discord: &DiscordConfig,
) -> RestockEvent {
    RestockEvent {
        timestamp: chrono::Utc::now().to_rfc3339(),
        product_id: snapshot.product.id.clone(),
        title: snapshot.product.name.clone(),
        url: product_url(base_url, &snapshot.product),
        color: restock.style.clone(),
        size: restock.size.clone(),
        image: image_url(&snapshot.product.image_url_hi),
        footer: discord.footer.clone(),
        accent_color: discord.color,
    }
}
