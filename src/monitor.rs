use std::time::Duration;

use futures_util::future::join_all;
use tracing::{error, info};

use crate::api::ShopApi;
use crate::config::{AppConfig, DiscordConfig, MonitorConfig};
use crate::engine;
use crate::notify::Notifier;
use crate::store::SnapshotStore;
use crate::types::{CatalogEntry, ProductId, StockSnapshot};
use crate::week::ReleaseWeekTracker;

/// Result of a bootstrap stock fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum InitialStock {
    Loaded(StockSnapshot),
    /// The product is gone because the release week rolled over mid-load.
    ReloadRequired,
}

/// Result of a diff-mode stock fetch for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockCheck {
    Unchanged,
    /// Number of sizes that moved into stock.
    Restocked(usize),
    ReloadRequired,
}

/// Decision taken at the end of a monitor cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Quiet,
    Restocked,
    ReloadRequired,
}

/// Polling engine: owns the snapshot store and the release week baseline.
///
/// Every network call retries forever with the configured error delay, so
/// nothing here returns an error to the caller.
pub struct Monitor<A, N> {
    api: A,
    notifier: N,
    settings: MonitorConfig,
    discord: DiscordConfig,
    base_url: String,
    store: SnapshotStore,
    week: ReleaseWeekTracker,
}

impl<A: ShopApi, N: Notifier> Monitor<A, N> {
    pub fn new(api: A, notifier: N, config: &AppConfig) -> Self {
        Self {
            api,
            notifier,
            settings: config.monitor.clone(),
            discord: config.discord.clone(),
            base_url: config.base_url().to_string(),
            store: SnapshotStore::new(),
            week: ReleaseWeekTracker::new(),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn week(&self) -> &ReleaseWeekTracker {
        &self.week
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Run forever: load, monitor until a restock or week change, reload.
    pub async fn run(&mut self) {
        loop {
            self.load_catalog().await;
            info!("Monitoring...");
            loop {
                match self.run_cycle().await {
                    CycleOutcome::ReloadRequired => break,
                    CycleOutcome::Restocked => {
                        self.wait("restock", self.settings.restock_delay()).await;
                        break;
                    }
                    CycleOutcome::Quiet => {
                        self.wait("monitor", self.settings.monitor_delay()).await;
                    }
                }
            }
        }
    }

    /// Fetch the catalog and the initial stock of every product, then replace
    /// the store. Returns the number of products loaded.
    pub async fn load_catalog(&mut self) -> usize {
        if self.check_week().await {
            info!("Release week changed since the last load");
        }

        loop {
            info!("Loading products...");
            let shop = match self.api.shop().await {
                Ok(shop) => shop,
                Err(e) => {
                    error!("Error loading products: {e}");
                    tokio::time::sleep(self.settings.error_delay()).await;
                    continue;
                }
            };
            self.week.rebase(&shop.release_week);

            let entries = engine::catalog_entries(&shop);
            let results = join_all(
                entries
                    .into_iter()
                    .map(|entry| self.fetch_initial_stock(entry)),
            )
            .await;

            let mut snapshots = Vec::with_capacity(results.len());
            let mut stale = false;
            for result in results {
                match result {
                    InitialStock::Loaded(snapshot) => snapshots.push(snapshot),
                    InitialStock::ReloadRequired => stale = true,
                }
            }
            if stale {
                info!("New week detected. Loading new products...");
                continue;
            }

            self.store.replace_all(snapshots);
            info!(
                "Loaded {} products ({} sizes) for week {}",
                self.store.len(),
                self.store.cell_count(),
                shop.release_week
            );
            return self.store.len();
        }
    }

    /// Bootstrap fetch: build a snapshot without comparing or notifying.
    pub async fn fetch_initial_stock(&self, entry: CatalogEntry) -> InitialStock {
        loop {
            match self.api.product(&entry.id).await {
                Ok(detail) => return InitialStock::Loaded(engine::build_snapshot(entry, detail)),
                Err(e) => {
                    if e.is_not_found() && self.check_week().await {
                        return InitialStock::ReloadRequired;
                    }
                    error!("Error fetching stock for {} ({}): {e}", entry.name, entry.id);
                    tokio::time::sleep(self.settings.error_delay()).await;
                }
            }
        }
    }

    /// Diff fetch: compare fresh stock against the stored snapshot and notify
    /// once per size that came back in stock. The store is not updated.
    pub async fn check_stock(&self, id: &ProductId) -> StockCheck {
        let Some(snapshot) = self.store.get(id) else {
            return StockCheck::Unchanged;
        };

        loop {
            match self.api.product(id).await {
                Ok(detail) => {
                    let restocks = engine::detect_restocks(&snapshot.styles, &detail.styles);
                    for restock in &restocks {
                        info!(
                            "Restock!: {} - {} / {}",
                            snapshot.product.name, restock.style, restock.size
                        );
                        let event =
                            engine::restock_event(snapshot, restock, &self.base_url, &self.discord);
                        self.notifier.notify(&event).await;
                    }
                    return if restocks.is_empty() {
                        StockCheck::Unchanged
                    } else {
                        StockCheck::Restocked(restocks.len())
                    };
                }
                Err(e) => {
                    if e.is_not_found() && self.check_week().await {
                        info!("New week detected. Loading new products...");
                        return StockCheck::ReloadRequired;
                    }
                    error!("Error fetching stock for {}: {e}", snapshot.product.name);
                    tokio::time::sleep(self.settings.error_delay()).await;
                }
            }
        }
    }

    /// Whether the shop's release week differs from the baseline. The first
    /// call records the baseline and returns `false`.
    pub async fn check_week(&self) -> bool {
        loop {
            match self.api.shop().await {
                Ok(shop) => return self.week.observe(&shop.release_week),
                Err(e) => {
                    error!("Error checking week: {e}");
                    tokio::time::sleep(self.settings.error_delay()).await;
                }
            }
        }
    }

    /// One monitor cycle: diff every known product concurrently, then decide.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let ids = self.store.ids();
        if ids.is_empty() {
            // No product can 404, so poll the week directly.
            return if self.check_week().await {
                info!("New week detected. Loading new products...");
                CycleOutcome::ReloadRequired
            } else {
                CycleOutcome::Quiet
            };
        }

        let checks = join_all(ids.iter().map(|id| self.check_stock(id))).await;

        if checks.contains(&StockCheck::ReloadRequired) {
            CycleOutcome::ReloadRequired
        } else if checks
            .iter()
            .any(|check| matches!(check, StockCheck::Restocked(_)))
        {
            CycleOutcome::Restocked
        } else {
            CycleOutcome::Quiet
        }
    }

    async fn wait(&self, label: &str, delay: Duration) {
        info!("Waiting {label} delay... {}ms", delay.as_millis());
        tokio::time::sleep(delay).await;
    }
}
