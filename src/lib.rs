pub mod api;
pub mod config;
pub mod engine;
pub mod monitor;
pub mod notify;
pub mod proxy;
pub mod reporter;
pub mod store;
pub mod types;
pub mod week;

/// Supreme shop base URL (public JSON endpoints, no auth required)
pub const SHOP_BASE_URL: &str = "https://www.supremenewyork.com";

/// Mobile Chrome user agent sent with every shop request
pub const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 8.0.0; Pixel 2 XL Build/OPD1.170816.004) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/79.0.3945.79 Mobile Safari/537.36";

/// Default footer text on restock embeds
pub const DEFAULT_WEBHOOK_FOOTER: &str = "Written by @suite";

/// Default embed accent color (#76CCC5)
pub const DEFAULT_WEBHOOK_COLOR: u32 = 7785669;

/// Env var that overrides `[discord].webhook`
pub const WEBHOOK_ENV_VAR: &str = "RESTOCK_WEBHOOK_URL";
