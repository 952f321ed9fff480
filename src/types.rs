use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Stock level the shop reports for an available size.
pub const IN_STOCK: i64 = 1;

/// Scalar the shop sends either as a JSON number or a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Token {
    Number(serde_json::Number),
    Text(String),
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        match token {
            Token::Number(n) => n.to_string(),
            Token::Text(s) => s,
        }
    }
}

fn token_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Token::deserialize(deserializer).map(String::from)
}

/// Shop product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(#[serde(deserialize_with = "token_string")] pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Opaque catalog generation marker. `19` and `"19"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseWeek(#[serde(deserialize_with = "token_string")] pub String);

impl fmt::Display for ReleaseWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReleaseWeek {
    fn from(week: &str) -> Self {
        Self(week.to_string())
    }
}

/// One product as listed in `shop.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: ProductId,
    pub name: String,
    /// Protocol-relative (`//assets...`) high resolution image.
    #[serde(default)]
    pub image_url_hi: String,
}

impl CatalogEntry {
    /// Path of the product page relative to the shop base URL.
    pub fn detail_path(&self) -> String {
        format!("shop/{}", self.id)
    }
}

/// `GET /shop.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ShopResponse {
    pub release_week: ReleaseWeek,
    #[serde(default)]
    pub products_and_categories: BTreeMap<String, Vec<CatalogEntry>>,
}

/// `GET /shop/{id}.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDetail {
    #[serde(default)]
    pub styles: Vec<StyleRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRecord {
    pub name: String,
    #[serde(default)]
    pub sizes: Vec<SizeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeRecord {
    pub name: String,
    pub stock_level: i64,
}

/// Last known stock for one product. Styles and sizes keep the shop's order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub product: CatalogEntry,
    pub styles: Vec<StyleRecord>,
}

/// A single size whose stock level moved into [`IN_STOCK`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeRestock {
    pub style_index: usize,
    pub size_index: usize,
    pub style: String,
    pub size: String,
    pub old_level: i64,
    pub new_level: i64,
}

/// Restock notification payload handed to every sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestockEvent {
    pub timestamp: String,
    pub product_id: ProductId,
    pub title: String,
    pub url: String,
    pub color: String,
    pub size: String,
    pub image: String,
    pub footer: String,
    pub accent_color: u32,
}
