// Catalog ingestion from scraped JSON listings
use anyhow::{Context, Result};
use motomatch_core::{coerce_price, Catalog, Item};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// One scraped row, before coercion
///
/// Accepts the scraper's capitalized column names as well as lowercase ones.
/// Every field is optional and any JSON type is tolerated.
#[derive(Debug, Default, Deserialize)]
pub struct RawItem {
    #[serde(default, alias = "Model", deserialize_with = "lenient_string")]
    pub model: Option<String>,
    #[serde(default, alias = "Price")]
    pub price: Option<Value>,
    #[serde(default, alias = "Brand", deserialize_with = "lenient_string")]
    pub brand: Option<String>,
    #[serde(default, alias = "Style", deserialize_with = "lenient_string")]
    pub style: Option<String>,
    #[serde(default, alias = "Image_URL", alias = "image", deserialize_with = "lenient_string")]
    pub image_url: Option<String>,
    #[serde(default, alias = "Shop_Link", alias = "link", deserialize_with = "lenient_string")]
    pub shop_link: Option<String>,
    #[serde(default, alias = "Store", alias = "location", deserialize_with = "lenient_string")]
    pub store: Option<String>,
}

impl RawItem {
    /// Coerce into a listing with id `position`
    pub fn into_item(self, position: usize) -> Item {
        let price = self.price.as_ref().map(price_from_value).unwrap_or(0.0);
        Item::new(
            position as u64,
            self.model.unwrap_or_default(),
            price,
            self.brand.unwrap_or_default(),
            self.style.unwrap_or_default(),
        )
        .with_image_url(self.image_url.unwrap_or_default())
        .with_shop_link(self.shop_link.unwrap_or_default())
        .with_store(self.store.unwrap_or_default())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Rows(Vec<RawItem>),
    Wrapped { items: Vec<RawItem> },
}

/// Read and coerce a catalog file
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let catalog = parse_catalog(&text)
        .with_context(|| format!("failed to parse catalog {}", path.display()))?;
    info!(path = %path.display(), items = catalog.len(), "catalog loaded");
    Ok(catalog)
}

/// Coerce a JSON catalog document
///
/// Malformed fields never fail ingestion; only a document that is not a
/// list of objects does.
pub fn parse_catalog(text: &str) -> Result<Catalog> {
    let rows = match serde_json::from_str(text).context("catalog is not valid JSON")? {
        CatalogDocument::Rows(rows) => rows,
        CatalogDocument::Wrapped { items } => items,
    };

    let items: Vec<Item> = rows
        .into_iter()
        .enumerate()
        .map(|(position, raw)| raw.into_item(position))
        .collect();

    let unpriced = items.iter().filter(|item| item.price == 0.0).count();
    if unpriced > 0 {
        warn!(unpriced, "listings without a usable price were set to 0");
    }

    Ok(Catalog::new(items)?)
}

/// Price from a JSON number or a display string like "NT$ 52,000" or "5.2萬"
pub fn price_from_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => coerce_price(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => parse_price_text(s),
        _ => 0.0,
    }
}

fn parse_price_text(text: &str) -> f64 {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value = digits.parse::<f64>().unwrap_or(0.0);
    let multiplier = if text.contains('萬') { 10_000.0 } else { 1.0 };
    coerce_price(value * multiplier)
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}
