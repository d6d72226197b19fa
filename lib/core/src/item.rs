use serde::{Deserialize, Serialize};
use std::fmt;

/// Brand assigned to listings that arrive without one
pub const DEFAULT_BRAND: &str = "其他";

/// Style assigned to listings that arrive without one
pub const DEFAULT_STYLE: &str = "通勤";

/// Store shown for listings without a location
pub const DEFAULT_STORE: &str = "全台分店";

/// Display name for listings without a model name
pub const DEFAULT_MODEL: &str = "未命名";

/// Placeholder image for listings without a picture
pub const DEFAULT_IMAGE_URL: &str = "https://cdn-icons-png.flaticon.com/512/3097/3097180.png";

/// Stable identifier of a listing within a catalog snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        ItemId(id)
    }
}

/// A used-motorcycle listing
///
/// Only `price`, `brand` and `style` take part in similarity scoring.
/// The remaining fields are carried through for presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub model: String,
    pub price: f64,
    pub brand: String,
    pub style: String,
    pub image_url: String,
    pub shop_link: String,
    pub store: String,
}

impl Item {
    /// Create a listing, coercing malformed attributes to their defaults
    pub fn new(
        id: impl Into<ItemId>,
        model: impl Into<String>,
        price: f64,
        brand: impl Into<String>,
        style: impl Into<String>,
    ) -> Self {
        let mut item = Self {
            id: id.into(),
            model: model.into(),
            price,
            brand: brand.into(),
            style: style.into(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            shop_link: String::new(),
            store: DEFAULT_STORE.to_string(),
        };
        item.sanitize();
        item
    }

    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = or_default(store.into(), DEFAULT_STORE);
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = or_default(url.into(), DEFAULT_IMAGE_URL);
        self
    }

    pub fn with_shop_link(mut self, link: impl Into<String>) -> Self {
        self.shop_link = link.into().trim().to_string();
        self
    }

    /// Re-apply ingestion coercions in place
    ///
    /// Prices become finite and non-negative, blank categorical and
    /// display fields fall back to their defaults.
    pub fn sanitize(&mut self) {
        self.price = coerce_price(self.price);
        self.brand = or_default(std::mem::take(&mut self.brand), DEFAULT_BRAND);
        self.style = or_default(std::mem::take(&mut self.style), DEFAULT_STYLE);
        self.model = or_default(std::mem::take(&mut self.model), DEFAULT_MODEL);
        self.store = or_default(std::mem::take(&mut self.store), DEFAULT_STORE);
        self.image_url = or_default(std::mem::take(&mut self.image_url), DEFAULT_IMAGE_URL);
    }

    /// Whether the model name advertises ABS brakes
    pub fn mentions_abs(&self) -> bool {
        self.model.to_ascii_uppercase().contains("ABS")
    }
}

/// Coerce a scraped price into a finite, non-negative value
#[inline]
pub fn coerce_price(price: f64) -> f64 {
    if price.is_finite() && price > 0.0 {
        price
    } else {
        0.0
    }
}

fn or_default(value: String, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}
