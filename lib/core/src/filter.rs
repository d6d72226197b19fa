// Listing filters used to narrow a catalog into a new snapshot
use crate::Item;
use serde::{Deserialize, Serialize};

pub trait Filter {
    fn matches(&self, item: &Item) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&Item) -> bool,
{
    fn matches(&self, item: &Item) -> bool {
        self(item)
    }
}

/// Browse filter combining the dashboard's search controls
///
/// Every populated criterion must hold. An empty filter matches all listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFilter {
    /// Case-insensitive substring of the model name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Accepted brands; empty accepts every brand
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub brands: Vec<String>,
    /// Accepted styles; empty accepts every style
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub styles: Vec<String>,
    /// Inclusive price ceiling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    /// Substring of the store / location field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Only listings whose model name mentions ABS
    #[serde(default)]
    pub require_abs: bool,
}

impl ItemFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = non_blank(keyword.into());
        self
    }

    pub fn with_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brands = brands.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_styles<I, S>(mut self, styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.styles = styles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = non_blank(location.into());
        self
    }

    pub fn with_abs(mut self, require_abs: bool) -> Self {
        self.require_abs = require_abs;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keyword.is_none()
            && self.brands.is_empty()
            && self.styles.is_empty()
            && self.max_price.is_none()
            && self.location.is_none()
            && !self.require_abs
    }
}

impl Filter for ItemFilter {
    fn matches(&self, item: &Item) -> bool {
        if let Some(keyword) = &self.keyword {
            if !item.model.to_lowercase().contains(&keyword.to_lowercase()) {
                return false;
            }
        }
        if !self.brands.is_empty() && !self.brands.iter().any(|b| b == &item.brand) {
            return false;
        }
        if !self.styles.is_empty() && !self.styles.iter().any(|s| s == &item.style) {
            return false;
        }
        if let Some(max_price) = self.max_price {
            if item.price > max_price {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !normalize_place(&item.store).contains(&normalize_place(location)) {
                return false;
            }
        }
        if self.require_abs && !item.mentions_abs() {
            return false;
        }
        true
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Fold the traditional 臺 to 台 so "臺中" matches "台中店"
pub fn normalize_place(value: &str) -> String {
    value.trim().replace('臺', "台").to_lowercase()
}
