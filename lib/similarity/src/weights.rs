//! Per-channel feature weights
//!
//! Controls how strongly price, brand and style pull listings together.
//! Each channel of the feature vector is multiplied by its weight before
//! cosine similarity is taken, so only the ratios between weights matter.

use motomatch_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Weights applied to the price, brand and style channels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FeatureWeights {
    #[serde(default = "default_price_weight")]
    pub price_weight: f32,

    #[serde(default = "default_brand_weight")]
    pub brand_weight: f32,

    #[serde(default = "default_style_weight")]
    pub style_weight: f32,
}

fn default_price_weight() -> f32 {
    FeatureWeights::default().price_weight
}

fn default_brand_weight() -> f32 {
    FeatureWeights::default().brand_weight
}

fn default_style_weight() -> f32 {
    FeatureWeights::default().style_weight
}

/// Defaults to [`FeatureWeights::brand_emphasized`]
impl Default for FeatureWeights {
    fn default() -> Self {
        Self::brand_emphasized()
    }
}

impl FeatureWeights {
    pub fn new(price_weight: f32, brand_weight: f32, style_weight: f32) -> Self {
        Self {
            price_weight,
            brand_weight,
            style_weight,
        }
    }

    /// Every channel counts the same
    pub fn equal() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Price and style lead, brand matters half as much
    pub fn price_dominant() -> Self {
        Self::new(1.0, 0.5, 1.0)
    }

    /// Brand and style outweigh price
    pub fn brand_emphasized() -> Self {
        Self::new(1.0, 1.5, 1.5)
    }

    /// Replace individual weights, keeping the rest
    pub fn with_overrides(
        mut self,
        price_weight: Option<f32>,
        brand_weight: Option<f32>,
        style_weight: Option<f32>,
    ) -> Self {
        if let Some(w) = price_weight {
            self.price_weight = w;
        }
        if let Some(w) = brand_weight {
            self.brand_weight = w;
        }
        if let Some(w) = style_weight {
            self.style_weight = w;
        }
        self
    }

    /// Check that every weight is finite and non-negative
    pub fn validate(&self) -> Result<()> {
        for (name, weight) in [
            ("price_weight", self.price_weight),
            ("brand_weight", self.brand_weight),
            ("style_weight", self.style_weight),
        ] {
            if !weight.is_finite() {
                return Err(Error::InvalidWeights(format!("{name} must be finite, got {weight}")));
            }
            if weight < 0.0 {
                return Err(Error::InvalidWeights(format!("{name} cannot be negative, got {weight}")));
            }
        }
        Ok(())
    }

    /// Bit pattern used as a cache key component
    ///
    /// `-0.0` folds onto `0.0` so equal weights always share a key.
    pub fn key(&self) -> [u32; 3] {
        [
            canonical_bits(self.price_weight),
            canonical_bits(self.brand_weight),
            canonical_bits(self.style_weight),
        ]
    }
}

fn canonical_bits(weight: f32) -> u32 {
    if weight == 0.0 {
        0.0f32.to_bits()
    } else {
        weight.to_bits()
    }
}

/// Named weight presets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WeightPreset {
    Equal,
    PriceDominant,
    #[default]
    BrandEmphasized,
}

impl WeightPreset {
    pub fn weights(self) -> FeatureWeights {
        match self {
            WeightPreset::Equal => FeatureWeights::equal(),
            WeightPreset::PriceDominant => FeatureWeights::price_dominant(),
            WeightPreset::BrandEmphasized => FeatureWeights::brand_emphasized(),
        }
    }
}

impl From<WeightPreset> for FeatureWeights {
    fn from(preset: WeightPreset) -> Self {
        preset.weights()
    }
}

impl fmt::Display for WeightPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeightPreset::Equal => "equal",
            WeightPreset::PriceDominant => "price-dominant",
            WeightPreset::BrandEmphasized => "brand-emphasized",
        };
        f.write_str(name)
    }
}

impl FromStr for WeightPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "equal" => Ok(WeightPreset::Equal),
            "price-dominant" | "price" => Ok(WeightPreset::PriceDominant),
            "brand-emphasized" | "brand" => Ok(WeightPreset::BrandEmphasized),
            other => Err(Error::InvalidConfig(format!("unknown weight preset '{other}'"))),
        }
    }
}
