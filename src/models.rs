//! Data models for campaign inputs and calculation results

use serde::{Deserialize, Serialize};

/// One advertising platform line in the distribution module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEntry {
    pub platform: String,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub budget: f64,
}

/// AI asset-type categories used by the averaged strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Text,
    Image,
    Video,
    Mixed,
    Unsure,
}

impl AssetType {
    /// Key into the asset-type factor table.
    pub fn key(&self) -> &'static str {
        match self {
            AssetType::Text => "text",
            AssetType::Image => "image",
            AssetType::Video => "video",
            AssetType::Mixed => "mixed",
            AssetType::Unsure => "unsure",
        }
    }
}

/// Itemized asset counts (images / text queries / video seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemizedAssets {
    #[serde(default)]
    pub ai_images: u64,
    #[serde(default)]
    pub ai_queries: u64,
    #[serde(default = "default_avg_tokens")]
    pub avg_tokens: f64,
    #[serde(default)]
    pub video_seconds: f64,
}

pub fn default_avg_tokens() -> f64 {
    300.0
}

/// Generic asset count averaged across the selected types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AveragedAssets {
    #[serde(default)]
    pub asset_types: Vec<AssetType>,
    #[serde(default)]
    pub count: u64,
}

/// The two asset-input shapes the product variants use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStrategy {
    Itemized(ItemizedAssets),
    Averaged(AveragedAssets),
}

/// Asset module input. One variant folds hardware/storage into this
/// module, the other keeps it separate; both are accepted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetInputs {
    pub strategy: AssetStrategy,
    #[serde(default)]
    pub infrastructure: Option<StorageInputs>,
}

/// Hardware and cloud-storage inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageInputs {
    #[serde(default)]
    pub gigabytes: f64,
    #[serde(default = "default_months")]
    pub months: u32,
    #[serde(default = "default_laptops")]
    pub laptops: u32,
    #[serde(default = "default_usage_share")]
    pub usage_share_percent: f64,
    #[serde(default)]
    pub green_cloud: bool,
}

pub fn default_months() -> u32 {
    1
}

pub fn default_laptops() -> u32 {
    1
}

pub fn default_usage_share() -> f64 {
    50.0
}

/// Top-level campaign definition, the on-disk JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub distribution: Vec<PlatformEntry>,
    #[serde(default)]
    pub assets: Option<AssetInputs>,
    #[serde(default)]
    pub storage: Option<StorageInputs>,
}

impl Campaign {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Campaign")
    }
}

/// One line item attributing part of the total to an activity category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownItem {
    pub category: String,
    pub description: String,
    pub emissions_g: f64,
}

/// Severity bucket for total emissions in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmissionLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl EmissionLevel {
    /// Bucket a total in kg. Intervals are half-open: 100 kg is already
    /// medium, 500 kg is already high, 2000 kg is already very-high.
    pub fn from_kg(total_kg: f64) -> Self {
        if total_kg < 100.0 {
            EmissionLevel::Low
        } else if total_kg < 500.0 {
            EmissionLevel::Medium
        } else if total_kg < 2000.0 {
            EmissionLevel::High
        } else {
            EmissionLevel::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmissionLevel::Low => "Low Emissions",
            EmissionLevel::Medium => "Moderate Emissions",
            EmissionLevel::High => "High Emissions",
            EmissionLevel::VeryHigh => "Very High Emissions",
        }
    }
}

impl std::fmt::Display for EmissionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EmissionLevel::Low => "low",
            EmissionLevel::Medium => "medium",
            EmissionLevel::High => "high",
            EmissionLevel::VeryHigh => "very-high",
        };
        write!(f, "{}", s)
    }
}

/// Result of one module calculation (or the cumulative aggregate).
/// Recomputed fresh on every invocation, never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResults {
    pub total_emissions_kg: f64,
    pub emissions_per_currency_unit: f64,
    pub emissions_per_impression: f64,
    pub km_driven: f64,
    pub level: EmissionLevel,
    pub breakdown: Vec<BreakdownItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_boundaries_are_half_open() {
        assert_eq!(EmissionLevel::from_kg(0.0), EmissionLevel::Low);
        assert_eq!(EmissionLevel::from_kg(99.99), EmissionLevel::Low);
        assert_eq!(EmissionLevel::from_kg(100.0), EmissionLevel::Medium);
        assert_eq!(EmissionLevel::from_kg(499.99), EmissionLevel::Medium);
        assert_eq!(EmissionLevel::from_kg(500.0), EmissionLevel::High);
        assert_eq!(EmissionLevel::from_kg(1999.99), EmissionLevel::High);
        assert_eq!(EmissionLevel::from_kg(2000.0), EmissionLevel::VeryHigh);
    }

    #[test]
    fn campaign_deserializes_with_defaults() {
        let json = r#"{
            "name": "spring-launch",
            "distribution": [{ "platform": "google", "impressions": 1000 }],
            "storage": { "gigabytes": 50 }
        }"#;
        let campaign: Campaign = serde_json::from_str(json).unwrap();
        assert_eq!(campaign.distribution.len(), 1);
        assert_eq!(campaign.distribution[0].budget, 0.0);

        let storage = campaign.storage.unwrap();
        assert_eq!(storage.months, 1);
        assert_eq!(storage.laptops, 1);
        assert_eq!(storage.usage_share_percent, 50.0);
        assert!(!storage.green_cloud);
    }

    #[test]
    fn itemized_assets_default_token_length() {
        let json = r#"{ "strategy": { "itemized": { "ai_queries": 25 } } }"#;
        let assets: AssetInputs = serde_json::from_str(json).unwrap();
        match assets.strategy {
            AssetStrategy::Itemized(items) => {
                assert_eq!(items.avg_tokens, 300.0);
                assert_eq!(items.ai_images, 0);
            }
            _ => panic!("expected itemized strategy"),
        }
    }
}
