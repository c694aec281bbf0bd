//! Emission factor table and built-in defaults
//!
//! Factors are grams CO2e per unit of activity. The built-in values come
//! from platform-specific studies and published lifecycle research; the
//! SQLite factor store can overlay any of them (see `db`).

use std::collections::BTreeMap;

/// Grams CO2e per impression for one advertising platform.
#[derive(Debug, Clone)]
pub struct PlatformFactor {
    pub key: String,
    pub name: String,
    pub grams_per_impression: f64,
}

/// Grams CO2e per asset for one asset-type category (averaged strategy).
#[derive(Debug, Clone)]
pub struct AssetTypeFactor {
    pub key: String,
    pub name: String,
    pub grams_per_asset: f64,
}

/// Grams CO2e per unit for an infrastructure or generation resource.
#[derive(Debug, Clone)]
pub struct ResourceFactor {
    pub key: String,
    pub name: String,
    pub grams_per_unit: f64,
    pub unit: String,
}

/// Resource keys used by the itemized and storage calculators.
pub const AI_IMAGE: &str = "ai-image";
pub const AI_TEXT: &str = "ai-text";
pub const AI_VIDEO: &str = "ai-video";
pub const LAPTOP: &str = "laptop";
pub const CLOUD_STORAGE: &str = "cloud-storage";

/// Flat multiplicative reduction for green cloud providers.
pub const GREEN_CLOUD_REDUCTION: f64 = 0.3;

/// Average passenger car, kg CO2e per km.
pub const KG_PER_KM_DRIVEN: f64 = 0.184;

/// Token baseline the AI text factor is expressed against.
pub const TOKEN_BASELINE: f64 = 300.0;

/// Immutable factor table, loaded once per invocation and passed by
/// reference into every calculation.
#[derive(Debug, Clone)]
pub struct FactorTable {
    pub platforms: BTreeMap<String, PlatformFactor>,
    pub asset_types: BTreeMap<String, AssetTypeFactor>,
    pub resources: BTreeMap<String, ResourceFactor>,
}

impl FactorTable {
    /// Built-in default factors.
    pub fn defaults() -> Self {
        let mut table = FactorTable {
            platforms: BTreeMap::new(),
            asset_types: BTreeMap::new(),
            resources: BTreeMap::new(),
        };

        for (key, name, grams) in [
            ("google", "Google Search", 0.2),
            ("google-display", "Google Display", 0.5),
            ("youtube", "YouTube", 0.6),
            ("meta", "Meta/Facebook", 0.5),
            ("tiktok", "TikTok", 0.3),
            ("programmatic", "Programmatic", 0.5148),
            ("bing", "Microsoft Bing", 0.2),
            ("pinterest", "Pinterest", 0.5),
            ("reddit", "Reddit", 0.5),
            ("linkedin", "LinkedIn", 0.5),
        ] {
            table.platforms.insert(
                key.to_string(),
                PlatformFactor {
                    key: key.to_string(),
                    name: name.to_string(),
                    grams_per_impression: grams,
                },
            );
        }

        for (key, name, grams) in [
            ("text", "Text", 0.5),
            ("image", "Image", 2.0),
            ("video", "Video", 8.8),
            ("mixed", "Mixed", 3.0),
            ("unsure", "Unsure", 1.0),
        ] {
            table.asset_types.insert(
                key.to_string(),
                AssetTypeFactor {
                    key: key.to_string(),
                    name: name.to_string(),
                    grams_per_asset: grams,
                },
            );
        }

        for (key, name, grams, unit) in [
            (AI_IMAGE, "AI image generation", 2.0, "g/image"),
            (AI_TEXT, "AI text generation", 0.036, "g/300 tokens"),
            (AI_VIDEO, "AI video generation", 4.4, "g/2s video"),
            (LAPTOP, "Laptop lifecycle", 9700.0, "g/laptop-month"),
            (CLOUD_STORAGE, "Cloud storage", 20.0, "g/GB-month"),
        ] {
            table.resources.insert(
                key.to_string(),
                ResourceFactor {
                    key: key.to_string(),
                    name: name.to_string(),
                    grams_per_unit: grams,
                    unit: unit.to_string(),
                },
            );
        }

        table
    }

    /// Grams per impression for a platform key, None when unrecognized.
    pub fn platform_grams(&self, key: &str) -> Option<f64> {
        self.platforms.get(key).map(|f| f.grams_per_impression)
    }

    /// Display name for a platform key, falling back to the raw key.
    pub fn platform_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.platforms.get(key).map(|f| f.name.as_str()).unwrap_or(key)
    }

    /// Grams per asset for an asset-type key, None when unrecognized.
    pub fn asset_type_grams(&self, key: &str) -> Option<f64> {
        self.asset_types.get(key).map(|f| f.grams_per_asset)
    }

    /// Grams per unit for a resource key. A missing key contributes
    /// nothing rather than failing.
    pub fn resource_grams(&self, key: &str) -> f64 {
        self.resources.get(key).map(|f| f.grams_per_unit).unwrap_or(0.0)
    }
}
