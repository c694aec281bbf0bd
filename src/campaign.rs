//! Campaign file loading
//!
//! Campaigns are JSON files describing the three input modules. This is
//! the input-collection layer: it owns coercion of out-of-range values
//! and defaults, so the calculation core can assume validated,
//! non-negative numbers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use thiserror::Error;
use walkdir::WalkDir;

use crate::models::{AssetStrategy, Campaign, StorageInputs, default_avg_tokens};

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("failed to read campaign file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid campaign file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Load and sanitize a campaign definition.
pub fn load_campaign(path: &Path) -> Result<Campaign, CampaignError> {
    let content = fs::read_to_string(path).map_err(|source| CampaignError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut campaign: Campaign =
        serde_json::from_str(&content).map_err(|source| CampaignError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if campaign.name.is_none() {
        campaign.name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(|stem| stem.to_string());
    }
    sanitize(&mut campaign);
    Ok(campaign)
}

/// Coerce out-of-range values to the documented defaults. The core never
/// sees negative numbers or a zero-month storage duration.
pub fn sanitize(campaign: &mut Campaign) {
    for entry in &mut campaign.distribution {
        if entry.budget < 0.0 {
            entry.budget = 0.0;
        }
    }

    if let Some(assets) = &mut campaign.assets {
        match &mut assets.strategy {
            AssetStrategy::Itemized(items) => {
                if items.avg_tokens <= 0.0 {
                    items.avg_tokens = default_avg_tokens();
                }
                if items.video_seconds < 0.0 {
                    items.video_seconds = 0.0;
                }
            }
            AssetStrategy::Averaged(averaged) => {
                // Repeated keys would skew the unweighted mean.
                let mut seen = Vec::new();
                averaged.asset_types.retain(|t| {
                    if seen.contains(t) {
                        false
                    } else {
                        seen.push(*t);
                        true
                    }
                });
            }
        }
        if let Some(infra) = &mut assets.infrastructure {
            sanitize_storage(infra);
        }
    }

    if let Some(storage) = &mut campaign.storage {
        sanitize_storage(storage);
    }
}

fn sanitize_storage(storage: &mut StorageInputs) {
    if storage.gigabytes < 0.0 {
        storage.gigabytes = 0.0;
    }
    if storage.months == 0 {
        storage.months = 1;
    }
    storage.usage_share_percent = storage.usage_share_percent.clamp(0.0, 100.0);
}

/// Find all campaign files (*.json) under a directory, sorted by path.
pub fn find_campaign_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
