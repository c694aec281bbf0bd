//! Per-module calculation session
//!
//! Each module is either uncalculated (no result) or calculated (last
//! explicitly-computed result). Editing inputs never recalculates or
//! clears a shown result; stale results persist until the matching
//! calculate action runs again.

use crate::calculator;
use crate::factors::FactorTable;
use crate::models::{AssetInputs, CalculationResults, Campaign, PlatformEntry, StorageInputs};

#[derive(Debug, Clone)]
pub struct CampaignSession {
    campaign: Campaign,
    distribution_results: Option<CalculationResults>,
    asset_results: Option<CalculationResults>,
    storage_results: Option<CalculationResults>,
}

impl CampaignSession {
    pub fn new(campaign: Campaign) -> Self {
        CampaignSession {
            campaign,
            distribution_results: None,
            asset_results: None,
            storage_results: None,
        }
    }

    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    /// Replace distribution inputs without touching the shown result.
    pub fn set_distribution(&mut self, entries: Vec<PlatformEntry>) {
        self.campaign.distribution = entries;
    }

    pub fn set_assets(&mut self, assets: Option<AssetInputs>) {
        self.campaign.assets = assets;
    }

    pub fn set_storage(&mut self, storage: Option<StorageInputs>) {
        self.campaign.storage = storage;
    }

    pub fn calculate_distribution(&mut self, factors: &FactorTable) -> &CalculationResults {
        let results = calculator::calculate_distribution(&self.campaign.distribution, factors);
        self.distribution_results.insert(results)
    }

    /// Calculate the asset module. Returns None when the campaign has no
    /// asset inputs (the module stays uncalculated).
    pub fn calculate_assets(&mut self, factors: &FactorTable) -> Option<&CalculationResults> {
        let assets = self.campaign.assets.as_ref()?;
        let results = calculator::calculate_assets(assets, factors);
        Some(self.asset_results.insert(results))
    }

    pub fn calculate_storage(&mut self, factors: &FactorTable) -> Option<&CalculationResults> {
        let storage = self.campaign.storage.as_ref()?;
        let results = calculator::calculate_storage(storage, factors);
        Some(self.storage_results.insert(results))
    }

    pub fn distribution_results(&self) -> Option<&CalculationResults> {
        self.distribution_results.as_ref()
    }

    pub fn asset_results(&self) -> Option<&CalculationResults> {
        self.asset_results.as_ref()
    }

    pub fn storage_results(&self) -> Option<&CalculationResults> {
        self.storage_results.as_ref()
    }

    /// How many modules are currently in the calculated state.
    pub fn calculated_modules(&self) -> usize {
        [
            self.distribution_results.is_some(),
            self.asset_results.is_some(),
            self.storage_results.is_some(),
        ]
        .iter()
        .filter(|calculated| **calculated)
        .count()
    }

    /// Cumulative view over whichever modules have been calculated.
    /// None until at least one module is in the calculated state.
    pub fn cumulative(&self) -> Option<CalculationResults> {
        if self.calculated_modules() == 0 {
            return None;
        }
        Some(calculator::aggregate(
            self.distribution_results.as_ref(),
            self.asset_results.as_ref(),
            self.storage_results.as_ref(),
        ))
    }
}
