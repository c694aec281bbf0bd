//! Emissions calculation core
//!
//! Pure functions over the input records plus a loaded factor table.
//! Each call recomputes its result from scratch; nothing here holds
//! state or performs I/O.

use crate::factors::{
    self, FactorTable, GREEN_CLOUD_REDUCTION, KG_PER_KM_DRIVEN, TOKEN_BASELINE,
};
use crate::models::{
    AssetInputs, AssetStrategy, AssetType, AveragedAssets, BreakdownItem, CalculationResults,
    EmissionLevel, ItemizedAssets, PlatformEntry, StorageInputs,
};

/// Calculate distribution emissions across platform entries.
///
/// Entries with zero impressions or an unrecognized platform key are
/// skipped silently and do not count toward the impression/budget totals.
pub fn calculate_distribution(
    entries: &[PlatformEntry],
    factors: &FactorTable,
) -> CalculationResults {
    let mut breakdown = Vec::new();
    let mut total_impressions: u64 = 0;
    let mut total_budget = 0.0;

    for entry in entries {
        let Some(grams_per_impression) = factors.platform_grams(&entry.platform) else {
            continue;
        };
        if entry.impressions == 0 {
            continue;
        }

        let emissions_g = entry.impressions as f64 * grams_per_impression;
        total_impressions += entry.impressions;
        total_budget += entry.budget;

        let mut description = format!("{} impressions", entry.impressions);
        if entry.budget > 0.0 {
            description.push_str(&format!(" (${:.2})", entry.budget));
        }
        breakdown.push(BreakdownItem {
            category: factors.platform_name(&entry.platform).to_string(),
            description,
            emissions_g,
        });
    }

    let total_g: f64 = breakdown.iter().map(|i| i.emissions_g).sum();
    let per_currency = if total_budget > 0.0 {
        total_g / total_budget
    } else {
        0.0
    };
    let per_impression = if total_impressions > 0 {
        total_g / total_impressions as f64
    } else {
        0.0
    };

    results_from(breakdown, per_currency, per_impression)
}

/// Calculate asset-creation emissions using whichever strategy the input
/// carries, plus hardware/storage lines when the variant folds them into
/// this module. Budget and impression metrics do not apply here.
pub fn calculate_assets(input: &AssetInputs, factors: &FactorTable) -> CalculationResults {
    let mut breakdown = match &input.strategy {
        AssetStrategy::Itemized(items) => itemized_lines(items, factors),
        AssetStrategy::Averaged(averaged) => averaged_lines(averaged, factors),
    };

    if let Some(infra) = &input.infrastructure {
        breakdown.extend(infrastructure_lines(infra, factors));
    }

    results_from(breakdown, 0.0, 0.0)
}

/// Calculate hardware and cloud-storage emissions as a standalone module.
pub fn calculate_storage(input: &StorageInputs, factors: &FactorTable) -> CalculationResults {
    results_from(infrastructure_lines(input, factors), 0.0, 0.0)
}

/// Combine module results into one cumulative view.
///
/// Breakdowns are concatenated in module order and totals summed. The
/// per-currency and per-impression metrics only make sense for the
/// distribution module, so they are carried over from its result rather
/// than re-derived from the summed total.
pub fn aggregate(
    distribution: Option<&CalculationResults>,
    assets: Option<&CalculationResults>,
    storage: Option<&CalculationResults>,
) -> CalculationResults {
    let mut breakdown = Vec::new();
    for results in [distribution, assets, storage].into_iter().flatten() {
        breakdown.extend(results.breakdown.iter().cloned());
    }

    let per_currency = distribution.map_or(0.0, |r| r.emissions_per_currency_unit);
    let per_impression = distribution.map_or(0.0, |r| r.emissions_per_impression);

    results_from(breakdown, per_currency, per_impression)
}

fn itemized_lines(items: &ItemizedAssets, factors: &FactorTable) -> Vec<BreakdownItem> {
    let mut lines = Vec::new();

    if items.ai_images > 0 {
        lines.push(BreakdownItem {
            category: "AI Images".to_string(),
            description: format!("{} AI-generated images", items.ai_images),
            emissions_g: items.ai_images as f64 * factors.resource_grams(factors::AI_IMAGE),
        });
    }

    if items.ai_queries > 0 {
        let emissions_g = items.ai_queries as f64 * (items.avg_tokens / TOKEN_BASELINE)
            * factors.resource_grams(factors::AI_TEXT);
        lines.push(BreakdownItem {
            category: "AI Text".to_string(),
            description: format!(
                "{} queries (avg {} tokens)",
                items.ai_queries, items.avg_tokens
            ),
            emissions_g,
        });
    }

    if items.video_seconds > 0.0 {
        lines.push(BreakdownItem {
            category: "AI Video".to_string(),
            description: format!("{} seconds of AI video", items.video_seconds),
            // Factor is expressed per 2 seconds of generated footage
            emissions_g: (items.video_seconds / 2.0) * factors.resource_grams(factors::AI_VIDEO),
        });
    }

    lines
}

fn averaged_lines(averaged: &AveragedAssets, factors: &FactorTable) -> Vec<BreakdownItem> {
    if averaged.count == 0 || averaged.asset_types.is_empty() {
        return Vec::new();
    }

    let per_asset = effective_asset_factor(averaged, factors);
    let emissions_g = averaged.count as f64 * per_asset;
    if emissions_g <= 0.0 {
        return Vec::new();
    }

    let type_list: Vec<&str> = averaged.asset_types.iter().map(|t| t.key()).collect();
    vec![BreakdownItem {
        category: "AI Assets".to_string(),
        description: format!("{} assets ({})", averaged.count, type_list.join(", ")),
        emissions_g,
    }]
}

/// Effective per-asset factor for the averaged strategy.
///
/// "unsure" is a fallback that overrides any other selection; a single
/// selected type uses its own factor; several types take the unweighted
/// arithmetic mean.
fn effective_asset_factor(averaged: &AveragedAssets, factors: &FactorTable) -> f64 {
    if averaged.asset_types.iter().any(|t| *t == AssetType::Unsure) {
        return factors.asset_type_grams("unsure").unwrap_or(0.0);
    }

    let known: Vec<f64> = averaged
        .asset_types
        .iter()
        .filter_map(|t| factors.asset_type_grams(t.key()))
        .collect();
    if known.is_empty() {
        return 0.0;
    }
    known.iter().sum::<f64>() / known.len() as f64
}

/// Shared hardware/storage sub-calculation, reused by the asset module
/// and the standalone storage module.
pub fn infrastructure_lines(input: &StorageInputs, factors: &FactorTable) -> Vec<BreakdownItem> {
    let mut lines = Vec::new();

    // Usage share scales one month's allocated laptop footprint.
    let hardware_g = input.laptops as f64 * (input.usage_share_percent / 100.0)
        * factors.resource_grams(factors::LAPTOP);
    if hardware_g > 0.0 {
        lines.push(BreakdownItem {
            category: "Hardware".to_string(),
            description: format!(
                "{} laptop(s) at {}% usage",
                input.laptops, input.usage_share_percent
            ),
            emissions_g: hardware_g,
        });
    }

    let mut storage_g =
        input.gigabytes * input.months as f64 * factors.resource_grams(factors::CLOUD_STORAGE);
    if input.green_cloud {
        storage_g *= 1.0 - GREEN_CLOUD_REDUCTION;
    }
    if storage_g > 0.0 {
        let mut description = format!("{} GB for {} month(s)", input.gigabytes, input.months);
        if input.green_cloud {
            description.push_str(" (green energy)");
        }
        lines.push(BreakdownItem {
            category: "Cloud Storage".to_string(),
            description,
            emissions_g: storage_g,
        });
    }

    lines
}

/// Derive the full result record from a finished breakdown.
fn results_from(
    breakdown: Vec<BreakdownItem>,
    per_currency: f64,
    per_impression: f64,
) -> CalculationResults {
    let total_g: f64 = breakdown.iter().map(|i| i.emissions_g).sum();
    let total_kg = total_g / 1000.0;

    CalculationResults {
        total_emissions_kg: total_kg,
        emissions_per_currency_unit: per_currency,
        emissions_per_impression: per_impression,
        km_driven: total_kg / KG_PER_KM_DRIVEN,
        level: EmissionLevel::from_kg(total_kg),
        breakdown,
    }
}

impl std::fmt::Display for CalculationResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Rating: {}", self.level.label())?;
        writeln!(f, "Total:  {:.3} kg CO2e", self.total_emissions_kg)?;
        if self.emissions_per_currency_unit > 0.0 {
            writeln!(f, "Per currency unit: {:.3} g", self.emissions_per_currency_unit)?;
        }
        if self.emissions_per_impression > 0.0 {
            writeln!(f, "Per impression:    {:.3} g", self.emissions_per_impression)?;
        }
        writeln!(f, "Equivalent to {:.1} km driven", self.km_driven)?;

        if !self.breakdown.is_empty() {
            writeln!(f)?;
            writeln!(f, "Breakdown:")?;
            for item in &self.breakdown {
                writeln!(
                    f,
                    "  {:<14} {:>10.3} kg  ({})",
                    item.category,
                    item.emissions_g / 1000.0,
                    item.description
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FactorTable {
        FactorTable::defaults()
    }

    fn entry(platform: &str, impressions: u64, budget: f64) -> PlatformEntry {
        PlatformEntry {
            platform: platform.to_string(),
            impressions,
            budget,
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn distribution_contribution_is_impressions_times_factor() {
        let results = calculate_distribution(&[entry("google", 100_000, 0.0)], &table());
        assert_eq!(results.breakdown.len(), 1);
        assert_close(results.breakdown[0].emissions_g, 100_000.0 * 0.2);
        assert_close(results.total_emissions_kg, 20.0);
        assert_close(results.emissions_per_impression, 0.2);
        assert_close(results.emissions_per_currency_unit, 0.0);
    }

    #[test]
    fn distribution_skips_unknown_platforms_and_zero_impressions() {
        let entries = [
            entry("google", 1000, 50.0),
            entry("myspace", 9_999_999, 100.0),
            entry("youtube", 0, 100.0),
        ];
        let results = calculate_distribution(&entries, &table());
        assert_eq!(results.breakdown.len(), 1);
        // Skipped entries must not feed the budget or impression totals.
        assert_close(results.emissions_per_currency_unit, 200.0 / 50.0);
        assert_close(results.emissions_per_impression, 0.2);
    }

    #[test]
    fn distribution_totals_span_platforms() {
        let entries = [entry("google", 10_000, 100.0), entry("youtube", 5_000, 200.0)];
        let results = calculate_distribution(&entries, &table());
        let grams = 10_000.0 * 0.2 + 5_000.0 * 0.6;
        assert_close(results.total_emissions_kg, grams / 1000.0);
        assert_close(results.emissions_per_currency_unit, grams / 300.0);
        assert_close(results.emissions_per_impression, grams / 15_000.0);
    }

    #[test]
    fn total_kg_equals_breakdown_grams_over_1000() {
        let assets = AssetInputs {
            strategy: AssetStrategy::Itemized(ItemizedAssets {
                ai_images: 10,
                ai_queries: 25,
                avg_tokens: 600.0,
                video_seconds: 30.0,
            }),
            infrastructure: Some(StorageInputs {
                gigabytes: 100.0,
                months: 2,
                laptops: 1,
                usage_share_percent: 50.0,
                green_cloud: false,
            }),
        };
        let results = calculate_assets(&assets, &table());
        let grams: f64 = results.breakdown.iter().map(|i| i.emissions_g).sum();
        assert_close(results.total_emissions_kg, grams / 1000.0);
        assert_eq!(results.breakdown.len(), 5);
        assert_close(results.emissions_per_currency_unit, 0.0);
        assert_close(results.emissions_per_impression, 0.0);
    }

    #[test]
    fn itemized_formulas_match_factors() {
        let assets = AssetInputs {
            strategy: AssetStrategy::Itemized(ItemizedAssets {
                ai_images: 10,
                ai_queries: 25,
                avg_tokens: 600.0,
                video_seconds: 30.0,
            }),
            infrastructure: None,
        };
        let results = calculate_assets(&assets, &table());
        assert_close(results.breakdown[0].emissions_g, 10.0 * 2.0);
        assert_close(results.breakdown[1].emissions_g, 25.0 * 2.0 * 0.036);
        assert_close(results.breakdown[2].emissions_g, 15.0 * 4.4);
    }

    #[test]
    fn averaged_strategy_takes_unweighted_mean() {
        let assets = AssetInputs {
            strategy: AssetStrategy::Averaged(AveragedAssets {
                asset_types: vec![AssetType::Image, AssetType::Video],
                count: 10,
            }),
            infrastructure: None,
        };
        let results = calculate_assets(&assets, &table());
        assert_eq!(results.breakdown.len(), 1);
        // (2.0 + 8.8) / 2 = 5.4 g per asset
        assert_close(results.breakdown[0].emissions_g, 54.0);
        assert_close(results.total_emissions_kg, 0.054);
    }

    #[test]
    fn averaged_single_type_uses_its_own_factor() {
        let assets = AssetInputs {
            strategy: AssetStrategy::Averaged(AveragedAssets {
                asset_types: vec![AssetType::Text],
                count: 4,
            }),
            infrastructure: None,
        };
        let results = calculate_assets(&assets, &table());
        assert_close(results.breakdown[0].emissions_g, 2.0);
    }

    #[test]
    fn unsure_overrides_other_selections() {
        let assets = AssetInputs {
            strategy: AssetStrategy::Averaged(AveragedAssets {
                asset_types: vec![AssetType::Image, AssetType::Unsure],
                count: 10,
            }),
            infrastructure: None,
        };
        let results = calculate_assets(&assets, &table());
        assert_close(results.breakdown[0].emissions_g, 10.0);
    }

    #[test]
    fn averaged_with_no_count_or_types_produces_nothing() {
        let empty_types = AssetInputs {
            strategy: AssetStrategy::Averaged(AveragedAssets {
                asset_types: vec![],
                count: 10,
            }),
            infrastructure: None,
        };
        assert!(calculate_assets(&empty_types, &table()).breakdown.is_empty());

        let zero_count = AssetInputs {
            strategy: AssetStrategy::Averaged(AveragedAssets {
                asset_types: vec![AssetType::Image],
                count: 0,
            }),
            infrastructure: None,
        };
        assert!(calculate_assets(&zero_count, &table()).breakdown.is_empty());
    }

    #[test]
    fn green_cloud_is_a_flat_30_percent_reduction() {
        let base = StorageInputs {
            gigabytes: 100.0,
            months: 3,
            laptops: 0,
            usage_share_percent: 0.0,
            green_cloud: false,
        };
        let mut green = base.clone();
        green.green_cloud = true;

        let plain = calculate_storage(&base, &table());
        let discounted = calculate_storage(&green, &table());
        assert_close(
            discounted.breakdown[0].emissions_g,
            0.7 * plain.breakdown[0].emissions_g,
        );
        assert!(discounted.breakdown[0].description.contains("green energy"));
    }

    #[test]
    fn hardware_scales_with_usage_share() {
        let input = StorageInputs {
            gigabytes: 0.0,
            months: 1,
            laptops: 2,
            usage_share_percent: 50.0,
            green_cloud: false,
        };
        let results = calculate_storage(&input, &table());
        assert_eq!(results.breakdown.len(), 1);
        assert_close(results.breakdown[0].emissions_g, 2.0 * 0.5 * 9700.0);
    }

    #[test]
    fn zero_inputs_produce_no_breakdown_lines() {
        let input = StorageInputs {
            gigabytes: 0.0,
            months: 1,
            laptops: 0,
            usage_share_percent: 50.0,
            green_cloud: false,
        };
        let results = calculate_storage(&input, &table());
        assert!(results.breakdown.is_empty());
        assert_close(results.total_emissions_kg, 0.0);
        assert_eq!(results.level, EmissionLevel::Low);
    }

    #[test]
    fn km_equivalent_uses_average_car_factor() {
        // 18.4 kg at 0.184 kg/km is exactly 100 km.
        let results = calculate_distribution(&[entry("google", 92_000, 0.0)], &table());
        assert_close(results.total_emissions_kg, 18.4);
        assert_close(results.km_driven, 100.0);
    }

    #[test]
    fn aggregate_concatenates_and_sums() {
        let t = table();
        let distribution = calculate_distribution(&[entry("google", 100_000, 500.0)], &t);
        let assets = calculate_assets(
            &AssetInputs {
                strategy: AssetStrategy::Itemized(ItemizedAssets {
                    ai_images: 10,
                    ai_queries: 0,
                    avg_tokens: 300.0,
                    video_seconds: 0.0,
                }),
                infrastructure: None,
            },
            &t,
        );
        let storage = calculate_storage(
            &StorageInputs {
                gigabytes: 100.0,
                months: 1,
                laptops: 1,
                usage_share_percent: 50.0,
                green_cloud: false,
            },
            &t,
        );

        let cumulative = aggregate(Some(&distribution), Some(&assets), Some(&storage));
        assert_eq!(
            cumulative.breakdown.len(),
            distribution.breakdown.len() + assets.breakdown.len() + storage.breakdown.len()
        );
        assert_close(
            cumulative.total_emissions_kg,
            distribution.total_emissions_kg
                + assets.total_emissions_kg
                + storage.total_emissions_kg,
        );
        // Rate metrics carry over from distribution, not the summed total.
        assert_close(
            cumulative.emissions_per_currency_unit,
            distribution.emissions_per_currency_unit,
        );
        assert_close(
            cumulative.emissions_per_impression,
            distribution.emissions_per_impression,
        );
    }

    #[test]
    fn aggregate_without_distribution_has_zero_rates() {
        let t = table();
        let storage = calculate_storage(
            &StorageInputs {
                gigabytes: 10.0,
                months: 1,
                laptops: 0,
                usage_share_percent: 0.0,
                green_cloud: false,
            },
            &t,
        );
        let cumulative = aggregate(None, None, Some(&storage));
        assert_close(cumulative.emissions_per_currency_unit, 0.0);
        assert_close(cumulative.emissions_per_impression, 0.0);
        assert_close(cumulative.total_emissions_kg, storage.total_emissions_kg);
    }
}
