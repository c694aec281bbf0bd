//! Plain-text result reports
//!
//! The export format is a collaborator contract: total, per-unit metrics,
//! km equivalence, then one line per breakdown item, followed by the
//! fixed assumptions block.

use crate::models::{CalculationResults, EmissionLevel};

/// One titled block of the report.
pub struct ReportSection<'a> {
    pub label: &'a str,
    pub results: &'a CalculationResults,
    /// Per-currency and per-impression lines only make sense where a
    /// budget/impression context exists (distribution, cumulative).
    pub show_rates: bool,
}

/// Real-world comparison for a calculated total.
#[derive(Debug)]
pub struct Equivalency {
    pub text: String,
    pub detail: String,
}

/// Pick a tangible comparison for the given result.
pub fn equivalency(results: &CalculationResults) -> Equivalency {
    let kg = results.total_emissions_kg;
    match results.level {
        EmissionLevel::Low => Equivalency {
            text: "One-way flight London to Paris".to_string(),
            detail: format!("{:.1} kg CO2e (< 100 kg threshold)", kg),
        },
        EmissionLevel::Medium => Equivalency {
            text: "Round-trip flight London to Rome".to_string(),
            detail: format!("{:.1} kg CO2e (100-500 kg range)", kg),
        },
        EmissionLevel::High => Equivalency {
            // 145 kg is roughly a month of typical driving
            text: format!("{:.0} days of typical driving", kg / 145.0 * 30.0),
            detail: format!("{:.1} kg CO2e (500-2,000 kg range)", kg),
        },
        EmissionLevel::VeryHigh => Equivalency {
            text: "Round-trip transatlantic flight".to_string(),
            detail: format!("{:.1} kg CO2e (> 2,000 kg)", kg),
        },
    }
}

/// Render the full export report for a campaign.
pub fn render_report(campaign_name: &str, sections: &[ReportSection<'_>]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Digital Marketing Carbon Calculator Results - {}\n",
        campaign_name
    ));
    out.push_str("==========================================\n");

    for section in sections {
        out.push('\n');
        out.push_str(&render_section(section));
    }

    out.push('\n');
    out.push_str("Calculation Assumptions:\n");
    out.push_str(
        "- Platform emissions based on energy consumption of data centers and network infrastructure\n",
    );
    out.push_str("- AI content includes GPU compute, model training allocation, and cooling systems\n");
    out.push_str("- Cloud storage accounts for data center energy, redundancy, and cooling\n");
    out.push_str("- Hardware includes lifecycle emissions of laptops allocated based on usage\n");

    out
}

fn render_section(section: &ReportSection<'_>) -> String {
    let results = section.results;
    let mut out = String::new();

    out.push_str(&format!("{} ({})\n", section.label, results.level.label()));
    out.push_str(&format!(
        "Total Emissions: {:.2} kg CO2e\n",
        results.total_emissions_kg
    ));
    if section.show_rates {
        out.push_str(&format!(
            "Emissions per Dollar: {:.2} g/$\n",
            results.emissions_per_currency_unit
        ));
        out.push_str(&format!(
            "Emissions per Impression: {:.2} g\n",
            results.emissions_per_impression
        ));
    }
    out.push_str(&format!("Equivalent to: {:.1} km driven\n", results.km_driven));

    let eq = equivalency(results);
    out.push_str(&format!("Comparable to: {} ({})\n", eq.text, eq.detail));

    if !results.breakdown.is_empty() {
        out.push_str("Breakdown:\n");
        for item in &results.breakdown {
            out.push_str(&format!(
                "- {}: {:.3} kg CO2e ({})\n",
                item.category,
                item.emissions_g / 1000.0,
                item.description
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::calculate_distribution;
    use crate::factors::FactorTable;
    use crate::models::PlatformEntry;

    fn results_for(impressions: u64) -> CalculationResults {
        calculate_distribution(
            &[PlatformEntry {
                platform: "google".to_string(),
                impressions,
                budget: 100.0,
            }],
            &FactorTable::defaults(),
        )
    }

    #[test]
    fn equivalency_follows_the_level() {
        // 100k impressions on google is 20 kg: low.
        let low = equivalency(&results_for(100_000));
        assert!(low.text.contains("London to Paris"));

        // 1M impressions is 200 kg: medium.
        let medium = equivalency(&results_for(1_000_000));
        assert!(medium.text.contains("London to Rome"));

        // 5M impressions is 1000 kg: high, expressed in driving days.
        let high = equivalency(&results_for(5_000_000));
        assert!(high.text.contains("days of typical driving"));

        // 15M impressions is 3000 kg: very high.
        let very_high = equivalency(&results_for(15_000_000));
        assert!(very_high.text.contains("transatlantic"));
    }

    #[test]
    fn report_contains_totals_and_breakdown_lines() {
        let results = results_for(100_000);
        let report = render_report(
            "spring-launch",
            &[ReportSection {
                label: "Campaign Distribution",
                results: &results,
                show_rates: true,
            }],
        );

        assert!(report.contains("spring-launch"));
        assert!(report.contains("Total Emissions: 20.00 kg CO2e"));
        assert!(report.contains("Emissions per Dollar:"));
        assert!(report.contains("- Google Search: 20.000 kg CO2e"));
        assert!(report.contains("Calculation Assumptions:"));
    }

    #[test]
    fn rates_are_omitted_for_rateless_sections() {
        let results = results_for(100_000);
        let report = render_report(
            "x",
            &[ReportSection {
                label: "Asset Creation",
                results: &results,
                show_rates: false,
            }],
        );
        assert!(!report.contains("Emissions per Dollar"));
        assert!(!report.contains("Emissions per Impression"));
    }
}
