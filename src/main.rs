//! Campaign Carbon Calculator
//!
//! Estimates greenhouse-gas emissions for digital-marketing campaigns:
//! ad distribution, AI-generated assets, and storage/hardware usage.

mod calculator;
mod campaign;
mod db;
mod factors;
mod models;
mod report;
mod session;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::Connection;

use crate::factors::{AssetTypeFactor, FactorTable, PlatformFactor, ResourceFactor};
use crate::report::ReportSection;
use crate::session::CampaignSession;

#[derive(Parser)]
#[command(name = "carbon-calculator")]
#[command(about = "Carbon emissions calculator for digital marketing campaigns")]
struct Cli {
    /// Path to the SQLite factor store
    #[arg(short, long, default_value = "carbon_factors.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate emissions for a campaign definition file
    Calc {
        /// Path to a campaign JSON file
        campaign: PathBuf,

        /// Print the full plain-text report
        #[arg(short, long)]
        verbose: bool,

        /// Write the plain-text report to a file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Calculate every campaign file (*.json) under a directory
    Batch {
        /// Directory containing campaign files
        dir: PathBuf,
    },

    /// List platform emission factors
    ListPlatforms,

    /// List asset-type emission factors
    ListAssetTypes,

    /// List resource emission factors
    ListResources,

    /// Show details for a single factor
    Factor {
        /// Factor key (platform, asset type, or resource)
        key: String,
    },

    /// Override one emission factor in the store
    SetFactor {
        /// Which factor table the key belongs to
        #[arg(value_enum)]
        table: FactorKind,

        /// Factor key
        key: String,

        /// Grams CO2e per unit
        grams: f64,

        /// Display name (defaults to the key)
        #[arg(long)]
        name: Option<String>,

        /// Unit label, resource factors only (e.g. "g/GB-month")
        #[arg(long)]
        unit: Option<String>,
    },

    /// Initialize an empty factor store with schema
    Init,

    /// Seed the factor store with the built-in defaults
    LoadDefaults,
}

#[derive(Clone, Copy, ValueEnum)]
enum FactorKind {
    Platform,
    Asset,
    Resource,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let conn = Connection::open(&cli.database)?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Calc {
            campaign,
            verbose,
            export,
        } => {
            let factors = db::load_factor_table(&conn)?;
            run_calc(&factors, &campaign, verbose, export.as_deref())?;
        }

        Commands::Batch { dir } => {
            let factors = db::load_factor_table(&conn)?;
            run_batch(&factors, &dir)?;
        }

        Commands::ListPlatforms => {
            let factors = db::load_factor_table(&conn)?;
            println!("{:<16} {:<16} {:>22}", "Key", "Platform", "g CO2e/impression");
            println!("{}", "-".repeat(56));
            for factor in factors.platforms.values() {
                println!(
                    "{:<16} {:<16} {:>22.4}",
                    factor.key, factor.name, factor.grams_per_impression
                );
            }
        }

        Commands::ListAssetTypes => {
            let factors = db::load_factor_table(&conn)?;
            println!("{:<10} {:<10} {:>16}", "Key", "Type", "g CO2e/asset");
            println!("{}", "-".repeat(38));
            for factor in factors.asset_types.values() {
                println!(
                    "{:<10} {:<10} {:>16.2}",
                    factor.key, factor.name, factor.grams_per_asset
                );
            }
        }

        Commands::ListResources => {
            let factors = db::load_factor_table(&conn)?;
            println!("{:<16} {:<24} {:>12} {:<14}", "Key", "Resource", "g CO2e", "Unit");
            println!("{}", "-".repeat(68));
            for factor in factors.resources.values() {
                println!(
                    "{:<16} {:<24} {:>12.3} {:<14}",
                    factor.key, factor.name, factor.grams_per_unit, factor.unit
                );
            }
        }

        Commands::Factor { key } => {
            let factors = db::load_factor_table(&conn)?;
            show_factor(&factors, &key);
        }

        Commands::SetFactor {
            table,
            key,
            grams,
            name,
            unit,
        } => {
            let name = name.unwrap_or_else(|| key.clone());
            match table {
                FactorKind::Platform => {
                    db::upsert_platform_factor(
                        &conn,
                        &PlatformFactor {
                            key: key.clone(),
                            name,
                            grams_per_impression: grams,
                        },
                    )?;
                }
                FactorKind::Asset => {
                    db::upsert_asset_factor(
                        &conn,
                        &AssetTypeFactor {
                            key: key.clone(),
                            name,
                            grams_per_asset: grams,
                        },
                    )?;
                }
                FactorKind::Resource => {
                    db::upsert_resource_factor(
                        &conn,
                        &ResourceFactor {
                            key: key.clone(),
                            name,
                            grams_per_unit: grams,
                            unit: unit.unwrap_or_else(|| "g".to_string()),
                        },
                    )?;
                }
            }
            println!("Factor '{}' set to {} g CO2e", key, grams);
        }

        Commands::Init => {
            println!("Factor store initialized at: {}", cli.database.display());
        }

        Commands::LoadDefaults => {
            let count = db::seed_defaults(&conn)?;
            println!("Seeded {} default factors", count);
        }
    }

    Ok(())
}

fn run_calc(
    factors: &FactorTable,
    path: &std::path::Path,
    verbose: bool,
    export: Option<&std::path::Path>,
) -> Result<()> {
    let campaign = campaign::load_campaign(path)?;
    let name = campaign.display_name().to_string();
    let mut session = CampaignSession::new(campaign);

    if !session.campaign().distribution.is_empty() {
        session.calculate_distribution(factors);
    }
    session.calculate_assets(factors);
    session.calculate_storage(factors);

    if session.calculated_modules() == 0 {
        println!("Campaign '{}' has no inputs to calculate.", name);
        return Ok(());
    }

    let cumulative = session.cumulative();

    let mut sections = Vec::new();
    if let Some(results) = session.distribution_results() {
        sections.push(ReportSection {
            label: "Campaign Distribution",
            results,
            show_rates: true,
        });
    }
    if let Some(results) = session.asset_results() {
        sections.push(ReportSection {
            label: "Asset Creation",
            results,
            show_rates: false,
        });
    }
    if let Some(results) = session.storage_results() {
        sections.push(ReportSection {
            label: "Storage & Hardware",
            results,
            show_rates: false,
        });
    }
    // The cumulative view only adds information once several modules exist.
    if session.calculated_modules() > 1 {
        if let Some(results) = cumulative.as_ref() {
            sections.push(ReportSection {
                label: "Cumulative",
                results,
                show_rates: true,
            });
        }
    }

    for section in &sections {
        println!("=== {} ===", section.label);
        println!("{}", section.results);
    }

    if verbose {
        println!("{}", report::render_report(&name, &sections));
    }

    if let Some(export_path) = export {
        let rendered = report::render_report(&name, &sections);
        fs::write(export_path, rendered)
            .with_context(|| format!("failed to write report to {}", export_path.display()))?;
        println!("Report written to {}", export_path.display());
    }

    Ok(())
}

fn run_batch(factors: &FactorTable, dir: &std::path::Path) -> Result<()> {
    println!("Scanning {} for campaign files...", dir.display());
    let files = campaign::find_campaign_files(dir)?;
    println!("Found {} campaign files", files.len());

    let mut stats = BatchStats::default();

    for path in &files {
        match campaign::load_campaign(path) {
            Ok(campaign) => {
                let name = campaign.display_name().to_string();
                let mut session = CampaignSession::new(campaign);
                if !session.campaign().distribution.is_empty() {
                    session.calculate_distribution(factors);
                }
                session.calculate_assets(factors);
                session.calculate_storage(factors);

                let total_kg = session
                    .cumulative()
                    .map_or(0.0, |results| results.total_emissions_kg);
                let level = models::EmissionLevel::from_kg(total_kg);
                println!("  {}: {:.2} kg CO2e ({})", name, total_kg, level.label());

                stats.campaigns += 1;
                stats.total_kg += total_kg;
            }
            Err(e) => {
                eprintln!("  Error loading {}: {}", path.display(), e);
                stats.errors += 1;
            }
        }
    }

    println!("\n{}", stats);
    Ok(())
}

fn show_factor(factors: &FactorTable, key: &str) {
    if let Some(factor) = factors.platforms.get(key) {
        println!("Platform: {}", factor.name);
        println!("  Key: {}", factor.key);
        println!("  Factor: {} g CO2e per impression", factor.grams_per_impression);
    } else if let Some(factor) = factors.asset_types.get(key) {
        println!("Asset type: {}", factor.name);
        println!("  Key: {}", factor.key);
        println!("  Factor: {} g CO2e per asset", factor.grams_per_asset);
    } else if let Some(factor) = factors.resources.get(key) {
        println!("Resource: {}", factor.name);
        println!("  Key: {}", factor.key);
        println!("  Factor: {} {}", factor.grams_per_unit, factor.unit);
    } else {
        println!("Factor '{}' not found", key);
    }
}

#[derive(Debug, Default)]
struct BatchStats {
    campaigns: usize,
    errors: usize,
    total_kg: f64,
}

impl std::fmt::Display for BatchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Calculated {} campaigns ({:.2} kg CO2e combined). Errors: {}",
            self.campaigns, self.total_kg, self.errors
        )
    }
}
