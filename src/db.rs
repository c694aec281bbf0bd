//! Factor store schema and operations
//!
//! The database holds emission-factor overrides. Loading overlays its
//! rows on the built-in defaults, so an empty store behaves exactly like
//! the defaults and a single upsert overrides one factor.

use anyhow::Result;
use rusqlite::Connection;

use crate::factors::{AssetTypeFactor, FactorTable, PlatformFactor, ResourceFactor};

/// Initialize the factor store schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Per-impression factors for ad platforms
        CREATE TABLE IF NOT EXISTS platform_factors (
            key TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            grams_per_impression REAL NOT NULL
        );

        -- Per-asset factors for the averaged asset strategy
        CREATE TABLE IF NOT EXISTS asset_factors (
            key TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            grams_per_asset REAL NOT NULL
        );

        -- Per-unit factors for generation and infrastructure resources
        CREATE TABLE IF NOT EXISTS resource_factors (
            key TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            grams_per_unit REAL NOT NULL,
            unit TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Insert or replace a platform factor
pub fn upsert_platform_factor(conn: &Connection, factor: &PlatformFactor) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO platform_factors (key, name, grams_per_impression)
         VALUES (?1, ?2, ?3)",
        (&factor.key, &factor.name, factor.grams_per_impression),
    )?;
    Ok(())
}

/// Insert or replace an asset-type factor
pub fn upsert_asset_factor(conn: &Connection, factor: &AssetTypeFactor) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO asset_factors (key, name, grams_per_asset)
         VALUES (?1, ?2, ?3)",
        (&factor.key, &factor.name, factor.grams_per_asset),
    )?;
    Ok(())
}

/// Insert or replace a resource factor
pub fn upsert_resource_factor(conn: &Connection, factor: &ResourceFactor) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO resource_factors (key, name, grams_per_unit, unit)
         VALUES (?1, ?2, ?3, ?4)",
        (&factor.key, &factor.name, factor.grams_per_unit, &factor.unit),
    )?;
    Ok(())
}

/// Clear all stored factor overrides
pub fn clear_factors(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM platform_factors;
        DELETE FROM asset_factors;
        DELETE FROM resource_factors;
        "#,
    )?;
    Ok(())
}

/// Seed the store with the built-in default factors
pub fn seed_defaults(conn: &Connection) -> Result<usize> {
    let defaults = FactorTable::defaults();
    let mut count = 0;

    for factor in defaults.platforms.values() {
        upsert_platform_factor(conn, factor)?;
        count += 1;
    }
    for factor in defaults.asset_types.values() {
        upsert_asset_factor(conn, factor)?;
        count += 1;
    }
    for factor in defaults.resources.values() {
        upsert_resource_factor(conn, factor)?;
        count += 1;
    }

    Ok(count)
}

/// Load the effective factor table: built-in defaults overlaid with
/// whatever rows exist in the store. Rows with new keys add categories.
pub fn load_factor_table(conn: &Connection) -> Result<FactorTable> {
    let mut table = FactorTable::defaults();

    let mut stmt =
        conn.prepare("SELECT key, name, grams_per_impression FROM platform_factors")?;
    let rows = stmt.query_map([], |row| {
        Ok(PlatformFactor {
            key: row.get(0)?,
            name: row.get(1)?,
            grams_per_impression: row.get(2)?,
        })
    })?;
    for row in rows {
        let factor = row?;
        table.platforms.insert(factor.key.clone(), factor);
    }

    let mut stmt = conn.prepare("SELECT key, name, grams_per_asset FROM asset_factors")?;
    let rows = stmt.query_map([], |row| {
        Ok(AssetTypeFactor {
            key: row.get(0)?,
            name: row.get(1)?,
            grams_per_asset: row.get(2)?,
        })
    })?;
    for row in rows {
        let factor = row?;
        table.asset_types.insert(factor.key.clone(), factor);
    }

    let mut stmt = conn.prepare("SELECT key, name, grams_per_unit, unit FROM resource_factors")?;
    let rows = stmt.query_map([], |row| {
        Ok(ResourceFactor {
            key: row.get(0)?,
            name: row.get(1)?,
            grams_per_unit: row.get(2)?,
            unit: row.get(3)?,
        })
    })?;
    for row in rows {
        let factor = row?;
        table.resources.insert(factor.key.clone(), factor);
    }

    Ok(table)
}
