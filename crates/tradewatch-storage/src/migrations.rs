//! Database schema migrations.
//!
//! Applies the initial schema: the tariffs, shipping_routes, market_data
//! and schema_migrations tables.

use rusqlite::Connection;
use tracing::info;

use tradewatch_core::error::TradewatchError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), TradewatchError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| TradewatchError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| {
            TradewatchError::Storage(format!("Failed to query migration version: {}", e))
        })?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
///
/// Dates are stored as `YYYY-MM-DD` text, `last_updated` as epoch seconds.
fn apply_v1(conn: &Connection) -> Result<(), TradewatchError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tariffs (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            country_from    TEXT NOT NULL,
            country_to      TEXT NOT NULL,
            sector          TEXT NOT NULL,
            tariff_rate     REAL NOT NULL CHECK (tariff_rate >= 0),
            effective_date  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tariffs_country_from
            ON tariffs (country_from);

        CREATE INDEX IF NOT EXISTS idx_tariffs_rate
            ON tariffs (tariff_rate DESC);

        CREATE TABLE IF NOT EXISTS shipping_routes (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            route_name          TEXT NOT NULL,
            status              TEXT NOT NULL DEFAULT 'Normal'
                                CHECK (status IN ('Normal', 'Disrupted', 'Blocked')),
            freight_cost_index  REAL NOT NULL DEFAULT 100.0,
            last_updated        INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_shipping_routes_status
            ON shipping_routes (status);

        CREATE TABLE IF NOT EXISTS market_data (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            symbol          TEXT NOT NULL,
            sector          TEXT NOT NULL,
            price_change_7d REAL NOT NULL,
            date            TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_market_data_sector
            ON market_data (sector, price_change_7d);

        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| TradewatchError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
