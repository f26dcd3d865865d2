//! Repository implementations for SQLite-backed persistence.
//!
//! Provides TariffRepository, ShippingRepository and MarketRepository
//! that operate on the Database struct using raw SQL. The `insert_*`
//! functions take a bare connection so the CSV importer can reuse them
//! inside a transaction.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use rusqlite::Connection;

use tradewatch_core::error::TradewatchError;
use tradewatch_core::types::{MarketRecord, RouteStatus, ShippingRoute, TariffRecord};

use crate::db::Database;

const DATE_FORMAT: &str = "%Y-%m-%d";

const TARIFF_COLUMNS: &str = "country_from, country_to, sector, tariff_rate, effective_date";
const ROUTE_COLUMNS: &str = "route_name, status, freight_cost_index, last_updated";
const MARKET_COLUMNS: &str = "symbol, sector, price_change_7d, date";

// =============================================================================
// Tariffs
// =============================================================================

/// Repository for tariff records.
pub struct TariffRepository {
    db: Arc<Database>,
}

impl TariffRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a new tariff record.
    pub fn save(&self, record: &TariffRecord) -> Result<(), TradewatchError> {
        self.db.with_conn(|conn| insert_tariff(conn, record))
    }

    /// All tariffs, newest effective date first, then highest rate.
    pub fn list_all(&self) -> Result<Vec<TariffRecord>, TradewatchError> {
        self.query(
            &format!(
                "SELECT {} FROM tariffs ORDER BY effective_date DESC, tariff_rate DESC, id ASC",
                TARIFF_COLUMNS
            ),
            &[],
        )
    }

    /// Tariffs whose exporting country equals `country`, ignoring ASCII case.
    pub fn find_by_exporter_ignore_case(
        &self,
        country: &str,
    ) -> Result<Vec<TariffRecord>, TradewatchError> {
        self.query(
            &format!(
                "SELECT {} FROM tariffs WHERE country_from = ?1 COLLATE NOCASE
                 ORDER BY effective_date DESC, tariff_rate DESC, id ASC",
                TARIFF_COLUMNS
            ),
            &[&country],
        )
    }

    /// Tariffs whose exporting country equals `country` exactly.
    pub fn find_by_exporter(&self, country: &str) -> Result<Vec<TariffRecord>, TradewatchError> {
        self.query(
            &format!(
                "SELECT {} FROM tariffs WHERE country_from = ?1
                 ORDER BY effective_date DESC, tariff_rate DESC, id ASC",
                TARIFF_COLUMNS
            ),
            &[&country],
        )
    }

    /// The `limit` highest tariffs.
    pub fn top_by_rate(&self, limit: u64) -> Result<Vec<TariffRecord>, TradewatchError> {
        self.query(
            &format!(
                "SELECT {} FROM tariffs ORDER BY tariff_rate DESC, id ASC LIMIT ?1",
                TARIFF_COLUMNS
            ),
            &[&(limit as i64)],
        )
    }

    fn query(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<TariffRecord>, TradewatchError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| TradewatchError::Storage(format!("Tariff query prepare: {}", e)))?;

            let rows = stmt
                .query_map(params, |row| Ok(row_to_tariff(row)))
                .map_err(|e| TradewatchError::Storage(format!("Tariff query: {}", e)))?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row.map_err(|e| TradewatchError::Storage(e.to_string()))??);
            }
            Ok(records)
        })
    }
}

/// Insert one tariff row on an existing connection.
pub fn insert_tariff(conn: &Connection, record: &TariffRecord) -> Result<(), TradewatchError> {
    conn.execute(
        &format!(
            "INSERT INTO tariffs ({}) VALUES (?1, ?2, ?3, ?4, ?5)",
            TARIFF_COLUMNS
        ),
        rusqlite::params![
            record.country_from,
            record.country_to,
            record.sector,
            record.tariff_rate,
            record.effective_date.format(DATE_FORMAT).to_string(),
        ],
    )
    .map_err(|e| TradewatchError::Storage(format!("Failed to save tariff: {}", e)))?;
    Ok(())
}

fn row_to_tariff(row: &rusqlite::Row<'_>) -> Result<TariffRecord, TradewatchError> {
    let effective_date: String = get(row, 4)?;
    Ok(TariffRecord {
        country_from: get(row, 0)?,
        country_to: get(row, 1)?,
        sector: get(row, 2)?,
        tariff_rate: get(row, 3)?,
        effective_date: parse_date(&effective_date)?,
    })
}

// =============================================================================
// Shipping routes
// =============================================================================

/// Repository for shipping routes.
pub struct ShippingRepository {
    db: Arc<Database>,
}

impl ShippingRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a new route. `last_updated` is stamped by the store.
    pub fn save(
        &self,
        route_name: &str,
        status: RouteStatus,
        freight_cost_index: f64,
    ) -> Result<(), TradewatchError> {
        self.db
            .with_conn(|conn| insert_route(conn, route_name, status, freight_cost_index))
    }

    /// All routes ordered by name.
    pub fn list_all(&self) -> Result<Vec<ShippingRoute>, TradewatchError> {
        self.query(
            &format!(
                "SELECT {} FROM shipping_routes ORDER BY route_name ASC, id ASC",
                ROUTE_COLUMNS
            ),
            &[],
        )
    }

    /// Routes in the given status, ordered by name.
    pub fn find_by_status(&self, status: RouteStatus) -> Result<Vec<ShippingRoute>, TradewatchError> {
        self.query(
            &format!(
                "SELECT {} FROM shipping_routes WHERE status = ?1 ORDER BY route_name ASC, id ASC",
                ROUTE_COLUMNS
            ),
            &[&status.as_str()],
        )
    }

    fn query(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<ShippingRoute>, TradewatchError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| TradewatchError::Storage(format!("Route query prepare: {}", e)))?;

            let rows = stmt
                .query_map(params, |row| Ok(row_to_route(row)))
                .map_err(|e| TradewatchError::Storage(format!("Route query: {}", e)))?;

            let mut routes = Vec::new();
            for row in rows {
                routes.push(row.map_err(|e| TradewatchError::Storage(e.to_string()))??);
            }
            Ok(routes)
        })
    }
}

/// Insert one route row on an existing connection.
pub fn insert_route(
    conn: &Connection,
    route_name: &str,
    status: RouteStatus,
    freight_cost_index: f64,
) -> Result<(), TradewatchError> {
    conn.execute(
        &format!(
            "INSERT INTO shipping_routes ({}) VALUES (?1, ?2, ?3, ?4)",
            ROUTE_COLUMNS
        ),
        rusqlite::params![
            route_name,
            status.as_str(),
            freight_cost_index,
            Utc::now().timestamp(),
        ],
    )
    .map_err(|e| TradewatchError::Storage(format!("Failed to save route: {}", e)))?;
    Ok(())
}

fn row_to_route(row: &rusqlite::Row<'_>) -> Result<ShippingRoute, TradewatchError> {
    let status: String = get(row, 1)?;
    let last_updated: i64 = get(row, 3)?;
    Ok(ShippingRoute {
        route_name: get(row, 0)?,
        status: status
            .parse::<RouteStatus>()
            .map_err(|e: TradewatchError| TradewatchError::Storage(e.to_string()))?,
        freight_cost_index: get(row, 2)?,
        last_updated: Utc
            .timestamp_opt(last_updated, 0)
            .single()
            .unwrap_or_default(),
    })
}

// =============================================================================
// Market data
// =============================================================================

/// Repository for market performance rows.
pub struct MarketRepository {
    db: Arc<Database>,
}

impl MarketRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn save(&self, record: &MarketRecord) -> Result<(), TradewatchError> {
        self.db.with_conn(|conn| insert_market(conn, record))
    }

    /// All rows, newest date first, then by symbol.
    pub fn list_all(&self) -> Result<Vec<MarketRecord>, TradewatchError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM market_data ORDER BY date DESC, symbol ASC, id ASC",
                    MARKET_COLUMNS
                ))
                .map_err(|e| TradewatchError::Storage(format!("Market query prepare: {}", e)))?;

            let rows = stmt
                .query_map([], |row| Ok(row_to_market(row)))
                .map_err(|e| TradewatchError::Storage(format!("Market query: {}", e)))?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row.map_err(|e| TradewatchError::Storage(e.to_string()))??);
            }
            Ok(records)
        })
    }
}

/// Insert one market row on an existing connection.
pub fn insert_market(conn: &Connection, record: &MarketRecord) -> Result<(), TradewatchError> {
    conn.execute(
        &format!(
            "INSERT INTO market_data ({}) VALUES (?1, ?2, ?3, ?4)",
            MARKET_COLUMNS
        ),
        rusqlite::params![
            record.symbol,
            record.sector,
            record.price_change_7d,
            record.date.format(DATE_FORMAT).to_string(),
        ],
    )
    .map_err(|e| TradewatchError::Storage(format!("Failed to save market row: {}", e)))?;
    Ok(())
}

fn row_to_market(row: &rusqlite::Row<'_>) -> Result<MarketRecord, TradewatchError> {
    let date: String = get(row, 3)?;
    Ok(MarketRecord {
        symbol: get(row, 0)?,
        sector: get(row, 1)?,
        price_change_7d: get(row, 2)?,
        date: parse_date(&date)?,
    })
}

// =============================================================================
// Helpers
// =============================================================================

fn get<T: rusqlite::types::FromSql>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> Result<T, TradewatchError> {
    row.get(idx)
        .map_err(|e| TradewatchError::Storage(e.to_string()))
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, TradewatchError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| TradewatchError::Storage(format!("Invalid date '{}': {}", s, e)))
}
