//! Bulk CSV import of demo / reference data.
//!
//! Replaces the contents of all three tables with the rows found in
//! `tariffs.csv`, `shipping_routes.csv` and `market_data.csv`. The whole
//! import runs in one transaction: a bad row leaves the store untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use tradewatch_core::error::TradewatchError;
use tradewatch_core::types::{MarketRecord, RouteStatus, TariffRecord};

use crate::db::Database;
use crate::repository::{insert_market, insert_route, insert_tariff, parse_date};

pub const TARIFFS_FILE: &str = "tariffs.csv";
pub const SHIPPING_FILE: &str = "shipping_routes.csv";
pub const MARKETS_FILE: &str = "market_data.csv";

/// Row counts written by one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub tariffs: usize,
    pub shipping_routes: usize,
    pub market_rows: usize,
}

#[derive(Debug, Deserialize)]
struct TariffRow {
    country_from: String,
    country_to: String,
    sector: String,
    tariff_rate: f64,
    effective_date: String,
}

#[derive(Debug, Deserialize)]
struct ShippingRow {
    route_name: String,
    status: String,
    freight_cost_index: f64,
}

#[derive(Debug, Deserialize)]
struct MarketRow {
    symbol: String,
    sector: String,
    price_change_7d: f64,
    date: String,
}

/// Loads the three CSV files from one directory into the database.
pub struct CsvImporter {
    db: Arc<Database>,
    data_dir: PathBuf,
}

impl CsvImporter {
    pub fn new(db: Arc<Database>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            data_dir: data_dir.into(),
        }
    }

    /// Clear all tables and import every file.
    pub fn run(&self) -> Result<ImportReport, TradewatchError> {
        let tariffs = read_tariffs(&self.data_dir.join(TARIFFS_FILE))?;
        let routes = read_routes(&self.data_dir.join(SHIPPING_FILE))?;
        let markets = read_markets(&self.data_dir.join(MARKETS_FILE))?;

        let report = self.db.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| TradewatchError::Storage(format!("Begin transaction: {}", e)))?;

            tx.execute_batch(
                "DELETE FROM tariffs;
                 DELETE FROM shipping_routes;
                 DELETE FROM market_data;",
            )
            .map_err(|e| TradewatchError::Storage(format!("Failed to clear tables: {}", e)))?;
            info!("Cleared existing data");

            for t in &tariffs {
                insert_tariff(&tx, t)?;
            }
            for (name, status, index) in &routes {
                insert_route(&tx, name, *status, *index)?;
            }
            for m in &markets {
                insert_market(&tx, m)?;
            }

            tx.commit()
                .map_err(|e| TradewatchError::Storage(format!("Commit import: {}", e)))?;

            Ok(ImportReport {
                tariffs: tariffs.len(),
                shipping_routes: routes.len(),
                market_rows: markets.len(),
            })
        })?;

        info!(
            tariffs = report.tariffs,
            shipping_routes = report.shipping_routes,
            market_rows = report.market_rows,
            data_dir = %self.data_dir.display(),
            "Data import complete"
        );
        Ok(report)
    }
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, TradewatchError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| TradewatchError::Import(format!("{}: {}", path.display(), e)))
}

/// Error for a bad data row. Line numbers count the header as line 1.
fn row_error(path: &Path, line: usize, detail: impl std::fmt::Display) -> TradewatchError {
    TradewatchError::Import(format!("{} line {}: {}", path.display(), line, detail))
}

fn read_tariffs(path: &Path) -> Result<Vec<TariffRecord>, TradewatchError> {
    let mut records = Vec::new();
    for (i, row) in open(path)?.deserialize::<TariffRow>().enumerate() {
        let line = i + 2;
        let row = row.map_err(|e| row_error(path, line, e))?;
        if row.tariff_rate < 0.0 {
            return Err(row_error(path, line, "tariff_rate must be >= 0"));
        }
        records.push(TariffRecord {
            effective_date: parse_date(&row.effective_date).map_err(|e| row_error(path, line, e))?,
            country_from: row.country_from,
            country_to: row.country_to,
            sector: row.sector,
            tariff_rate: row.tariff_rate,
        });
    }
    Ok(records)
}

fn read_routes(path: &Path) -> Result<Vec<(String, RouteStatus, f64)>, TradewatchError> {
    let mut routes = Vec::new();
    for (i, row) in open(path)?.deserialize::<ShippingRow>().enumerate() {
        let line = i + 2;
        let row = row.map_err(|e| row_error(path, line, e))?;
        let status = row
            .status
            .parse::<RouteStatus>()
            .map_err(|e| row_error(path, line, e))?;
        routes.push((row.route_name, status, row.freight_cost_index));
    }
    Ok(routes)
}

fn read_markets(path: &Path) -> Result<Vec<MarketRecord>, TradewatchError> {
    let mut records = Vec::new();
    for (i, row) in open(path)?.deserialize::<MarketRow>().enumerate() {
        let line = i + 2;
        let row = row.map_err(|e| row_error(path, line, e))?;
        records.push(MarketRecord {
            date: parse_date(&row.date).map_err(|e| row_error(path, line, e))?,
            symbol: row.symbol,
            sector: row.sector,
            price_change_7d: row.price_change_7d,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::MetricsService;
    use crate::repository::{MarketRepository, ShippingRepository, TariffRepository};

    const TARIFFS: &str = "country_from,country_to,sector,tariff_rate,effective_date
China,USA,Technology,25.0,2025-02-01
China,USA,Steel,45.0,2025-03-12
Mexico,USA,Automotive,10.0,2025-03-04
";

    const ROUTES: &str = "route_name,status,freight_cost_index
Panama Canal,Disrupted,145.0
Suez Canal,Normal,100.0
";

    const MARKETS: &str = "symbol,sector,price_change_7d,date
XLK,Technology,-2.4,2025-03-10
F,Automotive,1.1,2025-03-10
";

    fn write_fixtures(dir: &Path, tariffs: &str, routes: &str, markets: &str) {
        std::fs::write(dir.join(TARIFFS_FILE), tariffs).unwrap();
        std::fs::write(dir.join(SHIPPING_FILE), routes).unwrap();
        std::fs::write(dir.join(MARKETS_FILE), markets).unwrap();
    }

    #[test]
    fn test_import_all_files() {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path(), TARIFFS, ROUTES, MARKETS);
        let db = Arc::new(Database::in_memory().unwrap());

        let report = CsvImporter::new(Arc::clone(&db), dir.path()).run().unwrap();
        assert_eq!(
            report,
            ImportReport {
                tariffs: 3,
                shipping_routes: 2,
                market_rows: 2,
            }
        );

        let metrics = MetricsService::new(Arc::clone(&db));
        assert_eq!(metrics.count_high_tariffs().unwrap(), 2);
        assert_eq!(metrics.count_disrupted_routes().unwrap(), 1);
        assert_eq!(metrics.count_declining_records().unwrap(), 1);
    }

    #[test]
    fn test_import_replaces_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path(), TARIFFS, ROUTES, MARKETS);
        let db = Arc::new(Database::in_memory().unwrap());

        let importer = CsvImporter::new(Arc::clone(&db), dir.path());
        importer.run().unwrap();
        importer.run().unwrap();

        assert_eq!(TariffRepository::new(Arc::clone(&db)).list_all().unwrap().len(), 3);
        assert_eq!(ShippingRepository::new(Arc::clone(&db)).list_all().unwrap().len(), 2);
        assert_eq!(MarketRepository::new(db).list_all().unwrap().len(), 2);
    }

    #[test]
    fn test_bad_status_aborts_without_changes() {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path(), TARIFFS, ROUTES, MARKETS);
        let db = Arc::new(Database::in_memory().unwrap());
        CsvImporter::new(Arc::clone(&db), dir.path()).run().unwrap();

        let bad_routes = "route_name,status,freight_cost_index\nRed Sea,Sunk,300\n";
        write_fixtures(dir.path(), TARIFFS, bad_routes, MARKETS);

        let err = CsvImporter::new(Arc::clone(&db), dir.path())
            .run()
            .unwrap_err();
        assert!(matches!(err, TradewatchError::Import(_)));
        assert!(err.to_string().contains("line 2"));

        // Previous import untouched.
        assert_eq!(ShippingRepository::new(db).list_all().unwrap().len(), 2);
    }

    #[test]
    fn test_bad_date_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let tariffs = "country_from,country_to,sector,tariff_rate,effective_date
China,USA,Technology,25.0,2025-02-01
China,USA,Steel,45.0,12/03/2025
";
        write_fixtures(dir.path(), tariffs, ROUTES, MARKETS);
        let db = Arc::new(Database::in_memory().unwrap());

        let err = CsvImporter::new(db, dir.path()).run().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(TARIFFS_FILE));
        assert!(msg.contains("line 3"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::in_memory().unwrap());
        let err = CsvImporter::new(db, dir.path()).run().unwrap_err();
        assert!(matches!(err, TradewatchError::Import(_)));
    }
}
