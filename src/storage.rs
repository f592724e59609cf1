//! SQLite access for the two dashboard tables.
//!
//! The viewing side opens the file read-only for each render pass and drops
//! the connection once both tables are in memory. The write side replaces
//! each table wholesale inside one transaction.

use crate::errors::StorageError;
use crate::models::{Dataset, ForecastRecord, HistoricalRecord};
use chrono::NaiveDate;
use rusqlite::{params, types::ValueRef, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

pub const DEFAULT_DB_PATH: &str = "data/demand.db";

const HISTORICAL_TABLE: &str = "ventas_historicas";
const FORECAST_TABLE: &str = "pronosticos_activos";

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS ventas_historicas (
    Fecha DATETIME,
    Producto_Descripcion TEXT,
    Cliente_Descripcion TEXT,
    Pedido_Piezas REAL
);
CREATE TABLE IF NOT EXISTS pronosticos_activos (
    Fecha_Pronostico DATETIME,
    Producto_Descripcion TEXT,
    Cliente_Descripcion TEXT,
    Cluster INTEGER,
    Pronostico_Ensemble_PedidoPiezas REAL,
    Pronostico_Min REAL,
    Pronostico_Max REAL
);
";

pub async fn load(path: PathBuf) -> Result<Dataset, StorageError> {
    spawn_blocking(move || load_dataset(&path)).await?
}

pub fn load_dataset(path: &Path) -> Result<Dataset, StorageError> {
    if !path.exists() {
        return Err(StorageError::Unavailable(format!(
            "database file {} not found",
            path.display()
        )));
    }

    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|err| StorageError::Unavailable(err.to_string()))?;

    let dataset = Dataset {
        historical: read_historical(&conn)?,
        forecasts: read_forecasts(&conn)?,
    };
    debug!(
        historical = dataset.historical.len(),
        forecasts = dataset.forecasts.len(),
        "dataset loaded"
    );

    let inverted = count_inverted_bands(&dataset.forecasts);
    if inverted > 0 {
        warn!(rows = inverted, "forecast rows with min/mean/max out of order");
    }

    Ok(dataset)
}

/// Rows breaking min <= mean <= max. They are reported, not rejected.
fn count_inverted_bands(rows: &[ForecastRecord]) -> usize {
    rows.iter().filter(|row| !band_is_ordered(row)).count()
}

fn band_is_ordered(row: &ForecastRecord) -> bool {
    match (row.forecast_min, row.forecast_mean, row.forecast_max) {
        (Some(min), Some(mean), Some(max)) => min <= mean && mean <= max,
        _ => true,
    }
}

fn read_historical(conn: &Connection) -> Result<Vec<HistoricalRecord>, StorageError> {
    let mut stmt = conn
        .prepare(
            "SELECT Fecha, Producto_Descripcion, Cliente_Descripcion, Pedido_Piezas
             FROM ventas_historicas",
        )
        .map_err(|err| missing_table(HISTORICAL_TABLE, err))?;

    let mut rows = stmt.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let Some(date) = date_column(row, 0)? else {
            warn!(table = HISTORICAL_TABLE, "skipping row with unreadable date");
            continue;
        };
        records.push(HistoricalRecord {
            date,
            product: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            client: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            quantity: row.get(3)?,
        });
    }
    Ok(records)
}

fn read_forecasts(conn: &Connection) -> Result<Vec<ForecastRecord>, StorageError> {
    let mut stmt = conn
        .prepare(
            "SELECT Fecha_Pronostico, Producto_Descripcion, Cliente_Descripcion, Cluster,
                    Pronostico_Ensemble_PedidoPiezas, Pronostico_Min, Pronostico_Max
             FROM pronosticos_activos",
        )
        .map_err(|err| missing_table(FORECAST_TABLE, err))?;

    let mut rows = stmt.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let Some(forecast_date) = date_column(row, 0)? else {
            warn!(table = FORECAST_TABLE, "skipping row with unreadable date");
            continue;
        };
        records.push(ForecastRecord {
            forecast_date,
            product: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            client: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            cluster: row.get(3)?,
            forecast_mean: row.get(4)?,
            forecast_min: row.get(5)?,
            forecast_max: row.get(6)?,
        });
    }
    Ok(records)
}

fn missing_table(table: &str, err: rusqlite::Error) -> StorageError {
    StorageError::Unavailable(format!("cannot read table {table}: {err}"))
}

fn date_column(row: &Row<'_>, idx: usize) -> Result<Option<NaiveDate>, StorageError> {
    match row.get_ref(idx)? {
        ValueRef::Text(bytes) => Ok(std::str::from_utf8(bytes).ok().and_then(parse_date)),
        _ => Ok(None),
    }
}

/// Accepts `YYYY-MM-DD` optionally followed by a time part, which is dropped.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d 00:00:00").to_string()
}

pub fn open_for_write(path: &Path) -> Result<Connection, StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(StorageError::CreateDir)?;
    }
    Ok(Connection::open(path)?)
}

pub fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(SCHEMA_SQL)?;
    info!("database tables verified");
    Ok(())
}

/// Replaces the contents of both tables. Nothing is appended or merged.
pub fn replace_tables(
    conn: &mut Connection,
    historical: &[HistoricalRecord],
    forecasts: &[ForecastRecord],
) -> Result<(), StorageError> {
    let tx = conn.transaction()?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {HISTORICAL_TABLE}; DROP TABLE IF EXISTS {FORECAST_TABLE};"
    ))?;
    tx.execute_batch(SCHEMA_SQL)?;

    {
        let mut insert = tx.prepare(
            "INSERT INTO ventas_historicas
                 (Fecha, Producto_Descripcion, Cliente_Descripcion, Pedido_Piezas)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for row in historical {
            insert.execute(params![
                format_date(row.date),
                row.product,
                row.client,
                row.quantity
            ])?;
        }

        let mut insert = tx.prepare(
            "INSERT INTO pronosticos_activos
                 (Fecha_Pronostico, Producto_Descripcion, Cliente_Descripcion, Cluster,
                  Pronostico_Ensemble_PedidoPiezas, Pronostico_Min, Pronostico_Max)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for row in forecasts {
            insert.execute(params![
                format_date(row.forecast_date),
                row.product,
                row.client,
                row.cluster,
                row.forecast_mean,
                row.forecast_min,
                row.forecast_max
            ])?;
        }
    }

    tx.commit()?;
    info!(records = historical.len(), "saved historical records");
    info!(records = forecasts.len(), "saved forecast records");
    Ok(())
}
