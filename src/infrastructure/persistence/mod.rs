use sqlx::{
    any::{AnyConnectOptions, AnyPoolOptions, AnyRow},
    AnyPool, ConnectOptions, Row,
};
use std::str::FromStr;
use tracing::log::LevelFilter;

use crate::domain::entities::SlotTime;
use crate::domain::errors::{DomainError, DomainResult};
use crate::shared::utils::datetime::{self, DATE_FORMAT, TIME_FORMAT};

mod bookings;
mod directory;
mod feedback;
mod slots;
mod stats;
mod users;

/// Applied on every pooled connection, not just the first one.
const SQLITE_PRAGMAS: &[&str] = &[
    "PRAGMA journal_mode = WAL",
    "PRAGMA busy_timeout = 5000",
    "PRAGMA synchronous = NORMAL",
    "PRAGMA foreign_keys = ON",
];

pub struct Database {
    pub(crate) pool: AnyPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        // Ensure drivers are installed for AnyPool
        sqlx::any::install_default_drivers();

        let connect_options = AnyConnectOptions::from_str(database_url)?
            .log_statements(LevelFilter::Info)
            .log_slow_statements(LevelFilter::Warn, std::time::Duration::from_secs(1));

        let is_sqlite = database_url.starts_with("sqlite");

        let pool = AnyPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    if is_sqlite {
                        for pragma in SQLITE_PRAGMAS {
                            sqlx::query(pragma).execute(&mut *conn).await?;
                        }
                    }
                    Ok(())
                })
            })
            .connect_with(connect_options)
            .await?;

        tracing::info!(sqlite = is_sqlite, "Database pool ready");

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("migrations/sqlite").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

/// Reads the `date` and `time` text columns of a slot row.
pub(crate) fn slot_time_from_row(row: &AnyRow) -> DomainResult<SlotTime> {
    let date: String = row.try_get("date")?;
    let time: String = row.try_get("time")?;

    let date = chrono::NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|e| DomainError::Persistence(format!("Corrupt slot date '{}': {}", date, e)))?;
    let time = chrono::NaiveTime::parse_from_str(&time, TIME_FORMAT)
        .map_err(|e| DomainError::Persistence(format!("Corrupt slot time '{}': {}", time, e)))?;

    Ok(SlotTime::new(date, time))
}

/// Maps the rows of a listing. Rows whose stored date/time cannot be read are
/// logged and left out, so one corrupt slot does not fail the whole list.
pub(crate) fn map_listing<T>(
    rows: &[AnyRow],
    map: impl Fn(&AnyRow) -> DomainResult<T>,
) -> DomainResult<Vec<T>> {
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        if let Err(e) = slot_time_from_row(row) {
            let date: String = row.try_get("date").unwrap_or_default();
            let time: String = row.try_get("time").unwrap_or_default();
            tracing::warn!(
                at = %datetime::format(&date, &time),
                error = %e,
                "Skipping row with unreadable slot date/time"
            );
            continue;
        }
        items.push(map(row)?);
    }
    Ok(items)
}

pub(crate) fn flag_from_row(row: &AnyRow, column: &str) -> DomainResult<bool> {
    Ok(row.try_get::<i64, _>(column)? != 0)
}
