//! SQLite storage for the normalized table
//!
//! [`Database`] wraps a pool capped at a single connection. It is opened once
//! per run and must be [closed](Database::close) on every exit path.

use crate::config::Columns;
use crate::error::EtlError;
use crate::etl::Loader;
use crate::gdp::NormalizedRecord;

use eyre::Result;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::{Path, PathBuf};

/// A single-connection handle on a SQLite database file
pub struct Database {
    pool: SqlitePool,
    path: PathBuf,
}

impl Database {
    /// Open (creating if missing) the database file
    ///
    /// # Errors
    /// Returns [`EtlError::Storage`] if the file cannot be opened.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| EtlError::storage(format!("connect to {}", path.display()), e))?;

        log::debug!("Connected to {}", path.display());
        Ok(Self { pool, path })
    }

    /// Open an existing database file without write access
    ///
    /// # Errors
    /// Returns [`EtlError::Storage`] if the file does not exist or cannot be opened.
    pub async fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(false)
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| EtlError::storage(format!("open {} read-only", path.display()), e))?;

        log::debug!("Opened {} read-only", path.display());
        Ok(Self { pool, path })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the connection
    pub async fn close(self) {
        self.pool.close().await;
        log::debug!("Closed {}", self.path.display());
    }

    /// Drop and recreate `table`, then insert `records` in order
    ///
    /// Runs in one transaction; a failure leaves the previous table intact.
    ///
    /// # Errors
    /// Returns [`EtlError::Storage`] if any statement fails.
    pub async fn replace_table(
        &self,
        table: &str,
        columns: &Columns,
        records: &[NormalizedRecord],
    ) -> Result<usize> {
        let table = quote_identifier(table);
        let country = quote_identifier(&columns.country);
        let gdp = quote_identifier(&columns.gdp);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| EtlError::storage("begin transaction", e))?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(&mut *tx)
            .await
            .map_err(|e| EtlError::storage(format!("drop table {}", table), e))?;

        sqlx::query(&format!("CREATE TABLE {} ({} TEXT, {} REAL)", table, country, gdp))
            .execute(&mut *tx)
            .await
            .map_err(|e| EtlError::storage(format!("create table {}", table), e))?;

        let insert = format!("INSERT INTO {} ({}, {}) VALUES (?, ?)", table, country, gdp);
        for record in records {
            let value = real_value(&record.gdp_usd_billion)?;

            sqlx::query(&insert)
                .bind(record.country.as_str())
                .bind(value)
                .execute(&mut *tx)
                .await
                .map_err(|e| EtlError::storage(format!("insert into {}", table), e))?;
        }

        tx.commit()
            .await
            .map_err(|e| EtlError::storage("commit transaction", e))?;

        Ok(records.len())
    }
}

fn real_value(value: &Decimal) -> Result<f64, EtlError> {
    value.to_f64().ok_or_else(|| {
        EtlError::storage(
            format!("bind {} as REAL", value),
            sqlx::Error::Encode(format!("{} is out of range for REAL", value).into()),
        )
    })
}

/// Quote an SQL identifier, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Loader that replaces one table in a [`Database`]
pub struct TableWriter<'a> {
    database: &'a Database,
    table_name: String,
    columns: Columns,
}

impl<'a> TableWriter<'a> {
    pub fn new(database: &'a Database, table_name: impl Into<String>, columns: Columns) -> Self {
        Self {
            database,
            table_name: table_name.into(),
            columns,
        }
    }
}

impl Loader for TableWriter<'_> {
    type Item = NormalizedRecord;

    async fn load(&self, items: &[Self::Item]) -> Result<usize> {
        let count = self
            .database
            .replace_table(&self.table_name, &self.columns, items)
            .await?;

        log::debug!("Loaded {} row(s) into {}", count, self.table_name);
        Ok(count)
    }
}
