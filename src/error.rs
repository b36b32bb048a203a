//! Error taxonomy for the ETL run
//!
//! Stage functions return [`eyre::Result`]; the concrete failure is always an
//! [`EtlError`] so callers can recover the category with
//! `report.downcast_ref::<EtlError>()`.

use std::path::PathBuf;

/// Every way a run can fail
#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    /// Network failure or non-2xx response while fetching the source document
    #[error("failed to fetch {url}: {message}")]
    Fetch {
        url: String,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The document has no table we can read from
    #[error("no usable table in document: {0}")]
    Structure(String),

    /// A reported GDP value is not numeric
    #[error("cannot parse {field} value {value:?} for {country}")]
    Parse {
        field: String,
        country: String,
        value: String,
        #[source]
        source: rust_decimal::Error,
    },

    /// The flat file could not be written
    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Connecting to or writing the relational store failed
    #[error("storage failure: {context}")]
    Storage {
        context: String,
        #[source]
        source: sqlx::Error,
    },

    /// The query is malformed or references a missing table
    #[error("query failed: {query}")]
    Query {
        query: String,
        #[source]
        source: sqlx::Error,
    },

    /// The audit journal could not be appended to
    #[error("failed to append to journal {}", path.display())]
    Journal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is missing or invalid
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EtlError {
    pub(crate) fn storage(context: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }
}
