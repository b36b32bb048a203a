//! GDP ETL
//!
//! A one-shot pipeline that scrapes national GDP figures from an HTML table,
//! converts them to billions of USD, and stores them as CSV and SQLite.

pub mod client;
pub mod config;
pub mod error;
pub mod etl;
pub mod gdp;
pub mod journal;
pub mod storage;

// Re-exports for convenience
pub use client::HttpClient;
pub use config::{ConfigFile, EtlConfig};
pub use error::EtlError;
pub use etl::{EtlPipeline, Extractor, Loader, RunReport, Stage, Transformer};
pub use gdp::{GdpExtractor, GdpTransformer, NormalizedRecord, RawRecord};
pub use journal::{Journal, JournalPolicy};
pub use storage::{CsvWriter, Database, ResultSet, TableWriter};
