//! Persistence for normalized records
//!
//! This module handles every output of a run:
//! - CSV flat file
//! - SQLite table, replaced wholesale
//! - Read-only queries against that table

mod csv_file;
mod query;
mod sqlite;

pub use csv_file::CsvWriter;
pub use query::{Cell, ResultSet, execute_query, print_result, run_query, run_query_to};
pub use sqlite::{Database, TableWriter, quote_identifier};
