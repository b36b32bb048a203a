//! Read-only queries against the persisted table

use super::sqlite::Database;
use crate::error::EtlError;

use eyre::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Executor, Row, Statement, TypeInfo, ValueRef};
use std::fmt;
use std::io::Write;

/// A single value in a result row
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(value) => Some(*value),
            Self::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Real(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Real(value) => write!(f, "{}", value),
            Self::Text(value) => write!(f, "{}", value),
            Self::Blob(value) => write!(f, "<{} bytes>", value.len()),
        }
    }
}

/// Columns and rows returned by a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, matched case-insensitively like SQLite does
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    /// Every value of one column, in row order
    pub fn column(&self, name: &str) -> Vec<&Cell> {
        match self.column_index(name) {
            Some(index) => self.rows.iter().filter_map(|row| row.get(index)).collect(),
            None => Vec::new(),
        }
    }

    /// Render as an aligned text table with a leading row index
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return format!("Empty result set\nColumns: [{}]\n", self.columns.join(", "));
        }

        let index_width = (self.rows.len() - 1).to_string().len();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        out.push_str(&" ".repeat(index_width));
        for (name, width) in self.columns.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", name, width = width));
        }
        out.push('\n');

        for (index, (row, rendered)) in self.rows.iter().zip(&cells).enumerate() {
            out.push_str(&format!("{:<width$}", index, width = index_width));
            for ((cell, text), width) in row.iter().zip(rendered).zip(&widths) {
                if cell.is_numeric() {
                    out.push_str(&format!("  {:>width$}", text, width = width));
                } else {
                    out.push_str(&format!("  {:<width$}", text, width = width));
                }
            }
            out.push('\n');
        }

        out
    }
}

fn decode_cell(row: &SqliteRow, index: usize) -> Result<Cell, sqlx::Error> {
    let kind = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Cell::Null);
        }
        raw.type_info().name().to_string()
    };

    let cell = match kind.as_str() {
        "INTEGER" | "BOOLEAN" => Cell::Integer(row.try_get_unchecked(index)?),
        "REAL" | "NUMERIC" => Cell::Real(row.try_get_unchecked(index)?),
        "BLOB" => Cell::Blob(row.try_get_unchecked(index)?),
        _ => Cell::Text(row.try_get_unchecked(index)?),
    };
    Ok(cell)
}

/// Execute `query` verbatim and collect its result
///
/// # Errors
/// Returns [`EtlError::Query`] for malformed SQL or a missing table.
pub async fn execute_query(query: &str, database: &Database) -> Result<ResultSet> {
    let query_error = |source| EtlError::Query {
        query: query.to_string(),
        source,
    };

    let statement = database.pool().prepare(query).await.map_err(query_error)?;
    let columns: Vec<String> = statement
        .columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect();

    let rows = statement
        .query()
        .fetch_all(database.pool())
        .await
        .map_err(query_error)?;

    let rows = rows
        .iter()
        .map(|row| {
            (0..row.len())
                .map(|index| decode_cell(row, index))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(query_error)?;

    Ok(ResultSet { columns, rows })
}

/// Write the query text followed by the rendered result
pub fn print_result(query: &str, result: &ResultSet, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", query)?;
    write!(out, "{}", result.render())?;
    out.flush()?;
    Ok(())
}

/// Execute `query`, then write the query text and the rendered result to `out`
pub async fn run_query_to(
    query: &str,
    database: &Database,
    out: &mut impl Write,
) -> Result<ResultSet> {
    let result = execute_query(query, database).await?;
    print_result(query, &result, out)?;
    Ok(result)
}

/// Execute `query`, printing the query text and its result to stdout
pub async fn run_query(query: &str, database: &Database) -> Result<ResultSet> {
    let result = execute_query(query, database).await?;
    print_result(query, &result, &mut std::io::stdout().lock())?;
    Ok(result)
}
