//! CSV flat-file output

use crate::config::Columns;
use crate::error::EtlError;
use crate::etl::Loader;
use crate::gdp::NormalizedRecord;

use eyre::Result;
use std::path::{Path, PathBuf};

/// Write normalized records to a CSV file, replacing any previous content
///
/// The first column is the zero-based row index with an empty header.
pub struct CsvWriter {
    path: PathBuf,
    columns: Columns,
}

impl CsvWriter {
    pub fn new(path: impl AsRef<Path>, columns: Columns) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            columns,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write every record, overwriting the file
    ///
    /// # Errors
    /// Returns [`EtlError::Io`] if the file cannot be created or written.
    pub fn write(&self, records: &[NormalizedRecord]) -> Result<()> {
        self.write_records(records).map_err(|source| EtlError::Io {
            path: self.path.clone(),
            source,
        })?;

        log::debug!("Wrote {} row(s) to {}", records.len(), self.path.display());
        Ok(())
    }

    fn write_records(&self, records: &[NormalizedRecord]) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(["", self.columns.country.as_str(), self.columns.gdp.as_str()])?;

        for (index, record) in records.iter().enumerate() {
            writer.write_record([
                index.to_string(),
                record.country.clone(),
                record.gdp_usd_billion.to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl Loader for CsvWriter {
    type Item = NormalizedRecord;

    async fn load(&self, items: &[Self::Item]) -> Result<usize> {
        self.write(items)?;
        Ok(items.len())
    }
}
