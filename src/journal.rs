//! Append-only audit journal of pipeline stages
//!
//! Each entry is written as `"<DD-MonthName-YYYY-HH:MM:SS> : <message>"`
//! followed by a blank line. The file is only ever appended to.

use crate::error::EtlError;

use eyre::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%d-%B-%Y-%H:%M:%S";

/// What to do when an entry cannot be written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JournalPolicy {
    /// Warn through the diagnostic log and keep going
    #[default]
    Lenient,
    /// Fail the run
    Strict,
}

/// Audit journal backed by a text file
pub struct Journal {
    path: PathBuf,
    policy: JournalPolicy,
}

impl Journal {
    pub fn new(path: impl AsRef<Path>, policy: JournalPolicy) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a timestamped entry
    ///
    /// # Errors
    /// Only under [`JournalPolicy::Strict`], when the file cannot be written.
    pub fn log(&self, message: &str) -> Result<()> {
        log::info!("{}", message);

        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        let entry = format!("{} : {}\n\n", timestamp, message);

        match self.append(&entry) {
            Ok(()) => Ok(()),
            Err(source) => match self.policy {
                JournalPolicy::Lenient => {
                    log::warn!(
                        "Failed to append to journal {}: {}",
                        self.path.display(),
                        source
                    );
                    Ok(())
                }
                JournalPolicy::Strict => Err(EtlError::Journal {
                    path: self.path.clone(),
                    source,
                }
                .into()),
            },
        }
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(entry.as_bytes())
    }
}

/// Split journal text into `(timestamp, message)` pairs
pub fn parse_entries(content: &str) -> Vec<(String, String)> {
    content
        .split("\n\n")
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(|entry| {
            entry
                .split_once(" : ")
                .map(|(ts, msg)| (ts.to_string(), msg.to_string()))
        })
        .collect()
}
