//! Run configuration
//!
//! [`EtlConfig`] is built once and handed to the pipeline; nothing reads
//! ambient constants. Values resolve in this order:
//!
//! 1. Built-in defaults
//! 2. An optional YAML file
//! 3. `GDP_ETL_*` environment variables
//!
//! Example file:
//! ```yaml
//! url: https://example.org/gdp.html
//! table_name: Countries_by_GDP
//! csv_path: out/Countries_by_GDP.csv
//! db_path: out/World_Economies.db
//! log_path: out/etl_project_log.txt
//! ```

use crate::error::EtlError;
use crate::journal::JournalPolicy;

use eyre::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_URL: &str = "https://web.archive.org/web/20230902185326/https://en.wikipedia.org/wiki/List_of_countries_by_GDP_%28nominal%29";
pub const DEFAULT_TABLE_NAME: &str = "Countries_by_GDP";
pub const DEFAULT_CSV_PATH: &str = "Countries_by_GDP.csv";
pub const DEFAULT_DB_PATH: &str = "World_Economies.db";
pub const DEFAULT_LOG_PATH: &str = "etl_project_log.txt";

/// Zero-based `tbody` index used when no table matches the header keywords
pub const DEFAULT_TABLE_INDEX: usize = 2;

const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

/// The keys accepted in a configuration file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub csv_path: Option<PathBuf>,
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

impl ConfigFile {
    /// Read a configuration file from YAML
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file YAML: {}", path.display()))
    }
}

/// Column names for the raw and normalized record sets
#[derive(Debug, Clone, PartialEq)]
pub struct Columns {
    /// Country column, shared by raw and normalized records
    pub country: String,
    /// Raw GDP column, in millions of USD
    pub raw_gdp: String,
    /// Normalized GDP column, in billions of USD
    pub gdp: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            country: "Country".to_string(),
            raw_gdp: "GDP_USD_millions".to_string(),
            gdp: "GDP_USD_billion".to_string(),
        }
    }
}

/// Immutable configuration for one ETL run
#[derive(Debug, Clone, PartialEq)]
pub struct EtlConfig {
    pub url: String,
    pub table_name: String,
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub columns: Columns,
    /// Header keywords that identify the source table
    pub header_keywords: Vec<String>,
    pub table_index: usize,
    pub journal_policy: JournalPolicy,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            columns: Columns::default(),
            header_keywords: vec!["Country".to_string(), "IMF".to_string()],
            table_index: DEFAULT_TABLE_INDEX,
            journal_policy: JournalPolicy::default(),
        }
    }
}

impl EtlConfig {
    /// Resolve defaults, an optional config file, then environment overrides
    pub fn resolve(config_file: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = config_file {
            log::debug!("Loading config from {}", path.display());
            config = config.merge(ConfigFile::read(path)?);
        }

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Overlay the values present in a config file
    pub fn merge(mut self, file: ConfigFile) -> Self {
        if let Some(url) = file.url {
            self.url = url;
        }
        if let Some(table_name) = file.table_name {
            self.table_name = table_name;
        }
        if let Some(csv_path) = file.csv_path {
            self.csv_path = csv_path;
        }
        if let Some(db_path) = file.db_path {
            self.db_path = db_path;
        }
        if let Some(log_path) = file.log_path {
            self.log_path = log_path;
        }
        self
    }

    /// Apply overrides from the environment
    ///
    /// Recognized variables:
    /// - GDP_ETL_URL
    /// - GDP_ETL_TABLE_NAME
    /// - GDP_ETL_CSV_PATH
    /// - GDP_ETL_DB_PATH
    /// - GDP_ETL_LOG_PATH
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("GDP_ETL_URL") {
            self.url = url;
        }
        if let Ok(table_name) = std::env::var("GDP_ETL_TABLE_NAME") {
            self.table_name = table_name;
        }
        if let Ok(csv_path) = std::env::var("GDP_ETL_CSV_PATH") {
            self.csv_path = PathBuf::from(csv_path);
        }
        if let Ok(db_path) = std::env::var("GDP_ETL_DB_PATH") {
            self.db_path = PathBuf::from(db_path);
        }
        if let Ok(log_path) = std::env::var("GDP_ETL_LOG_PATH") {
            self.log_path = PathBuf::from(log_path);
        }
    }

    /// Check the URL and every SQL identifier
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.url)
            .map_err(|e| EtlError::Config(format!("invalid url {:?}: {}", self.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EtlError::Config(format!(
                "url must use http or https, got {:?}",
                url.scheme()
            ))
            .into());
        }

        let identifier = regex::Regex::new(IDENTIFIER_PATTERN)?;
        for (key, value) in [
            ("table_name", &self.table_name),
            ("country column", &self.columns.country),
            ("GDP column", &self.columns.gdp),
        ] {
            if !identifier.is_match(value) {
                return Err(EtlError::Config(format!(
                    "{} must be a plain SQL identifier, got {:?}",
                    key, value
                ))
                .into());
            }
        }

        Ok(())
    }

    /// The demonstration query: every economy of at least 100 billion USD
    pub fn default_query(&self) -> String {
        format!(
            "SELECT * FROM {} WHERE {} >= 100",
            self.table_name, self.columns.gdp
        )
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Place the CSV, database and journal under one directory
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.csv_path = dir.join(DEFAULT_CSV_PATH);
        self.db_path = dir.join(DEFAULT_DB_PATH);
        self.log_path = dir.join(DEFAULT_LOG_PATH);
        self
    }

    pub fn with_header_keywords(mut self, keywords: Vec<&str>) -> Self {
        self.header_keywords = keywords.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_table_index(mut self, index: usize) -> Self {
        self.table_index = index;
        self
    }

    pub fn with_journal_policy(mut self, policy: JournalPolicy) -> Self {
        self.journal_policy = policy;
        self
    }
}
