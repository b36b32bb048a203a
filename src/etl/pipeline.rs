//! Pipeline orchestration for the GDP ETL run

use super::{Extractor, Loader, Transformer};
use crate::config::EtlConfig;
use crate::gdp::{GdpExtractor, GdpTransformer, NormalizedRecord, RawRecord};
use crate::journal::Journal;
use crate::storage::{CsvWriter, Database, ResultSet, TableWriter, run_query};

use eyre::Result;
use std::fmt;

/// Where a run has got to
///
/// A run only ever moves forward through these states, one at a time. A
/// failure leaves it at the last state reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    Extracted,
    Transformed,
    FlatSaved,
    Connected,
    TableSaved,
    Queried,
    Closed,
}

impl Stage {
    /// Journal entry written on reaching this stage
    pub fn message(self) -> Option<&'static str> {
        match self {
            Self::Start => Some("Preliminaries complete. Initiating ETL process"),
            Self::Extracted => Some("Data extraction complete. Initiating Transformation process"),
            Self::Transformed => Some("Data transformation complete. Initiating loading process"),
            Self::FlatSaved => Some("Data saved to CSV file"),
            Self::Connected => Some("SQL Connection initiated."),
            Self::TableSaved => Some("Data loaded to Database as table. Running the query"),
            Self::Queried => Some("Process Complete."),
            Self::Closed => None,
        }
    }

    /// Every journal message of a successful run, in order
    pub fn journal_messages() -> Vec<&'static str> {
        [
            Self::Start,
            Self::Extracted,
            Self::Transformed,
            Self::FlatSaved,
            Self::Connected,
            Self::TableSaved,
            Self::Queried,
            Self::Closed,
        ]
        .into_iter()
        .filter_map(Self::message)
        .collect()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::Extracted => "EXTRACTED",
            Self::Transformed => "TRANSFORMED",
            Self::FlatSaved => "FLAT_SAVED",
            Self::Connected => "CONNECTED",
            Self::TableSaved => "TABLE_SAVED",
            Self::Queried => "QUERIED",
            Self::Closed => "CLOSED",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub stage: Stage,
    /// Rows admitted by the extractor
    pub extracted: usize,
    /// Rows written to the table
    pub loaded: usize,
    /// Result of the demonstration query
    pub result: ResultSet,
}

/// ETL driver: extract → transform → CSV → connect → table → query → close
///
/// Writes one journal entry per completed stage. Outputs written before a
/// failure are left in place.
///
/// # Example
/// ```no_run
/// use gdp_etl::config::EtlConfig;
/// use gdp_etl::etl::EtlPipeline;
///
/// # async fn example() -> eyre::Result<()> {
/// let pipeline = EtlPipeline::new(EtlConfig::default())?;
/// let report = pipeline.run().await?;
/// println!("Loaded {} countries", report.loaded);
/// # Ok(())
/// # }
/// ```
pub struct EtlPipeline<E = GdpExtractor> {
    config: EtlConfig,
    extractor: E,
    transformer: GdpTransformer,
    journal: Journal,
}

impl EtlPipeline<GdpExtractor> {
    /// Create a pipeline reading from the configured URL
    pub fn new(config: EtlConfig) -> Result<Self> {
        let extractor = GdpExtractor::from_config(&config)?;
        Self::with_extractor(config, extractor)
    }
}

impl<E> EtlPipeline<E>
where
    E: Extractor<Item = RawRecord>,
{
    /// Create a pipeline with a custom record source
    pub fn with_extractor(config: EtlConfig, extractor: E) -> Result<Self> {
        config.validate()?;
        let transformer = GdpTransformer::new(config.columns.raw_gdp.clone());
        let journal = Journal::new(&config.log_path, config.journal_policy);

        Ok(Self {
            config,
            extractor,
            transformer,
            journal,
        })
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    /// Run every stage once
    ///
    /// # Errors
    /// Returns the first stage failure; later stages are not attempted.
    pub async fn run(&self) -> Result<RunReport> {
        let mut stage = Stage::Start;
        let result = self.run_stages(&mut stage).await;

        match &result {
            Ok(report) => log::info!(
                "ETL run finished: {} extracted, {} loaded, {} row(s) queried",
                report.extracted,
                report.loaded,
                report.result.len()
            ),
            Err(e) => log::error!("ETL run aborted at stage {}: {}", stage, e),
        }

        result
    }

    fn enter(&self, stage: &mut Stage, next: Stage) -> Result<()> {
        log::debug!("{} -> {}", stage, next);
        *stage = next;
        match next.message() {
            Some(message) => self.journal.log(message),
            None => Ok(()),
        }
    }

    async fn run_stages(&self, stage: &mut Stage) -> Result<RunReport> {
        self.enter(stage, Stage::Start)?;

        let raw = self.extractor.extract().await?;
        let extracted = raw.len();
        self.enter(stage, Stage::Extracted)?;

        let records = self.transformer.transform_many(raw)?;
        self.enter(stage, Stage::Transformed)?;

        CsvWriter::new(&self.config.csv_path, self.config.columns.clone())
            .load(&records)
            .await?;
        self.enter(stage, Stage::FlatSaved)?;

        let database = Database::connect(&self.config.db_path).await?;
        let connected = self.run_connected(stage, &database, &records).await;
        database.close().await;
        let (loaded, result) = connected?;
        self.enter(stage, Stage::Closed)?;

        Ok(RunReport {
            stage: *stage,
            extracted,
            loaded,
            result,
        })
    }

    async fn run_connected(
        &self,
        stage: &mut Stage,
        database: &Database,
        records: &[NormalizedRecord],
    ) -> Result<(usize, ResultSet)> {
        self.enter(stage, Stage::Connected)?;

        let loaded = TableWriter::new(
            database,
            self.config.table_name.clone(),
            self.config.columns.clone(),
        )
        .load(records)
        .await?;
        self.enter(stage, Stage::TableSaved)?;

        let result = run_query(&self.config.default_query(), database).await?;
        self.enter(stage, Stage::Queried)?;

        Ok((loaded, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use crate::journal::{JournalPolicy, parse_entries};
    use crate::storage::Cell;
    use tempfile::TempDir;

    struct MockExtractor(Vec<RawRecord>);

    impl Extractor for MockExtractor {
        type Item = RawRecord;

        async fn extract(&self) -> Result<Vec<Self::Item>> {
            Ok(self.0.clone())
        }
    }

    struct FailingExtractor;

    impl Extractor for FailingExtractor {
        type Item = RawRecord;

        async fn extract(&self) -> Result<Vec<Self::Item>> {
            Err(EtlError::Structure("no tables".to_string()).into())
        }
    }

    fn sample() -> MockExtractor {
        MockExtractor(vec![
            RawRecord::new("A", "150,230"),
            RawRecord::new("B", "42,100"),
            RawRecord::new("C", "100,000"),
        ])
    }

    fn journal_messages(config: &EtlConfig) -> Vec<String> {
        let content = std::fs::read_to_string(&config.log_path).unwrap_or_default();
        parse_entries(&content)
            .into_iter()
            .map(|(_, message)| message)
            .collect()
    }

    #[test]
    fn test_stage_messages() {
        let messages = Stage::journal_messages();
        assert_eq!(messages.len(), 7);
        assert_eq!(messages[0], "Preliminaries complete. Initiating ETL process");
        assert_eq!(messages[4], "SQL Connection initiated.");
        assert_eq!(messages[6], "Process Complete.");
        assert_eq!(Stage::Closed.message(), None);
    }

    #[test]
    fn test_stage_order() {
        assert!(Stage::Start < Stage::Extracted);
        assert!(Stage::Queried < Stage::Closed);
        assert_eq!(Stage::FlatSaved.to_string(), "FLAT_SAVED");
    }

    #[tokio::test]
    async fn test_full_run() {
        let temp = TempDir::new().unwrap();
        let config = EtlConfig::default()
            .with_output_dir(temp.path())
            .with_journal_policy(JournalPolicy::Strict);

        let pipeline = EtlPipeline::with_extractor(config.clone(), sample()).unwrap();
        let report = pipeline.run().await.unwrap();

        assert_eq!(report.stage, Stage::Closed);
        assert_eq!(report.extracted, 3);
        assert_eq!(report.loaded, 3);
        let countries: Vec<_> = report
            .result
            .column("Country")
            .into_iter()
            .filter_map(Cell::as_text)
            .collect();
        assert_eq!(countries, vec!["A", "C"]);

        assert!(config.csv_path.exists());
        assert!(config.db_path.exists());
        assert_eq!(journal_messages(&config), Stage::journal_messages());
    }

    #[tokio::test]
    async fn test_journal_accumulates_across_runs() {
        let temp = TempDir::new().unwrap();
        let config = EtlConfig::default().with_output_dir(temp.path());

        let pipeline = EtlPipeline::with_extractor(config.clone(), sample()).unwrap();
        pipeline.run().await.unwrap();
        pipeline.run().await.unwrap();

        assert_eq!(journal_messages(&config).len(), 14);
    }

    #[tokio::test]
    async fn test_extract_failure_stops_at_start() {
        let temp = TempDir::new().unwrap();
        let config = EtlConfig::default().with_output_dir(temp.path());

        let pipeline = EtlPipeline::with_extractor(config.clone(), FailingExtractor).unwrap();
        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<EtlError>(),
            Some(EtlError::Structure(_))
        ));
        assert_eq!(journal_messages(&config), Stage::journal_messages()[..1]);
        assert!(!config.csv_path.exists());
    }

    #[tokio::test]
    async fn test_parse_failure_aborts_before_loading() {
        let temp = TempDir::new().unwrap();
        let config = EtlConfig::default().with_output_dir(temp.path());
        let extractor = MockExtractor(vec![
            RawRecord::new("A", "150,230"),
            RawRecord::new("B", "about 42"),
        ]);

        let pipeline = EtlPipeline::with_extractor(config.clone(), extractor).unwrap();
        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<EtlError>(),
            Some(EtlError::Parse { .. })
        ));
        assert_eq!(journal_messages(&config), Stage::journal_messages()[..2]);
        assert!(!config.csv_path.exists());
        assert!(!config.db_path.exists());
    }

    #[tokio::test]
    async fn test_connect_failure_keeps_csv() {
        let temp = TempDir::new().unwrap();
        let mut config = EtlConfig::default().with_output_dir(temp.path());
        config.db_path = temp.path().join("missing").join("World_Economies.db");

        let pipeline = EtlPipeline::with_extractor(config.clone(), sample()).unwrap();
        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<EtlError>(),
            Some(EtlError::Storage { .. })
        ));
        assert_eq!(journal_messages(&config), Stage::journal_messages()[..4]);
        assert!(config.csv_path.exists());
    }

    #[tokio::test]
    async fn test_table_failure_stops_after_connect() {
        let temp = TempDir::new().unwrap();
        let config = EtlConfig::default()
            .with_output_dir(temp.path())
            .with_table_name("sqlite_reserved");

        let pipeline = EtlPipeline::with_extractor(config.clone(), sample()).unwrap();
        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<EtlError>(),
            Some(EtlError::Storage { .. })
        ));
        let messages = journal_messages(&config);
        assert_eq!(messages, Stage::journal_messages()[..5]);
        assert_eq!(messages.last().unwrap(), "SQL Connection initiated.");

        // The connection was released: the file can be reopened and written
        let database = Database::connect(&config.db_path).await.unwrap();
        sqlx::query("CREATE TABLE probe (x INTEGER)")
            .execute(database.pool())
            .await
            .unwrap();
        database.close().await;
    }

    #[tokio::test]
    async fn test_strict_journal_failure_aborts() {
        let temp = TempDir::new().unwrap();
        let mut config = EtlConfig::default()
            .with_output_dir(temp.path())
            .with_journal_policy(JournalPolicy::Strict);
        config.log_path = temp.path().join("missing").join("log.txt");

        let pipeline = EtlPipeline::with_extractor(config.clone(), sample()).unwrap();
        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<EtlError>(),
            Some(EtlError::Journal { .. })
        ));
        assert!(!config.csv_path.exists());
    }

    #[tokio::test]
    async fn test_lenient_journal_failure_continues() {
        let temp = TempDir::new().unwrap();
        let mut config = EtlConfig::default().with_output_dir(temp.path());
        config.log_path = temp.path().join("missing").join("log.txt");

        let pipeline = EtlPipeline::with_extractor(config.clone(), sample()).unwrap();
        let report = pipeline.run().await.unwrap();
        assert_eq!(report.stage, Stage::Closed);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EtlConfig::default().with_table_name("bad name");
        assert!(EtlPipeline::with_extractor(config, sample()).is_err());
    }
}
