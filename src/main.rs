use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use gdp_etl::{Database, EtlConfig, EtlPipeline, JournalPolicy, storage::run_query};
use owo_colors::OwoColorize;
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// GDP ETL: scrape IMF GDP estimates into CSV and SQLite, with an audit journal
#[derive(Parser)]
#[command(name = "gdpetl", version, styles = STYLES)]
struct Cli {
    /// YAML file with url, table_name, csv_path, db_path and log_path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// The dotenv file to source GDP_ETL_* overrides from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute (defaults to `run`)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, transform, load and query in one pass
    Run {
        /// Fail the run if the journal cannot be written
        #[arg(long)]
        strict_journal: bool,
    },

    /// Run a read-only query against an existing database
    Query {
        /// SQL to run; defaults to economies of at least 100 billion USD
        statement: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // The dotenv file is optional
    let dotenv = dotenvy::from_filename(&cli.env);

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    if let Err(e) = dotenv {
        log::debug!("No dotenv loaded from {}: {}", cli.env, e);
    }

    let config = EtlConfig::resolve(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run {
        strict_journal: false,
    }) {
        Commands::Run { strict_journal } => {
            let policy = match strict_journal {
                true => JournalPolicy::Strict,
                false => JournalPolicy::Lenient,
            };
            log::info!(
                "Running ETL from {} into {}",
                config.url.bright_black(),
                config.db_path.display().bright_black()
            );

            let pipeline = EtlPipeline::new(config.with_journal_policy(policy))?;
            let report = pipeline.run().await?;

            log::info!(
                "✓ Loaded {} countries, {} at or above 100 billion USD",
                report.loaded.cyan(),
                report.result.len().cyan()
            );
        }
        Commands::Query { statement } => {
            let statement = statement.unwrap_or_else(|| config.default_query());
            log::info!("Querying {}", config.db_path.display().bright_black());

            let database = Database::open_read_only(&config.db_path).await?;
            let result = run_query(&statement, &database).await;
            database.close().await;
            result?;
        }
    }

    Ok(())
}
