//! GDP table extractor
//!
//! Fetches the source page over HTTP and scans its GDP table.

use super::records::RawRecord;
use super::table::{TableLocator, parse_document};
use crate::client::HttpClient;
use crate::config::{Columns, EtlConfig};
use crate::etl::Extractor;

use eyre::Result;

/// Extractor for the country GDP table
///
/// # Example
/// ```no_run
/// use gdp_etl::client::HttpClient;
/// use gdp_etl::config::Columns;
/// use gdp_etl::etl::Extractor;
/// use gdp_etl::gdp::{GdpExtractor, TableLocator};
///
/// # async fn example() -> eyre::Result<()> {
/// let client = HttpClient::try_new("https://example.org/gdp.html")?;
/// let extractor = GdpExtractor::new(client, TableLocator::default(), Columns::default());
/// let records = extractor.extract().await?;
/// # Ok(())
/// # }
/// ```
pub struct GdpExtractor {
    client: HttpClient,
    locator: TableLocator,
    columns: Columns,
}

impl GdpExtractor {
    /// Create a new extractor
    ///
    /// # Arguments
    /// * `client` - Client bound to the source document
    /// * `locator` - How to find the GDP table in the document
    /// * `columns` - Names of the fields being populated
    pub fn new(client: HttpClient, locator: TableLocator, columns: Columns) -> Self {
        Self {
            client,
            locator,
            columns,
        }
    }

    pub fn from_config(config: &EtlConfig) -> Result<Self> {
        Ok(Self::new(
            HttpClient::try_new(&config.url)?,
            TableLocator::from_config(config),
            config.columns.clone(),
        ))
    }
}

impl Extractor for GdpExtractor {
    type Item = RawRecord;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let html = self.client.fetch_text().await?;
        let records = parse_document(&html, &self.locator)?;

        log::info!(
            "Extracted {} row(s) of ({}, {}) from {}",
            records.len(),
            self.columns.country,
            self.columns.raw_gdp,
            self.client.url()
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_from_config() {
        let config = EtlConfig::default()
            .with_url("http://localhost:8080/gdp.html")
            .with_table_index(4);
        let extractor = GdpExtractor::from_config(&config).unwrap();
        assert_eq!(extractor.client.url().as_str(), "http://localhost:8080/gdp.html");
        assert_eq!(extractor.locator, TableLocator::from_config(&config));
        assert_eq!(extractor.columns.raw_gdp, "GDP_USD_millions");
    }
}
