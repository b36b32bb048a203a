//! Extractor trait for pulling records out of a source

use eyre::Result;

/// Extractor trait for extracting records from a source
///
/// Implementors define how records are produced, e.g. by fetching a remote
/// document and scanning it for table rows.
///
/// # Example
/// ```no_run
/// use gdp_etl::etl::Extractor;
/// use eyre::Result;
///
/// struct FixedExtractor(Vec<String>);
///
/// impl Extractor for FixedExtractor {
///     type Item = String;
///
///     async fn extract(&self) -> Result<Vec<Self::Item>> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The type of items extracted
    type Item: Send;

    /// Extract items from the source, in source order
    ///
    /// # Errors
    /// Returns an error if the source cannot be read or has no usable structure
    fn extract(&self) -> impl std::future::Future<Output = Result<Vec<Self::Item>>> + Send;
}
