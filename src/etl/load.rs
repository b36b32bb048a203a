//! Loader trait for persisting records

use eyre::Result;

/// Loader trait for writing records to a destination
///
/// Loaders in this crate replace the destination wholesale: loading the same
/// records twice leaves the destination as if they were loaded once.
///
/// # Example
/// ```no_run
/// use gdp_etl::etl::Loader;
/// use eyre::Result;
/// use std::path::PathBuf;
///
/// struct LineLoader {
///     path: PathBuf,
/// }
///
/// impl Loader for LineLoader {
///     type Item = String;
///
///     async fn load(&self, items: &[Self::Item]) -> Result<usize> {
///         std::fs::write(&self.path, items.join("\n"))?;
///         Ok(items.len())
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    /// The type of items to load
    type Item: Sync;

    /// Load items to the destination
    ///
    /// Returns the number of items written
    ///
    /// # Errors
    /// Returns an error if the destination cannot be written
    fn load(
        &self,
        items: &[Self::Item],
    ) -> impl std::future::Future<Output = Result<usize>> + Send;
}
