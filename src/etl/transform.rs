//! Transformer trait for converting records

use eyre::Result;

/// Transformer trait for converting one record type into another
///
/// # Example
/// ```
/// use gdp_etl::etl::Transformer;
/// use eyre::Result;
///
/// struct Trim;
///
/// impl Transformer for Trim {
///     type Input = String;
///     type Output = String;
///
///     fn transform(&self, input: Self::Input) -> Result<Self::Output> {
///         Ok(input.trim().to_string())
///     }
/// }
///
/// let out = Trim.transform_many(vec![" a ".to_string()]).unwrap();
/// assert_eq!(out, vec!["a"]);
/// ```
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output item type after transformation
    type Output: Send;

    /// Transform a single item
    ///
    /// # Errors
    /// Returns an error if the item cannot be converted
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;

    /// Transform every item, preserving order and count
    ///
    /// Stops at the first failing item.
    fn transform_many(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        inputs.into_iter().map(|i| self.transform(i)).collect()
    }
}
