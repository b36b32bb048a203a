//! GDP-by-country records and the stages that produce them
//!
//! - [`GdpExtractor`] fetches the source page and scans its GDP table
//! - [`GdpTransformer`] converts millions of USD to billions of USD

mod extractor;
mod records;
mod table;
mod transformer;

pub use extractor::GdpExtractor;
pub use records::{GdpCell, NormalizedRecord, RawRecord, UNREPORTED_PLACEHOLDER};
pub use table::{TableLocator, parse_document};
pub use transformer::{GdpTransformer, normalize_gdp};
