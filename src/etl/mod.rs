//! Core ETL (Extract, Transform, Load) abstractions
//!
//! Trait definitions for the pipeline stages, and the [`EtlPipeline`] driver
//! that sequences them.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::{EtlPipeline, RunReport, Stage};
pub use transform::Transformer;
