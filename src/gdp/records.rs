//! Record types flowing between the pipeline stages

use rust_decimal::Decimal;

/// Glyph the source uses for an economy with no reported GDP
pub const UNREPORTED_PLACEHOLDER: &str = "—";

/// A country row as scraped, GDP still in source formatting (millions of USD)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub country: String,
    /// e.g. `"26,854,599"`
    pub gdp_raw: String,
}

impl RawRecord {
    pub fn new(country: impl Into<String>, gdp_raw: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            gdp_raw: gdp_raw.into(),
        }
    }
}

/// A country row with GDP in billions of USD, two fractional digits
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub country: String,
    pub gdp_usd_billion: Decimal,
}

impl NormalizedRecord {
    pub fn new(country: impl Into<String>, gdp_usd_billion: Decimal) -> Self {
        Self {
            country: country.into(),
            gdp_usd_billion,
        }
    }
}

/// Content of the GDP cell, read at the parse boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GdpCell {
    Reported(String),
    Unreported,
}

impl GdpCell {
    /// Classify cell text; only the placeholder is unreported
    ///
    /// A blank or absent cell is reported as empty text.
    pub fn parse(text: Option<&str>) -> Self {
        match text.map(str::trim) {
            Some(UNREPORTED_PLACEHOLDER) => Self::Unreported,
            Some(value) => Self::Reported(value.to_string()),
            None => Self::Reported(String::new()),
        }
    }

    pub fn reported(self) -> Option<String> {
        match self {
            Self::Reported(value) => Some(value),
            Self::Unreported => None,
        }
    }
}
