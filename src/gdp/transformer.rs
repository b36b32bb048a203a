//! GDP unit normalization
//!
//! Millions of USD in source formatting become billions of USD with exactly
//! two fractional digits. Midpoints round away from zero.

use super::records::{NormalizedRecord, RawRecord};
use crate::error::EtlError;
use crate::etl::Transformer;

use eyre::Result;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

const THOUSANDS_SEPARATOR: char = ',';

/// Parse a source GDP string (millions) and convert to billions
///
/// # Example
/// ```
/// use gdp_etl::gdp::normalize_gdp;
///
/// assert_eq!(normalize_gdp("26,854,599").unwrap().to_string(), "26854.60");
/// assert_eq!(normalize_gdp("1,235").unwrap().to_string(), "1.24");
/// ```
pub fn normalize_gdp(raw: &str) -> Result<Decimal, rust_decimal::Error> {
    let digits: String = raw.chars().filter(|c| *c != THOUSANDS_SEPARATOR).collect();
    let millions = Decimal::from_str(digits.trim())?;

    let mut billions = (millions / Decimal::from(1000))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    billions.rescale(2);
    Ok(billions)
}

/// Transformer from [`RawRecord`] to [`NormalizedRecord`]
pub struct GdpTransformer {
    field: String,
}

impl GdpTransformer {
    /// Create a transformer; `field` names the raw GDP column in errors
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Default for GdpTransformer {
    fn default() -> Self {
        Self::new("GDP_USD_millions")
    }
}

impl Transformer for GdpTransformer {
    type Input = RawRecord;
    type Output = NormalizedRecord;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        let gdp_usd_billion = normalize_gdp(&input.gdp_raw).map_err(|source| EtlError::Parse {
            field: self.field.clone(),
            country: input.country.clone(),
            value: input.gdp_raw.clone(),
            source,
        })?;

        Ok(NormalizedRecord {
            country: input.country,
            gdp_usd_billion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_divides_and_rounds() {
        assert_eq!(normalize_gdp("1,234").unwrap(), Decimal::new(123, 2));
        assert_eq!(normalize_gdp("26,854,599").unwrap(), Decimal::new(2685460, 2));
        assert_eq!(normalize_gdp("150,230").unwrap(), Decimal::new(15023, 2));
    }

    #[test]
    fn test_normalize_midpoint_away_from_zero() {
        assert_eq!(normalize_gdp("1,245").unwrap(), Decimal::new(125, 2));
        assert_eq!(normalize_gdp("2,225").unwrap(), Decimal::new(223, 2));
        assert_eq!(normalize_gdp("-1,245").unwrap(), Decimal::new(-125, 2));
    }

    #[test]
    fn test_normalize_fixed_scale() {
        let value = normalize_gdp("100,000").unwrap();
        assert_eq!(value.scale(), 2);
        assert_eq!(value.to_string(), "100.00");
    }

    #[test]
    fn test_normalize_accepts_fraction_and_padding() {
        assert_eq!(normalize_gdp(" 12,345.5 ").unwrap(), Decimal::new(1235, 2));
    }

    #[test]
    fn test_non_numeric_is_parse_error() {
        let transformer = GdpTransformer::default();
        let err = transformer
            .transform(RawRecord::new("Nowhere", "n/a"))
            .unwrap_err();

        match err.downcast_ref::<EtlError>() {
            Some(EtlError::Parse { country, value, .. }) => {
                assert_eq!(country, "Nowhere");
                assert_eq!(value, "n/a");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_transform_many_preserves_order_and_count() {
        let transformer = GdpTransformer::default();
        let raw = vec![
            RawRecord::new("A", "150,230"),
            RawRecord::new("B", "42,100"),
            RawRecord::new("C", "100,000"),
        ];

        let normalized = transformer.transform_many(raw.clone()).unwrap();
        assert_eq!(normalized.len(), raw.len());
        for (before, after) in raw.iter().zip(&normalized) {
            assert_eq!(before.country, after.country);
            assert_eq!(after.gdp_usd_billion, normalize_gdp(&before.gdp_raw).unwrap());
        }
    }
}
