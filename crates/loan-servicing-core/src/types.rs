use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Periodic rates expressed as decimals (0.007 = 0.7% per month).
pub type Rate = Decimal;

/// Annual rates quoted the way borrowers see them (8.5 = 8.5% a year).
pub type RatePercent = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Sum money amounts, reporting overflow instead of panicking.
pub(crate) fn checked_sum<I>(values: I, context: &str) -> crate::LoanServicingResult<Money>
where
    I: IntoIterator<Item = Money>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .ok_or_else(|| crate::LoanServicingError::ArithmeticOverflow {
            context: context.to_string(),
        })
}

/// Sum month counts, reporting overflow instead of wrapping.
pub(crate) fn checked_months<I>(values: I, context: &str) -> crate::LoanServicingResult<u32>
where
    I: IntoIterator<Item = u32>,
{
    values
        .into_iter()
        .try_fold(0u32, |acc, v| acc.checked_add(v))
        .ok_or_else(|| crate::LoanServicingError::ArithmeticOverflow {
            context: context.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_checked_sum() {
        assert_eq!(checked_sum([dec!(1.25), dec!(2.75)], "t").unwrap(), dec!(4));
        assert_eq!(checked_sum(Vec::new(), "t").unwrap(), Decimal::ZERO);
        assert!(checked_sum([Decimal::MAX, Decimal::ONE], "t").is_err());
    }

    #[test]
    fn test_checked_months() {
        assert_eq!(checked_months([3, 4], "t").unwrap(), 7);
        assert!(checked_months([u32::MAX, 1], "t").is_err());
    }
}
