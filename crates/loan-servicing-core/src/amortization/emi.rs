//! Equated monthly installment (EMI) for a level-pay amortising loan.
//!
//! Annual rates are quoted in percent (8.4 = 8.4% a year) and converted to
//! a monthly decimal rate as `annual / 12 / 100`. The installment is rounded
//! once, to minor units, after the annuity formula has been evaluated in
//! full precision.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LoanServicingError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, RatePercent};
use crate::LoanServicingResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Decimal places kept on every derived money amount.
pub const MONEY_DP: u32 = 2;

/// One minor currency unit.
pub const MINOR_UNIT: Money = dec!(0.01);

/// Upper bound on tenure. Keeps schedule generation bounded for any input.
pub const MAX_TENURE_MONTHS: u32 = 1200;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiInput {
    /// Amount borrowed (or currently outstanding).
    pub principal: Money,
    /// Annual interest rate in percent (8.4 = 8.4%).
    pub annual_rate_percent: RatePercent,
    /// Number of monthly installments.
    pub tenure_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiOutput {
    pub emi: Money,
    pub monthly_rate: Rate,
    /// EMI x tenure: what the borrower pays if every installment is nominal.
    pub total_payment: Money,
    pub total_interest: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Calculate the EMI for a loan, with payment totals.
pub fn calculate_emi(input: &EmiInput) -> LoanServicingResult<ComputationOutput<EmiOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let emi = compute_emi(
        input.principal,
        input.annual_rate_percent,
        input.tenure_months,
    )?;

    if input.annual_rate_percent.is_zero() {
        warnings.push("Zero interest rate: EMI is straight-line principal / tenure".into());
    } else if input.annual_rate_percent > dec!(36) {
        warnings.push(format!(
            "Annual rate of {}% is unusually high for a retail loan",
            input.annual_rate_percent
        ));
    }

    let total_payment = emi
        .checked_mul(Decimal::from(input.tenure_months))
        .ok_or_else(|| LoanServicingError::ArithmeticOverflow {
            context: "EMI total payment".into(),
        })?;

    let output = EmiOutput {
        emi,
        monthly_rate: monthly_rate(input.annual_rate_percent),
        total_payment,
        total_interest: total_payment - input.principal,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reducing-balance annuity EMI",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Monthly decimal rate for an annual percentage rate.
pub fn monthly_rate(annual_rate_percent: RatePercent) -> Rate {
    annual_rate_percent / MONTHS_PER_YEAR / PERCENT
}

/// EMI = P x r x (1+r)^n / ((1+r)^n - 1), or P / n when the rate is zero.
pub fn compute_emi(
    principal: Money,
    annual_rate_percent: RatePercent,
    tenure_months: u32,
) -> LoanServicingResult<Money> {
    validate_loan_terms(principal, annual_rate_percent, tenure_months)?;

    let r = monthly_rate(annual_rate_percent);
    if r.is_zero() {
        return Ok((principal / Decimal::from(tenure_months)).round_dp(MONEY_DP));
    }

    let growth = compound_growth(r, tenure_months)?;
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        return Err(LoanServicingError::DivisionByZero {
            context: "EMI annuity factor".into(),
        });
    }

    let emi = principal
        .checked_mul(r)
        .and_then(|v| v.checked_mul(growth / denominator))
        .ok_or_else(|| LoanServicingError::ArithmeticOverflow {
            context: "EMI annuity formula".into(),
        })?;

    Ok(emi.round_dp(MONEY_DP))
}

/// Interest still to be paid if the loan runs its full remaining tenure at
/// the given EMI. Never negative.
pub fn remaining_interest(
    outstanding: Money,
    emi: Money,
    remaining_tenure_months: u32,
) -> LoanServicingResult<Money> {
    if outstanding < Decimal::ZERO {
        return Err(LoanServicingError::invalid(
            "outstanding",
            "Outstanding principal cannot be negative",
        ));
    }
    if emi <= Decimal::ZERO {
        return Err(LoanServicingError::invalid("emi", "EMI must be positive"));
    }

    let total_to_pay = emi
        .checked_mul(Decimal::from(remaining_tenure_months))
        .ok_or_else(|| LoanServicingError::ArithmeticOverflow {
            context: "remaining EMI total".into(),
        })?;

    Ok((total_to_pay - outstanding).max(Decimal::ZERO).round_dp(MONEY_DP))
}

/// (1 + r)^n with overflow reported instead of panicking.
pub(crate) fn compound_growth(r: Rate, months: u32) -> LoanServicingResult<Decimal> {
    (Decimal::ONE + r)
        .checked_powu(u64::from(months))
        .ok_or_else(|| LoanServicingError::ArithmeticOverflow {
            context: format!("(1 + r)^{months}"),
        })
}

pub(crate) fn validate_loan_terms(
    principal: Money,
    annual_rate_percent: RatePercent,
    tenure_months: u32,
) -> LoanServicingResult<()> {
    if principal <= Decimal::ZERO {
        return Err(LoanServicingError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(LoanServicingError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative",
        ));
    }
    if tenure_months == 0 {
        return Err(LoanServicingError::invalid(
            "tenure_months",
            "Tenure must be at least one month",
        ));
    }
    if tenure_months > MAX_TENURE_MONTHS {
        return Err(LoanServicingError::InvalidInput {
            field: "tenure_months".into(),
            reason: format!("Tenure cannot exceed {MAX_TENURE_MONTHS} months"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_emi_reference_home_loan() {
        // 10 lakh at 8.4% over 20 years
        let emi = compute_emi(dec!(1_000_000), dec!(8.4), 240).unwrap();
        assert_eq!(emi, dec!(8615.04));
    }

    #[test]
    fn test_emi_zero_rate_is_straight_line() {
        let emi = compute_emi(dec!(120_000), Decimal::ZERO, 12).unwrap();
        assert_eq!(emi, dec!(10000.00));
    }

    #[test]
    fn test_emi_zero_rate_rounds_to_minor_units() {
        let emi = compute_emi(dec!(100_000), Decimal::ZERO, 3).unwrap();
        assert_eq!(emi, dec!(33333.33));
    }

    #[test]
    fn test_emi_is_deterministic() {
        let a = compute_emi(dec!(5_000_000), dec!(9), 180).unwrap();
        let b = compute_emi(dec!(5_000_000), dec!(9), 180).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, dec!(50713.33));
    }

    #[test]
    fn test_monthly_rate_conversion() {
        assert_eq!(monthly_rate(dec!(8.4)), dec!(0.007));
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
    }

    #[test]
    fn test_emi_rejects_non_positive_principal() {
        let err = compute_emi(Decimal::ZERO, dec!(8), 12).unwrap_err();
        match err {
            LoanServicingError::InvalidInput { field, .. } => assert_eq!(field, "principal"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_emi_rejects_zero_tenure() {
        assert!(compute_emi(dec!(1000), dec!(8), 0).is_err());
    }

    #[test]
    fn test_emi_rejects_negative_rate() {
        assert!(compute_emi(dec!(1000), dec!(-1), 12).is_err());
    }

    #[test]
    fn test_emi_rejects_tenure_above_cap() {
        assert!(compute_emi(dec!(1000), dec!(8), MAX_TENURE_MONTHS + 1).is_err());
    }

    #[test]
    fn test_remaining_interest_clamps_at_zero() {
        let interest = remaining_interest(dec!(50_000), dec!(1_000), 12).unwrap();
        assert_eq!(interest, Decimal::ZERO);

        let interest = remaining_interest(dec!(100_000), dec!(8884.88), 12).unwrap();
        assert_eq!(interest, dec!(6618.56));
    }

    #[test]
    fn test_calculate_emi_totals() {
        let input = EmiInput {
            principal: dec!(120_000),
            annual_rate_percent: Decimal::ZERO,
            tenure_months: 12,
        };
        let out = calculate_emi(&input).unwrap();
        assert_eq!(out.result.total_payment, dec!(120_000));
        assert_eq!(out.result.total_interest, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}
