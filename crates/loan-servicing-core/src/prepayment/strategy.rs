//! Prepayment strategy resolver.
//!
//! A prepayment reduces the outstanding principal, after which the loan is
//! re-amortized either at a lower EMI over the same tenure
//! ([`PrepaymentStrategy::ReduceEmi`]) or at the same EMI over the shortest
//! tenure that clears the reduced principal
//! ([`PrepaymentStrategy::ReduceTenure`]). Interest saved is always read off
//! the two materialized schedules, never estimated analytically.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amortization::emi::{compute_emi, monthly_rate, validate_loan_terms};
use crate::amortization::schedule::{
    generate_schedule, is_fully_amortized, total_interest, AmortizationRow,
};
use crate::error::LoanServicingError;
use crate::types::{Money, Rate, RatePercent};
use crate::LoanServicingResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How a prepayment is applied to the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepaymentStrategy {
    /// Keep the tenure, lower the installment.
    ReduceEmi,
    /// Keep the installment, shorten the tenure.
    ReduceTenure,
}

impl fmt::Display for PrepaymentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepaymentStrategy::ReduceEmi => write!(f, "reduce_emi"),
            PrepaymentStrategy::ReduceTenure => write!(f, "reduce_tenure"),
        }
    }
}

/// Current terms of the loan the prepayment is applied to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Outstanding principal.
    pub principal: Money,
    /// Annual interest rate in percent (8.4 = 8.4%).
    pub annual_rate_percent: RatePercent,
    /// Remaining tenure.
    pub tenure_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentRequest {
    pub prepayment_amount: Money,
    pub strategy: PrepaymentStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentResolution {
    pub strategy: PrepaymentStrategy,
    /// Set for [`PrepaymentStrategy::ReduceEmi`] only.
    pub new_emi: Option<Money>,
    /// Set for [`PrepaymentStrategy::ReduceTenure`] only.
    pub new_tenure_months: Option<u32>,
    /// Interest over `schedule_before` minus interest over `schedule_after`.
    pub interest_saved: Money,
    pub schedule_before: Vec<AmortizationRow>,
    pub schedule_after: Vec<AmortizationRow>,
}

impl PrepaymentResolution {
    /// Months cut from the remaining tenure (reduce-tenure only).
    pub fn tenure_reduced_months(&self, remaining_tenure_months: u32) -> Option<u32> {
        self.new_tenure_months
            .map(|tenure| remaining_tenure_months.saturating_sub(tenure))
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Apply a lump-sum prepayment to a loan and compare the schedules.
pub fn resolve_prepayment(
    terms: &LoanTerms,
    current_emi: Money,
    request: &PrepaymentRequest,
    start_date: NaiveDate,
) -> LoanServicingResult<PrepaymentResolution> {
    resolve_with_warnings(terms, current_emi, request, start_date).map(|(res, _)| res)
}

pub(crate) fn resolve_with_warnings(
    terms: &LoanTerms,
    current_emi: Money,
    request: &PrepaymentRequest,
    start_date: NaiveDate,
) -> LoanServicingResult<(PrepaymentResolution, Vec<String>)> {
    validate_resolution(terms, current_emi, request)?;
    let mut warnings: Vec<String> = Vec::new();

    let schedule_before = generate_schedule(
        terms.principal,
        terms.annual_rate_percent,
        current_emi,
        terms.tenure_months,
        start_date,
    )?;
    if !is_fully_amortized(&schedule_before) {
        tracing::warn!(
            emi = %current_emi,
            principal = %terms.principal,
            "current EMI does not clear the loan within the remaining tenure"
        );
        warnings.push(format!(
            "Current EMI of {current_emi} does not repay {} within {} months",
            terms.principal, terms.tenure_months
        ));
    }

    let reduced_principal = terms.principal - request.prepayment_amount;

    let (new_emi, new_tenure_months, schedule_after) = match request.strategy {
        PrepaymentStrategy::ReduceEmi => {
            let emi = compute_emi(
                reduced_principal,
                terms.annual_rate_percent,
                terms.tenure_months,
            )?;
            let after = generate_schedule(
                reduced_principal,
                terms.annual_rate_percent,
                emi,
                terms.tenure_months,
                start_date,
            )?;
            (Some(emi), None, after)
        }
        PrepaymentStrategy::ReduceTenure => {
            let tenure = reduced_tenure(
                reduced_principal,
                monthly_rate(terms.annual_rate_percent),
                current_emi,
                terms.tenure_months,
                &mut warnings,
            )?;
            let after = generate_schedule(
                reduced_principal,
                terms.annual_rate_percent,
                current_emi,
                tenure,
                start_date,
            )?;
            (None, Some(tenure), after)
        }
    };

    let interest_saved = total_interest(&schedule_before)? - total_interest(&schedule_after)?;
    tracing::debug!(
        strategy = %request.strategy,
        interest_saved = %interest_saved,
        "prepayment resolved"
    );

    Ok((
        PrepaymentResolution {
            strategy: request.strategy,
            new_emi,
            new_tenure_months,
            interest_saved,
            schedule_before,
            schedule_after,
        },
        warnings,
    ))
}

// ---------------------------------------------------------------------------
// Tenure solver
// ---------------------------------------------------------------------------

/// Smallest whole tenure that clears `principal` at a fixed `emi`:
/// n = ceil( ln(emi / (emi - P x r)) / ln(1 + r) ), or floor(P / emi) when
/// the rate is zero. Falls back to the remaining tenure when the EMI cannot
/// cover a month's interest, and never exceeds it.
fn reduced_tenure(
    principal: Money,
    r: Rate,
    emi: Money,
    remaining_tenure_months: u32,
    warnings: &mut Vec<String>,
) -> LoanServicingResult<u32> {
    let monthly_interest = principal.checked_mul(r).ok_or_else(|| {
        LoanServicingError::ArithmeticOverflow {
            context: "monthly interest on reduced principal".into(),
        }
    })?;
    if emi <= monthly_interest {
        tracing::debug!(
            emi = %emi,
            monthly_interest = %monthly_interest,
            "EMI does not cover interest on reduced principal; tenure unchanged"
        );
        warnings.push(format!(
            "EMI of {emi} does not cover monthly interest of {} on the reduced \
             principal; tenure left at {remaining_tenure_months} months",
            monthly_interest.round_dp(2)
        ));
        return Ok(remaining_tenure_months);
    }

    let tenure = if r.is_zero() {
        let months = to_months((principal / emi).floor())?;
        let residual = principal - emi * Decimal::from(months);
        if residual > Decimal::ZERO {
            warnings.push(format!(
                "Straight-line tenure of {months} months leaves {residual} unpaid"
            ));
        }
        months
    } else {
        let numerator = (emi / (emi - monthly_interest))
            .checked_ln()
            .ok_or_else(|| {
                LoanServicingError::FinancialImpossibility(
                    "EMI-to-net-payment ratio has no logarithm".into(),
                )
            })?;
        let denominator = (Decimal::ONE + r).checked_ln().ok_or_else(|| {
            LoanServicingError::FinancialImpossibility("ln(1 + r) is undefined".into())
        })?;
        if denominator.is_zero() {
            return Err(LoanServicingError::DivisionByZero {
                context: "tenure solver ln(1 + r)".into(),
            });
        }
        to_months((numerator / denominator).ceil())?
    };

    if tenure > remaining_tenure_months {
        warnings.push(format!(
            "EMI of {emi} needs {tenure} months to clear the reduced principal; \
             capped at the remaining {remaining_tenure_months} months"
        ));
        return Ok(remaining_tenure_months);
    }
    Ok(tenure)
}

fn to_months(value: Decimal) -> LoanServicingResult<u32> {
    value
        .to_u32()
        .ok_or_else(|| LoanServicingError::ArithmeticOverflow {
            context: format!("tenure of {value} months"),
        })
}

fn validate_resolution(
    terms: &LoanTerms,
    current_emi: Money,
    request: &PrepaymentRequest,
) -> LoanServicingResult<()> {
    validate_loan_terms(
        terms.principal,
        terms.annual_rate_percent,
        terms.tenure_months,
    )?;
    if current_emi <= Decimal::ZERO {
        return Err(LoanServicingError::invalid(
            "current_emi",
            "EMI must be positive",
        ));
    }
    if request.prepayment_amount <= Decimal::ZERO {
        return Err(LoanServicingError::invalid(
            "prepayment_amount",
            "Prepayment amount must be positive",
        ));
    }
    if request.prepayment_amount >= terms.principal {
        return Err(LoanServicingError::invalid(
            "prepayment_amount",
            "Prepayment must be less than the outstanding principal; \
             a full repayment is a foreclosure",
        ));
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

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn small_loan() -> LoanTerms {
        LoanTerms {
            principal: dec!(100_000),
            annual_rate_percent: dec!(12),
            tenure_months: 12,
        }
    }

    fn request(amount: Decimal, strategy: PrepaymentStrategy) -> PrepaymentRequest {
        PrepaymentRequest {
            prepayment_amount: amount,
            strategy,
        }
    }

    #[test]
    fn test_reduce_emi_small_loan() {
        let res = resolve_prepayment(
            &small_loan(),
            dec!(8884.88),
            &request(dec!(20_000), PrepaymentStrategy::ReduceEmi),
            start(),
        )
        .unwrap();
        assert_eq!(res.new_emi, Some(dec!(7107.90)));
        assert_eq!(res.new_tenure_months, None);
        assert_eq!(res.interest_saved, dec!(1323.70));
        assert_eq!(res.schedule_after.len(), 12);
        assert!(is_fully_amortized(&res.schedule_after));
    }

    #[test]
    fn test_reduce_tenure_small_loan() {
        let res = resolve_prepayment(
            &small_loan(),
            dec!(8884.88),
            &request(dec!(20_000), PrepaymentStrategy::ReduceTenure),
            start(),
        )
        .unwrap();
        assert_eq!(res.new_emi, None);
        assert_eq!(res.new_tenure_months, Some(10));
        assert_eq!(res.tenure_reduced_months(12), Some(2));
        assert_eq!(res.interest_saved, dec!(2355.47));
        assert_eq!(res.schedule_after.len(), 10);
        assert_eq!(
            res.schedule_after.last().unwrap().outstanding_balance,
            Decimal::ZERO
        );
    }

    #[test]
    fn test_reduce_tenure_falls_back_when_emi_below_interest() {
        let mut warnings = Vec::new();
        let tenure =
            reduced_tenure(dec!(90_000), dec!(0.01), dec!(800), 12, &mut warnings).unwrap();
        assert_eq!(tenure, 12);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_reduce_tenure_zero_rate_uses_floor() {
        let mut warnings = Vec::new();
        let tenure =
            reduced_tenure(dec!(100_000), Decimal::ZERO, dec!(30_000), 12, &mut warnings)
                .unwrap();
        assert_eq!(tenure, 3);
        // 10,000 is left over by the straight-line tenure
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_reduce_tenure_capped_at_remaining() {
        let mut warnings = Vec::new();
        // 9,000 at 1%/month needs ~11 months; only 6 remain
        let tenure =
            reduced_tenure(dec!(9_000), dec!(0.01), dec!(850), 6, &mut warnings).unwrap();
        assert_eq!(tenure, 6);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_reduce_tenure_interest_overflow_is_an_error() {
        let mut warnings = Vec::new();
        let err = reduced_tenure(Decimal::MAX, dec!(2), dec!(1_000), 12, &mut warnings)
            .unwrap_err();
        assert!(matches!(err, LoanServicingError::ArithmeticOverflow { .. }));
    }

    #[test]
    fn test_rejects_prepayment_at_or_above_principal() {
        let err = resolve_prepayment(
            &small_loan(),
            dec!(8884.88),
            &request(dec!(100_000), PrepaymentStrategy::ReduceEmi),
            start(),
        )
        .unwrap_err();
        match err {
            LoanServicingError::InvalidInput { field, .. } => {
                assert_eq!(field, "prepayment_amount")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_non_positive_emi() {
        let result = resolve_prepayment(
            &small_loan(),
            Decimal::ZERO,
            &request(dec!(1_000), PrepaymentStrategy::ReduceTenure),
            start(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_strategy_wire_names() {
        assert_eq!(
            serde_json::to_string(&PrepaymentStrategy::ReduceEmi).unwrap(),
            "\"reduce_emi\""
        );
        let parsed: PrepaymentStrategy = serde_json::from_str("\"reduce_tenure\"").unwrap();
        assert_eq!(parsed, PrepaymentStrategy::ReduceTenure);
        assert_eq!(PrepaymentStrategy::ReduceTenure.to_string(), "reduce_tenure");
    }
}
