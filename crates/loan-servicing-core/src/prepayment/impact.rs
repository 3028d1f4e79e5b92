//! Prepayment impact: the request/response boundary used by the calculator
//! endpoint and the negotiation and report flows.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::strategy::{
    resolve_with_warnings, LoanTerms, PrepaymentRequest, PrepaymentStrategy,
};
use crate::amortization::schedule::{closure_date, AmortizationRow};
use crate::error::LoanServicingError;
use crate::types::{with_metadata, ComputationOutput, Money, RatePercent};
use crate::LoanServicingResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentInput {
    /// Outstanding principal before the prepayment.
    pub loan_amount: Money,
    /// Annual interest rate in percent (8.4 = 8.4%).
    pub interest_rate: RatePercent,
    pub remaining_tenure_months: u32,
    /// Current EMI.
    pub emi_amount: Money,
    pub prepayment_amount: Money,
    pub strategy: PrepaymentStrategy,
    /// First schedule date is start + 30 days. Defaults to today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentOutput {
    pub new_emi: Option<Money>,
    pub new_tenure_months: Option<u32>,
    pub interest_saved: Money,
    pub tenure_reduced: Option<u32>,
    pub new_closure_date: Option<NaiveDate>,
    pub amortization_before: Vec<AmortizationRow>,
    pub amortization_after: Vec<AmortizationRow>,
}

/// Analyse the impact of a lump-sum prepayment under the chosen strategy.
pub fn analyze_prepayment(
    input: &PrepaymentInput,
) -> LoanServicingResult<ComputationOutput<PrepaymentOutput>> {
    let start = Instant::now();
    validate_prepayment_input(input)?;

    let terms = LoanTerms {
        principal: input.loan_amount,
        annual_rate_percent: input.interest_rate,
        tenure_months: input.remaining_tenure_months,
    };
    let request = PrepaymentRequest {
        prepayment_amount: input.prepayment_amount,
        strategy: input.strategy,
    };
    let start_date = input
        .start_date
        .unwrap_or_else(crate::amortization::today);

    let (resolution, mut warnings) =
        resolve_with_warnings(&terms, input.emi_amount, &request, start_date)?;

    if resolution.interest_saved < Decimal::ZERO {
        warnings.push(format!(
            "Prepayment increases total interest by {}",
            -resolution.interest_saved
        ));
    }

    let tenure_reduced = resolution.tenure_reduced_months(input.remaining_tenure_months);
    let output = PrepaymentOutput {
        new_emi: resolution.new_emi,
        new_tenure_months: resolution.new_tenure_months,
        interest_saved: resolution.interest_saved,
        tenure_reduced,
        new_closure_date: closure_date(&resolution.schedule_after),
        amortization_before: resolution.schedule_before,
        amortization_after: resolution.schedule_after,
    };

    let methodology = match input.strategy {
        PrepaymentStrategy::ReduceEmi => "Prepayment impact: reduce EMI, tenure unchanged",
        PrepaymentStrategy::ReduceTenure => "Prepayment impact: reduce tenure, EMI unchanged",
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

fn validate_prepayment_input(input: &PrepaymentInput) -> LoanServicingResult<()> {
    let positive = [
        ("loan_amount", input.loan_amount),
        ("interest_rate", input.interest_rate),
        ("emi_amount", input.emi_amount),
        ("prepayment_amount", input.prepayment_amount),
    ];
    for (field, value) in positive {
        if value <= Decimal::ZERO {
            return Err(LoanServicingError::invalid(field, "Must be greater than zero"));
        }
    }
    if input.remaining_tenure_months == 0 {
        return Err(LoanServicingError::invalid(
            "remaining_tenure_months",
            "Must be greater than zero",
        ));
    }
    Ok(())
}
