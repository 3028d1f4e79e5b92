//! Where a running loan stands on a given date: remaining tenure, next
//! installment date and outstanding principal.
//!
//! Tenure and installment dates here follow the calendar (monthly
//! anniversaries of the start date). Outstanding principal is read off the
//! loan's own amortization schedule after the elapsed installments.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::emi::{compute_emi, remaining_interest, validate_loan_terms};
use super::schedule::generate_schedule;
use crate::error::LoanServicingError;
use crate::types::{with_metadata, ComputationOutput, Money, RatePercent};
use crate::LoanServicingResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPositionInput {
    pub loan_amount: Money,
    /// Annual interest rate in percent (8.4 = 8.4%).
    pub annual_rate_percent: RatePercent,
    pub tenure_months: u32,
    /// Contractual EMI. Computed from the loan terms when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emi_amount: Option<Money>,
    pub start_date: NaiveDate,
    /// Valuation date. Defaults to today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPosition {
    pub emi: Money,
    pub end_date: NaiveDate,
    pub months_elapsed: u32,
    pub remaining_tenure_months: u32,
    pub next_emi_date: NaiveDate,
    pub outstanding_principal: Money,
    /// Interest still payable at the EMI over the remaining tenure.
    pub interest_remaining: Money,
}

/// Derive the current position of a loan from its contractual terms.
pub fn loan_position(
    input: &LoanPositionInput,
) -> LoanServicingResult<ComputationOutput<LoanPosition>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan_terms(
        input.loan_amount,
        input.annual_rate_percent,
        input.tenure_months,
    )?;

    let emi = match input.emi_amount {
        Some(emi) if emi <= Decimal::ZERO => {
            return Err(LoanServicingError::invalid(
                "emi_amount",
                "EMI must be positive",
            ));
        }
        Some(emi) => emi,
        None => compute_emi(
            input.loan_amount,
            input.annual_rate_percent,
            input.tenure_months,
        )?,
    };
    let as_of = input.as_of.unwrap_or_else(super::today);

    let end_date = add_months(input.start_date, input.tenure_months)?;
    if as_of < input.start_date {
        warnings.push(format!(
            "Valuation date {as_of} precedes loan start {}",
            input.start_date
        ));
    }
    if as_of >= end_date {
        warnings.push(format!("Loan reached its scheduled end date on {end_date}"));
    }

    let remaining_tenure_months =
        months_between(as_of, end_date).clamp(1, i64::from(input.tenure_months)) as u32;
    let months_elapsed = input.tenure_months - remaining_tenure_months;
    let next_emi_date = next_installment(input.start_date, end_date, as_of)?;

    let outstanding_principal = if months_elapsed == 0 {
        input.loan_amount
    } else {
        let schedule = generate_schedule(
            input.loan_amount,
            input.annual_rate_percent,
            emi,
            input.tenure_months,
            input.start_date,
        )?;
        // A schedule shorter than the elapsed months closed early.
        schedule
            .get(months_elapsed as usize - 1)
            .map(|row| row.outstanding_balance)
            .unwrap_or(Decimal::ZERO)
    };

    let output = LoanPosition {
        emi,
        end_date,
        months_elapsed,
        remaining_tenure_months,
        next_emi_date,
        outstanding_principal,
        interest_remaining: remaining_interest(
            outstanding_principal,
            emi,
            remaining_tenure_months,
        )?,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Calendar-month loan position",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn add_months(date: NaiveDate, months: u32) -> LoanServicingResult<NaiveDate> {
    date.checked_add_months(Months::new(months)).ok_or_else(|| {
        LoanServicingError::DateError(format!("{date} + {months} months is out of range"))
    })
}

/// Whole calendar months from `from` to `to`, ignoring the day of month.
fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month())
}

/// First monthly anniversary of `start` strictly after `as_of`, never past `end`.
fn next_installment(
    start: NaiveDate,
    end: NaiveDate,
    as_of: NaiveDate,
) -> LoanServicingResult<NaiveDate> {
    let mut k = 1;
    loop {
        let due = add_months(start, k)?;
        if due >= end {
            return Ok(end);
        }
        if due > as_of {
            return Ok(due);
        }
        k += 1;
    }
}
