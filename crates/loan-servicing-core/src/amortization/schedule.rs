//! Month-by-month amortization schedules.
//!
//! Each month's interest is charged on the running balance and rounded once
//! to minor units; the principal component is whatever the EMI leaves after
//! interest, capped at the balance. Rows are dated on a fixed 30-day month
//! from the start date. The schedule stops the first month the balance
//! reaches zero, so it can be shorter than the nominal tenure.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::emi::{
    compound_growth, compute_emi, monthly_rate, validate_loan_terms, MAX_TENURE_MONTHS,
    MINOR_UNIT, MONEY_DP,
};
use crate::error::LoanServicingError;
use crate::types::{checked_sum, with_metadata, ComputationOutput, Money, Rate, RatePercent};
use crate::LoanServicingResult;

/// Days added per schedule month.
const DAYS_PER_MONTH: u64 = 30;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One installment of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based installment number.
    pub month: u32,
    /// Start date + 30 x month days.
    pub date: NaiveDate,
    /// Nominal installment.
    pub emi: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    /// Balance after this installment. Never negative.
    pub outstanding_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub principal: Money,
    /// Annual interest rate in percent (8.4 = 8.4%).
    pub annual_rate_percent: RatePercent,
    pub tenure_months: u32,
    /// Installment to schedule with. Computed from the loan terms when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emi: Option<Money>,
    /// Defaults to today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub emi: Money,
    pub schedule: Vec<AmortizationRow>,
    pub total_interest: Money,
    pub total_payment: Money,
    pub months_to_closure: u32,
    pub closure_date: Option<NaiveDate>,
    pub fully_amortized: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build a full amortization schedule with totals.
pub fn build_amortization(
    input: &AmortizationInput,
) -> LoanServicingResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan_terms(
        input.principal,
        input.annual_rate_percent,
        input.tenure_months,
    )?;

    let emi = match input.emi {
        Some(emi) => emi,
        None => compute_emi(
            input.principal,
            input.annual_rate_percent,
            input.tenure_months,
        )?,
    };
    let start_date = input.start_date.unwrap_or_else(super::today);

    let first_interest = input
        .principal
        .checked_mul(monthly_rate(input.annual_rate_percent))
        .ok_or_else(|| LoanServicingError::ArithmeticOverflow {
            context: "first-month interest".into(),
        })?
        .round_dp(MONEY_DP);
    if emi <= first_interest {
        warnings.push(format!(
            "EMI of {emi} does not cover first-month interest of {first_interest}; \
             the balance will not amortize"
        ));
    }

    let schedule = generate_schedule(
        input.principal,
        input.annual_rate_percent,
        emi,
        input.tenure_months,
        start_date,
    )?;

    let fully_amortized = is_fully_amortized(&schedule);
    if !fully_amortized {
        let residual = schedule
            .last()
            .map(|row| row.outstanding_balance)
            .unwrap_or(input.principal);
        warnings.push(format!(
            "Balance of {residual} remains after {} months",
            schedule.len()
        ));
    }

    let interest = total_interest(&schedule)?;
    let total_payment = interest
        .checked_add(total_principal(&schedule)?)
        .ok_or_else(|| LoanServicingError::ArithmeticOverflow {
            context: "schedule total payment".into(),
        })?;
    let output = AmortizationOutput {
        emi,
        total_interest: interest,
        total_payment,
        months_to_closure: schedule.len() as u32,
        closure_date: closure_date(&schedule),
        fully_amortized,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reducing-balance amortization (30-day month)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Generate the month-by-month schedule for a loan paid at a fixed EMI.
///
/// At most `tenure_months` rows are produced; a zero tenure gives an empty
/// schedule. When the EMI does not cover interest the balance stagnates or
/// grows and the schedule simply runs to the end of the tenure.
pub fn generate_schedule(
    principal: Money,
    annual_rate_percent: RatePercent,
    emi: Money,
    tenure_months: u32,
    start_date: NaiveDate,
) -> LoanServicingResult<Vec<AmortizationRow>> {
    validate_schedule_inputs(principal, annual_rate_percent, emi, tenure_months)?;

    let r = monthly_rate(annual_rate_percent);
    let settle_bound = rounding_residual_bound(r, tenure_months);
    let mut outstanding = principal;
    let mut rows = Vec::with_capacity(tenure_months as usize);

    for month in 1..=tenure_months {
        let interest = outstanding
            .checked_mul(r)
            .ok_or_else(|| overflow(month))?
            .round_dp(MONEY_DP);
        let mut principal_paid = (emi - interest).round_dp(MONEY_DP).min(outstanding);
        outstanding = outstanding
            .checked_sub(principal_paid)
            .ok_or_else(|| overflow(month))?
            .max(Decimal::ZERO);

        // Last installment settles what minor-unit rounding left behind.
        if month == tenure_months
            && outstanding > Decimal::ZERO
            && emi > interest
            && outstanding <= settle_bound
        {
            principal_paid += outstanding;
            outstanding = Decimal::ZERO;
        }

        rows.push(AmortizationRow {
            month,
            date: installment_date(start_date, month)?,
            emi,
            principal_component: principal_paid,
            interest_component: interest,
            outstanding_balance: outstanding,
        });

        if outstanding.is_zero() {
            break;
        }
    }

    Ok(rows)
}

/// Sum of interest across a schedule.
pub fn total_interest(rows: &[AmortizationRow]) -> LoanServicingResult<Money> {
    checked_sum(rows.iter().map(|row| row.interest_component), "schedule total interest")
}

/// Sum of principal repaid across a schedule.
pub fn total_principal(rows: &[AmortizationRow]) -> LoanServicingResult<Money> {
    checked_sum(rows.iter().map(|row| row.principal_component), "schedule total principal")
}

/// Date of the final installment, if any.
pub fn closure_date(rows: &[AmortizationRow]) -> Option<NaiveDate> {
    rows.last().map(|row| row.date)
}

/// True when the schedule ends with a zero balance.
pub fn is_fully_amortized(rows: &[AmortizationRow]) -> bool {
    rows.last()
        .is_some_and(|row| row.outstanding_balance.is_zero())
}

/// Date of installment `month`: start date + 30 x month days.
pub fn installment_date(start_date: NaiveDate, month: u32) -> LoanServicingResult<NaiveDate> {
    start_date
        .checked_add_days(Days::new(DAYS_PER_MONTH * u64::from(month)))
        .ok_or_else(|| {
            LoanServicingError::DateError(format!(
                "installment {month} from {start_date} is out of range"
            ))
        })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Largest balance that minor-unit rounding of the EMI and of each month's
/// interest can leave at the end of `months` installments: one minor unit a
/// month, compounded at the loan rate.
fn rounding_residual_bound(r: Rate, months: u32) -> Money {
    if months == 0 {
        return Decimal::ZERO;
    }
    if r.is_zero() {
        return MINOR_UNIT * Decimal::from(months);
    }
    match compound_growth(r, months) {
        Ok(growth) => MINOR_UNIT * (growth - Decimal::ONE) / r,
        Err(_) => Decimal::ZERO,
    }
}

fn overflow(month: u32) -> LoanServicingError {
    LoanServicingError::ArithmeticOverflow {
        context: format!("schedule balance at month {month}"),
    }
}

fn validate_schedule_inputs(
    principal: Money,
    annual_rate_percent: RatePercent,
    emi: Money,
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
    if emi <= Decimal::ZERO {
        return Err(LoanServicingError::invalid("emi", "EMI must be positive"));
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
