//! Periodic (monthly / annual) savings report.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::period::{ReportPeriod, ReportType};
use crate::error::LoanServicingError;
use crate::prepayment::strategy::PrepaymentStrategy;
use crate::types::{
    checked_months, checked_sum, with_metadata, ComputationOutput, Money, RatePercent,
};
use crate::LoanServicingResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A borrower's loan as currently booked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSnapshot {
    pub bank_name: String,
    pub loan_amount: Money,
    pub outstanding_principal: Money,
    /// Annual interest rate in percent.
    pub interest_rate: RatePercent,
    pub emi_amount: Money,
    pub remaining_tenure_months: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// A prepayment already made, with the impact recorded at the time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentRecord {
    pub payment_date: NaiveDate,
    pub amount: Money,
    pub strategy: PrepaymentStrategy,
    #[serde(default)]
    pub interest_saved: Option<Money>,
    #[serde(default)]
    pub tenure_reduced_months: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsReportInput {
    pub report_type: ReportType,
    /// `YYYY-MM` for monthly, `YYYY` for annual.
    pub period: String,
    pub loans: Vec<LoanSnapshot>,
    pub prepayments: Vec<PrepaymentRecord>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub bank_name: String,
    pub loan_amount: Money,
    pub outstanding: Money,
    pub paid_off: Money,
    pub interest_rate: RatePercent,
    pub emi_amount: Money,
    pub remaining_months: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub total_outstanding: Money,
    pub total_paid_off: Money,
    pub total_loan_amount: Money,
    /// Paid off as a percentage of outstanding + paid off.
    pub completion_percentage: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyTally {
    pub count: u32,
    pub amount: Money,
    pub savings: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months_saved: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyBreakdown {
    pub reduce_emi: StrategyTally,
    pub reduce_tenure: StrategyTally,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedPrepayment {
    pub date: NaiveDate,
    pub amount: Money,
    pub savings: Money,
    pub strategy: PrepaymentStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsReport {
    pub report_type: ReportType,
    pub period: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_prepayments: Money,
    pub total_interest_saved: Money,
    pub total_tenure_reduced_months: u32,
    pub prepayment_count: u32,
    pub portfolio: Vec<PortfolioEntry>,
    pub totals: PortfolioTotals,
    pub strategy_breakdown: StrategyBreakdown,
    pub prepayments: Vec<DatedPrepayment>,
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the savings report for one monthly or annual period.
pub fn generate_savings_report(
    input: &SavingsReportInput,
) -> LoanServicingResult<ComputationOutput<SavingsReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let period = ReportPeriod::parse(input.report_type, &input.period)?;
    validate_loans(&input.loans, &mut warnings)?;
    validate_prepayments(&input.prepayments)?;

    let in_period: Vec<&PrepaymentRecord> = input
        .prepayments
        .iter()
        .filter(|p| period.contains(p.payment_date))
        .collect();
    let excluded = input.prepayments.len() - in_period.len();
    if excluded > 0 {
        warnings.push(format!(
            "{excluded} prepayment(s) outside {} excluded",
            period.describe()
        ));
    }

    let total_prepayments =
        checked_sum(in_period.iter().map(|p| p.amount), "total prepayments")?;
    let total_interest_saved =
        checked_sum(in_period.iter().map(|p| savings_of(p)), "total interest saved")?;
    let total_tenure_reduced_months = checked_months(
        in_period.iter().map(|p| p.tenure_reduced_months.unwrap_or(0)),
        "total tenure reduced",
    )?;

    let portfolio: Vec<PortfolioEntry> = input.loans.iter().map(portfolio_entry).collect();
    let totals = portfolio_totals(&portfolio)?;

    let prepayments: Vec<DatedPrepayment> = in_period
        .iter()
        .map(|p| DatedPrepayment {
            date: p.payment_date,
            amount: p.amount,
            savings: savings_of(p),
            strategy: p.strategy,
        })
        .collect();

    let summary = format!(
        "During {}, you made {} in prepayments across {} loan(s), saving {} in interest.",
        period.describe(),
        total_prepayments.round_dp(0),
        input.loans.len(),
        total_interest_saved.round_dp(0),
    );

    let output = SavingsReport {
        report_type: input.report_type,
        period: period.label.clone(),
        period_start: period.start,
        period_end: period.end,
        total_prepayments,
        total_interest_saved,
        total_tenure_reduced_months,
        prepayment_count: in_period.len() as u32,
        portfolio,
        totals,
        strategy_breakdown: strategy_breakdown(&in_period)?,
        prepayments,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Periodic prepayment savings report",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Count, amount and savings per strategy. Months saved only apply to
/// reduce-tenure prepayments.
pub fn strategy_breakdown(
    prepayments: &[&PrepaymentRecord],
) -> LoanServicingResult<StrategyBreakdown> {
    let mut reduce_emi = StrategyTally::default();
    let mut reduce_tenure = StrategyTally {
        months_saved: Some(0),
        ..StrategyTally::default()
    };

    for p in prepayments {
        let tally = match p.strategy {
            PrepaymentStrategy::ReduceEmi => &mut reduce_emi,
            PrepaymentStrategy::ReduceTenure => &mut reduce_tenure,
        };
        tally.count += 1;
        tally.amount = checked_sum([tally.amount, p.amount], "strategy amount")?;
        tally.savings = checked_sum([tally.savings, savings_of(p)], "strategy savings")?;
        if let Some(months) = tally.months_saved {
            tally.months_saved = Some(checked_months(
                [months, p.tenure_reduced_months.unwrap_or(0)],
                "strategy months saved",
            )?);
        }
    }

    Ok(StrategyBreakdown {
        reduce_emi,
        reduce_tenure,
    })
}

/// Paid off vs. outstanding across every loan, active or not.
pub fn portfolio_totals(portfolio: &[PortfolioEntry]) -> LoanServicingResult<PortfolioTotals> {
    let total_outstanding =
        checked_sum(portfolio.iter().map(|e| e.outstanding), "total outstanding")?;
    let total_paid_off = checked_sum(portfolio.iter().map(|e| e.paid_off), "total paid off")?;
    let total_loan_amount =
        checked_sum([total_outstanding, total_paid_off], "total loan amount")?;

    Ok(PortfolioTotals {
        total_outstanding,
        total_paid_off,
        total_loan_amount,
        completion_percentage: percentage(total_paid_off, total_loan_amount)?,
    })
}

pub(crate) fn portfolio_entry(loan: &LoanSnapshot) -> PortfolioEntry {
    PortfolioEntry {
        bank_name: loan.bank_name.clone(),
        loan_amount: loan.loan_amount,
        outstanding: loan.outstanding_principal,
        paid_off: loan.loan_amount - loan.outstanding_principal,
        interest_rate: loan.interest_rate,
        emi_amount: loan.emi_amount,
        remaining_months: loan.remaining_tenure_months,
        is_active: loan.is_active,
    }
}

pub(crate) fn savings_of(p: &PrepaymentRecord) -> Money {
    p.interest_saved.unwrap_or(Decimal::ZERO)
}

/// part / whole x 100 to 2 dp; zero when `whole` is not positive.
pub(crate) fn percentage(part: Money, whole: Money) -> LoanServicingResult<Decimal> {
    if whole <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .map(|pct| pct.round_dp(2))
        .ok_or_else(|| LoanServicingError::ArithmeticOverflow {
            context: "completion percentage".into(),
        })
}

pub(crate) fn validate_loans(
    loans: &[LoanSnapshot],
    warnings: &mut Vec<String>,
) -> LoanServicingResult<()> {
    for (i, loan) in loans.iter().enumerate() {
        if loan.loan_amount <= Decimal::ZERO {
            return Err(LoanServicingError::InvalidInput {
                field: format!("loans[{i}].loan_amount"),
                reason: "Loan amount must be positive".into(),
            });
        }
        if loan.outstanding_principal < Decimal::ZERO {
            return Err(LoanServicingError::InvalidInput {
                field: format!("loans[{i}].outstanding_principal"),
                reason: "Outstanding principal cannot be negative".into(),
            });
        }
        if loan.outstanding_principal > loan.loan_amount {
            warnings.push(format!(
                "{}: outstanding {} exceeds the original loan amount {}",
                loan.bank_name, loan.outstanding_principal, loan.loan_amount
            ));
        }
    }
    Ok(())
}

pub(crate) fn validate_prepayments(prepayments: &[PrepaymentRecord]) -> LoanServicingResult<()> {
    for (i, p) in prepayments.iter().enumerate() {
        if p.amount <= Decimal::ZERO {
            return Err(LoanServicingError::InvalidInput {
                field: format!("prepayments[{i}].amount"),
                reason: "Prepayment amount must be positive".into(),
            });
        }
    }
    Ok(())
}
