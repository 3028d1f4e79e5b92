//! Lifetime savings and portfolio overview across all of a borrower's loans.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::savings::{
    percentage, savings_of, validate_loans, validate_prepayments, LoanSnapshot, PrepaymentRecord,
};
use crate::types::{checked_months, checked_sum, with_metadata, ComputationOutput, Money};
use crate::LoanServicingResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallSummaryInput {
    pub loans: Vec<LoanSnapshot>,
    pub prepayments: Vec<PrepaymentRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifetimeTotals {
    pub total_prepayments: Money,
    pub total_interest_saved: Money,
    pub total_tenure_reduced_months: u32,
    pub prepayment_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioOverview {
    pub total_loan_amount: Money,
    /// Outstanding on active loans only.
    pub total_outstanding: Money,
    pub total_paid: Money,
    pub completion_percentage: Decimal,
    pub active_loans: u32,
    pub total_loans: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallSummary {
    pub lifetime: LifetimeTotals,
    pub portfolio: PortfolioOverview,
}

/// Lifetime prepayment totals and portfolio completion.
pub fn overall_summary(
    input: &OverallSummaryInput,
) -> LoanServicingResult<ComputationOutput<OverallSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loans(&input.loans, &mut warnings)?;
    validate_prepayments(&input.prepayments)?;

    let lifetime = LifetimeTotals {
        total_prepayments: checked_sum(
            input.prepayments.iter().map(|p| p.amount),
            "lifetime prepayments",
        )?,
        total_interest_saved: checked_sum(
            input.prepayments.iter().map(savings_of),
            "lifetime interest saved",
        )?,
        total_tenure_reduced_months: checked_months(
            input
                .prepayments
                .iter()
                .map(|p| p.tenure_reduced_months.unwrap_or(0)),
            "lifetime tenure reduced",
        )?,
        prepayment_count: input.prepayments.len() as u32,
    };

    let total_loan_amount =
        checked_sum(input.loans.iter().map(|l| l.loan_amount), "total loan amount")?;
    let total_outstanding = checked_sum(
        input
            .loans
            .iter()
            .filter(|l| l.is_active)
            .map(|l| l.outstanding_principal),
        "total outstanding",
    )?;
    let total_paid = total_loan_amount - total_outstanding;

    let portfolio = PortfolioOverview {
        total_loan_amount,
        total_outstanding,
        total_paid,
        completion_percentage: percentage(total_paid, total_loan_amount)?,
        active_loans: input.loans.iter().filter(|l| l.is_active).count() as u32,
        total_loans: input.loans.len() as u32,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Lifetime prepayment savings summary",
        input,
        warnings,
        elapsed,
        OverallSummary {
            lifetime,
            portfolio,
        },
    ))
}
