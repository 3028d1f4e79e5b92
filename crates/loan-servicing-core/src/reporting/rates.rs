//! How a borrower's rate compares with what banks are currently offering.
//!
//! The comparison is made for the first active loan. When no market rates
//! are supplied, the borrower's own active loans stand in as the market.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::savings::{validate_loans, LoanSnapshot};
use crate::error::LoanServicingError;
use crate::types::{checked_sum, with_metadata, ComputationOutput, Money, RatePercent};
use crate::LoanServicingResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A home-loan rate quoted by a bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRate {
    pub bank_name: String,
    /// Annual interest rate in percent.
    pub interest_rate: RatePercent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_fee: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateComparisonInput {
    pub loans: Vec<LoanSnapshot>,
    #[serde(default)]
    pub market_rates: Vec<MarketRate>,
}

/// Where the comparison rates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Market,
    UserLoans,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateComparison {
    pub bank_name: String,
    pub user_loan_rate: RatePercent,
    pub current_market_avg: RatePercent,
    pub best_available_rate: RatePercent,
    /// User rate minus best rate, in percentage points.
    pub rate_diff: RatePercent,
    /// Outstanding x rate_diff / 100. Negative when the user already beats
    /// every quote.
    pub potential_annual_savings: Money,
    pub rate_source: RateSource,
    pub banks_below_user_rate: Vec<MarketRate>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare the first active loan's rate with the market.
pub fn compare_rates(
    input: &RateComparisonInput,
) -> LoanServicingResult<ComputationOutput<RateComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loans(&input.loans, &mut warnings)?;
    validate_market_rates(&input.market_rates)?;

    let active: Vec<&LoanSnapshot> = input.loans.iter().filter(|l| l.is_active).collect();
    let user_loan = *active
        .first()
        .ok_or_else(|| LoanServicingError::invalid("loans", "No active loans to compare"))?;

    let (market, rate_source) = if input.market_rates.is_empty() {
        warnings
            .push("No market rates supplied; compared against your own active loans".into());
        let own: Vec<MarketRate> = active
            .iter()
            .map(|l| MarketRate {
                bank_name: l.bank_name.clone(),
                interest_rate: l.interest_rate,
                processing_fee: None,
                last_updated: None,
            })
            .collect();
        (own, RateSource::UserLoans)
    } else {
        (input.market_rates.clone(), RateSource::Market)
    };

    let rate_total = checked_sum(market.iter().map(|m| m.interest_rate), "market rate total")?;
    let current_market_avg = (rate_total / Decimal::from(market.len())).round_dp(2);
    let best_available_rate = market
        .iter()
        .map(|m| m.interest_rate)
        .min()
        .unwrap_or(user_loan.interest_rate);

    let rate_diff = user_loan.interest_rate - best_available_rate;
    let potential_annual_savings = user_loan
        .outstanding_principal
        .checked_mul(rate_diff)
        .map(|v| (v / Decimal::ONE_HUNDRED).round_dp(2))
        .ok_or_else(|| LoanServicingError::ArithmeticOverflow {
            context: "potential annual savings".into(),
        })?;
    if rate_diff < Decimal::ZERO {
        warnings.push(format!(
            "{} at {}% is already below every quoted rate",
            user_loan.bank_name, user_loan.interest_rate
        ));
    }

    let banks_below_user_rate: Vec<MarketRate> = market
        .into_iter()
        .filter(|m| m.interest_rate < user_loan.interest_rate)
        .collect();

    let output = RateComparison {
        bank_name: user_loan.bank_name.clone(),
        user_loan_rate: user_loan.interest_rate,
        current_market_avg,
        best_available_rate,
        rate_diff,
        potential_annual_savings,
        rate_source,
        banks_below_user_rate,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rate comparison against market quotes",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_market_rates(rates: &[MarketRate]) -> LoanServicingResult<()> {
    for (i, rate) in rates.iter().enumerate() {
        if rate.interest_rate < Decimal::ZERO {
            return Err(LoanServicingError::InvalidInput {
                field: format!("market_rates[{i}].interest_rate"),
                reason: "Interest rate cannot be negative".into(),
            });
        }
    }
    Ok(())
}
