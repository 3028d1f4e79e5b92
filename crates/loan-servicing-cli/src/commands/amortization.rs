use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_servicing_core::amortization::emi::{self, EmiInput};
use loan_servicing_core::amortization::position::{self, LoanPositionInput};
use loan_servicing_core::amortization::schedule::{self, AmortizationInput};

use crate::input;

/// Arguments for EMI calculation
#[derive(Args)]
pub struct EmiArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 8.4 for 8.4%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in months
    #[arg(long)]
    pub tenure: Option<u32>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for an amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in months
    #[arg(long)]
    pub tenure: Option<u32>,

    /// Installment to schedule with (computed when omitted)
    #[arg(long)]
    pub emi: Option<Decimal>,

    /// Schedule start date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the current position of a running loan
#[derive(Args)]
pub struct LoanPositionArgs {
    /// Original loan amount
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Original tenure in months
    #[arg(long)]
    pub tenure: Option<u32>,

    /// Contractual EMI (computed when omitted)
    #[arg(long)]
    pub emi: Option<Decimal>,

    /// Loan start date, YYYY-MM-DD
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Valuation date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let emi_input: EmiInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        EmiInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_percent: args
                .rate
                .ok_or("--rate is required (or provide --input)")?,
            tenure_months: args
                .tenure
                .ok_or("--tenure is required (or provide --input)")?,
        }
    };
    let result = emi::calculate_emi(&emi_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: AmortizationInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        AmortizationInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_percent: args
                .rate
                .ok_or("--rate is required (or provide --input)")?,
            tenure_months: args
                .tenure
                .ok_or("--tenure is required (or provide --input)")?,
            emi: args.emi,
            start_date: args.start_date,
        }
    };
    let result = schedule::build_amortization(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_loan_position(args: LoanPositionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let position_input: LoanPositionInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        LoanPositionInput {
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            annual_rate_percent: args
                .rate
                .ok_or("--rate is required (or provide --input)")?,
            tenure_months: args
                .tenure
                .ok_or("--tenure is required (or provide --input)")?,
            emi_amount: args.emi,
            start_date: args
                .start_date
                .ok_or("--start-date is required (or provide --input)")?,
            as_of: args.as_of,
        }
    };
    let result = position::loan_position(&position_input)?;
    Ok(serde_json::to_value(result)?)
}
