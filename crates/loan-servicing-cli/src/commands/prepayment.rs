use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use loan_servicing_core::prepayment::impact::{self, PrepaymentInput};
use loan_servicing_core::prepayment::strategy::PrepaymentStrategy;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Keep the tenure, lower the EMI
    ReduceEmi,
    /// Keep the EMI, shorten the tenure
    ReduceTenure,
}

impl From<StrategyArg> for PrepaymentStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::ReduceEmi => PrepaymentStrategy::ReduceEmi,
            StrategyArg::ReduceTenure => PrepaymentStrategy::ReduceTenure,
        }
    }
}

/// Arguments for prepayment impact analysis
#[derive(Args)]
pub struct PrepaymentArgs {
    /// Outstanding principal before the prepayment
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 8.4 for 8.4%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Remaining tenure in months
    #[arg(long)]
    pub remaining_tenure: Option<u32>,

    /// Current EMI
    #[arg(long)]
    pub emi: Option<Decimal>,

    /// Lump-sum prepayment amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// How the prepayment is applied
    #[arg(long, value_enum, default_value = "reduce-tenure")]
    pub strategy: StrategyArg,

    /// Schedule start date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_prepayment(args: PrepaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pp_input: PrepaymentInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        PrepaymentInput {
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            interest_rate: args
                .rate
                .ok_or("--rate is required (or provide --input)")?,
            remaining_tenure_months: args
                .remaining_tenure
                .ok_or("--remaining-tenure is required (or provide --input)")?,
            emi_amount: args.emi.ok_or("--emi is required (or provide --input)")?,
            prepayment_amount: args
                .amount
                .ok_or("--amount is required (or provide --input)")?,
            strategy: args.strategy.into(),
            start_date: args.start_date,
        }
    };
    let result = impact::analyze_prepayment(&pp_input)?;
    Ok(serde_json::to_value(result)?)
}
