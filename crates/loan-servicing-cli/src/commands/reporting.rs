use clap::Args;
use serde_json::Value;

use loan_servicing_core::reporting::rates::{self, RateComparisonInput};
use loan_servicing_core::reporting::savings::{self, SavingsReportInput};
use loan_servicing_core::reporting::summary::{self, OverallSummaryInput};

use crate::input;

#[derive(Args)]
pub struct SavingsReportArgs {
    /// Path to JSON/YAML file with report type, period, loans and prepayments
    #[arg(long)]
    pub input: Option<String>,

    /// Override the period in the input (YYYY-MM or YYYY)
    #[arg(long)]
    pub period: Option<String>,
}

#[derive(Args)]
pub struct OverallSummaryArgs {
    /// Path to JSON/YAML file with loans and prepayments
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct RateComparisonArgs {
    /// Path to JSON/YAML file with loans and (optionally) market rates
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_savings_report(args: SavingsReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut report_input: SavingsReportInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for savings report".into());
    };
    if let Some(period) = args.period {
        report_input.period = period;
    }
    let result = savings::generate_savings_report(&report_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_overall_summary(args: OverallSummaryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let summary_input: OverallSummaryInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for overall summary".into());
    };
    let result = summary::overall_summary(&summary_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_rate_comparison(args: RateComparisonArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let comparison_input: RateComparisonInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for rate comparison".into());
    };
    let result = rates::compare_rates(&comparison_input)?;
    Ok(serde_json::to_value(result)?)
}
