mod commands;
mod input;
mod output;

use std::process;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use commands::amortization::{EmiArgs, LoanPositionArgs, ScheduleArgs};
use commands::prepayment::PrepaymentArgs;
use commands::reporting::{OverallSummaryArgs, RateComparisonArgs, SavingsReportArgs};

/// Loan EMI, amortization and prepayment calculations
#[derive(Parser)]
#[command(
    name = "loanctl",
    version,
    about = "Loan EMI, amortization and prepayment calculations",
    long_about = "A CLI for servicing amortizing loans with decimal precision. Computes \
                  EMIs, month-by-month amortization schedules, the impact of lump-sum \
                  prepayments, and savings reports across a loan portfolio."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Print only the computed result, without methodology and assumptions
    #[arg(long, global = true)]
    result_only: bool,

    /// Single-line JSON output
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the equated monthly installment
    Emi(EmiArgs),
    /// Generate a month-by-month amortization schedule
    Schedule(ScheduleArgs),
    /// Analyze the impact of a lump-sum prepayment
    Prepayment(PrepaymentArgs),
    /// Current position of a running loan
    LoanPosition(LoanPositionArgs),
    /// Monthly or annual prepayment savings report
    SavingsReport(SavingsReportArgs),
    /// Lifetime savings and portfolio overview
    OverallSummary(OverallSummaryArgs),
    /// Compare a loan's rate with market quotes
    RateComparison(RateComparisonArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOANCTL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let started = Instant::now();
    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::amortization::run_emi(args),
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::Prepayment(args) => commands::prepayment::run_prepayment(args),
        Commands::LoanPosition(args) => commands::amortization::run_loan_position(args),
        Commands::SavingsReport(args) => commands::reporting::run_savings_report(args),
        Commands::OverallSummary(args) => commands::reporting::run_overall_summary(args),
        Commands::RateComparison(args) => commands::reporting::run_rate_comparison(args),
        Commands::Version => {
            println!("loanctl {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };
    tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "command finished");

    match result {
        Ok(value) => {
            let opts = output::RenderOptions {
                result_only: cli.result_only,
                compact: cli.compact,
            };
            output::format_output(&cli.output, &value, opts);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
