use chrono::NaiveDate;
use loan_servicing_core::prepayment::impact::{analyze_prepayment, PrepaymentInput};
use loan_servicing_core::prepayment::strategy::PrepaymentStrategy;
use loan_servicing_core::reporting::period::ReportType;
use loan_servicing_core::reporting::rates::{
    compare_rates, MarketRate, RateComparisonInput, RateSource,
};
use loan_servicing_core::reporting::savings::{
    generate_savings_report, LoanSnapshot, PrepaymentRecord, SavingsReportInput, StrategyTally,
};
use loan_servicing_core::reporting::summary::{overall_summary, OverallSummaryInput};
use loan_servicing_core::LoanServicingError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn loans() -> Vec<LoanSnapshot> {
    vec![
        LoanSnapshot {
            bank_name: "HDFC".into(),
            loan_amount: dec!(5_000_000),
            outstanding_principal: dec!(4_000_000),
            interest_rate: dec!(8.75),
            emi_amount: dec!(44_186.20),
            remaining_tenure_months: 150,
            is_active: true,
        },
        LoanSnapshot {
            bank_name: "SBI".into(),
            loan_amount: dec!(1_000_000),
            outstanding_principal: Decimal::ZERO,
            interest_rate: dec!(9.1),
            emi_amount: dec!(12_700),
            remaining_tenure_months: 0,
            is_active: false,
        },
    ]
}

fn prepayments() -> Vec<PrepaymentRecord> {
    vec![
        PrepaymentRecord {
            payment_date: date(2024, 3, 5),
            amount: dec!(200_000),
            strategy: PrepaymentStrategy::ReduceTenure,
            interest_saved: Some(dec!(350_000)),
            tenure_reduced_months: Some(14),
        },
        PrepaymentRecord {
            payment_date: date(2024, 3, 28),
            amount: dec!(100_000),
            strategy: PrepaymentStrategy::ReduceEmi,
            interest_saved: Some(dec!(80_000)),
            tenure_reduced_months: None,
        },
        PrepaymentRecord {
            payment_date: date(2024, 4, 2),
            amount: dec!(50_000),
            strategy: PrepaymentStrategy::ReduceEmi,
            interest_saved: Some(dec!(30_000)),
            tenure_reduced_months: None,
        },
    ]
}

#[test]
fn test_monthly_report_filters_to_period() {
    let out = generate_savings_report(&SavingsReportInput {
        report_type: ReportType::Monthly,
        period: "2024-03".into(),
        loans: loans(),
        prepayments: prepayments(),
    })
    .unwrap();
    let r = &out.result;

    assert_eq!(r.period_start, date(2024, 3, 1));
    assert_eq!(r.period_end, date(2024, 4, 1));
    assert_eq!(r.prepayment_count, 2);
    assert_eq!(r.total_prepayments, dec!(300_000));
    assert_eq!(r.total_interest_saved, dec!(430_000));
    assert_eq!(r.total_tenure_reduced_months, 14);
    assert_eq!(r.prepayments.len(), 2);
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(
        r.summary,
        "During the month of 2024-03, you made 300000 in prepayments across 2 loan(s), \
         saving 430000 in interest."
    );
}

#[test]
fn test_monthly_report_strategy_breakdown() {
    let out = generate_savings_report(&SavingsReportInput {
        report_type: ReportType::Monthly,
        period: "2024-03".into(),
        loans: loans(),
        prepayments: prepayments(),
    })
    .unwrap();
    let b = &out.result.strategy_breakdown;

    assert_eq!(
        b.reduce_emi,
        StrategyTally {
            count: 1,
            amount: dec!(100_000),
            savings: dec!(80_000),
            months_saved: None,
        }
    );
    assert_eq!(
        b.reduce_tenure,
        StrategyTally {
            count: 1,
            amount: dec!(200_000),
            savings: dec!(350_000),
            months_saved: Some(14),
        }
    );
}

#[test]
fn test_portfolio_totals_include_closed_loans() {
    let out = generate_savings_report(&SavingsReportInput {
        report_type: ReportType::Annual,
        period: "2024".into(),
        loans: loans(),
        prepayments: prepayments(),
    })
    .unwrap();
    let t = &out.result.totals;

    assert_eq!(out.result.prepayment_count, 3);
    assert_eq!(t.total_outstanding, dec!(4_000_000));
    assert_eq!(t.total_paid_off, dec!(2_000_000));
    assert_eq!(t.total_loan_amount, dec!(6_000_000));
    assert_eq!(t.completion_percentage, dec!(33.33));
    assert_eq!(out.result.portfolio[1].paid_off, dec!(1_000_000));
}

#[test]
fn test_empty_report() {
    let out = generate_savings_report(&SavingsReportInput {
        report_type: ReportType::Monthly,
        period: "2023-07".into(),
        loans: vec![],
        prepayments: vec![],
    })
    .unwrap();
    assert_eq!(out.result.total_prepayments, Decimal::ZERO);
    assert_eq!(out.result.totals.completion_percentage, Decimal::ZERO);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_bad_period_rejected() {
    let result = generate_savings_report(&SavingsReportInput {
        report_type: ReportType::Monthly,
        period: "March 2024".into(),
        loans: loans(),
        prepayments: prepayments(),
    });
    assert!(result.is_err());
}

#[test]
fn test_overall_summary() {
    let out = overall_summary(&OverallSummaryInput {
        loans: loans(),
        prepayments: prepayments(),
    })
    .unwrap();
    let s = &out.result;

    assert_eq!(s.lifetime.total_prepayments, dec!(350_000));
    assert_eq!(s.lifetime.total_interest_saved, dec!(460_000));
    assert_eq!(s.lifetime.total_tenure_reduced_months, 14);
    assert_eq!(s.lifetime.prepayment_count, 3);
    assert_eq!(s.portfolio.total_loan_amount, dec!(6_000_000));
    assert_eq!(s.portfolio.total_outstanding, dec!(4_000_000));
    assert_eq!(s.portfolio.total_paid, dec!(2_000_000));
    assert_eq!(s.portfolio.completion_percentage, dec!(33.33));
    assert_eq!(s.portfolio.active_loans, 1);
    assert_eq!(s.portfolio.total_loans, 2);
}

#[test]
fn test_report_from_resolved_prepayment() {
    let impact = analyze_prepayment(&PrepaymentInput {
        loan_amount: dec!(1_000_000),
        interest_rate: dec!(8.4),
        remaining_tenure_months: 240,
        emi_amount: dec!(8615.04),
        prepayment_amount: dec!(200_000),
        strategy: PrepaymentStrategy::ReduceTenure,
        start_date: Some(date(2024, 6, 1)),
    })
    .unwrap()
    .result;

    let record = PrepaymentRecord {
        payment_date: date(2024, 6, 1),
        amount: dec!(200_000),
        strategy: PrepaymentStrategy::ReduceTenure,
        interest_saved: Some(impact.interest_saved),
        tenure_reduced_months: impact.tenure_reduced,
    };

    let out = generate_savings_report(&SavingsReportInput {
        report_type: ReportType::Annual,
        period: "2024".into(),
        loans: vec![],
        prepayments: vec![record],
    })
    .unwrap();

    assert_eq!(out.result.total_interest_saved, dec!(570959.34));
    assert_eq!(out.result.total_tenure_reduced_months, 89);
}

// ===========================================================================
// Overflowing totals
// ===========================================================================

fn huge_prepayments() -> Vec<PrepaymentRecord> {
    (1..=2)
        .map(|day| PrepaymentRecord {
            payment_date: date(2024, 3, day),
            amount: Decimal::MAX,
            strategy: PrepaymentStrategy::ReduceEmi,
            interest_saved: None,
            tenure_reduced_months: None,
        })
        .collect()
}

fn assert_overflow<T: std::fmt::Debug>(result: Result<T, LoanServicingError>) {
    match result {
        Err(LoanServicingError::ArithmeticOverflow { .. }) => {}
        other => panic!("Expected ArithmeticOverflow, got {other:?}"),
    }
}

#[test]
fn test_report_prepayment_total_overflow_is_an_error() {
    assert_overflow(generate_savings_report(&SavingsReportInput {
        report_type: ReportType::Monthly,
        period: "2024-03".into(),
        loans: vec![],
        prepayments: huge_prepayments(),
    }));
}

#[test]
fn test_report_months_total_overflow_is_an_error() {
    let mut records = prepayments();
    for r in records.iter_mut() {
        r.payment_date = date(2024, 3, 10);
        r.tenure_reduced_months = Some(u32::MAX);
    }
    assert_overflow(generate_savings_report(&SavingsReportInput {
        report_type: ReportType::Monthly,
        period: "2024-03".into(),
        loans: vec![],
        prepayments: records,
    }));
}

#[test]
fn test_report_portfolio_total_overflow_is_an_error() {
    let mut book = loans();
    for loan in book.iter_mut() {
        loan.loan_amount = Decimal::MAX;
        loan.outstanding_principal = Decimal::MAX;
    }
    assert_overflow(generate_savings_report(&SavingsReportInput {
        report_type: ReportType::Annual,
        period: "2024".into(),
        loans: book,
        prepayments: vec![],
    }));
}

#[test]
fn test_overall_summary_overflow_is_an_error() {
    assert_overflow(overall_summary(&OverallSummaryInput {
        loans: vec![],
        prepayments: huge_prepayments(),
    }));

    let mut book = loans();
    for loan in book.iter_mut() {
        loan.loan_amount = Decimal::MAX;
    }
    assert_overflow(overall_summary(&OverallSummaryInput {
        loans: book,
        prepayments: vec![],
    }));
}

// ===========================================================================
// Rate comparison
// ===========================================================================

fn quote(bank: &str, rate: Decimal) -> MarketRate {
    MarketRate {
        bank_name: bank.into(),
        interest_rate: rate,
        processing_fee: Some(dec!(10_000)),
        last_updated: Some(date(2024, 5, 1)),
    }
}

#[test]
fn test_rate_comparison_against_market() {
    let out = compare_rates(&RateComparisonInput {
        loans: loans(),
        market_rates: vec![
            quote("SBI", dec!(8.40)),
            quote("ICICI", dec!(8.90)),
            quote("Axis", dec!(8.55)),
        ],
    })
    .unwrap();
    let r = &out.result;

    assert_eq!(r.bank_name, "HDFC");
    assert_eq!(r.user_loan_rate, dec!(8.75));
    assert_eq!(r.current_market_avg, dec!(8.62));
    assert_eq!(r.best_available_rate, dec!(8.40));
    assert_eq!(r.rate_diff, dec!(0.35));
    assert_eq!(r.potential_annual_savings, dec!(14000.00));
    assert_eq!(r.rate_source, RateSource::Market);
    let below: Vec<&str> = r
        .banks_below_user_rate
        .iter()
        .map(|m| m.bank_name.as_str())
        .collect();
    assert_eq!(below, vec!["SBI", "Axis"]);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_rate_comparison_falls_back_to_own_loans() {
    let out = compare_rates(&RateComparisonInput {
        loans: loans(),
        market_rates: vec![],
    })
    .unwrap();
    let r = &out.result;

    // Only the active HDFC loan stands in for the market
    assert_eq!(r.rate_source, RateSource::UserLoans);
    assert_eq!(r.current_market_avg, dec!(8.75));
    assert_eq!(r.best_available_rate, dec!(8.75));
    assert_eq!(r.rate_diff, Decimal::ZERO);
    assert_eq!(r.potential_annual_savings, Decimal::ZERO);
    assert!(r.banks_below_user_rate.is_empty());
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_rate_comparison_from_json() {
    let input: RateComparisonInput = serde_json::from_value(serde_json::json!({
        "loans": [{
            "bank_name": "HDFC",
            "loan_amount": "5000000",
            "outstanding_principal": "2500000",
            "interest_rate": "9.25",
            "emi_amount": "44186.20",
            "remaining_tenure_months": 120
        }],
        "market_rates": [
            { "bank_name": "SBI", "interest_rate": "8.50" },
            { "bank_name": "Kotak", "interest_rate": "8.75" }
        ]
    }))
    .unwrap();

    let out = compare_rates(&input).unwrap().result;
    assert_eq!(out.current_market_avg, dec!(8.62));
    assert_eq!(out.potential_annual_savings, dec!(18750.00));
    assert_eq!(out.banks_below_user_rate.len(), 2);
}
