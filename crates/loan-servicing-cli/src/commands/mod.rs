pub mod amortization;
pub mod prepayment;
pub mod reporting;
