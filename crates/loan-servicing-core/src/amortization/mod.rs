//! Level-pay loan mathematics: EMI, month-by-month amortization schedules
//! and the current position of a running loan.

pub mod emi;
pub mod position;
pub mod schedule;

use chrono::NaiveDate;

/// Default start date for schedules when the caller does not pin one.
pub(crate) fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}
