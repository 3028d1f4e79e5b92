//! Savings reporting over a borrower's loans and recorded prepayments.
//!
//! The caller supplies loan snapshots and prepayment records (with the
//! interest saved and tenure reduced figures produced by
//! [`crate::prepayment`]); everything here is aggregation.

pub mod period;
pub mod rates;
pub mod savings;
pub mod summary;
