//! Lump-sum prepayment analysis: apply a prepayment to a running loan under
//! one of two strategies and compare the schedules before and after.

pub mod impact;
pub mod strategy;
