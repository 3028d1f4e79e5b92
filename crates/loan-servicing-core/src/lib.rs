pub mod error;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "prepayment")]
pub mod prepayment;

#[cfg(feature = "reporting")]
pub mod reporting;

pub use error::LoanServicingError;
pub use types::*;

/// Standard result type for all loan-servicing operations
pub type LoanServicingResult<T> = Result<T, LoanServicingError>;
