use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanServicingError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanServicingError {
    pub(crate) fn invalid(field: &str, reason: &str) -> Self {
        LoanServicingError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LoanServicingError {
    fn from(e: serde_json::Error) -> Self {
        LoanServicingError::SerializationError(e.to_string())
    }
}
