use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanPayoffError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },
}

impl LoanPayoffError {
    /// Shorthand used by validation code throughout the crate.
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanPayoffError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn is_convergence_failure(&self) -> bool {
        matches!(self, LoanPayoffError::ConvergenceFailure { .. })
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, LoanPayoffError::InvalidInput { .. })
    }
}
