pub mod amortization;
pub mod calculator;
pub mod error;
pub mod payoff;
pub mod rate_solver;
pub mod types;

#[cfg(feature = "report")]
pub mod report;

pub use calculator::LoanCalculator;
pub use error::LoanPayoffError;
pub use rate_solver::{solve_monthly_rate, LoanScenario};
pub use types::*;

/// Standard result type for all loan-payoff operations
pub type LoanPayoffResult<T> = Result<T, LoanPayoffError>;
