//! Implied periodic rate of an amortizing loan.
//!
//! Given a principal, a level payment, the number of payments made and the
//! balance still owed, there is no closed form for the rate. We invert the
//! balance equation with Newton-Raphson in `Decimal`:
//!
//! ```text
//! f(r)  = P(1+r)^n - pmt((1+r)^n - 1)/r - B
//! f'(r) = P n (1+r)^(n-1) - pmt (n (1+r)^(n-1) - A) / r,   A = ((1+r)^n - 1)/r
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::{
    annuity_value, checked_add, checked_div, checked_mul, checked_sub, compound_growth, power,
};
use crate::error::LoanPayoffError;
use crate::types::{Money, Rate};
use crate::LoanPayoffResult;

const INITIAL_GUESS: Decimal = dec!(0.01);
const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000000001);
const MAX_ITERATIONS: u32 = 100;

/// A loan observed part-way through its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanScenario {
    /// Original amount borrowed.
    pub principal: Money,
    /// Level payment made every period.
    pub payment: Money,
    /// Number of payments already made.
    pub periods: u32,
    /// Balance still owed after `periods` payments.
    pub remaining_balance: Money,
}

impl LoanScenario {
    pub fn new(principal: Money, payment: Money, periods: u32, remaining_balance: Money) -> Self {
        Self {
            principal,
            payment,
            periods,
            remaining_balance,
        }
    }

    /// Balance implied by `rate` minus the observed balance.
    pub fn residual(&self, rate: Rate) -> LoanPayoffResult<Money> {
        let grown = compound_growth(self.principal, rate, self.periods)?;
        let paid = annuity_value(self.payment, rate, self.periods)?;
        checked_sub(checked_sub(grown, paid, "residual")?, self.remaining_balance, "residual")
    }

    /// Analytic derivative of [`residual`](Self::residual) with respect to the rate.
    pub fn residual_derivative(&self, rate: Rate) -> LoanPayoffResult<Decimal> {
        let one_plus_r = checked_add(Decimal::ONE, rate, "derivative")?;
        let growth = power(one_plus_r, self.periods)?;
        let annuity_factor = checked_div(
            checked_sub(growth, Decimal::ONE, "derivative")?,
            rate,
            "derivative annuity factor",
        )?;

        let n = Decimal::from(self.periods);
        // n (1+r)^(n-1), shared by both terms
        let growth_slope = checked_div(checked_mul(n, growth, "derivative")?, one_plus_r, "derivative")?;

        let principal_term = checked_mul(self.principal, growth_slope, "derivative principal term")?;
        let annuity_slope = checked_div(
            checked_sub(growth_slope, annuity_factor, "derivative")?,
            rate,
            "derivative annuity slope",
        )?;
        let payment_term = checked_mul(self.payment, annuity_slope, "derivative payment term")?;

        checked_sub(principal_term, payment_term, "derivative")
    }

    /// Solve for the periodic rate. See [`solve_monthly_rate`].
    pub fn solve_rate(&self) -> LoanPayoffResult<Rate> {
        self.solve_rate_within(MAX_ITERATIONS)
    }

    /// Newton-Raphson with an explicit iteration budget.
    ///
    /// Every failure reports the last residual evaluated as `last_delta`.
    pub(crate) fn solve_rate_within(&self, max_iterations: u32) -> LoanPayoffResult<Rate> {
        let mut rate = INITIAL_GUESS;
        let mut last_residual = Decimal::ZERO;

        for i in 0..max_iterations {
            if rate <= dec!(-1) {
                return Err(convergence_failure(
                    "rate solver: iterate fell to or below -100%",
                    i,
                    last_residual,
                ));
            }

            let (value, slope) = match (self.residual(rate), self.residual_derivative(rate)) {
                (Ok(v), Ok(d)) => (v, d),
                (Err(e), _) | (_, Err(e)) => {
                    log::debug!("rate solver stopped at iteration {i} (rate {rate}): {e}");
                    return Err(convergence_failure(
                        "rate solver: iterate left the decimal range",
                        i,
                        last_residual,
                    ));
                }
            };
            last_residual = value;

            if slope.is_zero() {
                return Err(convergence_failure(
                    "derivative vanished in rate solver",
                    i,
                    value,
                ));
            }

            let next = value
                .checked_div(slope)
                .and_then(|step| rate.checked_sub(step).map(|next| (step, next)));
            let Some((step, next)) = next else {
                return Err(convergence_failure(
                    "rate solver: Newton step left the decimal range",
                    i,
                    value,
                ));
            };

            log::trace!("iteration {i}: rate={rate} residual={value} next={next}");

            if step.abs() < CONVERGENCE_THRESHOLD {
                log::debug!("rate solver converged to {next} after {} iterations", i + 1);
                return Ok(next);
            }

            rate = next;
        }

        Err(convergence_failure("rate solver", max_iterations, last_residual))
    }
}

fn convergence_failure(function: &str, iterations: u32, last_residual: Money) -> LoanPayoffError {
    LoanPayoffError::ConvergenceFailure {
        function: function.into(),
        iterations,
        last_delta: last_residual,
    }
}

/// Periodic interest rate at which `principal`, repaid with `periods` level
/// payments of `payment`, leaves exactly `remaining_balance` outstanding.
///
/// Newton-Raphson from 1% per period, stopping once successive iterates agree
/// to within 1e-10. Fails with `ConvergenceFailure` when the derivative is
/// zero, when 100 iterations pass without convergence, or when the iterate
/// leaves the range the decimal arithmetic can represent (including rates at
/// or below -100%).
pub fn solve_monthly_rate(
    principal: Money,
    payment: Money,
    periods: u32,
    remaining_balance: Money,
) -> LoanPayoffResult<Rate> {
    LoanScenario::new(principal, payment, periods, remaining_balance).solve_rate()
}
