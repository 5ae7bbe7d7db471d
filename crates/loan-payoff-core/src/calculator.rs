use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{checked_mul, effective_annual_rate, remaining_balance};
use crate::payoff::periods_to_payoff;
use crate::rate_solver::LoanScenario;
use crate::types::{Money, Rate};
use crate::LoanPayoffResult;

/// A loan scenario together with its solved monthly rate.
///
/// The rate is solved once in [`LoanCalculator::new`] and reused by every
/// derived figure. Two calculators built from the same scenario are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanCalculator {
    scenario: LoanScenario,
    monthly_rate: Rate,
}

impl LoanCalculator {
    pub fn new(scenario: LoanScenario) -> LoanPayoffResult<Self> {
        let monthly_rate = scenario.solve_rate()?;
        Ok(Self {
            scenario,
            monthly_rate,
        })
    }

    pub fn scenario(&self) -> &LoanScenario {
        &self.scenario
    }

    pub fn monthly_rate(&self) -> Rate {
        self.monthly_rate
    }

    /// `(1 + monthly)^12 - 1`
    pub fn effective_annual_rate(&self) -> LoanPayoffResult<Rate> {
        effective_annual_rate(self.monthly_rate)
    }

    /// Balance after the scenario's elapsed periods at the scenario's payment.
    /// Reproduces the observed remaining balance up to solver tolerance.
    pub fn future_value(&self) -> LoanPayoffResult<Money> {
        self.future_value_with_payment(self.scenario.payment)
    }

    /// Balance the loan would have after the elapsed periods had `payment`
    /// been paid instead.
    pub fn future_value_with_payment(&self, payment: Money) -> LoanPayoffResult<Money> {
        remaining_balance(
            self.scenario.principal,
            payment,
            self.monthly_rate,
            self.scenario.periods,
        )
    }

    /// Periods for `payment` to retire the original principal at the solved rate.
    pub fn periods_to_payoff(&self, payment: Money) -> LoanPayoffResult<Decimal> {
        periods_to_payoff(self.scenario.principal, self.monthly_rate, payment)
    }

    /// Total paid so far: payment times elapsed periods.
    pub fn total_paid(&self) -> LoanPayoffResult<Money> {
        checked_mul(
            self.scenario.payment,
            Decimal::from(self.scenario.periods),
            "total paid",
        )
    }
}
