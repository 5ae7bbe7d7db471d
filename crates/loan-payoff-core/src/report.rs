//! Payoff comparison table: how long the original loan would take to retire
//! under a range of alternative monthly payments.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::calculator::LoanCalculator;
use crate::error::LoanPayoffError;
use crate::rate_solver::LoanScenario;
use crate::types::*;
use crate::LoanPayoffResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound on rows a single scan may produce.
const MAX_TABLE_ROWS: usize = 10_000;

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Inclusive, ascending range of monthly payments to compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRange {
    #[serde(alias = "Start")]
    pub start: Money,
    #[serde(alias = "End")]
    pub end: Money,
    #[serde(alias = "Step")]
    pub step: Money,
}

impl Default for PaymentRange {
    fn default() -> Self {
        Self {
            start: dec!(500),
            end: dec!(900),
            step: dec!(100),
        }
    }
}

impl PaymentRange {
    pub fn new(start: Money, end: Money, step: Money) -> LoanPayoffResult<Self> {
        let range = Self { start, end, step };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> LoanPayoffResult<()> {
        if self.start <= Decimal::ZERO {
            return Err(LoanPayoffError::invalid("payment_range.start", "Start payment must be positive"));
        }
        if self.step <= Decimal::ZERO {
            return Err(LoanPayoffError::invalid("payment_range.step", "Step must be positive"));
        }
        if self.end < self.start {
            return Err(LoanPayoffError::invalid(
                "payment_range.end",
                format!("End {} is below start {}", self.end, self.start),
            ));
        }
        let rows = (self.end - self.start).checked_div(self.step).map(|q| q.floor());
        if rows.map_or(true, |rows| rows >= Decimal::from(MAX_TABLE_ROWS)) {
            return Err(LoanPayoffError::invalid(
                "payment_range.step",
                format!("Range would produce more than {MAX_TABLE_ROWS} rows"),
            ));
        }
        Ok(())
    }

    /// Payments from `start` to `end` inclusive, ascending by `step`.
    pub fn payments(&self) -> Vec<Money> {
        let mut payments = Vec::new();
        let mut next = Some(self.start);
        while let Some(payment) = next {
            if payment > self.end || payments.len() >= MAX_TABLE_ROWS {
                break;
            }
            payments.push(payment);
            next = payment.checked_add(self.step);
        }
        payments
    }

    pub fn contains(&self, payment: Money) -> bool {
        payment >= self.start && payment <= self.end
    }
}

/// Loan settings as supplied by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPayoffInput {
    /// Amount originally borrowed.
    #[serde(alias = "InitialLoan")]
    pub initial_loan: Money,
    /// Monthly payment made so far.
    #[serde(alias = "Payment")]
    pub payment: Money,
    /// Whole years of payments made.
    #[serde(alias = "YearsPaid")]
    pub years_paid: u32,
    /// Balance still owed today.
    #[serde(alias = "RemainingLoan")]
    pub remaining_loan: Money,
    /// Alternative payments to compare; defaults to 500..=900 step 100.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "PaymentRange")]
    pub payment_range: Option<PaymentRange>,
}

impl LoanPayoffInput {
    pub fn months_paid(&self) -> LoanPayoffResult<u32> {
        self.years_paid
            .checked_mul(PERIODS_PER_YEAR)
            .ok_or_else(|| LoanPayoffError::invalid("years_paid", "Too many years to express in months"))
    }

    pub fn scenario(&self) -> LoanPayoffResult<LoanScenario> {
        Ok(LoanScenario::new(
            self.initial_loan,
            self.payment,
            self.months_paid()?,
            self.remaining_loan,
        ))
    }

    pub fn validate(&self) -> LoanPayoffResult<()> {
        if self.initial_loan <= Decimal::ZERO {
            return Err(LoanPayoffError::invalid("initial_loan", "Initial loan must be positive"));
        }
        if self.payment <= Decimal::ZERO {
            return Err(LoanPayoffError::invalid("payment", "Payment must be positive"));
        }
        if self.years_paid == 0 {
            return Err(LoanPayoffError::invalid("years_paid", "At least one year of payments is required"));
        }
        if self.remaining_loan < Decimal::ZERO {
            return Err(LoanPayoffError::invalid("remaining_loan", "Remaining loan cannot be negative"));
        }
        if let Some(range) = &self.payment_range {
            range.validate()?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One line of the payoff comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffRow {
    /// Alternative monthly payment.
    pub payment: Money,
    /// Balance after the elapsed months had this payment been made.
    pub future_value: Money,
    /// Months to retire the original principal, to one decimal place.
    pub total_periods: Decimal,
    /// Whole years of `total_periods`.
    pub years: u32,
    /// Remaining whole months of `total_periods` after `years`.
    pub months: u32,
}

/// Full analysis of a loan scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPayoffOutput {
    /// The loan as observed, with `periods` in months.
    pub scenario: LoanScenario,
    pub monthly_rate: Rate,
    pub annual_rate: Rate,
    pub total_paid: Money,
    /// Balance implied by the solved rate at the configured payment.
    pub future_value: Money,
    pub rows: Vec<PayoffRow>,
}

// ---------------------------------------------------------------------------
// Table construction
// ---------------------------------------------------------------------------

/// Build one row per payment in `range`, ascending.
///
/// Payoff periods are measured from the original principal at period zero,
/// not from today's balance. Any row that cannot be computed fails the table.
pub fn build_pay_table(calculator: &LoanCalculator, range: &PaymentRange) -> LoanPayoffResult<Vec<PayoffRow>> {
    range.validate()?;
    range
        .payments()
        .into_iter()
        .map(|payment| payoff_row(calculator, payment))
        .collect()
}

fn payoff_row(calculator: &LoanCalculator, payment: Money) -> LoanPayoffResult<PayoffRow> {
    let total_periods = calculator.periods_to_payoff(payment)?.round_dp(1);
    let future_value = calculator.future_value_with_payment(payment)?;
    let (years, months) = split_years_months(total_periods)?;
    Ok(PayoffRow {
        payment,
        future_value,
        total_periods,
        years,
        months,
    })
}

/// Whole years and leftover whole months in a fractional month count.
pub fn split_years_months(total_periods: Decimal) -> LoanPayoffResult<(u32, u32)> {
    let years = (total_periods / MONTHS_PER_YEAR).floor();
    let months = (total_periods % MONTHS_PER_YEAR).trunc();
    match (years.to_u32(), months.to_u32()) {
        (Some(y), Some(m)) => Ok((y, m)),
        _ => Err(LoanPayoffError::ArithmeticOverflow {
            context: format!("splitting {total_periods} months into years"),
        }),
    }
}

/// Solve the implied rate for `input` and compare payoff timelines across
/// its payment range.
pub fn analyze_loan(input: &LoanPayoffInput) -> LoanPayoffResult<ComputationOutput<LoanPayoffOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.validate()?;
    let scenario = input.scenario()?;
    let range = input.payment_range.unwrap_or_default();

    if input.remaining_loan > input.initial_loan {
        warnings.push(format!(
            "Remaining loan {} exceeds the initial loan {}; payments have not covered interest",
            input.remaining_loan, input.initial_loan
        ));
    }
    if !range.contains(input.payment) {
        warnings.push(format!(
            "Current payment {} lies outside the comparison range {}..={}",
            input.payment, range.start, range.end
        ));
    }

    let calculator = LoanCalculator::new(scenario)?;
    let rows = build_pay_table(&calculator, &range)?;

    let output = LoanPayoffOutput {
        scenario,
        monthly_rate: calculator.monthly_rate(),
        annual_rate: calculator.effective_annual_rate()?,
        total_paid: calculator.total_paid()?,
        future_value: calculator.future_value()?,
        rows,
    };

    for warning in &warnings {
        log::warn!("{warning}");
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Implied rate via Newton-Raphson on the amortization balance; payoff periods via closed-form annuity inversion",
        &serde_json::json!({
            "initial_loan": input.initial_loan.to_string(),
            "payment": input.payment.to_string(),
            "months_paid": scenario.periods,
            "remaining_loan": input.remaining_loan.to_string(),
            "payment_range": {
                "start": range.start.to_string(),
                "end": range.end.to_string(),
                "step": range.step.to_string(),
            },
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reference_input() -> LoanPayoffInput {
        LoanPayoffInput {
            initial_loan: dec!(70000),
            payment: dec!(500),
            years_paid: 23,
            remaining_loan: dec!(60000),
            payment_range: None,
        }
    }

    #[test]
    fn test_default_range_payments() {
        let payments = PaymentRange::default().payments();
        assert_eq!(payments, vec![dec!(500), dec!(600), dec!(700), dec!(800), dec!(900)]);
    }

    #[test]
    fn test_range_end_not_on_step() {
        let range = PaymentRange::new(dec!(500), dec!(750), dec!(100)).unwrap();
        assert_eq!(range.payments(), vec![dec!(500), dec!(600), dec!(700)]);
    }

    #[test]
    fn test_split_years_months() {
        assert_eq!(split_years_months(dec!(536.7)).unwrap(), (44, 8));
        assert_eq!(split_years_months(dec!(276)).unwrap(), (23, 0));
        assert_eq!(split_years_months(dec!(11.9)).unwrap(), (0, 11));
    }

    #[test]
    fn test_analyze_reference_loan() {
        let out = analyze_loan(&reference_input()).unwrap();
        assert_eq!(out.result.scenario.periods, 276);
        assert_eq!(out.result.rows.len(), 5);
        assert!(out.warnings.is_empty());
        assert_eq!(out.result.rows[0].total_periods, dec!(536.7));
        assert_eq!(out.result.rows[0].years, 44);
        assert_eq!(out.result.rows[0].months, 8);
    }

    #[test]
    fn test_payment_outside_range_warns() {
        let mut input = reference_input();
        input.payment_range = Some(PaymentRange::new(dec!(600), dec!(800), dec!(100)).unwrap());
        let out = analyze_loan(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("outside the comparison range"));
    }

    #[test]
    fn test_zero_years_rejected() {
        let mut input = reference_input();
        input.years_paid = 0;
        let err = analyze_loan(&input).unwrap_err();
        assert!(err.is_invalid_input());
    }
}
