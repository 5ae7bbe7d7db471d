//! Decimal amortization primitives: integer powers, compound growth and
//! annuity accumulation.
//!
//! Powers are taken by repeated multiplication rather than `powd`/`powf`, so
//! every value stays an exact product of decimals. All arithmetic is checked;
//! results that leave the 96-bit mantissa range surface as errors instead of
//! panicking.

use rust_decimal::Decimal;

use crate::error::LoanPayoffError;
use crate::types::{Money, Rate, PERIODS_PER_YEAR};
use crate::LoanPayoffResult;

pub(crate) fn checked_mul(a: Decimal, b: Decimal, context: &str) -> LoanPayoffResult<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| LoanPayoffError::ArithmeticOverflow {
            context: context.into(),
        })
}

pub(crate) fn checked_add(a: Decimal, b: Decimal, context: &str) -> LoanPayoffResult<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| LoanPayoffError::ArithmeticOverflow {
            context: context.into(),
        })
}

pub(crate) fn checked_sub(a: Decimal, b: Decimal, context: &str) -> LoanPayoffResult<Decimal> {
    a.checked_sub(b)
        .ok_or_else(|| LoanPayoffError::ArithmeticOverflow {
            context: context.into(),
        })
}

pub(crate) fn checked_div(a: Decimal, b: Decimal, context: &str) -> LoanPayoffResult<Decimal> {
    if b.is_zero() {
        return Err(LoanPayoffError::DivisionByZero {
            context: context.into(),
        });
    }
    a.checked_div(b)
        .ok_or_else(|| LoanPayoffError::ArithmeticOverflow {
            context: context.into(),
        })
}

/// `base` raised to a non-negative integer `exponent` by repeated multiplication.
pub fn power(base: Decimal, exponent: u32) -> LoanPayoffResult<Decimal> {
    let mut result = Decimal::ONE;
    for _ in 0..exponent {
        result = checked_mul(result, base, "power")?;
    }
    Ok(result)
}

/// Value of `present_value` after compounding at `rate` for `periods`.
pub fn compound_growth(present_value: Money, rate: Rate, periods: u32) -> LoanPayoffResult<Money> {
    let growth = power(checked_add(Decimal::ONE, rate, "growth base")?, periods)?;
    checked_mul(present_value, growth, "compound growth")
}

/// Accumulated value of `periods` equal end-of-period payments at `rate`.
///
/// `rate` must be non-zero; a zero rate reports `DivisionByZero`.
pub fn annuity_value(payment: Money, rate: Rate, periods: u32) -> LoanPayoffResult<Money> {
    let growth = power(checked_add(Decimal::ONE, rate, "growth base")?, periods)?;
    let factor = checked_div(
        checked_sub(growth, Decimal::ONE, "annuity factor")?,
        rate,
        "annuity factor",
    )?;
    checked_mul(payment, factor, "annuity value")
}

/// Balance left after `periods` payments: compounded principal less the
/// accumulated payments.
pub fn remaining_balance(
    principal: Money,
    payment: Money,
    rate: Rate,
    periods: u32,
) -> LoanPayoffResult<Money> {
    let grown = compound_growth(principal, rate, periods)?;
    let paid = annuity_value(payment, rate, periods)?;
    checked_sub(grown, paid, "remaining balance")
}

/// Effective annual rate implied by a monthly rate: `(1 + r)^12 - 1`.
pub fn effective_annual_rate(periodic_rate: Rate) -> LoanPayoffResult<Rate> {
    let growth = power(
        checked_add(Decimal::ONE, periodic_rate, "effective annual rate")?,
        PERIODS_PER_YEAR,
    )?;
    checked_sub(growth, Decimal::ONE, "effective annual rate")
}
