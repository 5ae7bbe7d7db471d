//! Number of level payments needed to retire a loan.
//!
//! Solving the annuity equation for `n` with the balance driven to zero gives
//!
//! ```text
//! n = ln(pmt / (pmt - P r)) / ln(1 + r)
//! ```
//!
//! `Decimal` has no exact logarithm, so this is the one place the crate drops
//! to `f64`. The ratio and the growth base are formed in `Decimal`, handed to
//! `f64::ln`, and the quotient is converted back with `Decimal::from_f64`. The
//! result therefore carries double precision (about 15 significant digits),
//! not the 28 digits the rest of the crate works with.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::error::LoanPayoffError;
use crate::types::{Money, Rate};
use crate::LoanPayoffResult;

/// Fractional number of periods for `payment` to amortize `principal` at `rate`.
///
/// Assumes payments start at period zero against the full `principal`.
pub fn periods_to_payoff(principal: Money, rate: Rate, payment: Money) -> LoanPayoffResult<Decimal> {
    if rate <= Decimal::ZERO {
        return Err(LoanPayoffError::invalid("rate", "Periodic rate must be positive"));
    }
    if payment <= Decimal::ZERO {
        return Err(LoanPayoffError::invalid("payment", "Payment must be positive"));
    }
    if principal <= Decimal::ZERO {
        return Err(LoanPayoffError::invalid("principal", "Principal must be positive"));
    }
    let first_interest = principal
        .checked_mul(rate)
        .ok_or_else(|| LoanPayoffError::ArithmeticOverflow {
            context: "first period interest".into(),
        })?;
    if payment <= first_interest {
        return Err(LoanPayoffError::invalid(
            "payment",
            format!(
                "Payment {payment} does not exceed first period interest {first_interest}; the loan never amortizes"
            ),
        ));
    }

    let ratio = payment
        .checked_div(payment - first_interest)
        .ok_or_else(|| LoanPayoffError::ArithmeticOverflow {
            context: "payoff ratio".into(),
        })?;
    let numerator = to_f64(ratio, "payoff ratio")?.ln();
    let growth_base = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| LoanPayoffError::ArithmeticOverflow {
            context: "payoff growth base".into(),
        })?;
    let denominator = to_f64(growth_base, "payoff growth base")?.ln();
    let periods = numerator / denominator;

    if !periods.is_finite() {
        return Err(LoanPayoffError::ArithmeticOverflow {
            context: format!("payoff periods ({periods})"),
        });
    }
    Decimal::from_f64(periods).ok_or_else(|| LoanPayoffError::ArithmeticOverflow {
        context: format!("payoff periods ({periods}) outside decimal range"),
    })
}

fn to_f64(value: Decimal, context: &str) -> LoanPayoffResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| LoanPayoffError::ArithmeticOverflow {
            context: context.into(),
        })
}
