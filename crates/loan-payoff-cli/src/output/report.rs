use colored::Colorize;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use tabled::{builder::Builder, settings::Style};

use loan_payoff_core::report::{LoanPayoffOutput, PayoffRow};
use loan_payoff_core::{ComputationOutput, PERIODS_PER_YEAR};

use super::table;

const INDENT: usize = 4;
const SEPARATOR_WIDTH: usize = 60;

/// Print the narrative loan report: the scenario, the solved rates and the
/// payoff comparison table.
///
/// Results that are not a full loan analysis fall back to the table format.
pub fn print_report(value: &Value) {
    match serde_json::from_value::<ComputationOutput<LoanPayoffOutput>>(value.clone()) {
        Ok(output) => print!("{}", render_report(&output.result, &output.warnings)),
        Err(e) => {
            log::debug!("not a loan analysis ({e}); falling back to table output");
            table::print_table(value);
        }
    }
}

pub fn render_report(output: &LoanPayoffOutput, warnings: &[String]) -> String {
    let scenario = &output.scenario;
    let years_paid = scenario.periods / PERIODS_PER_YEAR;
    let mut out = String::new();

    out.push('\n');
    out.push_str(&indent(&format!(
        "{}\n{}\n\n\
         The loan started {} years ago at {}.\n\
         Payments of {} a month have been made for {} years ({} in total).\n\
         Today {} is still owed.\n\n\
         \x20 1. What annual interest rate would cause this?\n\
         \x20 2. How long will it take to pay the debt off?\n",
        "Loan payoff analysis".bold(),
        "-".repeat(SEPARATOR_WIDTH),
        years_paid,
        format_currency(scenario.principal),
        format_currency(scenario.payment),
        years_paid,
        format_currency(output.total_paid),
        format_currency(scenario.remaining_balance),
    )));
    out.push('\n');

    out.push_str(&format!(
        "\tMonthly Interest Rate: {}\n",
        output.monthly_rate.round_dp(12)
    ));
    out.push_str(&format!(
        "\tAnnual Interest Rate: {}\n\n",
        format_percent(output.annual_rate)
    ));

    out.push_str(&indent(&pay_table(&output.rows)));
    out.push('\n');

    for warning in warnings {
        out.push_str(&format!("{}: {}\n", "warning".yellow().bold(), warning));
    }
    out
}

/// The payoff rows laid out with currency formatting.
pub fn pay_table(rows: &[PayoffRow]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Payment", "Future Value", "Years", "Months", "Total Months"]);
    for row in rows {
        builder.push_record([
            format_currency(row.payment),
            format_currency(row.future_value),
            row.years.to_string(),
            row.months.to_string(),
            row.total_periods.to_string(),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::psql());
    table.to_string()
}

/// Prefix every line of `text` with four spaces.
pub fn indent(text: &str) -> String {
    let pad = " ".repeat(INDENT);
    text.lines()
        .map(|line| format!("{pad}{line}\n"))
        .collect()
}

/// US-style currency: `$70,000.00`, `-$23,244.33`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.2}", rounded.abs());
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}

/// A decimal fraction as a percentage with two places: `0.0869` -> `8.69%`.
pub fn format_percent(rate: Decimal) -> String {
    let pct = (rate * Decimal::ONE_HUNDRED).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}%", pct)
}
