use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use loan_payoff_core::payoff::periods_to_payoff;
use loan_payoff_core::report::{self, LoanPayoffInput, PaymentRange};
use loan_payoff_core::LoanCalculator;
use loan_payoff_core::LoanScenario;

use crate::input;

/// Settings file picked up from the working directory when nothing else is given.
const DEFAULT_SETTINGS_FILE: &str = "appsettings.json";

/// Arguments for the full loan analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to a JSON or YAML settings file (overrides individual flags)
    #[arg(long, alias = "input")]
    pub config: Option<String>,

    /// Amount originally borrowed
    #[arg(long)]
    pub initial_loan: Option<Decimal>,

    /// Monthly payment made so far
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Whole years of payments made
    #[arg(long)]
    pub years_paid: Option<u32>,

    /// Balance still owed today
    #[arg(long)]
    pub remaining_loan: Option<Decimal>,

    /// First payment in the comparison table
    #[arg(long)]
    pub payment_start: Option<Decimal>,

    /// Last payment in the comparison table
    #[arg(long)]
    pub payment_end: Option<Decimal>,

    /// Increment between compared payments
    #[arg(long)]
    pub payment_step: Option<Decimal>,
}

impl AnalyzeArgs {
    fn has_loan_flags(&self) -> bool {
        self.initial_loan.is_some()
            || self.payment.is_some()
            || self.years_paid.is_some()
            || self.remaining_loan.is_some()
    }

    fn payment_range(&self) -> Option<PaymentRange> {
        if self.payment_start.is_none() && self.payment_end.is_none() && self.payment_step.is_none() {
            return None;
        }
        let default = PaymentRange::default();
        Some(PaymentRange {
            start: self.payment_start.unwrap_or(default.start),
            end: self.payment_end.unwrap_or(default.end),
            step: self.payment_step.unwrap_or(default.step),
        })
    }
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut loan_input: LoanPayoffInput = if let Some(ref path) = args.config {
        input::file::read_settings(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else if let Some(path) = default_settings_path(&args, &std::env::current_dir()?) {
        log::info!("no settings given; falling back to {}", path.display());
        input::file::read_settings(&path.to_string_lossy())?
    } else {
        LoanPayoffInput {
            initial_loan: args
                .initial_loan
                .ok_or("--initial-loan is required (or provide --config)")?,
            payment: args
                .payment
                .ok_or("--payment is required (or provide --config)")?,
            years_paid: args
                .years_paid
                .ok_or("--years-paid is required (or provide --config)")?,
            remaining_loan: args
                .remaining_loan
                .ok_or("--remaining-loan is required (or provide --config)")?,
            payment_range: None,
        }
    };

    // Range flags apply on top of any settings source
    if let Some(range) = args.payment_range() {
        loan_input.payment_range = Some(range);
    }

    let result = report::analyze_loan(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

/// `appsettings.json` in `dir`, when it exists and no loan flags were passed.
fn default_settings_path(args: &AnalyzeArgs, dir: &Path) -> Option<PathBuf> {
    if args.has_loan_flags() {
        return None;
    }
    let path = dir.join(DEFAULT_SETTINGS_FILE);
    path.is_file().then_some(path)
}

/// Arguments for solving the implied rate only
#[derive(Args)]
pub struct SolveRateArgs {
    /// Amount originally borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Monthly payment
    #[arg(long)]
    pub payment: Decimal,

    /// Number of monthly payments made
    #[arg(long)]
    pub months: u32,

    /// Balance still owed
    #[arg(long)]
    pub remaining: Decimal,
}

pub fn run_solve_rate(args: SolveRateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = LoanScenario::new(args.principal, args.payment, args.months, args.remaining);
    let calculator = LoanCalculator::new(scenario)?;
    Ok(json!({
        "monthly_rate": calculator.monthly_rate(),
        "annual_rate": calculator.effective_annual_rate()?,
    }))
}

/// Arguments for months-to-payoff
#[derive(Args)]
pub struct PayoffArgs {
    /// Principal to retire
    #[arg(long)]
    pub principal: Decimal,

    /// Monthly interest rate as a decimal (0.007 = 0.7%)
    #[arg(long)]
    pub rate: Decimal,

    /// Monthly payment
    #[arg(long)]
    pub payment: Decimal,
}

pub fn run_payoff(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let periods = periods_to_payoff(args.principal, args.rate, args.payment)?;
    let (years, months) = report::split_years_months(periods)?;
    Ok(json!({
        "periods": periods,
        "years": years,
        "months": months,
    }))
}
