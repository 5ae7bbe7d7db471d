mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::loan::{AnalyzeArgs, PayoffArgs, SolveRateArgs};

/// Implied loan interest rate and payoff timeline calculator
#[derive(Parser)]
#[command(
    name = "payoff",
    version,
    about = "Solve the interest rate implied by a loan's payment history",
    long_about = "Given the original loan, the monthly payment, how long it has been paid \
                  and what is still owed, solves the implied monthly and effective annual \
                  interest rate with decimal precision, then compares how long the loan \
                  takes to retire under a range of alternative payments."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "report", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the implied rate and build the payoff comparison table
    Analyze(AnalyzeArgs),
    /// Solve only the implied monthly and effective annual rate
    SolveRate(SolveRateArgs),
    /// Months needed to retire a principal at a given rate and payment
    Payoff(PayoffArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
    Report,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::loan::run_analyze(args),
        Commands::SolveRate(args) => commands::loan::run_solve_rate(args),
        Commands::Payoff(args) => commands::loan::run_payoff(args),
        Commands::Version => {
            println!("payoff {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
