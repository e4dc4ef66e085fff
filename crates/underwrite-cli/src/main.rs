mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::deal::DealArgs;
use commands::recalculate::RecalculateArgs;
use commands::rent_roll::RentRollArgs;

/// Real-estate underwriting calculations
#[derive(Parser)]
#[command(
    name = "underwrite",
    version,
    about = "Real-estate underwriting calculations",
    long_about = "A CLI for underwriting multifamily deals with decimal precision. \
                  Derives the pro forma, financing structure and year-by-year \
                  cash-flow projection from extracted property facts, then solves \
                  levered and unlevered IRRs."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Underwrite a deal from property facts (plus optional rent roll)
    Deal(DealArgs),
    /// Re-run a saved deal with revised assumptions and/or a price override
    Recalculate(RecalculateArgs),
    /// Parse a rent roll CSV and print its summary
    RentRoll(RentRollArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Deal(args) => commands::deal::run_deal(args),
        Commands::Recalculate(args) => commands::recalculate::run_recalculate(args),
        Commands::RentRoll(args) => commands::rent_roll::run_rent_roll(args),
        Commands::Version => {
            println!("underwrite {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
