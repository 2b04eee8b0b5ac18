mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::market::{AdjustTrendArgs, RentalYieldArgs};
use commands::roi::RoiArgs;
use commands::uva::UvaArgs;

/// Real-estate investment analytics
#[derive(Parser)]
#[command(
    name = "inmo",
    version,
    about = "Real-estate investment analytics",
    long_about = "A CLI for real-estate investment calculations with decimal precision. \
                  Supports buy-to-rent ROI simulation, UVA-indexed mortgage projection, \
                  rental-yield ranking, and blue-rate price-trend adjustment."
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
    /// Simulate buy-to-rent ROI (IRR, NPV, payback, yields)
    Roi(RoiArgs),
    /// Project a UVA-indexed mortgage amortization schedule
    Uva(UvaArgs),
    /// Rank barrios by gross/net rental yield
    RentalYield(RentalYieldArgs),
    /// Normalize a price series to today's USD via the blue rate
    AdjustTrend(AdjustTrendArgs),
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
        Commands::Roi(args) => commands::roi::run_roi(args),
        Commands::Uva(args) => commands::uva::run_uva(args),
        Commands::RentalYield(args) => commands::market::run_rental_yield(args),
        Commands::AdjustTrend(args) => commands::market::run_adjust_trend(args),
        Commands::Version => {
            println!("inmo {}", env!("CARGO_PKG_VERSION"));
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
