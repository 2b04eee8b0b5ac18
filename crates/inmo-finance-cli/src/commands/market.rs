use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use inmo_finance_core::market::{self, BarrioPrices, PriceTrendPoint, DEFAULT_EXPENSE_RATIO};

use crate::input;

/// Arguments for rental-yield ranking
#[derive(Args)]
pub struct RentalYieldArgs {
    /// Path to a JSON array of per-barrio price rows
    #[arg(long)]
    pub input: Option<String>,

    /// Expense haircut for the net yield (default 0.30)
    #[arg(long)]
    pub expense_ratio: Option<Decimal>,
}

/// Arguments for blue-rate price-trend adjustment
#[derive(Args)]
pub struct AdjustTrendArgs {
    /// Path to a JSON array of dated price observations
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_rental_yield(args: RentalYieldArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rows: Vec<BarrioPrices> = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for rental-yield".into());
    };
    let expense_ratio = args.expense_ratio.unwrap_or(DEFAULT_EXPENSE_RATIO);
    let yields = market::rental_yields(&rows, expense_ratio)?;
    Ok(serde_json::to_value(yields)?)
}

pub fn run_adjust_trend(args: AdjustTrendArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let points: Vec<PriceTrendPoint> = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for adjust-trend".into());
    };
    let adjusted = market::adjust_price_trend(&points);
    Ok(serde_json::to_value(adjusted)?)
}
