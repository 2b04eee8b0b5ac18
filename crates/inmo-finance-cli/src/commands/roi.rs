use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use inmo_finance_core::roi::{self, RoiSimulationInput};

use crate::input;

/// Arguments for the buy-to-rent ROI simulation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RoiArgs {
    /// Path to JSON input file (alternative to the flags below)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price in USD
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// Expected monthly rent in USD
    #[arg(long)]
    pub monthly_rent: Option<Decimal>,

    /// Monthly operating expenses in USD
    #[arg(long)]
    pub monthly_expenses: Option<Decimal>,

    /// Fraction of rent lost to vacancy (e.g. 0.05 for 5%)
    #[arg(long)]
    pub vacancy_rate: Option<Decimal>,

    /// Fractional annual appreciation of the property value
    #[arg(long)]
    pub appreciation: Option<Decimal>,

    /// Fractional annual rent escalation
    #[arg(long)]
    pub rent_growth: Option<Decimal>,

    /// Acquisition costs as a fraction of price
    #[arg(long)]
    pub closing_costs: Option<Decimal>,

    /// Disposition costs as a fraction of exit value
    #[arg(long)]
    pub sale_costs: Option<Decimal>,

    /// Investment horizon in years
    #[arg(long)]
    pub holding_period: Option<u32>,

    /// Annual discount rate for NPV (e.g. 0.08 for 8%)
    #[arg(long)]
    pub discount_rate: Option<Decimal>,
}

pub fn run_roi(args: RoiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input: RoiSimulationInput = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        build_from_flags(args)?
    };
    let result = roi::simulate(&sim_input)?;
    Ok(serde_json::to_value(result)?)
}

fn build_from_flags(args: RoiArgs) -> Result<RoiSimulationInput, Box<dyn std::error::Error>> {
    let purchase_price_usd = args
        .purchase_price
        .ok_or("--purchase-price is required (or provide --input / stdin JSON)")?;
    let monthly_rent_usd = args
        .monthly_rent
        .ok_or("--monthly-rent is required (or provide --input / stdin JSON)")?;

    Ok(RoiSimulationInput {
        purchase_price_usd,
        monthly_rent_usd,
        monthly_expenses_usd: args.monthly_expenses.unwrap_or(Decimal::ZERO),
        vacancy_rate: args.vacancy_rate.unwrap_or(Decimal::ZERO),
        annual_appreciation: args.appreciation.unwrap_or(Decimal::ZERO),
        annual_rent_growth: args.rent_growth.unwrap_or(Decimal::ZERO),
        closing_costs_pct: args.closing_costs.unwrap_or(Decimal::ZERO),
        sale_costs_pct: args.sale_costs.unwrap_or(Decimal::ZERO),
        holding_period_years: args.holding_period.unwrap_or(10),
        discount_rate: args.discount_rate.unwrap_or(dec!(0.08)),
    })
}
