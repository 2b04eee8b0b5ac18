use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use inmo_finance_core::uva::{self, UvaAmortizationInput};

use crate::input;

/// Arguments for the UVA mortgage projection
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct UvaArgs {
    /// Path to JSON input file (alternative to the flags below)
    #[arg(long)]
    pub input: Option<String>,

    /// Property price in USD
    #[arg(long)]
    pub property_price: Option<Decimal>,

    /// Down payment as a fraction of price (e.g. 0.20 for 20%)
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub term_years: Option<u32>,

    /// Nominal annual rate / TNA (e.g. 0.055 for 5.5%)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Current UVA index value in ARS
    #[arg(long)]
    pub uva_value: Option<Decimal>,

    /// Blue ARS-per-USD exchange rate
    #[arg(long)]
    pub blue_rate: Option<Decimal>,

    /// Assumed fractional annual inflation (e.g. 0.50 for 50%)
    #[arg(long)]
    pub inflation: Option<Decimal>,
}

pub fn run_uva(args: UvaArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: UvaAmortizationInput = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        build_from_flags(args)?
    };
    let result = uva::project(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

fn build_from_flags(args: UvaArgs) -> Result<UvaAmortizationInput, Box<dyn std::error::Error>> {
    let missing = |flag: &str| format!("{flag} is required (or provide --input / stdin JSON)");

    Ok(UvaAmortizationInput {
        property_price_usd: args
            .property_price
            .ok_or_else(|| missing("--property-price"))?,
        down_payment_pct: args.down_payment.unwrap_or(Decimal::ZERO),
        loan_term_years: args.term_years.ok_or_else(|| missing("--term-years"))?,
        annual_rate: args.annual_rate.ok_or_else(|| missing("--annual-rate"))?,
        uva_value: args.uva_value.ok_or_else(|| missing("--uva-value"))?,
        blue_rate: args.blue_rate.ok_or_else(|| missing("--blue-rate"))?,
        annual_inflation: args.inflation.ok_or_else(|| missing("--inflation"))?,
    })
}
