use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Investment simulation
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_roi(input_json: String) -> NapiResult<String> {
    let input: inmo_finance_core::roi::RoiSimulationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = inmo_finance_core::roi::simulate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// UVA mortgage
// ---------------------------------------------------------------------------

#[napi]
pub fn project_uva_amortization(input_json: String) -> NapiResult<String> {
    let input: inmo_finance_core::uva::UvaAmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = inmo_finance_core::uva::project(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Market analytics
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct RentalYieldBindingInput {
    prices: Vec<inmo_finance_core::market::BarrioPrices>,
    expense_ratio: Option<rust_decimal::Decimal>,
}

#[napi]
pub fn rental_yields(input_json: String) -> NapiResult<String> {
    let binding_input: RentalYieldBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let ratio = binding_input
        .expense_ratio
        .unwrap_or(inmo_finance_core::market::DEFAULT_EXPENSE_RATIO);
    let output = inmo_finance_core::market::rental_yields(&binding_input.prices, ratio)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn adjust_price_trend(input_json: String) -> NapiResult<String> {
    let points: Vec<inmo_finance_core::market::PriceTrendPoint> =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = inmo_finance_core::market::adjust_price_trend(&points);
    serde_json::to_string(&output).map_err(to_napi_error)
}
