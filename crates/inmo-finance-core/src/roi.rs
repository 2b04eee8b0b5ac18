use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::InmoFinanceError;
use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::InmoResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for a buy-to-rent ROI simulation.
///
/// All monetary values share a single currency (conventionally USD at the
/// informal exchange rate). Only the purchase price and the monthly rent are
/// required; every other field has a documented default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiSimulationInput {
    /// Total purchase price of the property
    pub purchase_price_usd: Money,
    /// Expected monthly rental income
    pub monthly_rent_usd: Money,
    /// Monthly operating expenses (expensas, taxes, maintenance)
    #[serde(default)]
    pub monthly_expenses_usd: Money,
    /// Fraction of rent lost to vacancy, in [0, 1)
    #[serde(default)]
    pub vacancy_rate: Rate,
    /// Fractional annual growth of the property value
    #[serde(default)]
    pub annual_appreciation: Rate,
    /// Fractional annual rent escalation
    #[serde(default)]
    pub annual_rent_growth: Rate,
    /// Acquisition transaction costs as a fraction of price, in [0, 1)
    #[serde(default)]
    pub closing_costs_pct: Rate,
    /// Disposition transaction costs as a fraction of exit value, in [0, 1)
    #[serde(default)]
    pub sale_costs_pct: Rate,
    /// Investment horizon in years
    #[serde(default = "default_holding_period")]
    pub holding_period_years: u32,
    /// Annual rate used to discount cash flows for NPV
    #[serde(default = "default_discount_rate")]
    pub discount_rate: Rate,
}

fn default_holding_period() -> u32 {
    10
}

fn default_discount_rate() -> Rate {
    dec!(0.08)
}

/// One year of the projected investment, for charting and tabulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyCashFlow {
    pub year: u32,
    /// Rent before vacancy, 12 months
    pub gross_rent: Money,
    /// Rent after the vacancy haircut
    pub effective_rent: Money,
    /// Annual operating expenses
    pub expenses: Money,
    /// Effective rent minus expenses
    pub net_income: Money,
    /// Appreciated property value at year end
    pub property_value: Money,
    /// Net sale proceeds; populated on the final year only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_proceeds: Option<Money>,
    /// Net income plus any sale proceeds
    pub total_cash_flow: Money,
    /// Running undiscounted total including the initial outlay
    pub cumulative_cash_flow: Money,
}

/// Complete ROI simulation output.
///
/// Every field is a deterministic pure function of the input. `Option`
/// means "computed but undefined": `irr` when no rate zeroes the series,
/// `payback_years` when the outlay is never recovered in the horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiSimulationOutput {
    /// Purchase price plus closing costs
    pub total_investment: Money,
    /// Year-1 net operating income (rent after vacancy, minus expenses)
    pub annual_net_income: Money,
    /// Year-1 net income / purchase price
    pub cap_rate: Rate,
    /// Annual gross rent / purchase price
    pub gross_rental_yield: Rate,
    /// Year-1 net income / total investment
    pub cash_on_cash_return: Rate,
    /// Property value at the end of the horizon, net of sale costs
    pub exit_value: Money,
    /// Undiscounted series: year 0 is the negated total investment
    pub cash_flows: Vec<Money>,
    /// Year-by-year projection
    pub yearly: Vec<YearlyCashFlow>,
    /// NPV of `cash_flows` at the input discount rate
    pub npv: Money,
    /// Internal rate of return, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irr: Option<Rate>,
    /// Fractional year at which cumulative cash flow turns non-negative
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payback_years: Option<Decimal>,
    /// Undiscounted net gain over the initial outlay, as a fraction of it
    pub total_return: Rate,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run a buy-to-rent ROI simulation over the holding period.
///
/// Projects annual cash flows, then derives cap rate, gross yield,
/// cash-on-cash return, NPV, IRR, and the payback year. Returns a
/// `ComputationOutput` carrying warnings for unusual assumptions.
pub fn simulate(
    input: &RoiSimulationInput,
) -> InmoResult<ComputationOutput<RoiSimulationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input, &mut warnings)?;

    let total_investment = input.purchase_price_usd * (Decimal::ONE + input.closing_costs_pct);
    let annual_net_income = (input.monthly_rent_usd * (Decimal::ONE - input.vacancy_rate)
        - input.monthly_expenses_usd)
        * dec!(12);
    let cap_rate = annual_net_income / input.purchase_price_usd;
    let gross_rental_yield = input.monthly_rent_usd * dec!(12) / input.purchase_price_usd;
    let cash_on_cash_return = annual_net_income / total_investment;

    if annual_net_income <= Decimal::ZERO {
        warnings.push(
            "Year-1 net income is not positive — expenses and vacancy absorb the full rent".into(),
        );
    }

    // --- Project the holding period ---
    let n = input.holding_period_years as usize;
    let mut cash_flows: Vec<Money> = Vec::with_capacity(n + 1);
    cash_flows.push(-total_investment);

    let mut yearly: Vec<YearlyCashFlow> = Vec::with_capacity(n);
    let mut current_rent = input.monthly_rent_usd;
    let mut property_value = input.purchase_price_usd;
    let mut cumulative = -total_investment;
    let annual_expenses = input.monthly_expenses_usd * dec!(12);

    for year in 1..=n {
        if year > 1 {
            current_rent = current_rent
                .checked_mul(Decimal::ONE + input.annual_rent_growth)
                .ok_or_else(|| compounding_overflow("annual_rent_growth"))?;
        }
        let gross_rent = current_rent * dec!(12);
        let effective_rent = gross_rent * (Decimal::ONE - input.vacancy_rate);
        let net_income = effective_rent - annual_expenses;

        property_value = property_value
            .checked_mul(Decimal::ONE + input.annual_appreciation)
            .ok_or_else(|| compounding_overflow("annual_appreciation"))?;

        let sale_proceeds = if year == n {
            Some(property_value * (Decimal::ONE - input.sale_costs_pct))
        } else {
            None
        };

        let total_cash_flow = net_income + sale_proceeds.unwrap_or(Decimal::ZERO);
        cumulative += total_cash_flow;
        cash_flows.push(total_cash_flow);

        yearly.push(YearlyCashFlow {
            year: year as u32,
            gross_rent,
            effective_rent,
            expenses: annual_expenses,
            net_income,
            property_value,
            sale_proceeds,
            total_cash_flow,
            cumulative_cash_flow: cumulative,
        });
    }

    let exit_value = property_value * (Decimal::ONE - input.sale_costs_pct);

    // --- Discounted metrics ---
    let npv = time_value::npv(input.discount_rate, &cash_flows)?;

    let irr = match time_value::irr(&cash_flows, dec!(0.10)) {
        Ok(rate) => Some(rate),
        Err(e) => {
            warnings.push(format!("IRR not computed: {e}"));
            None
        }
    };

    let payback_years = payback_period(&yearly, total_investment);
    if payback_years.is_none() {
        warnings.push("Investment is not recovered within the holding period".into());
    }

    // Undiscounted total return on the initial outlay
    let total_cash_in: Decimal = cash_flows.iter().skip(1).copied().sum();
    let total_return = (total_cash_in - total_investment) / total_investment;

    let output = RoiSimulationOutput {
        total_investment,
        annual_net_income,
        cap_rate,
        gross_rental_yield,
        cash_on_cash_return,
        exit_value,
        cash_flows,
        yearly,
        npv,
        irr,
        payback_years,
        total_return,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Buy-to-Rent ROI Simulation (Cash-Flow Projection)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn compounding_overflow(field: &str) -> InmoFinanceError {
    InmoFinanceError::InvalidInput {
        field: field.into(),
        reason: "Rate compounds past the representable range over the horizon".into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &RoiSimulationInput, warnings: &mut Vec<String>) -> InmoResult<()> {
    if input.purchase_price_usd <= Decimal::ZERO {
        return Err(InmoFinanceError::InvalidInput {
            field: "purchase_price_usd".into(),
            reason: "Purchase price must be positive".into(),
        });
    }

    if input.monthly_rent_usd < Decimal::ZERO {
        return Err(InmoFinanceError::InvalidInput {
            field: "monthly_rent_usd".into(),
            reason: "Monthly rent cannot be negative".into(),
        });
    }

    if input.monthly_expenses_usd < Decimal::ZERO {
        return Err(InmoFinanceError::InvalidInput {
            field: "monthly_expenses_usd".into(),
            reason: "Monthly expenses cannot be negative".into(),
        });
    }

    if input.holding_period_years < 1 {
        return Err(InmoFinanceError::InvalidInput {
            field: "holding_period_years".into(),
            reason: "Holding period must be at least 1 year".into(),
        });
    }

    for (field, value) in [
        ("vacancy_rate", input.vacancy_rate),
        ("closing_costs_pct", input.closing_costs_pct),
        ("sale_costs_pct", input.sale_costs_pct),
    ] {
        if value < Decimal::ZERO || value >= Decimal::ONE {
            return Err(InmoFinanceError::InvalidInput {
                field: field.into(),
                reason: "Must be a fraction in [0, 1)".into(),
            });
        }
    }

    for (field, value) in [
        ("annual_appreciation", input.annual_appreciation),
        ("annual_rent_growth", input.annual_rent_growth),
        ("discount_rate", input.discount_rate),
    ] {
        if value <= dec!(-1) {
            return Err(InmoFinanceError::InvalidInput {
                field: field.into(),
                reason: "Rate must be greater than -100%".into(),
            });
        }
    }

    if input.vacancy_rate > dec!(0.15) {
        warnings.push(format!(
            "Vacancy rate {:.1}% exceeds 15% — above typical market norms",
            input.vacancy_rate * dec!(100)
        ));
    }

    if input.annual_appreciation > dec!(0.15) {
        warnings.push(format!(
            "Annual appreciation {:.1}% exceeds 15% — verify the assumption",
            input.annual_appreciation * dec!(100)
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Payback
// ---------------------------------------------------------------------------

/// Fractional year at which cumulative undiscounted cash flow first turns
/// non-negative, linearly interpolated inside the crossing year. None when
/// the outlay is never recovered within the horizon.
fn payback_period(yearly: &[YearlyCashFlow], total_investment: Money) -> Option<Decimal> {
    let mut prev_cumulative = -total_investment;

    for row in yearly {
        if row.cumulative_cash_flow >= Decimal::ZERO {
            // prev_cumulative < 0 <= cumulative, so the year's flow is positive
            let fraction = -prev_cumulative / row.total_cash_flow;
            return Some(Decimal::from(row.year - 1) + fraction);
        }
        prev_cumulative = row.cumulative_cash_flow;
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
