//! Pure market-statistics helpers ported from the dashboard backend.
//!
//! These functions receive already-aggregated rows (per-barrio medians,
//! snapshot price series) from whatever data source the caller uses and do
//! only the arithmetic: rental-yield ranking and blue-rate normalization of
//! historical price series.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::InmoFinanceError;
use crate::types::{Currency, Money, Rate};
use crate::InmoResult;

/// Expense haircut applied to gross rent for the net-yield estimate.
pub const DEFAULT_EXPENSE_RATIO: Rate = dec!(0.30);

// ---------------------------------------------------------------------------
// Rental yields
// ---------------------------------------------------------------------------

/// Latest median prices for one barrio, per square meter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarrioPrices {
    pub barrio_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Median sale price per m2; None when the barrio has no sale snapshot
    pub sale_price_usd_m2: Option<Money>,
    /// Median monthly rent per m2; None when there is no rent snapshot
    pub rent_price_usd_m2: Option<Money>,
}

/// Gross and net rental yield for one barrio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarrioYield {
    pub barrio_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub sale_price_usd_m2: Option<Money>,
    pub rent_price_usd_m2: Option<Money>,
    /// (monthly rent * 12) / sale price; None when either price is missing
    pub gross_rental_yield: Option<Rate>,
    /// Gross yield after the expense haircut
    pub net_rental_yield: Option<Rate>,
}

/// Compute gross and net rental yield per barrio, sorted descending by
/// gross yield. Rows missing a sale or rent price carry None yields rather
/// than dropping out, so the caller can still list them.
pub fn rental_yields(
    rows: &[BarrioPrices],
    expense_ratio: Rate,
) -> InmoResult<Vec<BarrioYield>> {
    if expense_ratio < Decimal::ZERO || expense_ratio >= Decimal::ONE {
        return Err(InmoFinanceError::InvalidInput {
            field: "expense_ratio".into(),
            reason: "Expense ratio must be a fraction in [0, 1)".into(),
        });
    }

    let mut yields: Vec<BarrioYield> = rows
        .iter()
        .map(|row| {
            let (gross, net) = match (row.sale_price_usd_m2, row.rent_price_usd_m2) {
                (Some(sale), Some(rent)) if sale > Decimal::ZERO => {
                    let gross = rent * dec!(12) / sale;
                    (Some(gross), Some(gross * (Decimal::ONE - expense_ratio)))
                }
                _ => (None, None),
            };
            BarrioYield {
                barrio_name: row.barrio_name.clone(),
                slug: row.slug.clone(),
                sale_price_usd_m2: row.sale_price_usd_m2,
                rent_price_usd_m2: row.rent_price_usd_m2,
                gross_rental_yield: gross,
                net_rental_yield: net,
            }
        })
        .collect();

    // Descending by gross yield, barrios without one at the bottom
    yields.sort_by(|a, b| {
        b.gross_rental_yield
            .unwrap_or(Decimal::MIN)
            .cmp(&a.gross_rental_yield.unwrap_or(Decimal::MIN))
    });

    Ok(yields)
}

// ---------------------------------------------------------------------------
// Inflation-adjusted price trend
// ---------------------------------------------------------------------------

/// One observation of the city-wide price series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTrendPoint {
    pub date: NaiveDate,
    pub price_usd_m2: Money,
    #[serde(default)]
    pub currency: Currency,
    /// Blue rate recorded at snapshot time, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue_rate: Option<Money>,
}

/// Normalize a price series to "today's USD" using the blue rate of the
/// most recent observation that has one.
///
/// A lower historical blue rate means the dollar bought fewer pesos then,
/// so the adjustment factor for each point is `point rate / latest rate`.
/// Points without a recorded rate pass through unadjusted; a series with no
/// rates at all is returned as-is.
pub fn adjust_price_trend(points: &[PriceTrendPoint]) -> Vec<PriceTrendPoint> {
    let latest_rate = points
        .iter()
        .filter(|p| p.blue_rate.is_some_and(|r| r > Decimal::ZERO))
        .max_by_key(|p| p.date)
        .and_then(|p| p.blue_rate);

    let Some(latest_rate) = latest_rate else {
        return points.to_vec();
    };

    points
        .iter()
        .map(|p| match p.blue_rate {
            Some(rate) if rate > Decimal::ZERO => PriceTrendPoint {
                date: p.date,
                price_usd_m2: p.price_usd_m2 * rate / latest_rate,
                currency: p.currency,
                blue_rate: p.blue_rate,
            },
            _ => p.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
