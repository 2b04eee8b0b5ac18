use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
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

/// Input parameters for a UVA-indexed mortgage projection.
///
/// `uva_value` and `blue_rate` are live market figures the caller sources
/// from its own data feed; the engine only consumes the numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UvaAmortizationInput {
    /// Property price in USD
    pub property_price_usd: Money,
    /// Down payment as a fraction of price, in [0, 1)
    pub down_payment_pct: Rate,
    /// Loan term in years
    pub loan_term_years: u32,
    /// Nominal annual rate (TNA) on the UVA balance
    pub annual_rate: Rate,
    /// Current UVA index value in ARS
    pub uva_value: Money,
    /// Informal ("blue") ARS per USD exchange rate
    pub blue_rate: Money,
    /// Assumed fractional annual inflation driving the index
    pub annual_inflation: Rate,
}

/// One month of the amortization schedule, in index units and in nominal
/// pesos at that month's projected index value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UvaScheduleRow {
    pub month: u32,
    pub payment_uva: Money,
    pub interest_uva: Money,
    pub capital_uva: Money,
    pub payment_ars: Money,
    pub interest_ars: Money,
    pub capital_ars: Money,
    /// Outstanding balance in UVA after this month's capital, floored at 0
    pub remaining_uva_balance: Money,
    /// Projected UVA value used to translate this month's figures
    pub index_value: Money,
}

/// Complete UVA amortization output with the full month-by-month schedule.
///
/// Index-unit quantities keep full Decimal precision; rounding for display
/// belongs to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UvaAmortizationOutput {
    pub loan_usd: Money,
    pub loan_ars: Money,
    pub loan_uva_units: Money,
    pub monthly_rate: Rate,
    pub total_months: u32,
    /// Constant French-system payment in index units
    pub payment_uva: Money,
    /// Monthly inflation implied by compounding the annual assumption
    pub monthly_inflation: Rate,
    pub schedule: Vec<UvaScheduleRow>,
    /// Nominal payment of month 1
    pub first_payment_ars: Money,
    /// Nominal payment of the final month
    pub last_payment_ars: Money,
    /// Sum of all nominal payments
    pub total_paid_ars: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project a UVA-indexed French-amortization schedule.
///
/// The payment is constant in index units; nominal figures grow with the
/// projected index, which compounds by the monthly inflation before each
/// month's translation.
pub fn project(
    input: &UvaAmortizationInput,
) -> InmoResult<ComputationOutput<UvaAmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input, &mut warnings)?;

    let loan_usd = input.property_price_usd * (Decimal::ONE - input.down_payment_pct);
    let loan_ars = loan_usd * input.blue_rate;
    let loan_uva_units = loan_ars / input.uva_value;

    let monthly_rate = input.annual_rate / dec!(12);
    let total_months = input.loan_term_years * 12;
    let payment_uva = time_value::pmt_french(loan_uva_units, monthly_rate, total_months)?;

    // Spread the annual assumption smoothly over 12 months instead of
    // applying it as a single annual step.
    let monthly_inflation =
        (Decimal::ONE + input.annual_inflation).powd(Decimal::ONE / dec!(12)) - Decimal::ONE;

    let mut schedule: Vec<UvaScheduleRow> = Vec::with_capacity(total_months as usize);
    let mut remaining_uva_balance = loan_uva_units;
    let mut current_index_value = input.uva_value;
    let mut total_paid_ars = Decimal::ZERO;

    for month in 1..=total_months {
        // Index compounds before this month's translation: month m already
        // reflects m months of inflation. Checked: a runaway inflation
        // assumption overflows Decimal long before month 240.
        current_index_value = current_index_value
            .checked_mul(Decimal::ONE + monthly_inflation)
            .ok_or_else(index_overflow)?;

        let interest_uva = remaining_uva_balance * monthly_rate;
        let capital_uva = payment_uva - interest_uva;
        remaining_uva_balance -= capital_uva;
        if remaining_uva_balance < Decimal::ZERO {
            remaining_uva_balance = Decimal::ZERO;
        }

        // interest_uva and capital_uva never exceed payment_uva, so this is
        // the only translation that can overflow.
        let payment_ars = payment_uva
            .checked_mul(current_index_value)
            .ok_or_else(index_overflow)?;
        total_paid_ars = total_paid_ars
            .checked_add(payment_ars)
            .ok_or_else(index_overflow)?;

        schedule.push(UvaScheduleRow {
            month,
            payment_uva,
            interest_uva,
            capital_uva,
            payment_ars,
            interest_ars: interest_uva * current_index_value,
            capital_ars: capital_uva * current_index_value,
            remaining_uva_balance,
            index_value: current_index_value,
        });
    }

    let first_payment_ars = schedule
        .first()
        .map(|row| row.payment_ars)
        .unwrap_or(Decimal::ZERO);
    let last_payment_ars = schedule
        .last()
        .map(|row| row.payment_ars)
        .unwrap_or(Decimal::ZERO);

    let output = UvaAmortizationOutput {
        loan_usd,
        loan_ars,
        loan_uva_units,
        monthly_rate,
        total_months,
        payment_uva,
        monthly_inflation,
        schedule,
        first_payment_ars,
        last_payment_ars,
        total_paid_ars,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "UVA Mortgage Amortization (French System)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn index_overflow() -> InmoFinanceError {
    InmoFinanceError::InvalidInput {
        field: "annual_inflation".into(),
        reason: "Projected index compounds past the representable range over the term".into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &UvaAmortizationInput, warnings: &mut Vec<String>) -> InmoResult<()> {
    if input.property_price_usd <= Decimal::ZERO {
        return Err(InmoFinanceError::InvalidInput {
            field: "property_price_usd".into(),
            reason: "Property price must be positive".into(),
        });
    }

    if input.down_payment_pct < Decimal::ZERO || input.down_payment_pct >= Decimal::ONE {
        return Err(InmoFinanceError::InvalidInput {
            field: "down_payment_pct".into(),
            reason: "Down payment must be a fraction in [0, 1)".into(),
        });
    }

    if input.loan_term_years < 1 {
        return Err(InmoFinanceError::InvalidInput {
            field: "loan_term_years".into(),
            reason: "Loan term must be at least 1 year".into(),
        });
    }

    if input.annual_rate < Decimal::ZERO {
        return Err(InmoFinanceError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Annual rate cannot be negative".into(),
        });
    }

    if input.annual_inflation < Decimal::ZERO {
        return Err(InmoFinanceError::InvalidInput {
            field: "annual_inflation".into(),
            reason: "Annual inflation cannot be negative".into(),
        });
    }

    // Market inputs: without a positive index value and exchange rate the
    // schedule would be meaningless, so no result is produced at all.
    if input.uva_value <= Decimal::ZERO {
        return Err(InmoFinanceError::InsufficientData(
            "UVA index value is missing or non-positive — cannot denominate the loan".into(),
        ));
    }

    if input.blue_rate <= Decimal::ZERO {
        return Err(InmoFinanceError::InsufficientData(
            "Blue exchange rate is missing or non-positive — cannot convert the loan to ARS"
                .into(),
        ));
    }

    if input.down_payment_pct < dec!(0.20) {
        warnings.push(format!(
            "Down payment {:.1}% is below 20% — high leverage for a UVA loan",
            input.down_payment_pct * dec!(100)
        ));
    }

    if input.annual_inflation > dec!(1.0) {
        warnings.push(format!(
            "Annual inflation assumption {:.0}% exceeds 100% — verify the scenario",
            input.annual_inflation * dec!(100)
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn baseline_input() -> UvaAmortizationInput {
        UvaAmortizationInput {
            property_price_usd: dec!(100000),
            down_payment_pct: dec!(0.20),
            loan_term_years: 20,
            annual_rate: dec!(0.055),
            uva_value: dec!(1000),
            blue_rate: dec!(1000),
            annual_inflation: dec!(0.50),
        }
    }

    #[test]
    fn test_baseline_loan_derivations() {
        let result = project(&baseline_input()).unwrap();
        let out = &result.result;

        assert_eq!(out.loan_usd, dec!(80000));
        assert_eq!(out.loan_ars, dec!(80000000));
        assert_eq!(out.loan_uva_units, dec!(80000));
        assert_eq!(out.total_months, 240);
        assert_eq!(out.schedule.len(), 240);
    }

    #[test]
    fn test_payment_constant_in_uva() {
        let result = project(&baseline_input()).unwrap();
        let out = &result.result;
        for row in &out.schedule {
            assert_eq!(row.payment_uva, out.payment_uva);
        }
    }

    #[test]
    fn test_nominal_payment_strictly_increasing() {
        let result = project(&baseline_input()).unwrap();
        let out = &result.result;
        for pair in out.schedule.windows(2) {
            assert!(
                pair[1].payment_ars > pair[0].payment_ars,
                "month {} payment did not grow",
                pair[1].month
            );
        }
        assert_eq!(out.first_payment_ars, out.schedule[0].payment_ars);
        assert_eq!(out.last_payment_ars, out.schedule[239].payment_ars);
    }

    #[test]
    fn test_zero_rate_straight_line() {
        let mut input = baseline_input();
        input.annual_rate = Decimal::ZERO;
        let result = project(&input).unwrap();
        let out = &result.result;

        assert_eq!(out.payment_uva, out.loan_uva_units / dec!(240));
        for row in &out.schedule {
            assert_eq!(row.interest_uva, Decimal::ZERO);
            assert_eq!(row.capital_uva, out.payment_uva);
        }
    }

    #[test]
    fn test_zero_inflation_keeps_nominal_flat() {
        let mut input = baseline_input();
        input.annual_inflation = Decimal::ZERO;
        let result = project(&input).unwrap();
        let out = &result.result;

        assert_eq!(out.monthly_inflation, Decimal::ZERO);
        assert_eq!(out.first_payment_ars, out.last_payment_ars);
    }

    #[test]
    fn test_missing_uva_value_is_insufficient_data() {
        let mut input = baseline_input();
        input.uva_value = Decimal::ZERO;
        let err = project(&input).unwrap_err();
        assert!(matches!(err, InmoFinanceError::InsufficientData(_)));
    }

    #[test]
    fn test_missing_blue_rate_is_insufficient_data() {
        let mut input = baseline_input();
        input.blue_rate = dec!(-1);
        let err = project(&input).unwrap_err();
        assert!(matches!(err, InmoFinanceError::InsufficientData(_)));
    }

    #[test]
    fn test_extreme_rate_errors_instead_of_panicking() {
        // 500% TNA over 20 years overflows the payment compounding.
        let mut input = baseline_input();
        input.annual_rate = dec!(5);
        let err = project(&input).unwrap_err();
        assert!(matches!(err, InmoFinanceError::InvalidInput { .. }));
    }

    #[test]
    fn test_runaway_inflation_errors_instead_of_panicking() {
        let mut input = baseline_input();
        input.annual_inflation = dec!(1000000000000);
        let err = project(&input).unwrap_err();
        match err {
            InmoFinanceError::InvalidInput { field, .. } => {
                assert_eq!(field, "annual_inflation");
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_low_down_payment_warning() {
        let mut input = baseline_input();
        input.down_payment_pct = dec!(0.10);
        let result = project(&input).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("below 20%")));
    }

    #[test]
    fn test_triple_digit_inflation_warning() {
        let mut input = baseline_input();
        input.annual_inflation = dec!(1.5);
        let result = project(&input).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("exceeds 100%")));
    }

    #[test]
    fn test_validation_rejects_down_payment_of_one() {
        let mut input = baseline_input();
        input.down_payment_pct = Decimal::ONE;
        assert!(project(&input).is_err());
    }
}
