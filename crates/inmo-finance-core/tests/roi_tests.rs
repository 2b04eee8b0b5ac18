use inmo_finance_core::roi::{simulate, RoiSimulationInput};
use inmo_finance_core::time_value;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Baseline scenario: USD 120k purchase, USD 600 rent, 10-year hold
// ===========================================================================

fn baseline() -> RoiSimulationInput {
    RoiSimulationInput {
        purchase_price_usd: dec!(120000),
        monthly_rent_usd: dec!(600),
        monthly_expenses_usd: dec!(100),
        vacancy_rate: dec!(0.05),
        annual_appreciation: dec!(0.03),
        annual_rent_growth: Decimal::ZERO,
        closing_costs_pct: dec!(0.05),
        sale_costs_pct: Decimal::ZERO,
        holding_period_years: 10,
        discount_rate: dec!(0.08),
    }
}

#[test]
fn test_baseline_reference_numbers() {
    let result = simulate(&baseline()).unwrap();
    let out = &result.result;

    assert_eq!(out.total_investment, dec!(126000));
    assert_eq!(out.annual_net_income, dec!(5640));
    assert_eq!(out.cap_rate, dec!(0.047));
    assert_eq!(out.gross_rental_yield, dec!(0.06));
    assert!((out.cash_on_cash_return - dec!(0.04476)).abs() < dec!(0.00001));

    // IRR and NPV are finite and present for this profitable scenario
    let irr = out.irr.expect("baseline IRR");
    assert!(irr > dec!(-0.99) && irr < dec!(10));
}

#[test]
fn test_npv_irr_consistency() {
    // Discounting the series at the computed IRR zeroes the NPV.
    let result = simulate(&baseline()).unwrap();
    let out = &result.result;
    let irr = out.irr.expect("baseline IRR");

    let residual = time_value::npv(irr, &out.cash_flows).unwrap();
    assert!(residual.abs() < dec!(0.001), "residual {residual}");
}

#[test]
fn test_determinism() {
    let a = simulate(&baseline()).unwrap();
    let b = simulate(&baseline()).unwrap();
    assert_eq!(
        serde_json::to_value(&a.result).unwrap(),
        serde_json::to_value(&b.result).unwrap()
    );
}

#[test]
fn test_discount_rate_above_irr_flips_npv_sign() {
    let irr = simulate(&baseline()).unwrap().result.irr.unwrap();

    let mut cheap_money = baseline();
    cheap_money.discount_rate = irr - dec!(0.03);
    let mut dear_money = baseline();
    dear_money.discount_rate = irr + dec!(0.03);

    assert!(simulate(&cheap_money).unwrap().result.npv > Decimal::ZERO);
    assert!(simulate(&dear_money).unwrap().result.npv < Decimal::ZERO);
}

#[test]
fn test_yearly_breakdown_matches_series() {
    let result = simulate(&baseline()).unwrap();
    let out = &result.result;

    assert_eq!(out.yearly.len(), 10);
    for (row, cf) in out.yearly.iter().zip(out.cash_flows.iter().skip(1)) {
        assert_eq!(row.total_cash_flow, *cf);
    }
    // Cumulative of the last row equals the undiscounted sum of the series
    let plain_sum: Decimal = out.cash_flows.iter().copied().sum();
    assert_eq!(out.yearly.last().unwrap().cumulative_cash_flow, plain_sum);
}

#[test]
fn test_boundary_rates_behave_continuously() {
    // Zero vacancy / zero closing costs are ordinary parameter values.
    let mut input = baseline();
    input.vacancy_rate = Decimal::ZERO;
    input.closing_costs_pct = Decimal::ZERO;
    let out = simulate(&input).unwrap().result;

    assert_eq!(out.total_investment, dec!(120000));
    // (600 - 100) * 12 = 6000
    assert_eq!(out.annual_net_income, dec!(6000));
    assert_eq!(out.cash_on_cash_return, dec!(0.05));
}

#[test]
fn test_outsized_return_nulls_irr_instead_of_boundary_rate() {
    // Rent dwarfing the price puts the true IRR far above the 1000% search
    // ceiling. The engine must report no IRR rather than the ceiling itself
    // dressed up as a converged rate.
    let input = RoiSimulationInput {
        purchase_price_usd: dec!(1000),
        monthly_rent_usd: dec!(1500),
        monthly_expenses_usd: Decimal::ZERO,
        vacancy_rate: Decimal::ZERO,
        annual_appreciation: Decimal::ZERO,
        annual_rent_growth: Decimal::ZERO,
        closing_costs_pct: Decimal::ZERO,
        sale_costs_pct: Decimal::ZERO,
        holding_period_years: 10,
        discount_rate: dec!(0.08),
    };
    let result = simulate(&input).unwrap();
    let out = &result.result;

    assert!(out.irr.is_none());
    assert!(result.warnings.iter().any(|w| w.contains("IRR not computed")));
    // The rest of the analysis is still populated and valid
    assert!(out.npv > Decimal::ZERO);
    assert_eq!(out.annual_net_income, dec!(18000));
}

#[test]
fn test_unprofitable_scenario_nulls_irr_and_payback() {
    let input = RoiSimulationInput {
        purchase_price_usd: dec!(50000),
        monthly_rent_usd: Decimal::ZERO,
        monthly_expenses_usd: dec!(200),
        vacancy_rate: Decimal::ZERO,
        annual_appreciation: dec!(-0.95),
        annual_rent_growth: Decimal::ZERO,
        closing_costs_pct: Decimal::ZERO,
        sale_costs_pct: Decimal::ZERO,
        holding_period_years: 4,
        discount_rate: dec!(0.08),
    };
    let result = simulate(&input).unwrap();
    let out = &result.result;

    // Every flow is negative: no IRR exists and the outlay never comes back,
    // yet the direct metrics remain populated.
    assert!(out.irr.is_none());
    assert!(out.payback_years.is_none());
    assert_eq!(out.gross_rental_yield, Decimal::ZERO);
    assert!(out.npv < Decimal::ZERO);
}
