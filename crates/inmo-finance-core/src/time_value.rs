use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::InmoFinanceError;
use crate::types::{Money, Rate};
use crate::InmoResult;

/// Absolute convergence tolerance on the rate.
const RATE_TOLERANCE: Decimal = dec!(0.000001);
/// Bisection runs past RATE_TOLERANCE so the NPV residual at the returned
/// rate stays negligible even for six-figure cash flows.
const BISECTION_TOLERANCE: Decimal = dec!(0.000000000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const DERIVATIVE_FLOOR: Decimal = dec!(0.000000001);

/// Admissible IRR search range: -99% to 1000% annual.
const MIN_RATE: Decimal = dec!(-0.99);
const MAX_RATE: Decimal = dec!(10.0);

/// Coarse grid scanned for a sign change when Newton-Raphson fails.
const BRACKET_GRID: [Decimal; 16] = [
    dec!(-0.99),
    dec!(-0.9),
    dec!(-0.75),
    dec!(-0.5),
    dec!(-0.25),
    dec!(-0.1),
    dec!(-0.05),
    dec!(0.0),
    dec!(0.05),
    dec!(0.1),
    dec!(0.25),
    dec!(0.5),
    dec!(1.0),
    dec!(2.0),
    dec!(5.0),
    dec!(10.0),
];

/// Net Present Value of a series of cash flows.
///
/// The exponent for each flow is its index in the slice (period 0 is
/// undiscounted). A zero rate reduces to a plain sum.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> InmoResult<Money> {
    if rate <= dec!(-1) {
        return Err(InmoFinanceError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut result = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount.is_zero() {
            return Err(InmoFinanceError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}

/// Internal Rate of Return: the rate at which `npv` of the series is zero.
///
/// Hybrid solver: Newton-Raphson from `guess`, falling back to a grid scan
/// over [-99%, 1000%] plus bisection when Newton diverges or the arithmetic
/// overflows. A series that never changes sign has no IRR and is rejected
/// up front.
pub fn irr(cash_flows: &[Money], guess: Rate) -> InmoResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(InmoFinanceError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let has_positive = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    let has_negative = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    if !has_positive || !has_negative {
        return Err(InmoFinanceError::FinancialImpossibility(
            "cash-flow series never changes sign, so no rate can zero its NPV".into(),
        ));
    }

    if let Some(rate) = newton_irr(cash_flows, guess) {
        return Ok(rate);
    }

    bracket_and_bisect(cash_flows)
}

/// Constant-payment (French system) periodic payment:
/// `P * r(1+r)^n / ((1+r)^n - 1)`.
///
/// A zero rate degenerates to straight-line repayment `P / n`.
pub fn pmt_french(principal: Money, periodic_rate: Rate, periods: u32) -> InmoResult<Money> {
    if periods == 0 {
        return Err(InmoFinanceError::InvalidInput {
            field: "periods".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if periodic_rate < Decimal::ZERO {
        return Err(InmoFinanceError::InvalidInput {
            field: "periodic_rate".into(),
            reason: "Periodic rate must be non-negative".into(),
        });
    }

    if periodic_rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    // (1 + r)^n via iterative multiplication, checked: a large enough rate
    // and term overflow Decimal, which must surface as an error.
    let growth = Decimal::ONE + periodic_rate;
    let mut compound = Decimal::ONE;
    for _ in 0..periods {
        compound = compound
            .checked_mul(growth)
            .ok_or_else(|| compounding_overflow("periodic_rate"))?;
    }

    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(InmoFinanceError::DivisionByZero {
            context: "French payment annuity factor".into(),
        });
    }

    // compound / denominator stays near 1 even when compound is enormous,
    // so divide before multiplying by the principal.
    let annuity_factor = compound / denominator;
    principal
        .checked_mul(periodic_rate)
        .and_then(|v| v.checked_mul(annuity_factor))
        .ok_or_else(|| compounding_overflow("periodic_rate"))
}

fn compounding_overflow(field: &str) -> InmoFinanceError {
    InmoFinanceError::InvalidInput {
        field: field.into(),
        reason: "Rate compounds past the representable range over the term".into(),
    }
}

// ---------------------------------------------------------------------------
// Solver internals
// ---------------------------------------------------------------------------

fn newton_irr(cash_flows: &[Money], guess: Rate) -> Option<Rate> {
    let mut rate = guess;

    for _ in 0..MAX_IRR_ITERATIONS {
        let (npv_val, dnpv) = npv_and_derivative(cash_flows, rate)?;

        if dnpv.abs() < DERIVATIVE_FLOOR {
            return None;
        }

        let step = rate - npv_val.checked_div(dnpv)?;
        let next = step.clamp(MIN_RATE, MAX_RATE);
        if (next - rate).abs() < RATE_TOLERANCE {
            // A clamped step that stops moving has pinned itself to the
            // search boundary, not found a root.
            if next != step {
                return None;
            }
            return Some(next);
        }
        rate = next;
    }

    None
}

fn bracket_and_bisect(cash_flows: &[Money]) -> InmoResult<Rate> {
    let mut prev: Option<(Rate, Decimal)> = None;

    for rate in BRACKET_GRID {
        // Grid points where the arithmetic overflows are skipped; the
        // bracket only needs two evaluable points of opposite sign.
        let Some((val, _)) = npv_and_derivative(cash_flows, rate) else {
            continue;
        };
        if val.is_zero() {
            return Ok(rate);
        }
        if let Some((lo_rate, lo_val)) = prev {
            if (lo_val < Decimal::ZERO) != (val < Decimal::ZERO) {
                return bisect(cash_flows, lo_rate, rate, lo_val);
            }
        }
        prev = Some((rate, val));
    }

    Err(InmoFinanceError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: prev.map(|(_, v)| v).unwrap_or(Decimal::ZERO),
    })
}

fn bisect(cash_flows: &[Money], mut lo: Rate, mut hi: Rate, mut lo_val: Decimal) -> InmoResult<Rate> {
    for i in 0..MAX_IRR_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        if hi - lo < BISECTION_TOLERANCE {
            return Ok(mid);
        }

        let Some((mid_val, _)) = npv_and_derivative(cash_flows, mid) else {
            return Err(InmoFinanceError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: lo_val,
            });
        };

        if mid_val.is_zero() {
            return Ok(mid);
        }
        if (mid_val < Decimal::ZERO) == (lo_val < Decimal::ZERO) {
            lo = mid;
            lo_val = mid_val;
        } else {
            hi = mid;
        }
    }

    // The interval halves every pass, so 100 iterations leave it far below
    // the tolerance; the midpoint is the converged root.
    Ok((lo + hi) / dec!(2))
}

/// NPV(r) = sum CF_t / (1+r)^t and its derivative d(NPV)/dr, evaluated with
/// checked arithmetic. Returns None when the rate is out of domain or the
/// discount factors overflow Decimal.
fn npv_and_derivative(cash_flows: &[Money], rate: Rate) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut npv = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE; // (1+r)^-t

    for (t, cf) in cash_flows.iter().enumerate() {
        npv = npv.checked_add(cf.checked_mul(discount)?)?;
        if t > 0 {
            // d/dr of CF_t / (1+r)^t = -t * CF_t / (1+r)^(t+1)
            let term = Decimal::from(-(t as i64))
                .checked_mul(*cf)?
                .checked_mul(discount)?
                .checked_div(one_plus_r)?;
            dnpv = dnpv.checked_add(term)?;
        }
        discount = discount.checked_div(one_plus_r)?;
        if discount.is_zero() {
            return None;
        }
    }

    Some((npv, dnpv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        // NPV at 10%: -1000 + 300/1.1 + 400/1.21 + 500/1.331 ≈ -21.04
        assert!((result - dec!(-21.04)).abs() < dec!(1.0));
    }

    #[test]
    fn test_npv_zero_rate_is_plain_sum() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        let result = npv(dec!(0.0), &cfs).unwrap();
        assert_eq!(result, dec!(50));
    }

    #[test]
    fn test_npv_rejects_rate_at_minus_one() {
        let cfs = vec![dec!(-100), dec!(110)];
        assert!(npv(dec!(-1), &cfs).is_err());
    }

    #[test]
    fn test_irr_single_period() {
        // Invest 100, receive 110 in 1 year => IRR = 10%
        let cfs = vec![dec!(-100), dec!(110)];
        let rate = irr(&cfs, dec!(0.10)).unwrap();
        assert!((rate - dec!(0.10)).abs() < dec!(0.001), "got {rate}");
    }

    #[test]
    fn test_irr_multi_period() {
        // Invest 1000, receive 300/year for 5 years => IRR ~15.24%
        let cfs = vec![
            dec!(-1000),
            dec!(300),
            dec!(300),
            dec!(300),
            dec!(300),
            dec!(300),
        ];
        let rate = irr(&cfs, dec!(0.10)).unwrap();
        assert!(rate > dec!(0.14) && rate < dec!(0.17), "got {rate}");
    }

    #[test]
    fn test_irr_zeroes_npv() {
        let cfs = vec![dec!(-126000), dec!(5640), dec!(5640), dec!(170000)];
        let rate = irr(&cfs, dec!(0.10)).unwrap();
        let residual = npv(rate, &cfs).unwrap();
        assert!(residual.abs() < dec!(0.001), "residual {residual}");
    }

    #[test]
    fn test_irr_no_sign_change() {
        let cfs = vec![dec!(-100), dec!(-50), dec!(-25)];
        let err = irr(&cfs, dec!(0.10)).unwrap_err();
        assert!(matches!(
            err,
            InmoFinanceError::FinancialImpossibility(_)
        ));
    }

    #[test]
    fn test_irr_deeply_negative_rate() {
        // Invest 100, recover only 10 => IRR = -90%
        let cfs = vec![dec!(-100), dec!(10)];
        let rate = irr(&cfs, dec!(0.10)).unwrap();
        assert!((rate - dec!(-0.90)).abs() < dec!(0.001), "got {rate}");
    }

    #[test]
    fn test_irr_long_horizon_does_not_overflow() {
        // 60-year series with a large terminal flow still solves.
        let mut cfs = vec![dec!(-100000)];
        for _ in 0..59 {
            cfs.push(dec!(4000));
        }
        cfs.push(dec!(250000));
        let rate = irr(&cfs, dec!(0.10)).unwrap();
        assert!(rate > dec!(0.0) && rate < dec!(0.10), "got {rate}");
    }

    #[test]
    fn test_irr_above_search_range_is_rejected() {
        // True IRR is 1400%, beyond the 1000% ceiling. The solver must not
        // report the boundary itself as a converged root.
        let cfs = vec![dec!(-100), dec!(1500)];
        let err = irr(&cfs, dec!(0.10)).unwrap_err();
        assert!(matches!(err, InmoFinanceError::ConvergenceFailure { .. }));
    }

    #[test]
    fn test_irr_below_search_range_is_rejected() {
        // True IRR is -99.5%, between -100% and the -99% floor.
        let cfs = vec![dec!(-100), dec!(0.5)];
        let err = irr(&cfs, dec!(0.10)).unwrap_err();
        assert!(matches!(err, InmoFinanceError::ConvergenceFailure { .. }));
    }

    #[test]
    fn test_pmt_french_30_year_mortgage() {
        // $750k at 6.5% over 30 years, expected ~$4,740/mo
        let payment = pmt_french(dec!(750000), dec!(0.065) / dec!(12), 360).unwrap();
        assert!(
            payment > dec!(4700) && payment < dec!(4800),
            "monthly payment {payment} outside expected range"
        );
    }

    #[test]
    fn test_pmt_french_zero_rate_straight_line() {
        let payment = pmt_french(dec!(360000), Decimal::ZERO, 360).unwrap();
        assert_eq!(payment, dec!(1000));
    }

    #[test]
    fn test_pmt_french_zero_periods() {
        assert!(pmt_french(dec!(1000), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_pmt_french_extreme_rate_errors_instead_of_panicking() {
        // 500% annual over 20 years overflows (1+r)^n.
        let result = pmt_french(dec!(80000), dec!(5) / dec!(12), 240);
        assert!(matches!(
            result,
            Err(InmoFinanceError::InvalidInput { .. })
        ));
    }
}
