use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::UnderwriteError;
use crate::types::{Money, Rate};
use crate::UnderwriteResult;

/// Newton-Raphson tuning. Treated as underwriting policy, not physics:
/// callers that want different bounds change these in one place.
pub const IRR_INITIAL_GUESS: Rate = dec!(0.15);
pub const IRR_NPV_TOLERANCE: Decimal = dec!(0.000001);
pub const IRR_DERIVATIVE_EPSILON: Decimal = dec!(0.0000000001);
pub const IRR_GUESS_FLOOR: Rate = dec!(-0.9);
pub const IRR_GUESS_CEILING: Rate = dec!(10);
pub const MAX_IRR_ITERATIONS: u32 = 100;

/// Clamp range for the simple-return heuristic.
pub const FALLBACK_IRR_FLOOR: Rate = dec!(0.05);
pub const FALLBACK_IRR_CEILING: Rate = dec!(0.30);

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Monthly payment on a fixed-rate, fully amortizing loan:
/// P * r(1+r)^n / ((1+r)^n - 1) with r = annual_rate / 12, n = years * 12.
///
/// A zero rate degrades to straight-line principal (never divides by zero).
pub fn amortized_payment(
    principal: Money,
    annual_rate: Rate,
    years: u32,
) -> UnderwriteResult<Money> {
    if years == 0 {
        return Err(UnderwriteError::InvalidInput {
            field: "amortization_years".into(),
            reason: "Amortization must be at least 1 year".into(),
        });
    }

    let total_months = Decimal::from(years) * MONTHS_PER_YEAR;

    if annual_rate.is_zero() {
        return Ok(principal / total_months);
    }

    let monthly_rate = annual_rate / MONTHS_PER_YEAR;
    let compound = (Decimal::ONE + monthly_rate).powi(i64::from(years) * 12);
    let denominator = compound - Decimal::ONE;

    if denominator.is_zero() {
        return Err(UnderwriteError::DivisionByZero {
            context: "amortized payment denominator".into(),
        });
    }

    Ok(principal * monthly_rate * compound / denominator)
}

/// Net Present Value of period-indexed cash flows: sum CF_t / (1+rate)^t.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> UnderwriteResult<Money> {
    if rate <= dec!(-1) {
        return Err(UnderwriteError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount.is_zero() {
            return Err(UnderwriteError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}

/// d(NPV)/dr = sum -t * CF_t / (1+rate)^(t+1). The period-0 flow contributes
/// nothing.
pub fn npv_derivative(rate: Rate, cash_flows: &[Money]) -> Money {
    let one_plus_r = Decimal::ONE + rate;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        discount *= one_plus_r; // (1+r)^(t+1)
        if t == 0 {
            continue;
        }
        dnpv -= Decimal::from(t as i64) * cf / discount;
    }

    dnpv
}

/// NPV and its derivative in one pass, for the solver.
fn npv_and_derivative(cash_flows: &[Money], rate: Rate) -> (Money, Money) {
    let one_plus_r = Decimal::ONE + rate;
    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE; // (1+r)^0

    for (t, cf) in cash_flows.iter().enumerate() {
        npv_val += cf / discount;
        if t > 0 {
            dnpv -= Decimal::from(t as i64) * cf / (discount * one_plus_r);
        }
        discount *= one_plus_r;
    }

    (npv_val, dnpv)
}

/// Newton-Raphson IRR with defensive guards.
///
/// Never fails: pathological inputs return the initial guess and leave an
/// audit note in `warnings`. A flat derivative or an iterate escaping
/// [IRR_GUESS_FLOOR, IRR_GUESS_CEILING] restarts the search from the initial
/// guess rather than aborting. Callers apply their own plausibility window on
/// the result (see `simple_irr_fallback`).
pub fn irr(cash_flows: &[Money], warnings: &mut Vec<String>) -> Rate {
    if cash_flows.len() < 2 {
        warnings.push("IRR: need at least 2 cash flows; returning initial guess".into());
        return IRR_INITIAL_GUESS;
    }
    if cash_flows[0] >= Decimal::ZERO {
        warnings.push("IRR: first cash flow is not an outlay; returning initial guess".into());
        return IRR_INITIAL_GUESS;
    }
    if !cash_flows[1..].iter().any(|cf| *cf > Decimal::ZERO) {
        warnings
            .push("IRR: no positive cash flow after the outlay; returning initial guess".into());
        return IRR_INITIAL_GUESS;
    }

    let mut guess = IRR_INITIAL_GUESS;
    let mut restarts = 0u32;

    for _ in 0..MAX_IRR_ITERATIONS {
        let (npv_val, dnpv) = npv_and_derivative(cash_flows, guess);

        if npv_val.abs() < IRR_NPV_TOLERANCE {
            return guess;
        }

        if dnpv.abs() < IRR_DERIVATIVE_EPSILON {
            guess = IRR_INITIAL_GUESS;
            restarts += 1;
            continue;
        }

        let next = guess - npv_val / dnpv;

        if next < IRR_GUESS_FLOOR || next > IRR_GUESS_CEILING {
            guess = IRR_INITIAL_GUESS;
            restarts += 1;
        } else {
            guess = next;
        }
    }

    warnings.push(format!(
        "IRR: no convergence after {MAX_IRR_ITERATIONS} iterations ({restarts} restarts); returning last iterate {guess:.6}"
    ));
    guess
}

/// Average-annual-return heuristic used when Newton-Raphson lands outside the
/// plausible underwriting window: ((sum of flows + outlay) / term) / outlay,
/// clamped to [FALLBACK_IRR_FLOOR, FALLBACK_IRR_CEILING].
pub fn simple_irr_fallback(
    cash_flows: &[Money],
    initial_outlay: Money,
    analysis_term: u32,
) -> Rate {
    if initial_outlay <= Decimal::ZERO || analysis_term == 0 {
        return FALLBACK_IRR_FLOOR;
    }

    let total_cash_flow: Decimal = cash_flows.iter().sum();
    let total_return = total_cash_flow + initial_outlay;

    if total_return <= Decimal::ZERO {
        return FALLBACK_IRR_FLOOR;
    }

    let avg_annual_return = total_return / Decimal::from(analysis_term);
    (avg_annual_return / initial_outlay).clamp(FALLBACK_IRR_FLOOR, FALLBACK_IRR_CEILING)
}
