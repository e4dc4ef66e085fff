use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::facts::UnderwritingAssumptions;
use crate::time_value;
use crate::types::{Money, Rate};
use crate::UnderwriteResult;

/// Debt and equity structure at the selected price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Financing {
    pub loan_amount: Money,
    pub equity: Money,
    /// Annual debt service (12 x monthly level payment).
    pub debt_service: Money,
    pub dscr: Decimal,
    pub cash_on_cash_return: Rate,
}

/// Size the loan against the selected price and derive the coverage ratios.
///
/// Price-basis-agnostic: whatever price the caller resolved (market, whisper
/// or custom) is consumed as-is. Zero debt service or zero equity degrade the
/// affected ratio to 0 with a warning rather than failing.
pub fn derive_financing(
    selected_price: Money,
    noi: Money,
    assumptions: &UnderwritingAssumptions,
    warnings: &mut Vec<String>,
) -> UnderwriteResult<Financing> {
    let loan_amount = selected_price * assumptions.loan_to_value;
    let equity = selected_price - loan_amount;

    let monthly_payment = time_value::amortized_payment(
        loan_amount,
        assumptions.interest_rate,
        assumptions.amortization_years,
    )?;
    let debt_service = monthly_payment * dec!(12);

    let dscr = if debt_service.is_zero() {
        warnings.push("Zero debt service; DSCR reported as 0".into());
        Decimal::ZERO
    } else {
        noi / debt_service
    };

    let cash_on_cash_return = if equity.is_zero() {
        warnings.push("Zero equity; cash-on-cash reported as 0".into());
        Decimal::ZERO
    } else {
        (noi - debt_service) / equity
    };

    if dscr > Decimal::ZERO && dscr < dec!(1.2) {
        warnings.push(format!(
            "DSCR of {dscr:.2} is below 1.20x — lender covenant risk"
        ));
    }

    if assumptions.loan_to_value > dec!(0.80) {
        warnings.push(format!(
            "LTV of {:.1}% exceeds 80% — high leverage",
            assumptions.loan_to_value * dec!(100)
        ));
    }

    Ok(Financing {
        loan_amount,
        equity,
        debt_service,
        dscr,
        cash_on_cash_return,
    })
}
