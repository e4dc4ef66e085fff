use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::facts::{PropertyFacts, RentRoll, UnderwritingAssumptions};
use crate::types::{Money, Rate};
use crate::UnderwriteResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Year-1 operating picture plus the market valuation derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProForma {
    /// Units after any rent-roll override.
    pub units: u32,
    /// Occupancy after any rent-roll override.
    pub occupancy: Rate,
    /// Average monthly rent after any rent-roll override.
    pub avg_monthly_rent: Money,
    /// Vacancy actually applied: the occupancy complement when a rent roll
    /// drives occupancy, otherwise the assumption constant.
    pub vacancy_used: Rate,
    pub gross_potential_income: Money,
    pub effective_gross_income: Money,
    pub operating_expenses: Money,
    pub noi: Money,
    /// NOI / market cap rate.
    pub market_valuation: Money,
    /// Whisper price minus market valuation; zero when no whisper price.
    pub price_difference: Money,
}

/// Derive gross/effective income, expenses, NOI and the cap-rate valuation.
///
/// A rent roll, when present and non-empty, overrides the extracted facts
/// before any income calculation, and its NOI is recomputed from scratch:
/// stated expense/NOI figures are discarded in favor of the roll.
pub fn derive_pro_forma(
    facts: &PropertyFacts,
    rent_roll: Option<&RentRoll>,
    assumptions: &UnderwritingAssumptions,
    warnings: &mut Vec<String>,
) -> UnderwriteResult<ProForma> {
    let rr = rent_roll.filter(|rr| rr.total_units > 0);

    let (units, occupancy, avg_monthly_rent) = match rr {
        Some(rr) => (rr.total_units, rr.occupancy_rate, rr.average_monthly_rent),
        None => (facts.units, facts.occupancy, facts.avg_monthly_rent),
    };

    let vacancy_used = match rr {
        Some(rr) => Decimal::ONE - rr.occupancy_rate,
        None => assumptions.vacancy,
    };

    let gross_potential_income = Decimal::from(units) * avg_monthly_rent * MONTHS_PER_YEAR;
    let effective_gross_income = gross_potential_income * (Decimal::ONE - vacancy_used);

    let (operating_expenses, mut noi) = match rr {
        Some(rr) => {
            // Ground everything in the actual roll
            let annual_rent = rr.total_monthly_rent * MONTHS_PER_YEAR;
            let vacancy_loss = annual_rent * (Decimal::ONE - rr.occupancy_rate);
            let egi = annual_rent - vacancy_loss;
            let expenses = egi * assumptions.expense_ratio;
            (expenses, egi - expenses)
        }
        None => {
            let expenses = match facts.annual_operating_expenses {
                Some(e) if e > Decimal::ZERO => e,
                _ => effective_gross_income * assumptions.expense_ratio,
            };
            let noi = match facts.noi {
                Some(n) if n > Decimal::ZERO => n,
                _ => effective_gross_income - expenses,
            };
            (expenses, noi)
        }
    };

    if noi <= Decimal::ZERO {
        noi = effective_gross_income * (Decimal::ONE - assumptions.expense_ratio);
        warnings.push(format!(
            "Non-positive NOI; fell back to EGI x (1 - expense ratio) = {noi:.2}"
        ));
    }

    let market_valuation = noi / assumptions.market_cap_rate;

    let price_difference = match facts.whisper_price {
        Some(wp) if wp > Decimal::ZERO => wp - market_valuation,
        _ => Decimal::ZERO,
    };

    Ok(ProForma {
        units,
        occupancy,
        avg_monthly_rent,
        vacancy_used,
        gross_potential_income,
        effective_gross_income,
        operating_expenses,
        noi,
        market_valuation,
        price_difference,
    })
}
