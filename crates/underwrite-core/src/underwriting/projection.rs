use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::facts::{RentRoll, UnderwritingAssumptions};
use crate::types::{Money, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// One row of the projection schedule, year 0..=analysis_term.
///
/// Operating cash-flow fields hold operating figures only; sale proceeds are
/// added by the IRR resolver when it builds its vectors, never folded in here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRow {
    pub year: u32,
    pub gross_income: Money,
    pub operating_expenses: Money,
    pub noi: Money,
    pub debt_service: Money,
    pub cash_flow_before_debt: Money,
    pub cash_flow_after_debt: Money,
    pub cumulative_cash_flow_before_debt: Money,
    pub cumulative_cash_flow_after_debt: Money,
    pub remaining_debt: Money,
    pub property_value: Money,
    /// Sale value net of remaining debt; populated only in the terminal year.
    pub exit_equity: Money,
    pub total_return_unlevered: Money,
    pub total_return_levered: Money,
    pub annual_cash_on_cash: Rate,
}

/// Build the year-0..N schedule.
///
/// Year 0 is the outlay: the unlevered view pays the full price, the levered
/// view the equity. Operating years grow income at the rent growth rate,
/// hold debt service constant (fixed-rate loan) and reduce principal
/// straight-line at loan/amortization_years, floored at zero. Intermediate
/// years are valued at the market cap rate; only the terminal year uses the
/// exit cap rate.
pub fn project(
    purchase_price: Money,
    equity: Money,
    loan_amount: Money,
    initial_noi: Money,
    initial_debt_service: Money,
    assumptions: &UnderwritingAssumptions,
    rent_roll: Option<&RentRoll>,
) -> Vec<YearRow> {
    let term = assumptions.analysis_term;
    let mut rows = Vec::with_capacity(term as usize + 1);

    rows.push(YearRow {
        year: 0,
        gross_income: Decimal::ZERO,
        operating_expenses: Decimal::ZERO,
        noi: Decimal::ZERO,
        debt_service: Decimal::ZERO,
        cash_flow_before_debt: -purchase_price,
        cash_flow_after_debt: -equity,
        cumulative_cash_flow_before_debt: -purchase_price,
        cumulative_cash_flow_after_debt: -equity,
        remaining_debt: loan_amount,
        property_value: purchase_price,
        exit_equity: Decimal::ZERO,
        total_return_unlevered: -purchase_price,
        total_return_levered: -equity,
        annual_cash_on_cash: Decimal::ZERO,
    });

    let rr = rent_roll.filter(|rr| rr.total_units > 0);
    let annual_principal = loan_amount / Decimal::from(assumptions.amortization_years);
    let one_plus_rent_growth = Decimal::ONE + assumptions.rent_growth_rate;
    let mut remaining_debt = loan_amount;

    for year in 1..=term {
        let rent_growth = one_plus_rent_growth.powi(i64::from(year));

        let (gross_income, operating_expenses, noi) = match rr {
            Some(rr) => {
                // Ground the projection in the actual roll
                let gross = rr.total_monthly_rent * MONTHS_PER_YEAR * rent_growth;
                let expenses = gross * assumptions.expense_ratio;
                (gross, expenses, gross - expenses)
            }
            None => {
                // NOI-first: back the gross figure out of the expense ratio
                let noi = initial_noi * rent_growth;
                let gross = noi / (Decimal::ONE - assumptions.expense_ratio);
                (gross, gross - noi, noi)
            }
        };

        // Straight-line principal paydown; a deliberate approximation of the
        // amortization schedule, applied identically on recalculation
        remaining_debt = (remaining_debt - annual_principal).max(Decimal::ZERO);

        let cash_flow_before_debt = noi;
        let cash_flow_after_debt = noi - initial_debt_service;

        let prev = &rows[(year - 1) as usize];
        let cumulative_cash_flow_before_debt =
            prev.cumulative_cash_flow_before_debt + cash_flow_before_debt;
        let cumulative_cash_flow_after_debt =
            prev.cumulative_cash_flow_after_debt + cash_flow_after_debt;

        let is_terminal = year == term;
        let property_value = if is_terminal {
            noi / assumptions.exit_cap_rate
        } else {
            noi / assumptions.market_cap_rate
        };
        let exit_equity = if is_terminal {
            property_value - remaining_debt
        } else {
            Decimal::ZERO
        };

        let annual_cash_on_cash = if equity.is_zero() {
            Decimal::ZERO
        } else {
            cash_flow_after_debt / equity
        };

        rows.push(YearRow {
            year,
            gross_income,
            operating_expenses,
            noi,
            debt_service: initial_debt_service,
            cash_flow_before_debt,
            cash_flow_after_debt,
            cumulative_cash_flow_before_debt,
            cumulative_cash_flow_after_debt,
            remaining_debt,
            property_value,
            exit_equity,
            total_return_unlevered: cumulative_cash_flow_before_debt + exit_equity,
            total_return_levered: cumulative_cash_flow_after_debt + exit_equity,
            annual_cash_on_cash,
        });
    }

    rows
}
