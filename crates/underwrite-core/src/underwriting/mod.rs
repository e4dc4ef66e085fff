//! The underwriting pipeline: pro forma -> financing -> projection -> IRRs.
//!
//! Each invocation is a synchronous, side-effect-free function of its inputs
//! producing one immutable `DealMetrics` snapshot. Recalculation re-runs the
//! whole pipeline from the stored facts; nothing is patched in place.

pub mod financing;
pub mod pro_forma;
pub mod projection;
pub mod returns;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::UnderwriteError;
use crate::facts::{PropertyFacts, RentRoll, UnderwritingAssumptions};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::UnderwriteResult;

pub use financing::Financing;
pub use pro_forma::ProForma;
pub use projection::YearRow;
pub use returns::Irrs;

/// Immutable snapshot of one underwriting run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealMetrics {
    /// Canonical facts after any rent-roll override, with the final NOI.
    pub facts: PropertyFacts,
    /// Vacancy actually applied (rent-roll complement or assumption).
    pub vacancy: Rate,
    pub expense_ratio: Rate,
    pub gross_potential_income: Money,
    pub effective_gross_income: Money,
    pub operating_expenses: Money,
    pub noi: Money,
    /// Price the deal was underwritten at: the cap-rate market valuation, or
    /// the caller's override on recalculation.
    pub purchase_price: Money,
    /// Whisper or custom price minus the market valuation; zero when neither
    /// applies.
    pub price_difference: Money,
    /// Same figure as `purchase_price`, kept under its valuation label.
    pub cap_rate_valuation: Money,
    pub loan_amount: Money,
    pub equity: Money,
    /// Annual debt service.
    pub debt_service: Money,
    pub dscr: Decimal,
    pub cash_on_cash_return: Rate,
    pub levered_irr: Rate,
    pub unlevered_irr: Rate,
    /// Year 0..=analysis_term schedule.
    pub irr_breakdown: Vec<YearRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_roll: Option<RentRoll>,
}

/// Underwrite a deal from resolved facts, an optional rent roll and an
/// assumption set.
pub fn underwrite(
    facts: &PropertyFacts,
    rent_roll: Option<&RentRoll>,
    assumptions: &UnderwritingAssumptions,
) -> UnderwriteResult<ComputationOutput<DealMetrics>> {
    underwrite_at_price(facts, rent_roll, assumptions, None)
}

/// Re-run the full pipeline from a previously finalized snapshot with revised
/// assumptions and, optionally, a caller-chosen price basis.
pub fn recalculate(
    previous: &DealMetrics,
    assumptions: &UnderwritingAssumptions,
    price_override: Option<Money>,
) -> UnderwriteResult<ComputationOutput<DealMetrics>> {
    underwrite_at_price(
        &previous.facts,
        previous.rent_roll.as_ref(),
        assumptions,
        price_override,
    )
}

fn underwrite_at_price(
    facts: &PropertyFacts,
    rent_roll: Option<&RentRoll>,
    assumptions: &UnderwritingAssumptions,
    price_override: Option<Money>,
) -> UnderwriteResult<ComputationOutput<DealMetrics>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_inputs(facts, assumptions)?;
    push_market_warnings(assumptions, &mut warnings);

    let pf = pro_forma::derive_pro_forma(facts, rent_roll, assumptions, &mut warnings)?;

    let selected_price = price_override.unwrap_or(pf.market_valuation);
    let price_difference = match price_override {
        Some(p) if facts.whisper_price == Some(p) => Decimal::ZERO,
        Some(p) => p - pf.market_valuation,
        None => pf.price_difference,
    };

    let fin = financing::derive_financing(selected_price, pf.noi, assumptions, &mut warnings)?;

    let rows = projection::project(
        selected_price,
        fin.equity,
        fin.loan_amount,
        pf.noi,
        fin.debt_service,
        assumptions,
        rent_roll,
    );

    let irrs = returns::resolve_irrs(&rows, fin.equity, selected_price, &mut warnings);

    let mut canonical_facts = facts.clone();
    canonical_facts.units = pf.units;
    canonical_facts.occupancy = pf.occupancy;
    canonical_facts.avg_monthly_rent = pf.avg_monthly_rent;
    canonical_facts.noi = Some(pf.noi);

    let metrics = DealMetrics {
        facts: canonical_facts,
        vacancy: pf.vacancy_used,
        expense_ratio: assumptions.expense_ratio,
        gross_potential_income: pf.gross_potential_income,
        effective_gross_income: pf.effective_gross_income,
        operating_expenses: pf.operating_expenses,
        noi: pf.noi,
        purchase_price: selected_price,
        price_difference,
        cap_rate_valuation: selected_price,
        loan_amount: fin.loan_amount,
        equity: fin.equity,
        debt_service: fin.debt_service,
        dscr: fin.dscr,
        cash_on_cash_return: fin.cash_on_cash_return,
        levered_irr: irrs.levered_irr,
        unlevered_irr: irrs.unlevered_irr,
        irr_breakdown: rows,
        rent_roll: rent_roll.cloned(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Real Estate Underwriting (Income Approach)",
        assumptions,
        warnings,
        elapsed,
        metrics,
    ))
}

fn validate_inputs(
    facts: &PropertyFacts,
    assumptions: &UnderwritingAssumptions,
) -> UnderwriteResult<()> {
    if facts.units == 0 {
        return Err(UnderwriteError::InvalidInput {
            field: "units".into(),
            reason: "Unit count must be positive".into(),
        });
    }
    if facts.avg_monthly_rent <= Decimal::ZERO {
        return Err(UnderwriteError::InvalidInput {
            field: "avg_monthly_rent".into(),
            reason: "Average monthly rent must be positive".into(),
        });
    }
    if assumptions.market_cap_rate <= Decimal::ZERO {
        return Err(UnderwriteError::InvalidInput {
            field: "market_cap_rate".into(),
            reason: "Market cap rate must be positive".into(),
        });
    }
    if assumptions.exit_cap_rate <= Decimal::ZERO {
        return Err(UnderwriteError::InvalidInput {
            field: "exit_cap_rate".into(),
            reason: "Exit cap rate must be positive".into(),
        });
    }
    if assumptions.analysis_term == 0 {
        return Err(UnderwriteError::InvalidInput {
            field: "analysis_term".into(),
            reason: "Analysis term must be at least 1 year".into(),
        });
    }
    if assumptions.amortization_years == 0 {
        return Err(UnderwriteError::InvalidInput {
            field: "amortization_years".into(),
            reason: "Amortization must be at least 1 year".into(),
        });
    }
    if assumptions.vacancy < Decimal::ZERO || assumptions.vacancy >= Decimal::ONE {
        return Err(UnderwriteError::InvalidInput {
            field: "vacancy".into(),
            reason: "Vacancy must be between 0 and 1 (exclusive upper)".into(),
        });
    }
    if assumptions.expense_ratio < Decimal::ZERO || assumptions.expense_ratio >= Decimal::ONE {
        return Err(UnderwriteError::InvalidInput {
            field: "expense_ratio".into(),
            reason: "Expense ratio must be between 0 and 1 (exclusive upper)".into(),
        });
    }
    if assumptions.loan_to_value < Decimal::ZERO || assumptions.loan_to_value > Decimal::ONE {
        return Err(UnderwriteError::InvalidInput {
            field: "loan_to_value".into(),
            reason: "Loan-to-value must be between 0 and 1".into(),
        });
    }

    Ok(())
}

fn push_market_warnings(assumptions: &UnderwritingAssumptions, warnings: &mut Vec<String>) {
    if assumptions.market_cap_rate < dec!(0.03) {
        warnings.push(format!(
            "Cap rate {} is below 3% — unusually low, verify market data",
            assumptions.market_cap_rate
        ));
    }
    if assumptions.market_cap_rate > dec!(0.12) {
        warnings.push(format!(
            "Cap rate {} exceeds 12% — unusually high, may indicate elevated risk",
            assumptions.market_cap_rate
        ));
    }
    if assumptions.vacancy > dec!(0.15) {
        warnings.push(format!(
            "Vacancy rate {:.1}% exceeds 15% — above typical market norms",
            assumptions.vacancy * dec!(100)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_facts() -> PropertyFacts {
        PropertyFacts {
            property_name: "Test Apartments".into(),
            whisper_price: Some(dec!(14000000)),
            units: 75,
            occupancy: dec!(0.95),
            avg_monthly_rent: dec!(1500),
            annual_operating_expenses: None,
            noi: None,
            market_cap_rate: dec!(0.06),
        }
    }

    #[test]
    fn test_units_zero_rejected() {
        let mut facts = sample_facts();
        facts.units = 0;
        let result = underwrite(&facts, None, &UnderwritingAssumptions::default());
        match result.unwrap_err() {
            UnderwriteError::InvalidInput { field, .. } => assert_eq!(field, "units"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_cap_rate_rejected() {
        let assumptions = UnderwritingAssumptions {
            market_cap_rate: Decimal::ZERO,
            ..Default::default()
        };
        assert!(underwrite(&sample_facts(), None, &assumptions).is_err());
    }

    #[test]
    fn test_zero_analysis_term_rejected() {
        let assumptions = UnderwritingAssumptions {
            analysis_term: 0,
            ..Default::default()
        };
        assert!(underwrite(&sample_facts(), None, &assumptions).is_err());
    }

    #[test]
    fn test_negative_rent_rejected() {
        let mut facts = sample_facts();
        facts.avg_monthly_rent = dec!(-100);
        assert!(underwrite(&facts, None, &UnderwritingAssumptions::default()).is_err());
    }

    #[test]
    fn test_low_cap_rate_warning() {
        let assumptions = UnderwritingAssumptions {
            market_cap_rate: dec!(0.025),
            ..Default::default()
        };
        let result = underwrite(&sample_facts(), None, &assumptions).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("below 3%")));
    }

    #[test]
    fn test_schedule_spans_term() {
        let assumptions = UnderwritingAssumptions {
            analysis_term: 10,
            ..Default::default()
        };
        let result = underwrite(&sample_facts(), None, &assumptions).unwrap();
        assert_eq!(result.result.irr_breakdown.len(), 11);
    }

    #[test]
    fn test_snapshot_carries_final_noi() {
        let result = underwrite(&sample_facts(), None, &UnderwritingAssumptions::default()).unwrap();
        let metrics = &result.result;
        assert_eq!(metrics.facts.noi, Some(metrics.noi));
    }

    #[test]
    fn test_methodology_string() {
        let result = underwrite(&sample_facts(), None, &UnderwritingAssumptions::default()).unwrap();
        assert_eq!(result.methodology, "Real Estate Underwriting (Income Approach)");
    }

    #[test]
    fn test_price_override_equal_to_whisper_zeroes_difference() {
        let facts = sample_facts();
        let first = underwrite(&facts, None, &UnderwritingAssumptions::default()).unwrap();
        let recalced = recalculate(
            &first.result,
            &UnderwritingAssumptions::default(),
            Some(dec!(14000000)),
        )
        .unwrap();
        assert_eq!(recalced.result.purchase_price, dec!(14000000));
        assert_eq!(recalced.result.price_difference, Decimal::ZERO);
    }

    #[test]
    fn test_custom_price_difference_vs_market() {
        let facts = sample_facts();
        let first = underwrite(&facts, None, &UnderwritingAssumptions::default()).unwrap();
        let market = first.result.purchase_price;
        let custom = market + dec!(500000);
        let recalced = recalculate(
            &first.result,
            &UnderwritingAssumptions::default(),
            Some(custom),
        )
        .unwrap();
        assert_eq!(recalced.result.purchase_price, custom);
        assert_eq!(recalced.result.price_difference, dec!(500000));
    }
}
