use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use underwrite_core::facts::{
    PropertyFacts, RentRoll, RentRollUnit, UnderwritingAssumptions, UnitStatus,
};
use underwrite_core::underwriting::returns::{IRR_PLAUSIBLE_CEILING, IRR_PLAUSIBLE_FLOOR};
use underwrite_core::underwriting::{recalculate, underwrite};

// ===========================================================================
// Reference deal: 75 units at $1,500/month, default assumption set
// ===========================================================================

fn reference_facts() -> PropertyFacts {
    PropertyFacts {
        property_name: "Garden Terrace Apartments".into(),
        whisper_price: None,
        units: 75,
        occupancy: dec!(0.95),
        avg_monthly_rent: dec!(1500),
        annual_operating_expenses: None,
        noi: None,
        market_cap_rate: dec!(0.06),
    }
}

fn reference_rent_roll() -> RentRoll {
    // 80 units, $90k/month total, 72 occupied
    let mut units = Vec::new();
    for i in 0..80u32 {
        units.push(RentRollUnit {
            unit_number: format!("{}", 100 + i),
            unit_type: "1BR".into(),
            monthly_rent: dec!(1125),
            status: if i < 72 {
                UnitStatus::Occupied
            } else {
                UnitStatus::Vacant
            },
            tenant_name: if i < 72 { Some(format!("Tenant {i}")) } else { None },
        });
    }
    RentRoll {
        total_units: 80,
        occupied_units: 72,
        vacant_units: 8,
        total_monthly_rent: dec!(90000),
        average_monthly_rent: dec!(1125),
        occupancy_rate: dec!(0.9),
        units,
    }
}

#[test]
fn end_to_end_reference_figures() {
    let result = underwrite(
        &reference_facts(),
        None,
        &UnderwritingAssumptions::default(),
    )
    .unwrap();
    let m = &result.result;

    assert_eq!(m.gross_potential_income, dec!(1350000));
    assert_eq!(m.effective_gross_income, dec!(1282500));
    assert_eq!(m.operating_expenses, dec!(448875));
    assert_eq!(m.noi, dec!(833625));
    assert_eq!(m.purchase_price, dec!(13893750));
    assert_eq!(m.cap_rate_valuation, dec!(13893750));
    assert_eq!(m.loan_amount, dec!(9030937.5));
    assert_eq!(m.equity, dec!(4862812.5));

    // Both IRRs inside the plausibility window without any fallback
    assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
    assert!(m.levered_irr > IRR_PLAUSIBLE_FLOOR && m.levered_irr < IRR_PLAUSIBLE_CEILING);
    assert!(m.unlevered_irr > IRR_PLAUSIBLE_FLOOR && m.unlevered_irr < IRR_PLAUSIBLE_CEILING);
}

#[test]
fn end_to_end_schedule_shape() {
    let result = underwrite(
        &reference_facts(),
        None,
        &UnderwritingAssumptions::default(),
    )
    .unwrap();
    let rows = &result.result.irr_breakdown;

    assert_eq!(rows.len(), 6);

    // Year 0 is the outlay row
    assert_eq!(rows[0].noi, Decimal::ZERO);
    assert_eq!(rows[0].cash_flow_before_debt, dec!(-13893750));
    assert_eq!(rows[0].cash_flow_after_debt, dec!(-4862812.5));

    // Exit fields only in the terminal year
    for row in &rows[..5] {
        assert_eq!(row.exit_equity, Decimal::ZERO);
    }
    assert!(rows[5].exit_equity > Decimal::ZERO);
}

#[test]
fn remaining_debt_never_increases_and_never_negative() {
    let assumptions = UnderwritingAssumptions {
        analysis_term: 40,
        amortization_years: 30,
        ..Default::default()
    };
    let result = underwrite(&reference_facts(), None, &assumptions).unwrap();

    let mut prev = result.result.irr_breakdown[0].remaining_debt;
    for row in &result.result.irr_breakdown[1..] {
        assert!(row.remaining_debt <= prev, "debt rose in year {}", row.year);
        assert!(row.remaining_debt >= Decimal::ZERO);
        prev = row.remaining_debt;
    }
    // 40-year projection on a 30-year amortization hits the floor
    assert_eq!(
        result.result.irr_breakdown.last().unwrap().remaining_debt,
        Decimal::ZERO
    );
}

#[test]
fn zero_whisper_price_difference_is_exactly_zero() {
    let result = underwrite(
        &reference_facts(),
        None,
        &UnderwritingAssumptions::default(),
    )
    .unwrap();
    assert_eq!(result.result.price_difference, Decimal::ZERO);
}

#[test]
fn whisper_price_difference_against_market() {
    let mut facts = reference_facts();
    facts.whisper_price = Some(dec!(14000000));
    let result = underwrite(&facts, None, &UnderwritingAssumptions::default()).unwrap();

    // 14,000,000 - 13,893,750
    assert_eq!(result.result.price_difference, dec!(106250));
}

// ===========================================================================
// Rent-roll grounding
// ===========================================================================

#[test]
fn rent_roll_overrides_extracted_facts() {
    let mut facts = reference_facts();
    facts.units = 100;
    facts.avg_monthly_rent = dec!(1000);

    let rr = reference_rent_roll();
    let result = underwrite(&facts, Some(&rr), &UnderwritingAssumptions::default()).unwrap();
    let m = &result.result;

    // 80 x 1,125 x 12, not 100 x 1,000 x 12
    assert_eq!(m.gross_potential_income, dec!(1080000));
    assert_eq!(m.facts.units, 80);
    assert_eq!(m.facts.avg_monthly_rent, dec!(1125));
    assert_eq!(m.facts.occupancy, dec!(0.9));
    assert_eq!(m.vacancy, dec!(0.1));
}

#[test]
fn rent_roll_noi_recomputed_from_roll() {
    let mut facts = reference_facts();
    // Stated NOI must be discarded in favor of the roll
    facts.noi = Some(dec!(1));

    let rr = reference_rent_roll();
    let result = underwrite(&facts, Some(&rr), &UnderwritingAssumptions::default()).unwrap();
    let m = &result.result;

    // EGI = 1,080,000 x 0.9 = 972,000; NOI = 972,000 x 0.65 = 631,800
    assert_eq!(m.effective_gross_income, dec!(972000));
    assert_eq!(m.noi, dec!(631800));
    assert!(m.rent_roll.is_some());
}

#[test]
fn rent_roll_drives_projection_income() {
    let rr = reference_rent_roll();
    let result = underwrite(
        &reference_facts(),
        Some(&rr),
        &UnderwritingAssumptions::default(),
    )
    .unwrap();
    let rows = &result.result.irr_breakdown;

    // Year 1 gross = 90,000 x 12 x 1.03
    assert_eq!(rows[1].gross_income, dec!(1112400));
}

// ===========================================================================
// NOI fallback
// ===========================================================================

#[test]
fn noi_fallback_from_expense_ratio() {
    // No stated expenses or NOI: both derive from the expense ratio
    let mut facts = reference_facts();
    facts.units = 10;
    facts.avg_monthly_rent = dec!(1000);
    let assumptions = UnderwritingAssumptions {
        vacancy: Decimal::ZERO,
        ..Default::default()
    };
    let result = underwrite(&facts, None, &assumptions).unwrap();
    let m = &result.result;

    // EGI = 120,000; OpEx = 42,000; NOI = 78,000 exactly
    assert_eq!(m.effective_gross_income, dec!(120000));
    assert_eq!(m.operating_expenses, dec!(42000));
    assert_eq!(m.noi, dec!(78000));
}

#[test]
fn non_positive_noi_triggers_last_resort_and_warning() {
    let mut facts = reference_facts();
    facts.annual_operating_expenses = Some(dec!(9000000));
    let result = underwrite(&facts, None, &UnderwritingAssumptions::default()).unwrap();

    // EGI x (1 - 0.35) = 1,282,500 x 0.65
    assert_eq!(result.result.noi, dec!(833625));
    assert!(result
        .warnings
        .iter()
        .any(|w| w.contains("Non-positive NOI")));
}

// ===========================================================================
// Recalculation
// ===========================================================================

#[test]
fn recalculation_is_a_fresh_derivation() {
    let first = underwrite(
        &reference_facts(),
        None,
        &UnderwritingAssumptions::default(),
    )
    .unwrap();

    let tighter = UnderwritingAssumptions {
        market_cap_rate: dec!(0.05),
        ..Default::default()
    };
    let second = recalculate(&first.result, &tighter, None).unwrap();

    // Same NOI, repriced at the new cap rate
    assert_eq!(second.result.noi, first.result.noi);
    assert_eq!(second.result.purchase_price, dec!(833625) / dec!(0.05));
    assert_eq!(
        second.result.loan_amount,
        second.result.purchase_price * dec!(0.65)
    );
    // The schedule is rebuilt, not patched
    assert_eq!(second.result.irr_breakdown.len(), 6);
    assert_ne!(
        second.result.irr_breakdown[0].cash_flow_after_debt,
        first.result.irr_breakdown[0].cash_flow_after_debt
    );
}

#[test]
fn recalculation_with_longer_term_extends_schedule() {
    let first = underwrite(
        &reference_facts(),
        None,
        &UnderwritingAssumptions::default(),
    )
    .unwrap();

    let longer = UnderwritingAssumptions {
        analysis_term: 10,
        ..Default::default()
    };
    let second = recalculate(&first.result, &longer, None).unwrap();
    assert_eq!(second.result.irr_breakdown.len(), 11);
}

#[test]
fn recalculation_keeps_rent_roll_grounding() {
    let rr = reference_rent_roll();
    let first = underwrite(
        &reference_facts(),
        Some(&rr),
        &UnderwritingAssumptions::default(),
    )
    .unwrap();

    let second = recalculate(&first.result, &UnderwritingAssumptions::default(), None).unwrap();
    assert_eq!(second.result.noi, dec!(631800));
    assert_eq!(second.result.irr_breakdown[1].gross_income, dec!(1112400));
}

#[test]
fn price_override_changes_financing_basis() {
    let first = underwrite(
        &reference_facts(),
        None,
        &UnderwritingAssumptions::default(),
    )
    .unwrap();

    let override_price = dec!(12000000);
    let second = recalculate(
        &first.result,
        &UnderwritingAssumptions::default(),
        Some(override_price),
    )
    .unwrap();
    let m = &second.result;

    assert_eq!(m.purchase_price, override_price);
    assert_eq!(m.loan_amount, dec!(7800000));
    assert_eq!(m.equity, dec!(4200000));
    // Custom price vs the unchanged market valuation
    assert_eq!(m.price_difference, override_price - dec!(13893750));
    // Year 0 outlays follow the override
    assert_eq!(m.irr_breakdown[0].cash_flow_before_debt, dec!(-12000000));
    assert_eq!(m.irr_breakdown[0].cash_flow_after_debt, dec!(-4200000));
}

// ===========================================================================
// IRR plausibility window
// ===========================================================================

#[test]
fn irrs_stay_in_window_across_assumption_sweeps() {
    let facts = reference_facts();
    for cap in [dec!(0.04), dec!(0.06), dec!(0.09)] {
        for ltv in [dec!(0.5), dec!(0.65), dec!(0.8)] {
            let assumptions = UnderwritingAssumptions {
                market_cap_rate: cap,
                loan_to_value: ltv,
                ..Default::default()
            };
            let result = underwrite(&facts, None, &assumptions).unwrap();
            let m = &result.result;
            assert!(
                m.levered_irr >= IRR_PLAUSIBLE_FLOOR && m.levered_irr <= IRR_PLAUSIBLE_CEILING,
                "levered IRR {} out of window at cap {cap} ltv {ltv}",
                m.levered_irr
            );
            assert!(
                m.unlevered_irr >= IRR_PLAUSIBLE_FLOOR
                    && m.unlevered_irr <= IRR_PLAUSIBLE_CEILING,
                "unlevered IRR {} out of window at cap {cap} ltv {ltv}",
                m.unlevered_irr
            );
        }
    }
}
