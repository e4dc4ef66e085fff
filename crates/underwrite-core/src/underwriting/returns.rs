use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::time_value;
use crate::types::{Money, Rate};

use super::projection::YearRow;

/// Plausibility window for a first-pass underwriting IRR. Results outside it
/// are replaced by the simple-return heuristic, never surfaced raw.
pub const IRR_PLAUSIBLE_FLOOR: Rate = dec!(-0.5);
pub const IRR_PLAUSIBLE_CEILING: Rate = dec!(2.0);

/// Levered and unlevered internal rates of return.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Irrs {
    pub levered_irr: Rate,
    pub unlevered_irr: Rate,
}

/// Assemble the levered/unlevered cash-flow vectors from the schedule and
/// solve both IRRs.
///
/// The terminal year picks up the sale: gross property value for the
/// unlevered vector, value net of remaining debt for the levered one. Any
/// solver result outside the plausibility window is replaced by
/// `simple_irr_fallback` and flagged in `warnings`.
pub fn resolve_irrs(
    rows: &[YearRow],
    equity: Money,
    purchase_price: Money,
    warnings: &mut Vec<String>,
) -> Irrs {
    let last = rows.len() - 1;

    let mut levered: Vec<Money> = Vec::with_capacity(rows.len());
    let mut unlevered: Vec<Money> = Vec::with_capacity(rows.len());
    levered.push(-equity);
    unlevered.push(-purchase_price);
    for (i, row) in rows.iter().enumerate().skip(1) {
        if i == last {
            levered.push(row.cash_flow_after_debt + row.property_value - row.remaining_debt);
            unlevered.push(row.cash_flow_before_debt + row.property_value);
        } else {
            levered.push(row.cash_flow_after_debt);
            unlevered.push(row.cash_flow_before_debt);
        }
    }

    let analysis_term = last as u32;
    let levered_irr = plausible_or_fallback(
        time_value::irr(&levered, warnings),
        &levered,
        equity,
        analysis_term,
        "Levered",
        warnings,
    );
    let unlevered_irr = plausible_or_fallback(
        time_value::irr(&unlevered, warnings),
        &unlevered,
        purchase_price,
        analysis_term,
        "Unlevered",
        warnings,
    );

    Irrs {
        levered_irr,
        unlevered_irr,
    }
}

fn plausible_or_fallback(
    candidate: Rate,
    cash_flows: &[Money],
    initial_outlay: Money,
    analysis_term: u32,
    label: &str,
    warnings: &mut Vec<String>,
) -> Rate {
    if candidate < IRR_PLAUSIBLE_FLOOR || candidate > IRR_PLAUSIBLE_CEILING {
        let fallback = time_value::simple_irr_fallback(cash_flows, initial_outlay, analysis_term);
        warnings.push(format!(
            "{label} IRR {candidate:.4} outside [{IRR_PLAUSIBLE_FLOOR}, {IRR_PLAUSIBLE_CEILING}]; using simple-return fallback {fallback:.4}"
        ));
        fallback
    } else {
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::UnderwritingAssumptions;
    use crate::underwriting::projection::project;
    use rust_decimal::Decimal;

    fn typical_rows() -> Vec<YearRow> {
        project(
            dec!(10000000),
            dec!(3500000),
            dec!(6500000),
            dec!(600000),
            dec!(460000),
            &UnderwritingAssumptions::default(),
            None,
        )
    }

    #[test]
    fn test_typical_deal_needs_no_fallback() {
        let rows = typical_rows();
        let mut warnings = Vec::new();
        let irrs = resolve_irrs(&rows, dec!(3500000), dec!(10000000), &mut warnings);

        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert!(irrs.levered_irr > IRR_PLAUSIBLE_FLOOR);
        assert!(irrs.levered_irr < IRR_PLAUSIBLE_CEILING);
        assert!(irrs.unlevered_irr > IRR_PLAUSIBLE_FLOOR);
        assert!(irrs.unlevered_irr < IRR_PLAUSIBLE_CEILING);
    }

    #[test]
    fn test_levered_exceeds_unlevered_on_accretive_debt() {
        // Debt cheaper than the asset yield amplifies the equity return
        let rows = typical_rows();
        let mut warnings = Vec::new();
        let irrs = resolve_irrs(&rows, dec!(3500000), dec!(10000000), &mut warnings);
        assert!(irrs.levered_irr > irrs.unlevered_irr);
    }

    #[test]
    fn test_terminal_flow_includes_sale() {
        let rows = typical_rows();
        let last = rows.last().unwrap();

        // Reconstruct the vectors the resolver builds
        let expected_levered_last =
            last.cash_flow_after_debt + last.property_value - last.remaining_debt;
        let expected_unlevered_last = last.cash_flow_before_debt + last.property_value;

        // Sanity: sale proceeds stay out of the stored rows themselves
        assert!(expected_levered_last > last.cash_flow_after_debt);
        assert!(expected_unlevered_last > last.cash_flow_before_debt);
    }

    #[test]
    fn test_zero_equity_degrades_to_defaults() {
        // All-debt structure: the levered vector has no valid outlay, so the
        // solver short-circuits and the plausibility window passes 0.15
        let rows = project(
            dec!(10000000),
            Decimal::ZERO,
            dec!(10000000),
            dec!(600000),
            dec!(460000),
            &UnderwritingAssumptions::default(),
            None,
        );
        let mut warnings = Vec::new();
        let irrs = resolve_irrs(&rows, Decimal::ZERO, dec!(10000000), &mut warnings);

        assert_eq!(irrs.levered_irr, time_value::IRR_INITIAL_GUESS);
        assert!(!warnings.is_empty());
    }
}
