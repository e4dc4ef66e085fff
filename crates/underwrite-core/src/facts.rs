use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Property-level facts extracted from an offering memorandum or supplied
/// directly by the caller. Optional fields are best-effort: the engine
/// derives anything missing from the assumption set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyFacts {
    pub property_name: String,
    /// Asking/suggested price quoted in the source documents, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whisper_price: Option<Money>,
    pub units: u32,
    /// Occupancy as a decimal fraction (0.95 = 95%).
    pub occupancy: Rate,
    pub avg_monthly_rent: Money,
    /// Stated annual operating expenses, if the documents carried them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_operating_expenses: Option<Money>,
    /// Stated NOI, if the documents carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noi: Option<Money>,
    /// Market cap rate quoted in the documents. Valuation uses the
    /// assumption-set cap rate; this one is informational.
    pub market_cap_rate: Rate,
}

/// Occupancy status of a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Occupied,
    Vacant,
}

/// One line of a rent roll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentRollUnit {
    pub unit_number: String,
    pub unit_type: String,
    pub monthly_rent: Money,
    pub status: UnitStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
}

/// Tenant-by-tenant schedule of actual occupancy and rent. When present it is
/// authoritative over the extracted facts for units, occupancy and average
/// rent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentRoll {
    pub total_units: u32,
    pub occupied_units: u32,
    pub vacant_units: u32,
    pub total_monthly_rent: Money,
    pub average_monthly_rent: Money,
    pub occupancy_rate: Rate,
    pub units: Vec<RentRollUnit>,
}

/// Underwriting assumption set. All rate fields are decimal fractions, never
/// percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnderwritingAssumptions {
    pub vacancy: Rate,
    pub expense_ratio: Rate,
    pub market_cap_rate: Rate,
    pub loan_to_value: Rate,
    pub interest_rate: Rate,
    pub amortization_years: u32,
    pub rent_growth_rate: Rate,
    /// Carried for callers that tune it; the projection holds the expense
    /// ratio constant, so expenses track rent growth (see projection module).
    pub expense_growth_rate: Rate,
    pub exit_cap_rate: Rate,
    /// Number of projection years (the schedule spans year 0..=analysis_term).
    pub analysis_term: u32,
}

impl Default for UnderwritingAssumptions {
    fn default() -> Self {
        Self {
            vacancy: dec!(0.05),
            expense_ratio: dec!(0.35),
            market_cap_rate: dec!(0.06),
            loan_to_value: dec!(0.65),
            interest_rate: dec!(0.06),
            amortization_years: 30,
            rent_growth_rate: dec!(0.03),
            expense_growth_rate: dec!(0.02),
            exit_cap_rate: dec!(0.065),
            analysis_term: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_assumptions_reference_set() {
        let a = UnderwritingAssumptions::default();
        assert_eq!(a.vacancy, dec!(0.05));
        assert_eq!(a.expense_ratio, dec!(0.35));
        assert_eq!(a.market_cap_rate, dec!(0.06));
        assert_eq!(a.loan_to_value, dec!(0.65));
        assert_eq!(a.amortization_years, 30);
        assert_eq!(a.exit_cap_rate, dec!(0.065));
        assert_eq!(a.analysis_term, 5);
    }

    #[test]
    fn test_partial_assumptions_json_fills_defaults() {
        let a: UnderwritingAssumptions =
            serde_json::from_str(r#"{"market_cap_rate": "0.07", "analysis_term": 10}"#).unwrap();
        assert_eq!(a.market_cap_rate, dec!(0.07));
        assert_eq!(a.analysis_term, 10);
        assert_eq!(a.vacancy, dec!(0.05));
        assert_eq!(a.loan_to_value, dec!(0.65));
    }

    #[test]
    fn test_unit_status_serializes_lowercase() {
        let s = serde_json::to_string(&UnitStatus::Vacant).unwrap();
        assert_eq!(s, r#""vacant""#);
    }
}
