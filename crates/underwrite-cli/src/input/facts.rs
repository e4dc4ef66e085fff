//! Field-alias reconciliation for extraction output.
//!
//! The upstream field-extraction service returns best-effort JSON whose key
//! spellings drift (`whisperPrice` vs `purchasePrice`, `avgRent` vs
//! `avg_rent`, ...). This module folds every known spelling into one
//! canonical `PropertyFacts` and substitutes the documented defaults for
//! missing required fields, so the engine never sees a half-resolved input.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::str::FromStr;

use underwrite_core::error::UnderwriteError;
use underwrite_core::facts::PropertyFacts;

const NAME_ALIASES: &[&str] = &["property_name", "propertyName", "property", "name"];
const WHISPER_ALIASES: &[&str] = &[
    "whisper_price",
    "whisperPrice",
    "purchasePrice",
    "purchase_price",
    "askingPrice",
    "asking_price",
];
const UNITS_ALIASES: &[&str] = &["units", "totalUnits", "total_units", "unitCount", "unit_count"];
const OCCUPANCY_ALIASES: &[&str] = &["occupancy", "occupancyRate", "occupancy_rate"];
const RENT_ALIASES: &[&str] = &[
    "avg_monthly_rent",
    "avgRent",
    "avg_rent",
    "avgMonthlyRent",
    "averageRent",
    "average_rent",
];
const EXPENSES_ALIASES: &[&str] = &[
    "annual_operating_expenses",
    "expenses",
    "operatingExpenses",
    "operating_expenses",
    "annualExpenses",
    "annual_expenses",
];
const NOI_ALIASES: &[&str] = &["noi", "NOI", "netOperatingIncome", "net_operating_income"];
const CAP_ALIASES: &[&str] = &["market_cap_rate", "marketCapRate", "capRate", "cap_rate"];

const DEFAULT_PROPERTY_NAME: &str = "Unknown Property";
const DEFAULT_UNITS: u32 = 100;
const DEFAULT_AVG_RENT: Decimal = dec!(1500);
const DEFAULT_OCCUPANCY: Decimal = dec!(0.95);
const DEFAULT_CAP_RATE: Decimal = dec!(0.06);

/// Reconcile a loose extraction object into canonical facts.
///
/// Returns the facts plus notes describing every default that was
/// substituted, so the caller can surface them.
pub fn resolve_facts(raw: &Value) -> Result<(PropertyFacts, Vec<String>), UnderwriteError> {
    let map = raw
        .as_object()
        .ok_or_else(|| UnderwriteError::UpstreamFailure("facts input is not a JSON object".into()))?;

    let mut notes = Vec::new();

    let property_name = match lookup(map, NAME_ALIASES).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => {
            notes.push(format!("property name missing; using \"{DEFAULT_PROPERTY_NAME}\""));
            DEFAULT_PROPERTY_NAME.to_string()
        }
    };

    let units = lookup(map, UNITS_ALIASES)
        .and_then(as_decimal)
        .and_then(|u| u.trunc().to_u32())
        .filter(|u| *u > 0)
        .unwrap_or_else(|| {
            notes.push(format!("unit count missing; assuming {DEFAULT_UNITS} units"));
            DEFAULT_UNITS
        });

    let avg_monthly_rent = match lookup(map, RENT_ALIASES).and_then(as_decimal) {
        Some(r) if r > Decimal::ZERO => r,
        _ => {
            notes.push(format!(
                "average rent missing; assuming ${DEFAULT_AVG_RENT}/month"
            ));
            DEFAULT_AVG_RENT
        }
    };

    let occupancy = match lookup(map, OCCUPANCY_ALIASES).and_then(as_decimal) {
        Some(o) if o > Decimal::ZERO => o,
        _ => {
            notes.push(format!("occupancy missing; assuming {DEFAULT_OCCUPANCY}"));
            DEFAULT_OCCUPANCY
        }
    };

    let market_cap_rate = match lookup(map, CAP_ALIASES).and_then(as_decimal) {
        Some(c) if c > Decimal::ZERO => c,
        _ => {
            notes.push(format!("market cap rate missing; assuming {DEFAULT_CAP_RATE}"));
            DEFAULT_CAP_RATE
        }
    };

    let whisper_price = lookup(map, WHISPER_ALIASES)
        .and_then(as_decimal)
        .filter(|p| *p > Decimal::ZERO);
    let annual_operating_expenses = lookup(map, EXPENSES_ALIASES)
        .and_then(as_decimal)
        .filter(|e| *e > Decimal::ZERO);
    let noi = lookup(map, NOI_ALIASES)
        .and_then(as_decimal)
        .filter(|n| *n > Decimal::ZERO);

    Ok((
        PropertyFacts {
            property_name,
            whisper_price,
            units,
            occupancy,
            avg_monthly_rent,
            annual_operating_expenses,
            noi,
            market_cap_rate,
        },
        notes,
    ))
}

/// First alias present with a non-null value wins.
fn lookup<'a>(map: &'a serde_json::Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|v| !v.is_null())
}

/// Coerce a JSON number or a "$1,234.56"-style string into a Decimal.
fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | ' '))
                .collect();
            Decimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}
