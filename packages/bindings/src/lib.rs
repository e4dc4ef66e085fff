use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use std::str::FromStr;

use underwrite_core::facts::{PropertyFacts, RentRoll, UnderwritingAssumptions};
use underwrite_core::underwriting::{self, DealMetrics};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Underwrite a deal. `facts_json` is the canonical PropertyFacts object;
/// the rent roll and assumptions are optional (assumptions default when
/// omitted). Returns the full computation envelope as JSON.
#[napi]
pub fn underwrite_deal(
    facts_json: String,
    rent_roll_json: Option<String>,
    assumptions_json: Option<String>,
) -> NapiResult<String> {
    let facts: PropertyFacts = serde_json::from_str(&facts_json).map_err(to_napi_error)?;

    let rent_roll: Option<RentRoll> = match rent_roll_json {
        Some(ref json) => Some(serde_json::from_str(json).map_err(to_napi_error)?),
        None => None,
    };

    let assumptions: UnderwritingAssumptions = match assumptions_json {
        Some(ref json) => serde_json::from_str(json).map_err(to_napi_error)?,
        None => UnderwritingAssumptions::default(),
    };

    let output = underwriting::underwrite(&facts, rent_roll.as_ref(), &assumptions)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Re-run a saved deal with revised assumptions and/or a price override.
/// The price arrives as a string to keep decimal precision across the JS
/// boundary.
#[napi]
pub fn recalculate_deal(
    deal_json: String,
    assumptions_json: Option<String>,
    price_override: Option<String>,
) -> NapiResult<String> {
    let previous: DealMetrics = serde_json::from_str(&deal_json).map_err(to_napi_error)?;

    let assumptions: UnderwritingAssumptions = match assumptions_json {
        Some(ref json) => serde_json::from_str(json).map_err(to_napi_error)?,
        None => UnderwritingAssumptions::default(),
    };

    let price: Option<Decimal> = match price_override {
        Some(ref raw) => Some(Decimal::from_str(raw).map_err(to_napi_error)?),
        None => None,
    };

    let output =
        underwriting::recalculate(&previous, &assumptions, price).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
