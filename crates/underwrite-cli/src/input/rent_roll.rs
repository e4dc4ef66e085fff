//! Rent-roll tabular parser.
//!
//! Real rent rolls never agree on column names, so each semantic field is
//! resolved through an explicit ordered list of case-insensitive header
//! aliases, once per document. Rows lacking a unit number or a positive rent
//! are skipped.

use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::str::FromStr;

use underwrite_core::error::UnderwriteError;
use underwrite_core::facts::{RentRoll, RentRollUnit, UnitStatus};

const UNIT_HEADERS: &[&str] = &[
    "unit",
    "unit #",
    "unit number",
    "unit_number",
    "unitnumber",
    "apt",
    "apt #",
];
const TYPE_HEADERS: &[&str] = &["type", "unit type", "unit_type", "floorplan", "floor plan"];
const RENT_HEADERS: &[&str] = &[
    "monthly rent",
    "rent",
    "monthlyrent",
    "monthly_rent",
    "current rent",
    "scheduled rent",
    "lease rent",
];
const STATUS_HEADERS: &[&str] = &["status", "occupancy", "occupied", "lease status"];
const TENANT_HEADERS: &[&str] = &[
    "tenant",
    "tenant name",
    "tenant_name",
    "resident",
    "resident name",
];

struct ColumnMap {
    unit: usize,
    rent: usize,
    unit_type: Option<usize>,
    status: Option<usize>,
    tenant: Option<usize>,
}

/// Parse a rent roll CSV from disk.
pub fn parse_rent_roll(path: &str) -> Result<RentRoll, UnderwriteError> {
    let file = File::open(path)
        .map_err(|e| UnderwriteError::UpstreamFailure(format!("cannot open rent roll '{path}': {e}")))?;
    parse_rent_roll_reader(file)
}

/// Parse a rent roll CSV from any reader.
pub fn parse_rent_roll_reader<R: Read>(reader: R) -> Result<RentRoll, UnderwriteError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| UnderwriteError::UpstreamFailure(format!("cannot read rent roll headers: {e}")))?
        .clone();
    let columns = resolve_columns(&headers)?;

    let mut units: Vec<RentRollUnit> = Vec::new();
    let mut occupied_units = 0u32;
    let mut vacant_units = 0u32;
    let mut total_monthly_rent = Decimal::ZERO;

    for record in rdr.records() {
        let record = record
            .map_err(|e| UnderwriteError::UpstreamFailure(format!("malformed rent roll row: {e}")))?;

        let unit_number = record.get(columns.unit).unwrap_or("").trim();
        let monthly_rent = record
            .get(columns.rent)
            .and_then(parse_money)
            .unwrap_or(Decimal::ZERO);

        // A row without a unit number or a positive rent is not a unit
        if unit_number.is_empty() || monthly_rent <= Decimal::ZERO {
            continue;
        }

        let unit_type = columns
            .unit_type
            .and_then(|i| record.get(i))
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown")
            .to_string();

        let status_cell = columns
            .status
            .and_then(|i| record.get(i))
            .unwrap_or("occupied")
            .to_lowercase();
        let status = if status_cell.contains("vacant") || status_cell.contains("empty") {
            UnitStatus::Vacant
        } else {
            UnitStatus::Occupied
        };

        match status {
            UnitStatus::Occupied => occupied_units += 1,
            UnitStatus::Vacant => vacant_units += 1,
        }
        total_monthly_rent += monthly_rent;

        let tenant_name = columns
            .tenant
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        units.push(RentRollUnit {
            unit_number: unit_number.to_string(),
            unit_type,
            monthly_rent,
            status,
            tenant_name,
        });
    }

    let total_units = units.len() as u32;
    if total_units == 0 {
        return Err(UnderwriteError::UpstreamFailure(
            "rent roll contains no usable rows (unit number and positive rent required)".into(),
        ));
    }

    Ok(RentRoll {
        total_units,
        occupied_units,
        vacant_units,
        total_monthly_rent,
        average_monthly_rent: total_monthly_rent / Decimal::from(total_units),
        occupancy_rate: Decimal::from(occupied_units) / Decimal::from(total_units),
        units,
    })
}

/// Resolve each semantic field to a column index, first alias wins.
fn resolve_columns(headers: &csv::StringRecord) -> Result<ColumnMap, UnderwriteError> {
    let find = |aliases: &[&str]| -> Option<usize> {
        aliases.iter().find_map(|alias| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(alias))
        })
    };

    let unit = find(UNIT_HEADERS).ok_or_else(|| {
        UnderwriteError::UpstreamFailure("rent roll has no recognizable unit-number column".into())
    })?;
    let rent = find(RENT_HEADERS).ok_or_else(|| {
        UnderwriteError::UpstreamFailure("rent roll has no recognizable rent column".into())
    })?;

    Ok(ColumnMap {
        unit,
        rent,
        unit_type: find(TYPE_HEADERS),
        status: find(STATUS_HEADERS),
        tenant: find(TENANT_HEADERS),
    })
}

/// Coerce a "$1,234.56"-style cell into a Decimal.
fn parse_money(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
