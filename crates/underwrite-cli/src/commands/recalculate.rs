use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use underwrite_core::underwriting::{self, DealMetrics};

use crate::input;

/// Arguments for recalculating a saved deal
#[derive(Args)]
pub struct RecalculateArgs {
    /// Path to a saved deal JSON: either the bare metrics or a full
    /// computation envelope from a previous run
    #[arg(long)]
    pub deal: Option<String>,

    /// Path to the revised assumptions file (JSON or YAML)
    #[arg(long)]
    pub assumptions: Option<String>,

    /// Underwrite at this price instead of the cap-rate market valuation
    #[arg(long)]
    pub price: Option<Decimal>,
}

pub fn run_recalculate(args: RecalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = if let Some(ref path) = args.deal {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--deal <file.json> or stdin required for recalculation".into());
    };

    let previous = extract_metrics(raw)?;
    let assumptions = input::file::read_assumptions(args.assumptions.as_deref())?;

    let result = underwriting::recalculate(&previous, &assumptions, args.price)?;
    Ok(serde_json::to_value(result)?)
}

/// Accept either a bare `DealMetrics` object or the `{ result: ... }`
/// envelope a previous CLI run printed.
fn extract_metrics(raw: Value) -> Result<DealMetrics, Box<dyn std::error::Error>> {
    if let Ok(metrics) = serde_json::from_value::<DealMetrics>(raw.clone()) {
        return Ok(metrics);
    }
    if let Some(inner) = raw.get("result") {
        return Ok(serde_json::from_value(inner.clone())?);
    }
    Err("deal input is neither a metrics object nor a computation envelope".into())
}
