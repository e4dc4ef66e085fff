use clap::Args;
use colored::Colorize;
use serde_json::Value;

use underwrite_core::underwriting;

use crate::input;

/// Arguments for underwriting a deal
#[derive(Args)]
pub struct DealArgs {
    /// Path to the property facts JSON (extraction output; loose field
    /// spellings are reconciled)
    #[arg(long)]
    pub facts: Option<String>,

    /// Path to a rent roll CSV; overrides extracted units/occupancy/rent
    #[arg(long)]
    pub rent_roll: Option<String>,

    /// Path to an assumptions file (JSON or YAML); defaults apply when omitted
    #[arg(long)]
    pub assumptions: Option<String>,
}

pub fn run_deal(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = if let Some(ref path) = args.facts {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--facts <file.json> or stdin required for underwriting".into());
    };

    let (facts, notes) = input::facts::resolve_facts(&raw)?;
    for note in &notes {
        eprintln!("{}: {}", "note".yellow(), note);
    }

    let rent_roll = match args.rent_roll {
        Some(ref path) => Some(input::rent_roll::parse_rent_roll(path)?),
        None => None,
    };

    let assumptions = input::file::read_assumptions(args.assumptions.as_deref())?;

    let result = underwriting::underwrite(&facts, rent_roll.as_ref(), &assumptions)?;
    Ok(serde_json::to_value(result)?)
}
