use clap::Args;
use serde_json::Value;

use crate::input;

/// Arguments for parsing a rent roll on its own
#[derive(Args)]
pub struct RentRollArgs {
    /// Path to the rent roll CSV
    #[arg(long)]
    pub input: String,
}

pub fn run_rent_roll(args: RentRollArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rent_roll = input::rent_roll::parse_rent_roll(&args.input)?;
    Ok(serde_json::to_value(rent_roll)?)
}
