use clap::Args;
use serde_json::Value;

use super::NormArgs;

/// Arguments for printing the effective norm table
#[derive(Args)]
pub struct NormsArgs {
    #[command(flatten)]
    pub norms: NormArgs,

    /// Print the whole norm set (baseline and every sector) instead
    #[arg(long)]
    pub all: bool,
}

pub fn run_norms(args: NormsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let norms = args.norms.norm_set()?;
    if args.all {
        return Ok(serde_json::to_value(norms)?);
    }
    Ok(serde_json::to_value(norms.effective(args.norms.sector()))?)
}
