use clap::Args;
use serde_json::{json, Value};
use std::time::Instant;

use ohada_analysis_core::compliance::check_compliance;
use ohada_analysis_core::{with_metadata, FinancialRatios};

use super::{read_input, NormArgs};

/// Arguments for the BCEAO compliance check
#[derive(Args)]
pub struct ComplianceArgs {
    /// Path to JSON ratios ({"roe": 16.67, "ratio_liquidite_generale": 1.2, ...})
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub norms: NormArgs,
}

pub fn run_compliance(args: ComplianceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let ratios: FinancialRatios = read_input(args.input.as_deref(), "no ratios")?;
    let sector = args.norms.sector();
    let norms = args.norms.norm_set()?;

    let results = check_compliance(&ratios, sector, &norms);
    let warnings = results
        .iter()
        .filter_map(|r| r.recommendation.clone())
        .collect();

    let output = with_metadata(
        "BCEAO norm compliance, critical first",
        &json!({ "sector": sector }),
        warnings,
        start.elapsed().as_micros() as u64,
        results,
    );
    Ok(serde_json::to_value(output)?)
}
