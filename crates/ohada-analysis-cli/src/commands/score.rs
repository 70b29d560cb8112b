use clap::Args;
use serde_json::{json, Value};
use std::time::Instant;

use ohada_analysis_core::scoring::{calculate_score, TREND_PLACEHOLDER_POINTS};
use ohada_analysis_core::{with_metadata, FinancialRatios};

use super::{read_input, NormArgs};

/// Arguments for the composite score
#[derive(Args)]
pub struct ScoreArgs {
    /// Path to JSON ratios ({"roe": 16.67, ...})
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub norms: NormArgs,
}

pub fn run_score(args: ScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let ratios: FinancialRatios = read_input(args.input.as_deref(), "no ratios")?;
    let sector = args.norms.sector();
    let score = calculate_score(&ratios, sector, &args.norms.norm_set()?);

    let output = with_metadata(
        "Weighted score over 140 points: liquidity 40, leverage 40, profitability 30, efficiency 15, trend 15",
        &json!({ "sector": sector, "trend_points": TREND_PLACEHOLDER_POINTS }),
        vec![format!(
            "Composante tendance forfaitaire ({TREND_PLACEHOLDER_POINTS}/15 points)"
        )],
        start.elapsed().as_micros() as u64,
        score,
    );
    Ok(serde_json::to_value(output)?)
}
