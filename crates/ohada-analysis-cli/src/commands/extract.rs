use clap::Args;
use serde_json::Value;

use ohada_analysis_core::extraction::extract_statements;
use ohada_analysis_core::Workbook;

use super::PeriodArgs;
use crate::input;

/// Arguments for workbook extraction
#[derive(Args)]
pub struct ExtractArgs {
    /// Workbook (.xlsx, .xlsm, .xls, .ods) with Bilan, CR and TFT sheets
    #[arg(long)]
    pub workbook: String,

    #[command(flatten)]
    pub period: PeriodArgs,
}

pub fn run_extract(args: ExtractArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let path = input::file::resolve_path(&args.workbook)?;
    let workbook = Workbook::open(&path)?;
    let output = extract_statements(&workbook, &args.period.options()?);
    Ok(serde_json::to_value(output)?)
}
