use clap::Args;
use serde_json::Value;

use ohada_analysis_core::extraction::manual::{extract_from_form, ManualForm};
use ohada_analysis_core::extraction::text::extract_from_text;
use ohada_analysis_core::{
    analyze_extraction, analyze_workbook, calculate_analysis, AnalysisOptions, MultiyearData,
    Workbook,
};

use super::{read_input, NormArgs, PeriodArgs};
use crate::input;

/// Arguments for the full analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Workbook (.xlsx, .xlsm, .xls, .ods) with Bilan, CR and TFT sheets
    #[arg(long, conflicts_with_all = ["input", "form", "text"])]
    pub workbook: Option<String>,

    /// Manual entry form as JSON: {"N": {"total_actif": 1000, ...}, "N-1": {...}}
    #[arg(long, conflicts_with_all = ["input", "text"])]
    pub form: Option<String>,

    /// OCR text file
    #[arg(long, conflicts_with = "input")]
    pub text: Option<String>,

    /// Multi-year data as JSON: {"N": {"year": 2024, "data": {...}}, ...}
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub period: PeriodArgs,

    #[command(flatten)]
    pub norms: NormArgs,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let options = AnalysisOptions {
        sector: args.norms.sector(),
        norms: args.norms.norm_set()?,
    };

    let output = if let Some(ref path) = args.workbook {
        let workbook = Workbook::open(input::file::resolve_path(path)?)?;
        analyze_workbook(&workbook, &args.period.options()?, &options)?
    } else if let Some(ref path) = args.form {
        let form: ManualForm = input::file::read_json(path)?;
        analyze_extraction(extract_from_form(&form, &args.period.options()?), &options)?
    } else if let Some(ref path) = args.text {
        let text = input::file::read_text(path)?;
        analyze_extraction(extract_from_text(&text, &args.period.options()?), &options)?
    } else {
        let data: MultiyearData = read_input(
            args.input.as_deref(),
            "no data to analyze: provide --workbook, --form or --text",
        )?;
        calculate_analysis(&data, &options)?
    };

    Ok(serde_json::to_value(output)?)
}
