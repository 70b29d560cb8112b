use clap::Args;
use serde_json::Value;

use ohada_analysis_core::extraction::text::extract_from_text;

use super::PeriodArgs;
use crate::input;

/// Arguments for OCR text extraction
#[derive(Args)]
pub struct OcrArgs {
    /// OCR text file (reads piped stdin when omitted)
    #[arg(long)]
    pub file: Option<String>,

    #[command(flatten)]
    pub period: PeriodArgs,
}

pub fn run_ocr(args: OcrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let text = match &args.file {
        Some(path) => input::file::read_text(path)?,
        None => input::stdin::read_stdin_text()?
            .ok_or("no OCR text (provide --file or pipe text on stdin)")?,
    };
    let output = extract_from_text(&text, &args.period.options()?);
    Ok(serde_json::to_value(output)?)
}
