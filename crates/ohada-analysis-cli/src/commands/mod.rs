pub mod analyze;
pub mod compliance;
pub mod extract;
pub mod layout;
pub mod norms;
pub mod ocr;
pub mod ratios;
pub mod score;

use clap::Args;
use std::error::Error;

use ohada_analysis_core::{ExtractionOptions, NormSet, Sector};

use crate::input;

/// Fiscal period selection shared by the extraction commands.
#[derive(Args)]
pub struct PeriodArgs {
    /// Calendar year of period N (defaults to the last closed year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Keep only periods from this calendar year
    #[arg(long, requires = "to")]
    pub from: Option<i32>,

    /// Keep only periods up to this calendar year
    #[arg(long, requires = "from")]
    pub to: Option<i32>,
}

impl PeriodArgs {
    pub fn options(&self) -> Result<ExtractionOptions, Box<dyn Error>> {
        let mut options = ExtractionOptions::default();
        if let Some(year) = self.year {
            options.reference_year = year;
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            options = options.with_year_range(from, to);
        }
        options.validate()?;
        Ok(options)
    }
}

/// Sector and norm configuration shared by the scoring commands.
#[derive(Args)]
pub struct NormArgs {
    /// Activity sector: general, industrie, commerce, services, agriculture,
    /// btp or transport (anything else uses general norms)
    #[arg(long, default_value = "general")]
    pub sector: String,

    /// YAML or JSON norm overrides, merged over the built-in BCEAO norms
    #[arg(long)]
    pub norms: Option<String>,
}

impl NormArgs {
    pub fn sector(&self) -> Sector {
        Sector::from(self.sector.as_str())
    }

    pub fn norm_set(&self) -> Result<NormSet, Box<dyn Error>> {
        let builtin = NormSet::bceao();
        match &self.norms {
            Some(path) => {
                let overrides: NormSet = input::file::read_config(path)?;
                log::info!("norm overrides loaded from {path}");
                let merged = builtin.merged_with(&overrides);
                merged.validate()?;
                Ok(merged)
            }
            None => Ok(builtin),
        }
    }
}

/// Typed input from `--input`, else from piped stdin.
pub fn read_input<T: serde::de::DeserializeOwned>(
    path: Option<&str>,
    hint: &str,
) -> Result<T, Box<dyn Error>> {
    if let Some(path) = path {
        input::file::read_json(path)
    } else if let Some(value) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(value)?)
    } else {
        Err(format!("{hint} (provide --input or pipe JSON on stdin)").into())
    }
}
