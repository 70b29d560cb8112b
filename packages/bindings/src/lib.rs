use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use ohada_analysis_core::compliance::check_compliance as check_norms;
use ohada_analysis_core::extraction::manual::{extract_from_form, ManualForm};
use ohada_analysis_core::extraction::text::extract_from_text;
use ohada_analysis_core::ratios::calculate_ratios as compute_ratios;
use ohada_analysis_core::scoring::calculate_score as compute_score;
use ohada_analysis_core::statements::derive_fields;
use ohada_analysis_core::{
    analyze_extraction, calculate_analysis, AnalysisOptions, ExtractionOptions, FinancialData,
    FinancialRatios, MultiyearData, NormSet, Sector,
};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Sector and optional norm overrides, shared by every scoring entry point.
#[derive(Deserialize)]
struct NormRequest {
    #[serde(default)]
    sector: Sector,
    #[serde(default)]
    norms: Option<NormSet>,
}

impl NormRequest {
    fn norm_set(&self) -> NapiResult<NormSet> {
        let builtin = NormSet::bceao();
        let Some(overrides) = &self.norms else {
            return Ok(builtin);
        };
        let merged = builtin.merged_with(overrides);
        merged.validate().map_err(to_napi_error)?;
        Ok(merged)
    }

    fn analysis_options(&self) -> NapiResult<AnalysisOptions> {
        Ok(AnalysisOptions {
            sector: self.sector,
            norms: self.norm_set()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AnalyzeRequest {
    data: MultiyearData,
    #[serde(flatten)]
    norms: NormRequest,
}

#[napi]
pub fn analyze(input_json: String) -> NapiResult<String> {
    let input: AnalyzeRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        calculate_analysis(&input.data, &input.norms.analysis_options()?).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct FormRequest {
    form: ManualForm,
    reference_year: Option<i32>,
    #[serde(flatten)]
    norms: NormRequest,
}

#[napi]
pub fn analyze_form(input_json: String) -> NapiResult<String> {
    let input: FormRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let options = input
        .reference_year
        .map(ExtractionOptions::for_year)
        .unwrap_or_default();
    let extraction = extract_from_form(&input.form, &options);
    let output = analyze_extraction(extraction, &input.norms.analysis_options()?)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

#[napi]
pub fn extract_text(text: String, reference_year: Option<i32>) -> NapiResult<String> {
    let options = reference_year
        .map(ExtractionOptions::for_year)
        .unwrap_or_default();
    let output = extract_from_text(&text, &options);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Ratios, compliance and score
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_ratios(data_json: String) -> NapiResult<String> {
    let data: FinancialData = serde_json::from_str(&data_json).map_err(to_napi_error)?;
    let ratios = compute_ratios(&derive_fields(&data));
    serde_json::to_string(&ratios).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct RatiosRequest {
    ratios: FinancialRatios,
    #[serde(flatten)]
    norms: NormRequest,
}

#[napi]
pub fn check_compliance(input_json: String) -> NapiResult<String> {
    let input: RatiosRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let results = check_norms(&input.ratios, input.norms.sector, &input.norms.norm_set()?);
    serde_json::to_string(&results).map_err(to_napi_error)
}

#[napi]
pub fn calculate_score(input_json: String) -> NapiResult<String> {
    let input: RatiosRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let score = compute_score(&input.ratios, input.norms.sector, &input.norms.norm_set()?);
    serde_json::to_string(&score).map_err(to_napi_error)
}

#[napi]
pub fn effective_norms(sector: Option<String>) -> NapiResult<String> {
    let sector = sector.as_deref().map(Sector::from).unwrap_or_default();
    serde_json::to_string(&NormSet::bceao().effective(sector)).map_err(to_napi_error)
}
