//! End-to-end analysis pipeline: derive, compute ratios, score, check
//! compliance, explain.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::compliance::{check_compliance, ComplianceResult, NormSet, Sector};
use crate::error::OhadaError;
use crate::extraction::{extract_statements, ExtractionOptions, ExtractionOutput, Workbook};
use crate::ratios::{calculate_all, FinancialRatios};
use crate::scoring::{
    calculate_score, generate_insights, generate_recommendations, AnalysisScore, Insight,
    Recommendation,
};
use crate::statements::{derive_all, FieldKey, MultiyearData, YearKey};
use crate::types::{with_metadata, ComputationOutput};
use crate::OhadaResult;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisOptions {
    #[serde(default)]
    pub sector: Sector,
    #[serde(default)]
    pub norms: NormSet,
}

impl AnalysisOptions {
    pub fn for_sector(sector: Sector) -> Self {
        Self {
            sector,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    /// Period the score and compliance refer to.
    pub period: YearKey,
    pub ratios: FinancialRatios,
    pub score: AnalysisScore,
    pub compliance: Vec<ComplianceResult>,
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
    /// Input enriched with derived fields and per-year ratios.
    pub data: MultiyearData,
}

/// Run the full analysis on already extracted data.
pub fn calculate_analysis(
    data: &MultiyearData,
    options: &AnalysisOptions,
) -> OhadaResult<ComputationOutput<AnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if data.field_count() == 0 {
        return Err(OhadaError::NoData(
            "aucune donnée financière fournie".into(),
        ));
    }

    let enriched = calculate_all(&derive_all(data));
    let ratios_by_year: BTreeMap<YearKey, FinancialRatios> = enriched
        .iter()
        .map(|(key, record)| (key, record.ratios.clone().unwrap_or_default()))
        .collect();

    let (period, record) = enriched
        .get(YearKey::CURRENT)
        .map(|r| (YearKey::CURRENT, r))
        .or_else(|| enriched.latest())
        .ok_or_else(|| OhadaError::NoData("aucune période disponible".into()))?;
    if period != YearKey::CURRENT {
        warnings.push(format!(
            "Exercice N absent : l'analyse porte sur l'exercice {period}"
        ));
    }
    let ratios = ratios_by_year.get(&period).cloned().unwrap_or_default();
    if let Some(caf) = record
        .data
        .get(FieldKey::CapaciteAutofinancement)
        .filter(|caf| *caf <= Decimal::ZERO)
    {
        warnings.push(format!(
            "Capacité d'autofinancement {caf} : l'entreprise ne dégage pas de ressources \
             pour rembourser ses dettes, capacité de remboursement non calculable"
        ));
    }
    if ratios.is_empty() {
        warnings.push(format!(
            "Aucun ratio calculable pour l'exercice {period} : données insuffisantes"
        ));
    }

    let score = calculate_score(&ratios, options.sector, &options.norms);
    let compliance = check_compliance(&ratios, options.sector, &options.norms);
    let insights = generate_insights(&enriched, &ratios_by_year, options.sector, &options.norms);
    if enriched.len() < 2 {
        warnings.push(
            "Un seul exercice disponible : l'analyse des tendances n'est pas possible".into(),
        );
    }
    let recommendations = generate_recommendations(&ratios);

    log::info!(
        "analysis of {period}: overall score {} ({}), {} compliance result(s)",
        score.overall,
        score.risk_level,
        compliance.len()
    );

    let assumptions = json!({
        "sector": options.sector,
        "period": period,
        "years": enriched.len(),
        "score_pools": {
            "liquidity": 40, "leverage": 40, "profitability": 30,
            "efficiency": 15, "trend": 15,
        },
    });

    let output = AnalysisOutput {
        period,
        ratios,
        score,
        compliance,
        insights,
        recommendations,
        data: enriched,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "OHADA/BCEAO ratio analysis, compliance classification and composite scoring",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Analyse the result of any producer. Extraction warnings lead the
/// envelope's warnings.
pub fn analyze_extraction(
    extraction: ExtractionOutput,
    options: &AnalysisOptions,
) -> OhadaResult<ComputationOutput<AnalysisOutput>> {
    if extraction.is_empty() {
        return Err(OhadaError::ExtractionFailed {
            warnings: extraction.warnings,
        });
    }
    let mut output = calculate_analysis(&extraction.data, options)?;
    let mut warnings = extraction.warnings;
    warnings.append(&mut output.warnings);
    output.warnings = warnings;
    Ok(output)
}

/// Extract the template sheets of `workbook`, then analyse them.
pub fn analyze_workbook(
    workbook: &Workbook,
    extraction: &ExtractionOptions,
    options: &AnalysisOptions,
) -> OhadaResult<ComputationOutput<AnalysisOutput>> {
    analyze_extraction(extract_statements(workbook, extraction), options)
}
