use ohada_analysis_core::compliance::{check_compliance, ComplianceStatus};
use ohada_analysis_core::ratios::calculate_ratios;
use ohada_analysis_core::scoring::{
    calculate_score, generate_insights, Category, InsightKind, Priority, RiskLevel,
};
use ohada_analysis_core::{
    analyze_workbook, calculate_analysis, AnalysisOptions, ExtractionOptions, FieldKey,
    FinancialData, FinancialRatios, MultiyearData, NormSet, OhadaError, RatioKey, Sector,
    Workbook, YearKey, YearRecord,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn scenario_workbook() -> Workbook {
    Workbook::new()
        .with_cell("Bilan", "E35", "10700000")
        .and_then(|w| w.with_cell("Bilan", "I15", "6000000"))
        .and_then(|w| w.with_cell("CR", "E12", "8000000"))
        .and_then(|w| w.with_cell("CR", "E46", "1000000"))
        .unwrap()
}

fn two_year_workbook() -> Workbook {
    scenario_workbook()
        .with_cell("Bilan", "F35", "9 800 000")
        .and_then(|w| w.with_cell("Bilan", "J15", "5 400 000"))
        .and_then(|w| w.with_cell("CR", "F12", "7 000 000"))
        .and_then(|w| w.with_cell("CR", "F46", "500 000"))
        .unwrap()
}

fn rounded(value: Option<Decimal>) -> Option<Decimal> {
    value.map(|v| v.round_dp(2))
}

// ===========================================================================
// Scenario: single-year workbook, end to end
// ===========================================================================

#[test]
fn test_scenario_ratios() {
    let out = analyze_workbook(
        &scenario_workbook(),
        &ExtractionOptions::for_year(2024),
        &AnalysisOptions::default(),
    )
    .unwrap();
    let ratios = &out.result.ratios;

    assert_eq!(rounded(ratios.get(RatioKey::Roa)), Some(dec!(9.35)));
    assert_eq!(rounded(ratios.get(RatioKey::Roe)), Some(dec!(16.67)));
    assert_eq!(ratios.get(RatioKey::MargeNette), Some(dec!(12.5)));
    assert_eq!(ratios.get(RatioKey::LiquiditeGenerale), None);
}

#[test]
fn test_scenario_score() {
    let out = analyze_workbook(
        &scenario_workbook(),
        &ExtractionOptions::for_year(2024),
        &AnalysisOptions::default(),
    )
    .unwrap();
    let score = &out.result.score;

    // profitability 30/30, leverage 20/40 (autonomy only), efficiency 6/15
    // (asset turnover 0.75 within tolerance), trend 12/15 => 68 / 140
    assert_eq!(score.profitability, 100);
    assert_eq!(score.leverage, 50);
    assert_eq!(score.liquidity, 0);
    assert_eq!(score.efficiency, 40);
    assert_eq!(score.trend, 80);
    assert_eq!(score.overall, 49);
    assert_eq!(score.risk_level, RiskLevel::High);
}

#[test]
fn test_scenario_single_year_has_full_results_but_no_insight() {
    let out = analyze_workbook(
        &scenario_workbook(),
        &ExtractionOptions::for_year(2024),
        &AnalysisOptions::default(),
    )
    .unwrap();
    let result = &out.result;

    assert!(result.insights.is_empty());
    assert_eq!(result.compliance.len(), 5);
    assert_eq!(result.compliance[0].ratio, RatioKey::RotationActif);
    assert_eq!(result.compliance[0].status, ComplianceStatus::Acceptable);
    assert!(result.compliance[1..]
        .iter()
        .all(|r| r.status == ComplianceStatus::Excellent));
    assert!(result.recommendations.is_empty());

    // Missing cash-flow sheet, then the single-year notice.
    assert!(out.warnings[0].contains("TFT"));
    assert!(out.warnings.iter().any(|w| w.contains("Un seul exercice")));
}

#[test]
fn test_enriched_data_carries_derived_fields_and_ratios() {
    let out = analyze_workbook(
        &scenario_workbook(),
        &ExtractionOptions::for_year(2024),
        &AnalysisOptions::default(),
    )
    .unwrap();
    let n = out.result.data.get(YearKey::CURRENT).unwrap();
    assert_eq!(
        n.data.get(FieldKey::TotalProduitsExploitation),
        Some(dec!(8000000))
    );
    assert_eq!(n.ratios.as_ref(), Some(&out.result.ratios));
}

// ===========================================================================
// Scenario: nothing to analyse
// ===========================================================================

#[test]
fn test_empty_workbook_is_rejected() {
    let err = analyze_workbook(
        &Workbook::new(),
        &ExtractionOptions::for_year(2024),
        &AnalysisOptions::default(),
    )
    .unwrap_err();
    match err {
        OhadaError::ExtractionFailed { warnings } => {
            assert!(warnings[0].starts_with("Feuille \"Bilan\""));
            assert!(warnings.last().unwrap().contains("Aucune donnée"));
        }
        other => panic!("expected ExtractionFailed, got {other:?}"),
    }
}

#[test]
fn test_empty_data_is_rejected() {
    let err = calculate_analysis(&MultiyearData::new(), &AnalysisOptions::default()).unwrap_err();
    assert!(matches!(err, OhadaError::NoData(_)));
}

// ===========================================================================
// Scenario: two years
// ===========================================================================

#[test]
fn test_two_year_roe_insight() {
    let out = analyze_workbook(
        &two_year_workbook(),
        &ExtractionOptions::for_year(2024),
        &AnalysisOptions::default(),
    )
    .unwrap();
    let insights = &out.result.insights;

    // ROE 9.26 -> 16.67
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].category, Category::Profitability);
    assert_eq!(insights[0].kind, InsightKind::Positive);
    assert_eq!(insights[0].impact, Priority::High);
    assert!(!out.warnings.iter().any(|w| w.contains("Un seul exercice")));

    let prior = out.result.data.get(YearKey::PRIOR).unwrap();
    assert_eq!(
        rounded(prior.ratios.as_ref().and_then(|r| r.get(RatioKey::Roe))),
        Some(dec!(9.26))
    );
}

#[test]
fn test_insights_follow_sector_liquidity_floor() {
    let mut data = MultiyearData::new();
    let year = |ac: Decimal, pc: Decimal| {
        FinancialData::new()
            .with(FieldKey::ActifCirculant, ac)
            .with(FieldKey::PassifCirculant, pc)
    };
    data.insert(YearKey::CURRENT, YearRecord::new(2024, year(dec!(115), dec!(100))))
        .unwrap();
    data.insert(YearKey::PRIOR, YearRecord::new(2023, year(dec!(115), dec!(100))))
        .unwrap();
    let ratios: BTreeMap<_, _> = data
        .iter()
        .map(|(key, record)| (key, calculate_ratios(&record.data)))
        .collect();

    let norms = NormSet::bceao();
    let general = generate_insights(&data, &ratios, Sector::General, &norms);
    let commerce = generate_insights(&data, &ratios, Sector::Commerce, &norms);
    assert_eq!(general.len(), 1);
    assert_eq!(general[0].kind, InsightKind::Warning);
    assert!(commerce.is_empty());
}

// ===========================================================================
// Boundaries and invariants
// ===========================================================================

#[test]
fn test_liquidity_exactly_at_minimum_is_good() {
    let ratios = FinancialRatios::new().with(RatioKey::LiquiditeGenerale, dec!(1.2));
    let results = check_compliance(&ratios, Sector::General, &NormSet::bceao());
    assert_eq!(results[0].status, ComplianceStatus::Good);
    assert!(results[0].is_compliant);
}

#[test]
fn test_unknown_sector_behaves_like_general() {
    let ratios = calculate_ratios(
        &FinancialData::new()
            .with(FieldKey::ChiffreAffaires, dec!(1000))
            .with(FieldKey::ResultatNet, dec!(30))
            .with(FieldKey::TotalActif, dec!(900)),
    );
    let norms = NormSet::bceao();
    let unknown = Sector::from("aeronautique");
    assert_eq!(
        check_compliance(&ratios, unknown, &norms),
        check_compliance(&ratios, Sector::General, &norms)
    );
    assert_eq!(
        calculate_score(&ratios, unknown, &norms),
        calculate_score(&ratios, Sector::General, &norms)
    );
}

#[test]
fn test_ratios_total_over_zero_and_missing_inputs() {
    let keys = [
        FieldKey::TotalActif,
        FieldKey::CapitauxPropres,
        FieldKey::ChiffreAffaires,
        FieldKey::PassifCirculant,
        FieldKey::ActifImmobilise,
        FieldKey::DettesFinancieres,
        FieldKey::CapaciteAutofinancement,
    ];
    for zeroed in keys {
        let data: FinancialData = FieldKey::ALL
            .iter()
            .map(|k| (*k, if *k == zeroed { Decimal::ZERO } else { dec!(1000) }))
            .collect();
        let ratios = calculate_ratios(&data);
        assert!(ratios.len() < RatioKey::ALL.len(), "{zeroed} divisor not suppressed");
        let score = calculate_score(&ratios, Sector::General, &NormSet::bceao());
        assert!(score.overall <= 100);
    }
}

#[test]
fn test_analysis_output_serializes() {
    let out = analyze_workbook(
        &scenario_workbook(),
        &ExtractionOptions::for_year(2024),
        &AnalysisOptions::for_sector(Sector::Services),
    )
    .unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["result"]["period"], "N");
    assert_eq!(json["result"]["score"]["risk_level"], "high");
    let margin: Decimal = json["result"]["ratios"]["marge_nette"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(margin, dec!(12.5));
    assert_eq!(json["assumptions"]["sector"], "services");
    assert!(json["result"]["data"]["N"]["data"]["total_actif"].is_string());
}
