//! Year-over-year insights on the two most recent periods.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Category, Priority};
use crate::compliance::norms::{NormSet, Sector};
use crate::ratios::{FinancialRatios, RatioKey};
use crate::statements::{MultiyearData, YearKey};

const ROE_MATERIALITY: Decimal = dec!(2);
const ROE_HIGH_IMPACT: Decimal = dec!(5);
const LIQUIDITY_DEFAULT_MIN: Decimal = dec!(1.2);
const LIQUIDITY_IMPROVEMENT: Decimal = dec!(0.2);
const AUTONOMY_MATERIALITY: Decimal = dec!(5);
const AUTONOMY_HIGH_IMPACT: Decimal = dec!(10);
const NET_MARGIN_DETERIORATION: Decimal = dec!(-2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Positive,
    Negative,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub category: Category,
    pub kind: InsightKind,
    pub impact: Priority,
    pub title: String,
    pub description: String,
    pub recommendation: String,
}

/// Compare the two most recent periods. Fewer than two periods yields no
/// insight.
pub fn generate_insights(
    data: &MultiyearData,
    ratios_by_year: &BTreeMap<YearKey, FinancialRatios>,
    sector: Sector,
    norms: &NormSet,
) -> Vec<Insight> {
    let mut keys = data.keys();
    let (Some(latest_key), Some(previous_key)) = (keys.next(), keys.next()) else {
        log::debug!("insights need two periods, {} available", data.len());
        return Vec::new();
    };
    let empty = FinancialRatios::new();
    let latest = ratios_by_year.get(&latest_key).unwrap_or(&empty);
    let previous = ratios_by_year.get(&previous_key).unwrap_or(&empty);
    let change = |key: RatioKey| {
        let (now, before) = latest.get(key).zip(previous.get(key))?;
        Some((now, before, now.checked_sub(before)?))
    };

    let mut insights = Vec::new();

    // -- Profitability --------------------------------------------------------
    if let Some((now, before, delta)) = change(RatioKey::Roe) {
        if delta.abs() > ROE_MATERIALITY {
            let impact = if delta.abs() > ROE_HIGH_IMPACT {
                Priority::High
            } else {
                Priority::Medium
            };
            let (kind, title, recommendation) = if delta > Decimal::ZERO {
                (
                    InsightKind::Positive,
                    "Amélioration de la rentabilité des capitaux propres",
                    "Consolider les leviers de rentabilité et envisager le réinvestissement des bénéfices.",
                )
            } else {
                (
                    InsightKind::Negative,
                    "Dégradation de la rentabilité des capitaux propres",
                    "Analyser l'évolution des charges et des marges pour identifier les causes de la baisse.",
                )
            };
            insights.push(Insight {
                category: Category::Profitability,
                kind,
                impact,
                title: title.to_string(),
                description: format!(
                    "Le ROE passe de {}% à {}% ({} points).",
                    pct(before),
                    pct(now),
                    signed(delta)
                ),
                recommendation: recommendation.to_string(),
            });
        }
    }

    if let Some((now, before, delta)) = change(RatioKey::MargeNette) {
        if delta < NET_MARGIN_DETERIORATION {
            insights.push(Insight {
                category: Category::Profitability,
                kind: InsightKind::Negative,
                impact: Priority::Medium,
                title: "Érosion de la marge nette".to_string(),
                description: format!(
                    "La marge nette recule de {}% à {}% ({} points).",
                    pct(before),
                    pct(now),
                    signed(delta)
                ),
                recommendation: "Revoir la politique tarifaire et la maîtrise des coûts.".to_string(),
            });
        }
    }

    // -- Liquidity ------------------------------------------------------------
    if let Some(now) = latest.get(RatioKey::LiquiditeGenerale) {
        let floor = norms
            .norm(sector, RatioKey::LiquiditeGenerale)
            .and_then(|n| n.min)
            .unwrap_or(LIQUIDITY_DEFAULT_MIN);
        let delta = previous.get(RatioKey::LiquiditeGenerale).and_then(|before| now.checked_sub(before));
        if now < floor {
            insights.push(Insight {
                category: Category::Liquidity,
                kind: InsightKind::Warning,
                impact: if now < Decimal::ONE {
                    Priority::High
                } else {
                    Priority::Medium
                },
                title: "Liquidité insuffisante".to_string(),
                description: format!(
                    "La liquidité générale ({}) est inférieure à la norme minimale de {floor}.",
                    now.round_dp(2)
                ),
                recommendation: "Renforcer le fonds de roulement et surveiller les échéances à court terme."
                    .to_string(),
            });
        } else if delta.is_some_and(|d| d > LIQUIDITY_IMPROVEMENT) {
            insights.push(Insight {
                category: Category::Liquidity,
                kind: InsightKind::Positive,
                impact: Priority::Medium,
                title: "Amélioration de la liquidité".to_string(),
                description: format!(
                    "La liquidité générale progresse à {} (+{}).",
                    now.round_dp(2),
                    delta.unwrap_or_default().round_dp(2)
                ),
                recommendation: "Placer les excédents de trésorerie de manière productive.".to_string(),
            });
        }
    }

    // -- Solvency -------------------------------------------------------------
    if let Some((now, before, delta)) = change(RatioKey::AutonomieFinanciere) {
        if delta.abs() > AUTONOMY_MATERIALITY {
            let impact = if delta.abs() > AUTONOMY_HIGH_IMPACT {
                Priority::High
            } else {
                Priority::Medium
            };
            let (kind, title, recommendation) = if delta > Decimal::ZERO {
                (
                    InsightKind::Positive,
                    "Renforcement de l'autonomie financière",
                    "Maintenir la politique de mise en réserve des résultats.",
                )
            } else {
                (
                    InsightKind::Negative,
                    "Baisse de l'autonomie financière",
                    "Limiter le recours à la dette et renforcer les fonds propres.",
                )
            };
            insights.push(Insight {
                category: Category::Solvency,
                kind,
                impact,
                title: title.to_string(),
                description: format!(
                    "L'autonomie financière passe de {}% à {}% ({} points).",
                    pct(before),
                    pct(now),
                    signed(delta)
                ),
                recommendation: recommendation.to_string(),
            });
        }
    }

    log::debug!("{} insight(s) comparing {latest_key} with {previous_key}", insights.len());
    insights
}

fn pct(value: Decimal) -> Decimal {
    value.round_dp(1)
}

fn signed(delta: Decimal) -> String {
    let rounded = delta.round_dp(1);
    if rounded.is_sign_negative() {
        rounded.to_string()
    } else {
        format!("+{rounded}")
    }
}
