use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::norms::{Bound, NormEntry, NormSet, Sector};
use crate::ratios::{FinancialRatios, RatioKey};
use crate::types::Ratio;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compliance level, ordered by severity: `Critical` is the lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    Critical,
    Poor,
    Acceptable,
    Good,
    Excellent,
}

impl ComplianceStatus {
    /// Only `Good` and `Excellent` meet the norm.
    pub fn is_compliant(self) -> bool {
        self >= ComplianceStatus::Good
    }

    pub fn label(self) -> &'static str {
        match self {
            ComplianceStatus::Critical => "Critique",
            ComplianceStatus::Poor => "Faible",
            ComplianceStatus::Acceptable => "Acceptable",
            ComplianceStatus::Good => "Bon",
            ComplianceStatus::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComplianceStatus::Critical => "critical",
            ComplianceStatus::Poor => "poor",
            ComplianceStatus::Acceptable => "acceptable",
            ComplianceStatus::Good => "good",
            ComplianceStatus::Excellent => "excellent",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub ratio: RatioKey,
    pub value: Ratio,
    pub norm: NormEntry,
    pub is_compliant: bool,
    pub status: ComplianceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify a value against its norm. `None` when the norm has no bound.
///
/// Every threshold is inclusive on the favourable side: a value exactly at
/// `min` is `Good`.
pub fn evaluate(value: Decimal, norm: &NormEntry) -> Option<ComplianceStatus> {
    let optimal = norm.optimal_or_default()?;
    let status = match norm.bound()? {
        Bound::Min(min) => {
            if value >= optimal {
                ComplianceStatus::Excellent
            } else if value >= min {
                ComplianceStatus::Good
            } else if value >= min.saturating_mul(dec!(0.8)) {
                ComplianceStatus::Acceptable
            } else if value >= min.saturating_mul(dec!(0.6)) {
                ComplianceStatus::Poor
            } else {
                ComplianceStatus::Critical
            }
        }
        Bound::Max(max) => {
            if value <= optimal {
                ComplianceStatus::Excellent
            } else if value <= max {
                ComplianceStatus::Good
            } else if value <= max.saturating_mul(dec!(1.2)) {
                ComplianceStatus::Acceptable
            } else if value <= max.saturating_mul(dec!(1.5)) {
                ComplianceStatus::Poor
            } else {
                ComplianceStatus::Critical
            }
        }
    };
    Some(status)
}

/// Check every ratio that has an effective norm for `sector`.
///
/// Results are ordered by ascending status, critical first; ratios sharing a
/// status keep their declaration order.
pub fn check_compliance(
    ratios: &FinancialRatios,
    sector: Sector,
    norms: &NormSet,
) -> Vec<ComplianceResult> {
    let table = norms.effective(sector);
    let mut results: Vec<ComplianceResult> = ratios
        .iter()
        .filter_map(|(ratio, value)| {
            let norm = *table.get(&ratio)?;
            let status = evaluate(value, &norm)?;
            Some(ComplianceResult {
                ratio,
                value,
                norm,
                is_compliant: status.is_compliant(),
                status,
                recommendation: (!status.is_compliant()).then(|| recommendation(ratio, status)),
            })
        })
        .collect();
    results.sort_by_key(|r| r.status);
    log::debug!(
        "compliance ({sector}): {} ratio(s) checked, {} non-compliant",
        results.len(),
        results.iter().filter(|r| !r.is_compliant).count()
    );
    results
}

fn recommendation(ratio: RatioKey, status: ComplianceStatus) -> String {
    let advice = match ratio {
        RatioKey::LiquiditeGenerale => {
            "renforcer le fonds de roulement en accélérant le recouvrement clients \
             et en négociant des délais fournisseurs"
        }
        RatioKey::LiquiditeImmediate => {
            "reconstituer la trésorerie disponible et limiter les décaissements non essentiels"
        }
        RatioKey::AutonomieFinanciere => {
            "renforcer les capitaux propres par mise en réserve des bénéfices ou augmentation de capital"
        }
        RatioKey::Endettement => {
            "réduire l'endettement en remboursant les dettes les plus coûteuses"
        }
        RatioKey::CouvertureDettes => {
            "améliorer l'excédent brut d'exploitation ou rééchelonner la dette financière"
        }
        RatioKey::FinancementStable => {
            "financer les immobilisations par des ressources stables plutôt que par la dette court terme"
        }
        RatioKey::CapaciteRemboursement => {
            "allonger la maturité de la dette ou accroître la capacité d'autofinancement"
        }
        RatioKey::Roe | RatioKey::Roa => {
            "améliorer la rentabilité en optimisant les charges et l'utilisation des actifs"
        }
        RatioKey::MargeNette | RatioKey::MargeBrute | RatioKey::MargeEbe => {
            "revoir la politique de prix et maîtriser les coûts d'exploitation"
        }
        RatioKey::TauxValeurAjoutee => {
            "accroître la valeur ajoutée en réduisant les consommations intermédiaires"
        }
        RatioKey::RotationActif | RatioKey::RotationStocks => {
            "céder les actifs sous-utilisés et développer le chiffre d'affaires"
        }
        RatioKey::WorkingCapital => "rééquilibrer actif et passif circulants",
    };
    let prefix = match status {
        ComplianceStatus::Critical => "Action urgente",
        ComplianceStatus::Poor => "Action prioritaire",
        _ => "À surveiller",
    };
    format!("{prefix} ({}) : {advice}.", ratio.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn min_norm() -> NormEntry {
        NormEntry::at_least(dec!(10), dec!(20))
    }

    #[test]
    fn test_min_bound_thresholds() {
        let norm = min_norm();
        assert_eq!(evaluate(dec!(20), &norm), Some(ComplianceStatus::Excellent));
        assert_eq!(evaluate(dec!(10), &norm), Some(ComplianceStatus::Good));
        assert_eq!(evaluate(dec!(8), &norm), Some(ComplianceStatus::Acceptable));
        assert_eq!(evaluate(dec!(6), &norm), Some(ComplianceStatus::Poor));
        assert_eq!(evaluate(dec!(5.99), &norm), Some(ComplianceStatus::Critical));
    }

    #[test]
    fn test_max_bound_thresholds() {
        let norm = NormEntry::at_most(dec!(70), dec!(50));
        assert_eq!(evaluate(dec!(50), &norm), Some(ComplianceStatus::Excellent));
        assert_eq!(evaluate(dec!(70), &norm), Some(ComplianceStatus::Good));
        assert_eq!(evaluate(dec!(84), &norm), Some(ComplianceStatus::Acceptable));
        assert_eq!(evaluate(dec!(105), &norm), Some(ComplianceStatus::Poor));
        assert_eq!(evaluate(dec!(105.01), &norm), Some(ComplianceStatus::Critical));
    }

    #[test]
    fn test_status_monotonic_in_value() {
        let norm = min_norm();
        let statuses: Vec<_> = [dec!(5), dec!(9), dec!(10), dec!(20)]
            .iter()
            .map(|v| evaluate(*v, &norm).unwrap())
            .collect();
        assert!(statuses.windows(2).all(|w| w[0] <= w[1]), "{statuses:?}");
    }

    #[test]
    fn test_unbounded_norm_skipped() {
        assert_eq!(evaluate(dec!(1), &NormEntry::default()), None);
    }

    #[test]
    fn test_liquidity_at_minimum_is_good() {
        let ratios = FinancialRatios::new().with(RatioKey::LiquiditeGenerale, dec!(1.2));
        let results = check_compliance(&ratios, Sector::General, &NormSet::bceao());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ComplianceStatus::Good);
        assert!(results[0].is_compliant);
        assert!(results[0].recommendation.is_none());
    }

    #[test]
    fn test_results_sorted_critical_first() {
        let ratios = FinancialRatios::new()
            .with(RatioKey::Roe, dec!(30))
            .with(RatioKey::Endettement, dec!(120))
            .with(RatioKey::MargeNette, dec!(4.5))
            .with(RatioKey::WorkingCapital, dec!(1000));
        let results = check_compliance(&ratios, Sector::General, &NormSet::bceao());
        let order: Vec<_> = results.iter().map(|r| (r.ratio, r.status)).collect();
        assert_eq!(
            order,
            vec![
                (RatioKey::Endettement, ComplianceStatus::Critical),
                (RatioKey::MargeNette, ComplianceStatus::Acceptable),
                (RatioKey::Roe, ComplianceStatus::Excellent),
            ]
        );
        assert!(results[0]
            .recommendation
            .as_deref()
            .is_some_and(|r| r.starts_with("Action urgente")));
    }

    #[test]
    fn test_sector_norms_apply() {
        let ratios = FinancialRatios::new().with(RatioKey::MargeNette, dec!(3));
        let general = check_compliance(&ratios, Sector::General, &NormSet::bceao());
        let commerce = check_compliance(&ratios, Sector::Commerce, &NormSet::bceao());
        assert_eq!(general[0].status, ComplianceStatus::Poor);
        assert_eq!(commerce[0].status, ComplianceStatus::Good);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ComplianceStatus::Acceptable).unwrap(),
            "\"acceptable\""
        );
    }
}
