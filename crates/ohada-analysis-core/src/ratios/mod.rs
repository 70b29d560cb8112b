//! Financial ratios.

pub mod engine;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::Ratio;

pub use engine::{calculate_all, calculate_ratios};

keyed_enum! {
    /// A computed ratio. Percent ratios are expressed in percent units.
    pub enum RatioKey ("ratio") {
        // -- Liquidity ------------------------------------------------------------
        LiquiditeGenerale => "ratio_liquidite_generale",
        LiquiditeImmediate => "ratio_liquidite_immediate",
        // -- Structure ------------------------------------------------------------
        AutonomieFinanciere => "ratio_autonomie_financiere",
        Endettement => "ratio_endettement",
        CouvertureDettes => "ratio_couverture_dettes",
        FinancementStable => "ratio_financement_stable",
        CapaciteRemboursement => "capacite_remboursement",
        // -- Profitability --------------------------------------------------------
        Roe => "roe",
        Roa => "roa",
        MargeNette => "marge_nette",
        MargeBrute => "marge_brute",
        MargeEbe => "marge_ebe",
        TauxValeurAjoutee => "taux_valeur_ajoutee",
        // -- Activity -------------------------------------------------------------
        RotationActif => "rotation_actif",
        RotationStocks => "rotation_stocks",
        WorkingCapital => "working_capital",
    }
}

impl RatioKey {
    /// French display label.
    pub fn label(self) -> &'static str {
        match self {
            RatioKey::LiquiditeGenerale => "Liquidité générale",
            RatioKey::LiquiditeImmediate => "Liquidité immédiate",
            RatioKey::AutonomieFinanciere => "Autonomie financière",
            RatioKey::Endettement => "Endettement",
            RatioKey::CouvertureDettes => "Couverture des dettes",
            RatioKey::FinancementStable => "Financement stable",
            RatioKey::CapaciteRemboursement => "Capacité de remboursement",
            RatioKey::Roe => "Rentabilité des capitaux propres (ROE)",
            RatioKey::Roa => "Rentabilité des actifs (ROA)",
            RatioKey::MargeNette => "Marge nette",
            RatioKey::MargeBrute => "Marge brute",
            RatioKey::MargeEbe => "Marge d'EBE",
            RatioKey::TauxValeurAjoutee => "Taux de valeur ajoutée",
            RatioKey::RotationActif => "Rotation de l'actif",
            RatioKey::RotationStocks => "Rotation des stocks",
            RatioKey::WorkingCapital => "Fonds de roulement",
        }
    }

    /// True for ratios expressed in percent.
    pub fn is_percent(self) -> bool {
        matches!(
            self,
            RatioKey::AutonomieFinanciere
                | RatioKey::Endettement
                | RatioKey::Roe
                | RatioKey::Roa
                | RatioKey::MargeNette
                | RatioKey::MargeBrute
                | RatioKey::MargeEbe
                | RatioKey::TauxValeurAjoutee
        )
    }
}

/// Ratios of one period. A ratio whose inputs were missing, or whose divisor
/// was zero, is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinancialRatios(BTreeMap<RatioKey, Ratio>);

impl FinancialRatios {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: RatioKey) -> Option<Ratio> {
        self.0.get(&key).copied()
    }

    pub fn set(&mut self, key: RatioKey, value: Ratio) {
        self.0.insert(key, value);
    }

    pub fn with(mut self, key: RatioKey, value: Ratio) -> Self {
        self.0.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RatioKey, Ratio)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(RatioKey, Ratio)> for FinancialRatios {
    fn from_iter<I: IntoIterator<Item = (RatioKey, Ratio)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ratio_keys_parse() {
        assert_eq!("roe".parse::<RatioKey>().unwrap(), RatioKey::Roe);
        assert_eq!(
            "ratio_liquidite_generale".parse::<RatioKey>().unwrap(),
            RatioKey::LiquiditeGenerale
        );
        assert!("ratio_liquidite".parse::<RatioKey>().is_err());
    }

    #[test]
    fn test_ratios_serialize_by_identifier() {
        let ratios = FinancialRatios::new().with(RatioKey::MargeNette, dec!(12.5));
        let json = serde_json::to_value(&ratios).unwrap();
        assert_eq!(json["marge_nette"], "12.5");
    }
}
