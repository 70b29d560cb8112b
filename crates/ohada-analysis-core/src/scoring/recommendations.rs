use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{Category, Priority};
use crate::ratios::{FinancialRatios, RatioKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: Category,
    pub title: String,
    pub description: String,
    pub actions: Vec<String>,
}

/// Threshold rule on the latest level of one ratio.
struct Rule {
    ratio: RatioKey,
    breached: fn(Decimal) -> bool,
    priority: Priority,
    category: Category,
    title: &'static str,
    description: &'static str,
    actions: &'static [&'static str],
}

const RULES: &[Rule] = &[
    Rule {
        ratio: RatioKey::LiquiditeGenerale,
        breached: |v| v < dec!(1.0),
        priority: Priority::High,
        category: Category::Liquidity,
        title: "Restaurer l'équilibre de trésorerie",
        description: "Les actifs à court terme ne couvrent pas les dettes à court terme.",
        actions: &[
            "Négocier un allongement des délais fournisseurs",
            "Accélérer le recouvrement des créances clients",
            "Consolider une partie des dettes court terme en dette moyen terme",
        ],
    },
    Rule {
        ratio: RatioKey::LiquiditeGenerale,
        breached: |v| v >= dec!(1.0) && v < dec!(1.5),
        priority: Priority::Medium,
        category: Category::Liquidity,
        title: "Améliorer la marge de liquidité",
        description: "La couverture des dettes court terme reste étroite.",
        actions: &[
            "Optimiser la rotation des stocks",
            "Mettre en place un suivi de trésorerie prévisionnelle",
        ],
    },
    Rule {
        ratio: RatioKey::Endettement,
        breached: |v| v > dec!(70),
        priority: Priority::High,
        category: Category::Solvency,
        title: "Réduire l'endettement",
        description: "Les dettes dépassent 70 % du total de l'actif.",
        actions: &[
            "Prioriser le remboursement des dettes les plus coûteuses",
            "Céder les actifs non stratégiques",
        ],
    },
    Rule {
        ratio: RatioKey::AutonomieFinanciere,
        breached: |v| v < dec!(20),
        priority: Priority::High,
        category: Category::Solvency,
        title: "Renforcer les fonds propres",
        description: "Les capitaux propres représentent moins de 20 % du total de l'actif.",
        actions: &[
            "Mettre en réserve les bénéfices",
            "Envisager une augmentation de capital",
        ],
    },
    Rule {
        ratio: RatioKey::CapaciteRemboursement,
        breached: |v| v > dec!(4),
        priority: Priority::High,
        category: Category::Solvency,
        title: "Alléger la charge de la dette financière",
        description: "Plus de quatre années d'autofinancement sont nécessaires pour rembourser la dette financière.",
        actions: &[
            "Rééchelonner la dette financière",
            "Accroître la capacité d'autofinancement",
        ],
    },
    Rule {
        ratio: RatioKey::Roe,
        breached: |v| v < dec!(5),
        priority: Priority::Medium,
        category: Category::Profitability,
        title: "Améliorer la rentabilité des capitaux propres",
        description: "Le rendement des capitaux propres est inférieur à 5 %.",
        actions: &[
            "Identifier les activités les moins rentables",
            "Réduire les charges de structure",
        ],
    },
    Rule {
        ratio: RatioKey::MargeNette,
        breached: |v| v < dec!(3),
        priority: Priority::Medium,
        category: Category::Profitability,
        title: "Restaurer les marges",
        description: "La marge nette est inférieure à 3 % du chiffre d'affaires.",
        actions: &[
            "Revoir la politique de prix",
            "Renégocier les achats et les contrats de sous-traitance",
        ],
    },
    Rule {
        ratio: RatioKey::RotationActif,
        breached: |v| v < dec!(0.5),
        priority: Priority::Low,
        category: Category::Efficiency,
        title: "Optimiser l'utilisation des actifs",
        description: "Le chiffre d'affaires représente moins de la moitié du total de l'actif.",
        actions: &[
            "Identifier les immobilisations sous-utilisées",
            "Développer les ventes sur les capacités existantes",
        ],
    },
];

/// Action list from the latest ratio levels, highest priority first.
pub fn generate_recommendations(ratios: &FinancialRatios) -> Vec<Recommendation> {
    let mut out: Vec<Recommendation> = RULES
        .iter()
        .filter(|rule| ratios.get(rule.ratio).is_some_and(rule.breached))
        .map(|rule| Recommendation {
            priority: rule.priority,
            category: rule.category,
            title: rule.title.to_string(),
            description: rule.description.to_string(),
            actions: rule.actions.iter().map(|a| a.to_string()).collect(),
        })
        .collect();
    out.sort_by_key(|r| r.priority);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_healthy_ratios_need_no_action() {
        let ratios = FinancialRatios::new()
            .with(RatioKey::LiquiditeGenerale, dec!(2))
            .with(RatioKey::Endettement, dec!(40))
            .with(RatioKey::Roe, dec!(15));
        assert!(generate_recommendations(&ratios).is_empty());
        assert!(generate_recommendations(&FinancialRatios::new()).is_empty());
    }

    #[test]
    fn test_sorted_by_priority() {
        let ratios = FinancialRatios::new()
            .with(RatioKey::RotationActif, dec!(0.3))
            .with(RatioKey::Roe, dec!(2))
            .with(RatioKey::LiquiditeGenerale, dec!(0.8))
            .with(RatioKey::Endettement, dec!(85));
        let priorities: Vec<_> = generate_recommendations(&ratios)
            .iter()
            .map(|r| (r.priority, r.category))
            .collect();
        assert_eq!(
            priorities,
            vec![
                (Priority::High, Category::Liquidity),
                (Priority::High, Category::Solvency),
                (Priority::Medium, Category::Profitability),
                (Priority::Low, Category::Efficiency),
            ]
        );
    }

    #[test]
    fn test_liquidity_bands_exclusive() {
        let medium = FinancialRatios::new().with(RatioKey::LiquiditeGenerale, dec!(1.2));
        let recs = generate_recommendations(&medium);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::Medium);
        assert!(!recs[0].actions.is_empty());
    }
}
