use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::compliance::norms::{Bound, NormSet, NormTable, Sector};
use crate::ratios::{FinancialRatios, RatioKey};
use crate::types::to_score;

/// Points granted to the trend pool regardless of history. Multi-year trend
/// scoring is not ratio-driven yet; this keeps the pool at 12 of 15.
pub const TREND_PLACEHOLDER_POINTS: Decimal = dec!(12);

const TREND_POOL: Decimal = dec!(15);
const TOTAL_POOL: Decimal = dec!(140);

/// Scored ratios per category, with the points each is worth.
const LIQUIDITY: [(RatioKey, Decimal); 2] = [
    (RatioKey::LiquiditeGenerale, dec!(20)),
    (RatioKey::LiquiditeImmediate, dec!(20)),
];
const LEVERAGE: [(RatioKey, Decimal); 2] = [
    (RatioKey::AutonomieFinanciere, dec!(20)),
    (RatioKey::Endettement, dec!(20)),
];
const PROFITABILITY: [(RatioKey, Decimal); 3] = [
    (RatioKey::Roe, dec!(10)),
    (RatioKey::Roa, dec!(10)),
    (RatioKey::MargeNette, dec!(10)),
];
const EFFICIENCY: [(RatioKey, Decimal); 1] = [(RatioKey::RotationActif, dec!(15))];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(overall: u32) -> Self {
        if overall >= 80 {
            RiskLevel::Low
        } else if overall >= 60 {
            RiskLevel::Medium
        } else if overall >= 40 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Composite score. Every component is an integer in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisScore {
    pub overall: u32,
    pub profitability: u32,
    pub liquidity: u32,
    pub leverage: u32,
    pub efficiency: u32,
    pub trend: u32,
    pub risk_level: RiskLevel,
}

/// Score a period's ratios against the sector's effective norms.
///
/// A missing ratio earns nothing but keeps its weight in the pool, so
/// incomplete data lowers the score instead of zeroing a category.
pub fn calculate_score(ratios: &FinancialRatios, sector: Sector, norms: &NormSet) -> AnalysisScore {
    let table = norms.effective(sector);

    let liquidity = pool_points(&LIQUIDITY, ratios, &table);
    let leverage = pool_points(&LEVERAGE, ratios, &table);
    let profitability = pool_points(&PROFITABILITY, ratios, &table);
    let efficiency = pool_points(&EFFICIENCY, ratios, &table);
    let trend = TREND_PLACEHOLDER_POINTS;

    let total = liquidity.0 + leverage.0 + profitability.0 + efficiency.0 + trend;
    let overall = to_score(total / TOTAL_POOL * dec!(100));

    log::debug!(
        "score: liquidity {}/{}, leverage {}/{}, profitability {}/{}, efficiency {}/{}, trend {trend}/{TREND_POOL}",
        liquidity.0, liquidity.1, leverage.0, leverage.1,
        profitability.0, profitability.1, efficiency.0, efficiency.1,
    );

    AnalysisScore {
        overall,
        profitability: category_score(profitability),
        liquidity: category_score(liquidity),
        leverage: category_score(leverage),
        efficiency: category_score(efficiency),
        trend: category_score((trend, TREND_POOL)),
        risk_level: RiskLevel::from_score(overall),
    }
}

/// `(earned, pool)` for one category.
fn pool_points(
    weights: &[(RatioKey, Decimal)],
    ratios: &FinancialRatios,
    table: &NormTable,
) -> (Decimal, Decimal) {
    weights.iter().fold((Decimal::ZERO, Decimal::ZERO), |(earned, pool), (key, weight)| {
        let points = ratios
            .get(*key)
            .zip(table.get(key))
            .and_then(|(value, norm)| {
                let optimal = norm.optimal_or_default()?;
                Some(*weight * share(value, norm.bound()?, optimal))
            })
            .unwrap_or(Decimal::ZERO);
        (earned + points, pool + weight)
    })
}

/// Fraction of a ratio's points earned: full at optimal, 70% within the
/// norm, 40% within a 30% tolerance band, nothing beyond.
fn share(value: Decimal, bound: Bound, optimal: Decimal) -> Decimal {
    match bound {
        Bound::Min(min) => {
            if value >= optimal {
                Decimal::ONE
            } else if value >= min {
                dec!(0.7)
            } else if value >= min.saturating_mul(dec!(0.7)) {
                dec!(0.4)
            } else {
                Decimal::ZERO
            }
        }
        Bound::Max(max) => {
            if value <= optimal {
                Decimal::ONE
            } else if value <= max {
                dec!(0.7)
            } else if value <= max.saturating_mul(dec!(1.3)) {
                dec!(0.4)
            } else {
                Decimal::ZERO
            }
        }
    }
}

fn category_score((earned, pool): (Decimal, Decimal)) -> u32 {
    if pool.is_zero() {
        return 0;
    }
    to_score(earned / pool * dec!(100))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn score(ratios: &FinancialRatios) -> AnalysisScore {
        calculate_score(ratios, Sector::General, &NormSet::bceao())
    }

    #[test]
    fn test_empty_ratios_score_trend_only() {
        let s = score(&FinancialRatios::new());
        // 12 / 140 = 8.57%
        assert_eq!(s.overall, 9);
        assert_eq!(s.trend, 80);
        assert_eq!(s.liquidity, 0);
        assert_eq!(s.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn test_all_optimal_reaches_overall_cap() {
        let ratios = FinancialRatios::new()
            .with(RatioKey::LiquiditeGenerale, dec!(2.5))
            .with(RatioKey::LiquiditeImmediate, dec!(0.6))
            .with(RatioKey::AutonomieFinanciere, dec!(45))
            .with(RatioKey::Endettement, dec!(40))
            .with(RatioKey::Roe, dec!(20))
            .with(RatioKey::Roa, dec!(9))
            .with(RatioKey::MargeNette, dec!(11))
            .with(RatioKey::RotationActif, dec!(1.6));
        let s = score(&ratios);
        // (125 + 12) / 140 = 97.86%
        assert_eq!(s.overall, 98);
        assert_eq!(s.liquidity, 100);
        assert_eq!(s.leverage, 100);
        assert_eq!(s.profitability, 100);
        assert_eq!(s.efficiency, 100);
        assert_eq!(s.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_partial_points() {
        let ratios = FinancialRatios::new()
            .with(RatioKey::LiquiditeGenerale, dec!(1.2))
            .with(RatioKey::LiquiditeImmediate, dec!(0.25))
            .with(RatioKey::Endettement, dec!(80))
            .with(RatioKey::RotationActif, dec!(0.1));
        let s = score(&ratios);
        // liquidity 14 + 8, leverage 8, efficiency 0, trend 12 => 42 / 140
        assert_eq!(s.liquidity, 55);
        assert_eq!(s.leverage, 20);
        assert_eq!(s.efficiency, 0);
        assert_eq!(s.overall, 30);
        assert_eq!(s.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn test_missing_ratio_keeps_pool_weight() {
        let ratios = FinancialRatios::new().with(RatioKey::Roe, dec!(16));
        assert_eq!(score(&ratios).profitability, 33);
    }

    #[test]
    fn test_overall_bounded_for_extreme_values() {
        for v in [Decimal::MIN, dec!(-1000), Decimal::ZERO, dec!(100000000000000000000), Decimal::MAX] {
            let ratios: FinancialRatios = RatioKey::ALL.iter().map(|k| (*k, v)).collect();
            let s = score(&ratios);
            assert!(s.overall <= 100);
            assert!(s.profitability <= 100 && s.liquidity <= 100);
        }
    }

    #[test]
    fn test_risk_level_boundaries() {
        assert_eq!(RiskLevel::from_score(80), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(79), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(60), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(59), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(39), RiskLevel::Critical);
    }
}
