//! Composite score, trend insights and action recommendations.

pub mod aggregator;
pub mod insights;
pub mod recommendations;

use serde::{Deserialize, Serialize};

pub use aggregator::{calculate_score, AnalysisScore, RiskLevel, TREND_PLACEHOLDER_POINTS};
pub use insights::{generate_insights, Insight, InsightKind};
pub use recommendations::{generate_recommendations, Recommendation};

/// Analysis area an insight or recommendation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Liquidity,
    Solvency,
    Profitability,
    Efficiency,
}

/// Shared by insight impact and recommendation priority. Sorts `High` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}
