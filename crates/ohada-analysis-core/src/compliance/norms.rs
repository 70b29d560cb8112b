use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::error::OhadaError;
use crate::ratios::RatioKey;
use crate::OhadaResult;

// ---------------------------------------------------------------------------
// Norm entries
// ---------------------------------------------------------------------------

/// Acceptable range for one ratio.
///
/// A norm with `min` is higher-is-better; a norm with only `max` is
/// lower-is-better. `optimal` marks the excellence threshold in either case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal: Option<Decimal>,
}

/// Which side of a norm is favourable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Higher is better, floor `min`.
    Min(Decimal),
    /// Lower is better, ceiling `max`.
    Max(Decimal),
}

impl NormEntry {
    pub const fn at_least(min: Decimal, optimal: Decimal) -> Self {
        Self {
            min: Some(min),
            max: None,
            optimal: Some(optimal),
        }
    }

    pub const fn at_most(max: Decimal, optimal: Decimal) -> Self {
        Self {
            min: None,
            max: Some(max),
            optimal: Some(optimal),
        }
    }

    /// `None` for a norm carrying neither bound.
    pub fn bound(&self) -> Option<Bound> {
        match (self.min, self.max) {
            (Some(min), _) => Some(Bound::Min(min)),
            (None, Some(max)) => Some(Bound::Max(max)),
            (None, None) => None,
        }
    }

    /// Excellence threshold, defaulting to `min × 1.5` or `max × 0.7`.
    pub fn optimal_or_default(&self) -> Option<Decimal> {
        self.optimal.or_else(|| match self.bound()? {
            Bound::Min(min) => Some(min.saturating_mul(dec!(1.5))),
            Bound::Max(max) => Some(max.saturating_mul(dec!(0.7))),
        })
    }

    /// Reject ranges that cannot classify anything: `min > max`, or an
    /// optimal on the unfavourable side of its bound.
    pub fn validate(&self, ratio: RatioKey) -> OhadaResult<()> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(OhadaError::Config(format!(
                    "{ratio}: min {min} is above max {max}"
                )));
            }
        }
        match (self.bound(), self.optimal) {
            (Some(Bound::Min(min)), Some(optimal)) if optimal < min => Err(OhadaError::Config(
                format!("{ratio}: optimal {optimal} is below min {min}"),
            )),
            (Some(Bound::Max(max)), Some(optimal)) if optimal > max => Err(OhadaError::Config(
                format!("{ratio}: optimal {optimal} is above max {max}"),
            )),
            _ => Ok(()),
        }
    }

    /// Field-by-field override: every field set in `other` wins.
    pub fn overlay(&self, other: &NormEntry) -> NormEntry {
        NormEntry {
            min: other.min.or(self.min),
            max: other.max.or(self.max),
            optimal: other.optimal.or(self.optimal),
        }
    }
}

impl fmt::Display for NormEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(min) = self.min {
            parts.push(format!("min {min}"));
        }
        if let Some(max) = self.max {
            parts.push(format!("max {max}"));
        }
        if let Some(optimal) = self.optimal {
            parts.push(format!("optimal {optimal}"));
        }
        f.write_str(&parts.join(", "))
    }
}

pub type NormTable = BTreeMap<RatioKey, NormEntry>;

// ---------------------------------------------------------------------------
// Sectors
// ---------------------------------------------------------------------------

/// Activity sector selecting a norm override table. Unrecognised names are
/// treated as [`Sector::General`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sector {
    #[default]
    General,
    Industrie,
    Commerce,
    Services,
    Agriculture,
    Btp,
    Transport,
}

impl Sector {
    pub const ALL: [Sector; 7] = [
        Sector::General,
        Sector::Industrie,
        Sector::Commerce,
        Sector::Services,
        Sector::Agriculture,
        Sector::Btp,
        Sector::Transport,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Sector::General => "general",
            Sector::Industrie => "industrie",
            Sector::Commerce => "commerce",
            Sector::Services => "services",
            Sector::Agriculture => "agriculture",
            Sector::Btp => "btp",
            Sector::Transport => "transport",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Ok(Sector::ALL
            .into_iter()
            .find(|sector| sector.as_str() == name)
            .unwrap_or_else(|| {
                log::debug!("unknown sector \"{s}\", using general norms");
                Sector::General
            }))
    }
}

impl From<&str> for Sector {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(sector) => sector,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Sector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Sector::from(raw.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Norm set
// ---------------------------------------------------------------------------

/// Baseline norms plus per-sector overrides. Built once and passed to the
/// scoring functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormSet {
    #[serde(default)]
    pub baseline: NormTable,
    #[serde(default)]
    pub sectors: BTreeMap<Sector, NormTable>,
}

impl Default for NormSet {
    fn default() -> Self {
        Self::bceao()
    }
}

impl NormSet {
    /// Built-in BCEAO prudential norms and sector adjustments.
    pub fn bceao() -> Self {
        use RatioKey::*;

        let baseline = NormTable::from([
            (LiquiditeGenerale, NormEntry::at_least(dec!(1.2), dec!(2.0))),
            (LiquiditeImmediate, NormEntry::at_least(dec!(0.3), dec!(0.5))),
            (AutonomieFinanciere, NormEntry::at_least(dec!(20), dec!(40))),
            (Endettement, NormEntry::at_most(dec!(70), dec!(50))),
            (CouvertureDettes, NormEntry::at_least(dec!(0.2), dec!(0.4))),
            (Roe, NormEntry::at_least(dec!(10), dec!(15))),
            (Roa, NormEntry::at_least(dec!(5), dec!(8))),
            (MargeNette, NormEntry::at_least(dec!(5), dec!(10))),
            (MargeEbe, NormEntry::at_least(dec!(10), dec!(20))),
            (RotationActif, NormEntry::at_least(dec!(0.8), dec!(1.5))),
            (FinancementStable, NormEntry::at_least(dec!(1.0), dec!(1.2))),
            (TauxValeurAjoutee, NormEntry::at_least(dec!(20), dec!(35))),
            (CapaciteRemboursement, NormEntry::at_most(dec!(4), dec!(2))),
        ]);

        let sectors = BTreeMap::from([
            (
                Sector::Industrie,
                NormTable::from([
                    (FinancementStable, NormEntry::at_least(dec!(1.2), dec!(1.5))),
                    (RotationActif, NormEntry::at_least(dec!(0.6), dec!(1.0))),
                    (MargeEbe, NormEntry::at_least(dec!(12), dec!(20))),
                    (TauxValeurAjoutee, NormEntry::at_least(dec!(25), dec!(40))),
                ]),
            ),
            (
                Sector::Commerce,
                NormTable::from([
                    (LiquiditeGenerale, NormEntry::at_least(dec!(1.1), dec!(1.5))),
                    (MargeNette, NormEntry::at_least(dec!(2), dec!(5))),
                    (MargeBrute, NormEntry::at_least(dec!(15), dec!(25))),
                    (RotationActif, NormEntry::at_least(dec!(1.5), dec!(2.5))),
                    (TauxValeurAjoutee, NormEntry::at_least(dec!(10), dec!(20))),
                ]),
            ),
            (
                Sector::Services,
                NormTable::from([
                    (LiquiditeGenerale, NormEntry::at_least(dec!(1.0), dec!(1.5))),
                    (MargeNette, NormEntry::at_least(dec!(8), dec!(15))),
                    (RotationActif, NormEntry::at_least(dec!(1.0), dec!(1.8))),
                    (TauxValeurAjoutee, NormEntry::at_least(dec!(40), dec!(60))),
                ]),
            ),
            (
                Sector::Agriculture,
                NormTable::from([
                    (LiquiditeGenerale, NormEntry::at_least(dec!(1.3), dec!(2.2))),
                    (AutonomieFinanciere, NormEntry::at_least(dec!(30), dec!(50))),
                    (MargeNette, NormEntry::at_least(dec!(3), dec!(8))),
                    (RotationActif, NormEntry::at_least(dec!(0.4), dec!(0.8))),
                ]),
            ),
            (
                Sector::Btp,
                NormTable::from([
                    (LiquiditeGenerale, NormEntry::at_least(dec!(1.1), dec!(1.6))),
                    (Endettement, NormEntry::at_most(dec!(75), dec!(55))),
                    (MargeNette, NormEntry::at_least(dec!(3), dec!(6))),
                    (RotationActif, NormEntry::at_least(dec!(1.0), dec!(1.5))),
                ]),
            ),
            (
                Sector::Transport,
                NormTable::from([
                    (Endettement, NormEntry::at_most(dec!(75), dec!(55))),
                    (FinancementStable, NormEntry::at_least(dec!(1.1), dec!(1.3))),
                    (MargeEbe, NormEntry::at_least(dec!(15), dec!(25))),
                    (RotationActif, NormEntry::at_least(dec!(0.6), dec!(1.0))),
                ]),
            ),
        ]);

        Self { baseline, sectors }
    }

    /// Baseline overridden field by field with the sector's entries.
    pub fn effective(&self, sector: Sector) -> NormTable {
        let mut table = self.baseline.clone();
        if sector == Sector::General {
            return table;
        }
        if let Some(overrides) = self.sectors.get(&sector) {
            for (ratio, entry) in overrides {
                let merged = table.get(ratio).copied().unwrap_or_default().overlay(entry);
                table.insert(*ratio, merged);
            }
        }
        table
    }

    /// Effective norm for a single ratio.
    pub fn norm(&self, sector: Sector, ratio: RatioKey) -> Option<NormEntry> {
        let base = self.baseline.get(&ratio).copied();
        let sectoral = (sector != Sector::General)
            .then(|| self.sectors.get(&sector).and_then(|t| t.get(&ratio)).copied())
            .flatten();
        match (base, sectoral) {
            (Some(b), Some(s)) => Some(b.overlay(&s)),
            (b, s) => s.or(b),
        }
    }

    /// Merge an override set over this one, field by field, at both the
    /// baseline and the sector level.
    pub fn merged_with(&self, overrides: &NormSet) -> NormSet {
        let mut merged = self.clone();
        overlay_table(&mut merged.baseline, &overrides.baseline);
        for (sector, table) in &overrides.sectors {
            overlay_table(merged.sectors.entry(*sector).or_default(), table);
        }
        merged
    }

    /// Validate the baseline and every effective sector table.
    pub fn validate(&self) -> OhadaResult<()> {
        for (ratio, entry) in &self.baseline {
            entry.validate(*ratio)?;
        }
        for sector in self.sectors.keys() {
            for (ratio, entry) in &self.effective(*sector) {
                entry
                    .validate(*ratio)
                    .map_err(|e| match e {
                        OhadaError::Config(msg) => OhadaError::Config(format!("{sector}: {msg}")),
                        other => other,
                    })?;
            }
        }
        Ok(())
    }
}

fn overlay_table(target: &mut NormTable, overrides: &NormTable) {
    for (ratio, entry) in overrides {
        let merged = target.get(ratio).copied().unwrap_or_default().overlay(entry);
        target.insert(*ratio, merged);
    }
}
