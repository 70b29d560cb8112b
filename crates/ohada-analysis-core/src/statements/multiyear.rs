use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::fields::FinancialData;
use crate::error::OhadaError;
use crate::ratios::FinancialRatios;
use crate::OhadaResult;

// ---------------------------------------------------------------------------
// Relative year key
// ---------------------------------------------------------------------------

/// Relative fiscal year label: `N` is the reference year, `N-k` is k years
/// before it. Orders most recent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearKey(u32);

impl YearKey {
    pub const CURRENT: YearKey = YearKey(0);
    pub const PRIOR: YearKey = YearKey(1);

    pub fn new(offset: u32) -> Self {
        YearKey(offset)
    }

    pub fn offset(self) -> u32 {
        self.0
    }

    /// Calendar year this key denotes for a given reference year.
    pub fn year_for(self, reference_year: i32) -> i32 {
        reference_year.saturating_sub(i32::try_from(self.0).unwrap_or(i32::MAX))
    }
}

impl fmt::Display for YearKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => f.write_str("N"),
            k => write!(f, "N-{k}"),
        }
    }
}

impl FromStr for YearKey {
    type Err = OhadaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "N" {
            return Ok(YearKey::CURRENT);
        }
        trimmed
            .strip_prefix("N-")
            .and_then(|k| k.parse::<u32>().ok())
            .filter(|k| *k > 0)
            .map(YearKey)
            .ok_or_else(|| OhadaError::InvalidYearKey(s.to_string()))
    }
}

impl Serialize for YearKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Year record
// ---------------------------------------------------------------------------

/// One fiscal period's complete statement set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: i32,
    pub data: FinancialData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratios: Option<FinancialRatios>,
}

impl YearRecord {
    pub fn new(year: i32, data: FinancialData) -> Self {
        Self {
            year,
            data,
            ratios: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Multi-year container
// ---------------------------------------------------------------------------

/// Relative year key → period record.
///
/// Insertions are validated: a calendar year appears under at most one key,
/// and years strictly decrease as the key offset grows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MultiyearData(BTreeMap<YearKey, YearRecord>);

impl MultiyearData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, rejecting duplicate or non-monotonic year mappings.
    /// Replacing the record already stored under `key` is allowed.
    pub fn insert(&mut self, key: YearKey, record: YearRecord) -> OhadaResult<()> {
        for (other_key, other) in self.0.iter().filter(|(k, _)| **k != key) {
            if other.year == record.year {
                return Err(OhadaError::InvalidYearMapping(format!(
                    "year {} already mapped to {other_key}, cannot map it to {key}",
                    record.year
                )));
            }
            let ordered = if *other_key < key {
                other.year > record.year
            } else {
                other.year < record.year
            };
            if !ordered {
                return Err(OhadaError::InvalidYearMapping(format!(
                    "{key} ({}) must be older than {} and newer than {}",
                    record.year,
                    self.newer_than(key).map_or("-".into(), |k| k.to_string()),
                    self.older_than(key).map_or("-".into(), |k| k.to_string()),
                )));
            }
        }
        self.0.insert(key, record);
        Ok(())
    }

    /// Fetch or create the record for `key`, deriving its year from the
    /// reference year.
    pub fn entry(&mut self, key: YearKey, reference_year: i32) -> OhadaResult<&mut YearRecord> {
        if !self.0.contains_key(&key) {
            self.insert(
                key,
                YearRecord::new(key.year_for(reference_year), FinancialData::new()),
            )?;
        }
        self.0
            .get_mut(&key)
            .ok_or_else(|| OhadaError::InvalidYearKey(key.to_string()))
    }

    pub fn get(&self, key: YearKey) -> Option<&YearRecord> {
        self.0.get(&key)
    }

    pub fn get_mut(&mut self, key: YearKey) -> Option<&mut YearRecord> {
        self.0.get_mut(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of field values across all years.
    pub fn field_count(&self) -> usize {
        self.0.values().map(|r| r.data.len()).sum()
    }

    /// Records ordered most recent first.
    pub fn iter(&self) -> impl Iterator<Item = (YearKey, &YearRecord)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = YearKey> + '_ {
        self.0.keys().copied()
    }

    /// The most recent period present (`N` when it exists).
    pub fn latest(&self) -> Option<(YearKey, &YearRecord)> {
        self.iter().next()
    }

    /// Apply a transform to every record's data, keeping keys and years.
    pub fn map_data(&self, f: impl Fn(&FinancialData) -> FinancialData) -> MultiyearData {
        MultiyearData(
            self.0
                .iter()
                .map(|(k, r)| {
                    (
                        *k,
                        YearRecord {
                            year: r.year,
                            data: f(&r.data),
                            ratios: None,
                        },
                    )
                })
                .collect(),
        )
    }

    fn newer_than(&self, key: YearKey) -> Option<YearKey> {
        self.0.range(..key).next_back().map(|(k, _)| *k)
    }

    fn older_than(&self, key: YearKey) -> Option<YearKey> {
        self.0
            .range(key..)
            .find(|(k, _)| **k != key)
            .map(|(k, _)| *k)
    }
}

impl<'de> Deserialize<'de> for MultiyearData {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<YearKey, YearRecord>::deserialize(deserializer)?;
        let mut data = MultiyearData::new();
        for (key, record) in raw {
            data.insert(key, record).map_err(serde::de::Error::custom)?;
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statements::FieldKey;
    use rust_decimal_macros::dec;

    fn record(year: i32) -> YearRecord {
        YearRecord::new(year, FinancialData::new())
    }

    #[test]
    fn test_year_key_display_and_parse() {
        assert_eq!(YearKey::CURRENT.to_string(), "N");
        assert_eq!(YearKey::new(2).to_string(), "N-2");
        assert_eq!("N-1".parse::<YearKey>().unwrap(), YearKey::PRIOR);
        assert!("N-0".parse::<YearKey>().is_err());
        assert!("N+1".parse::<YearKey>().is_err());
        assert!("2024".parse::<YearKey>().is_err());
    }

    #[test]
    fn test_year_keys_sort_most_recent_first() {
        let mut keys = vec![YearKey::new(2), YearKey::CURRENT, YearKey::PRIOR];
        keys.sort();
        assert_eq!(keys, vec![YearKey::CURRENT, YearKey::PRIOR, YearKey::new(2)]);
    }

    #[test]
    fn test_duplicate_year_rejected() {
        let mut data = MultiyearData::new();
        data.insert(YearKey::CURRENT, record(2024)).unwrap();
        let err = data.insert(YearKey::PRIOR, record(2024)).unwrap_err();
        assert!(matches!(err, OhadaError::InvalidYearMapping(_)));
    }

    #[test]
    fn test_non_monotonic_year_rejected() {
        let mut data = MultiyearData::new();
        data.insert(YearKey::CURRENT, record(2024)).unwrap();
        assert!(data.insert(YearKey::PRIOR, record(2025)).is_err());
        assert!(data.insert(YearKey::PRIOR, record(2023)).is_ok());
        assert!(data.insert(YearKey::new(2), record(2023)).is_err());
    }

    #[test]
    fn test_replacing_same_key_allowed() {
        let mut data = MultiyearData::new();
        data.insert(YearKey::CURRENT, record(2024)).unwrap();
        let mut updated = record(2024);
        updated.data.set(FieldKey::TotalActif, dec!(1));
        data.insert(YearKey::CURRENT, updated).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(
            data.get(YearKey::CURRENT).unwrap().data.get(FieldKey::TotalActif),
            Some(dec!(1))
        );
    }

    #[test]
    fn test_entry_derives_year_from_reference() {
        let mut data = MultiyearData::new();
        data.entry(YearKey::PRIOR, 2024).unwrap();
        data.entry(YearKey::CURRENT, 2024).unwrap();
        let years: Vec<(String, i32)> = data.iter().map(|(k, r)| (k.to_string(), r.year)).collect();
        assert_eq!(years, vec![("N".to_string(), 2024), ("N-1".to_string(), 2023)]);
    }

    #[test]
    fn test_deserialize_validates_mapping() {
        let ok = r#"{"N": {"year": 2024, "data": {}}, "N-1": {"year": 2023, "data": {}}}"#;
        assert!(serde_json::from_str::<MultiyearData>(ok).is_ok());

        let dup = r#"{"N": {"year": 2024, "data": {}}, "N-1": {"year": 2024, "data": {}}}"#;
        assert!(serde_json::from_str::<MultiyearData>(dup).is_err());
    }
}
