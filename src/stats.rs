// Stat store: the five persona stats and the JSON file they live in.
//
// The record keeps the file's own key order and any keys we don't know
// about, so a save after a load only changes the values we touched.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// The closed set of stats the tool tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Knowledge,
    Charm,
    Guts,
    Health,
    Kindness,
}

impl Stat {
    /// Canonical order, used for defaults and for appending missing keys.
    pub const ALL: [Stat; 5] = [
        Stat::Knowledge,
        Stat::Charm,
        Stat::Guts,
        Stat::Health,
        Stat::Kindness,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stat::Knowledge => "Knowledge",
            Stat::Charm => "Charm",
            Stat::Guts => "Guts",
            Stat::Health => "Health",
            Stat::Kindness => "Kindness",
        }
    }

    /// Exact, case-sensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Stat> {
        Stat::ALL.iter().copied().find(|s| s.name() == name)
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered mapping of stat names to values. All five canonical stats are
/// always present; extra keys from disk ride along untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatRecord {
    entries: Map<String, Value>,
}

impl Default for StatRecord {
    fn default() -> Self {
        let mut entries = Map::new();
        for stat in Stat::ALL {
            entries.insert(stat.name().to_string(), Value::from(0));
        }
        StatRecord { entries }
    }
}

impl StatRecord {
    /// Build a record from a parsed JSON object. Missing canonical keys are
    /// appended as zero. Numeric stats are normalised to integers; anything
    /// that needed more than dropping a `.0` is reported, and non-numbers
    /// are reset to zero.
    pub fn from_map(mut entries: Map<String, Value>) -> (Self, Vec<LoadNotice>) {
        let mut notices = Vec::new();
        for stat in Stat::ALL {
            match entries.get_mut(stat.name()) {
                None => {
                    entries.insert(stat.name().to_string(), Value::from(0));
                }
                Some(value) => match stored_count(value) {
                    Some((count, true)) => *value = Value::from(count),
                    Some((count, false)) => {
                        notices.push(LoadNotice::Adjusted {
                            stat,
                            original: value.to_string(),
                            value: count,
                        });
                        *value = Value::from(count);
                    }
                    None => {
                        notices.push(LoadNotice::InvalidValue { stat });
                        *value = Value::from(0);
                    }
                },
            }
        }
        (StatRecord { entries }, notices)
    }

    pub fn get(&self, stat: Stat) -> i64 {
        self.entries
            .get(stat.name())
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    pub fn set(&mut self, stat: Stat, value: i64) {
        self.entries.insert(stat.name().to_string(), Value::from(value));
    }

    /// Add a delta to a stat. Deltas may be negative; nothing clamps the result.
    pub fn add(&mut self, stat: Stat, delta: i64) {
        let value = self.get(stat).saturating_add(delta);
        self.set(stat, value);
    }

    /// Raw value for any key, canonical or not.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Entries in record order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Something the store noticed while loading that the user should hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadNotice {
    /// No file yet; defaults were used.
    Missing,
    /// The file exists but could not be read as a JSON object.
    Corrupted { reason: String },
    /// A canonical stat held something other than a number and was reset
    /// to zero.
    InvalidValue { stat: Stat },
    /// A canonical stat held a fractional or out-of-range number; `value`
    /// is what it was turned into.
    Adjusted {
        stat: Stat,
        original: String,
        value: i64,
    },
}

/// Result of `StatStore::load`.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub record: StatRecord,
    pub notices: Vec<LoadNotice>,
}

/// File-backed store for a `StatRecord`.
#[derive(Debug, Clone)]
pub struct StatStore {
    path: PathBuf,
}

impl StatStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StatStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record. Never fails: a missing or corrupted file yields the
    /// all-zero default, and a corrupted file is left as it is on disk.
    pub fn load(&self) -> Loaded {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Stat file {} does not exist", self.path.display());
                return Loaded {
                    record: StatRecord::default(),
                    notices: vec![LoadNotice::Missing],
                };
            }
            Err(e) => return self.corrupted(e.to_string()),
        };

        let map = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(other) => return self.corrupted(format!("expected a JSON object, found {}", json_kind(&other))),
            Err(e) => return self.corrupted(e.to_string()),
        };

        let (record, notices) = StatRecord::from_map(map);
        log::debug!(
            "Loaded {} entries from {} ({} notice(s))",
            record.len(),
            self.path.display(),
            notices.len()
        );
        Loaded { record, notices }
    }

    /// Write the record as 4-space indented JSON, replacing the file.
    pub fn save(&self, record: &StatRecord) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        record.serialize(&mut ser)?;
        fs::write(&self.path, buf)?;
        log::debug!("Wrote {} entries to {}", record.len(), self.path.display());
        Ok(())
    }

    fn corrupted(&self, reason: String) -> Loaded {
        log::debug!("Stat file {} is unreadable: {}", self.path.display(), reason);
        Loaded {
            record: StatRecord::default(),
            notices: vec![LoadNotice::Corrupted { reason }],
        }
    }
}

/// Integer reading of a stored stat and whether it was exact. Integers
/// above `i64::MAX` are clamped and fractions truncated (both inexact);
/// `None` for anything that isn't a number.
fn stored_count(value: &Value) -> Option<(i64, bool)> {
    if let Some(n) = value.as_i64() {
        return Some((n, true));
    }
    if value.as_u64().is_some() {
        return Some((i64::MAX, false));
    }
    let f = value.as_f64()?;
    // `as` saturates at the i64 bounds
    let count = f.trunc() as i64;
    Some((count, f.fract() == 0.0 && (count as f64) == f))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_record_has_five_zeros_in_order() {
        let record = StatRecord::default();
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Knowledge", "Charm", "Guts", "Health", "Kindness"]);
        assert!(Stat::ALL.iter().all(|s| record.get(*s) == 0));
    }

    #[test]
    fn from_map_appends_missing_and_keeps_extras() {
        let map = json!({"Luck": 9, "Charm": 3}).as_object().cloned().unwrap();
        let (record, notices) = StatRecord::from_map(map);
        assert!(notices.is_empty());
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Luck", "Charm", "Knowledge", "Guts", "Health", "Kindness"]);
        assert_eq!(record.value("Luck"), Some(&json!(9)));
        assert_eq!(record.get(Stat::Charm), 3);
    }

    #[test]
    fn from_map_resets_only_non_numbers() {
        let map = json!({"Guts": "lots", "Kindness": null}).as_object().cloned().unwrap();
        let (record, notices) = StatRecord::from_map(map);
        assert_eq!(
            notices,
            vec![
                LoadNotice::InvalidValue { stat: Stat::Guts },
                LoadNotice::InvalidValue { stat: Stat::Kindness },
            ]
        );
        assert_eq!(record.get(Stat::Guts), 0);
        assert_eq!(record.get(Stat::Kindness), 0);
    }

    #[test]
    fn whole_float_is_kept_silently() {
        let map = json!({"Knowledge": 5.0}).as_object().cloned().unwrap();
        let (record, notices) = StatRecord::from_map(map);
        assert!(notices.is_empty());
        assert_eq!(record.get(Stat::Knowledge), 5);
        assert_eq!(record.value("Knowledge"), Some(&json!(5)));
    }

    #[test]
    fn fractional_and_huge_values_are_adjusted_not_reset() {
        let map = json!({"Health": 2.5, "Charm": u64::MAX}).as_object().cloned().unwrap();
        let (record, notices) = StatRecord::from_map(map);
        assert_eq!(record.get(Stat::Health), 2);
        assert_eq!(record.get(Stat::Charm), i64::MAX);
        assert_eq!(
            notices,
            vec![
                LoadNotice::Adjusted {
                    stat: Stat::Charm,
                    original: u64::MAX.to_string(),
                    value: i64::MAX,
                },
                LoadNotice::Adjusted {
                    stat: Stat::Health,
                    original: "2.5".into(),
                    value: 2,
                },
            ]
        );
    }

    #[test]
    fn add_accepts_negative_deltas() {
        let mut record = StatRecord::default();
        record.add(Stat::Kindness, 2);
        record.add(Stat::Kindness, -5);
        assert_eq!(record.get(Stat::Kindness), -3);
    }

    #[test]
    fn stat_lookup_is_case_sensitive() {
        assert_eq!(Stat::from_name("Guts"), Some(Stat::Guts));
        assert_eq!(Stat::from_name("guts"), None);
        assert_eq!(Stat::from_name("Luck"), None);
    }

    #[test]
    fn non_object_json_is_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        let loaded = StatStore::new(&path).load();
        assert_eq!(loaded.record, StatRecord::default());
        assert!(matches!(loaded.notices.as_slice(), [LoadNotice::Corrupted { .. }]));
    }

    #[test]
    fn save_uses_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        StatStore::new(&path).save(&StatRecord::default()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n    \"Knowledge\": 0,"));
    }
}
