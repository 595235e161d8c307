//! Per-group summaries of a numeric feature column.
//!
//! Rows are partitioned by a categorical key column (by default `decade`),
//! and each partition's feature values are reduced to mean, median and
//! sample standard deviation.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::debug;

use crate::dataset::{Dataset, Value};
use crate::error::SummaryError;
use crate::stats::FeatureStats;

/// Partition key used by [`summarize`].
pub const DECADE_COLUMN: &str = "decade";

/// A distinct partition-key value. Integral numbers (decades such as `1960`)
/// are kept as integers; all numeric keys sort by value and before text keys.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Int(i64),
    Float(f64),
    Text(String),
}

impl GroupKey {
    /// Returns `None` for missing keys (`Null` or NaN).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) if n.is_nan() => None,
            Value::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                Some(GroupKey::Int(*n as i64))
            }
            Value::Number(n) => Some(GroupKey::Float(*n)),
            Value::Text(s) => Some(GroupKey::Text(s.clone())),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            GroupKey::Int(_) => 0,
            GroupKey::Float(_) => 1,
            GroupKey::Text(_) => 2,
        }
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Int(a), GroupKey::Int(b)) => a.cmp(b),
            (GroupKey::Float(a), GroupKey::Float(b)) => a.total_cmp(b),
            (GroupKey::Int(a), GroupKey::Float(b)) => (*a as f64)
                .total_cmp(b)
                .then(self.rank().cmp(&other.rank())),
            (GroupKey::Float(a), GroupKey::Int(b)) => a
                .total_cmp(&(*b as f64))
                .then(self.rank().cmp(&other.rank())),
            (GroupKey::Text(a), GroupKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            GroupKey::Int(n) => n.hash(state),
            GroupKey::Float(n) => n.to_bits().hash(state),
            GroupKey::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Int(n) => write!(f, "{n}"),
            GroupKey::Float(n) => write!(f, "{n}"),
            GroupKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for GroupKey {
    fn from(n: i64) -> Self {
        GroupKey::Int(n)
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        GroupKey::Text(s.to_string())
    }
}

/// Statistics of one feature for every partition present in a dataset,
/// ordered by ascending key.
#[derive(Debug, Clone)]
pub struct GroupSummary {
    partition_key: String,
    feature: String,
    groups: BTreeMap<GroupKey, FeatureStats>,
}

impl GroupSummary {
    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, key: &GroupKey) -> Option<&FeatureStats> {
        self.groups.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &FeatureStats)> {
        self.groups.iter()
    }
}

/// Summarizes `feature` per decade. See [`summarize_by`].
pub fn summarize(dataset: &Dataset, feature: &str) -> Result<GroupSummary, SummaryError> {
    summarize_by(dataset, DECADE_COLUMN, feature)
}

/// Groups rows of `dataset` by `partition_key` and computes mean, median and
/// sample standard deviation of `feature` within each group.
///
/// Rows with a missing key are dropped. Missing (or NaN) feature values are
/// skipped, so a group may end up with fewer values than rows; a group with a
/// single value has NaN std, one with none has NaN for all three statistics.
///
/// # Errors
///
/// - [`SummaryError::EmptyInput`] if the dataset has zero rows, checked first.
/// - [`SummaryError::ColumnNotFound`] if `feature` or `partition_key` is not a column.
/// - [`SummaryError::NonNumericValue`] if a keyed row holds text in `feature`.
pub fn summarize_by(
    dataset: &Dataset,
    partition_key: &str,
    feature: &str,
) -> Result<GroupSummary, SummaryError> {
    if dataset.is_empty() {
        return Err(SummaryError::EmptyInput);
    }

    let values = dataset
        .column(feature)
        .ok_or_else(|| SummaryError::column_not_found(feature))?;
    let keys = dataset
        .column(partition_key)
        .ok_or_else(|| SummaryError::column_not_found(partition_key))?;

    let mut partitions: HashMap<GroupKey, Vec<f64>> = HashMap::new();
    let mut dropped = 0usize;

    for (row, (key, value)) in keys.iter().zip(values).enumerate() {
        let Some(key) = GroupKey::from_value(key) else {
            dropped += 1;
            continue;
        };

        let series = partitions.entry(key).or_default();
        match value {
            Value::Number(n) if !n.is_nan() => series.push(*n),
            Value::Number(_) | Value::Null => {}
            Value::Text(_) => {
                return Err(SummaryError::NonNumericValue {
                    column: feature.to_string(),
                    row,
                });
            }
        }
    }

    let groups: BTreeMap<GroupKey, FeatureStats> = partitions
        .into_iter()
        .map(|(key, series)| (key, FeatureStats::from_values(&series)))
        .collect();

    debug!(
        partition_key,
        feature,
        rows = dataset.row_count(),
        dropped,
        groups = groups.len(),
        "Feature summarized"
    );

    Ok(GroupSummary {
        partition_key: partition_key.to_string(),
        feature: feature.to_string(),
        groups,
    })
}
