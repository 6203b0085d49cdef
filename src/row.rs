//! Row detectors - the merged constraints of one table row

use crate::detector::{DetectorError, ValueDetector};
use crate::error::{Error, Result};
use crate::table::Cell;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a constrained field: pattern position plus field name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    pub pattern: usize,
    pub field: String,
}

impl FieldKey {
    pub fn new(pattern: usize, field: impl Into<String>) -> Self {
        Self {
            pattern,
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pattern {}.{}", self.pattern, self.field)
    }
}

/// All merged value detectors of a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDetector {
    row: usize,
    detectors: BTreeMap<FieldKey, ValueDetector>,
    /// Action cells, compared verbatim when looking for conflicts
    actions: Vec<Cell>,
}

impl RowDetector {
    pub fn new(row: usize) -> Self {
        Self {
            row,
            detectors: BTreeMap::new(),
            actions: Vec::new(),
        }
    }

    pub fn with_actions(mut self, actions: Vec<Cell>) -> Self {
        self.actions = actions;
        self
    }

    /// 0-based row index
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn actions(&self) -> &[Cell] {
        &self.actions
    }

    pub fn detectors(&self) -> &BTreeMap<FieldKey, ValueDetector> {
        &self.detectors
    }

    pub fn get(&self, key: &FieldKey) -> Option<&ValueDetector> {
        self.detectors.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Insert `detector` under `key`, merging with any existing entry
    pub fn put_or_merge(&mut self, key: FieldKey, detector: ValueDetector) -> Result<()> {
        let merged = match self.detectors.get(&key) {
            Some(existing) => existing
                .merge_with(&detector)
                .map_err(|source| detector_error(&key, source))?,
            None => detector,
        };
        self.detectors.insert(key, merged);
        Ok(())
    }

    /// Keys whose merged constraints can never be satisfied
    pub fn impossible_keys(&self) -> Vec<&FieldKey> {
        self.detectors
            .iter()
            .filter(|(_, d)| d.is_impossible())
            .map(|(k, _)| k)
            .collect()
    }

    pub fn is_impossible(&self) -> bool {
        self.detectors.values().any(ValueDetector::is_impossible)
    }

    pub fn same_keys(&self, other: &RowDetector) -> bool {
        self.detectors.len() == other.detectors.len()
            && self.detectors.keys().all(|k| other.detectors.contains_key(k))
    }

    /// Key-for-key, value-for-value identical conditions
    pub fn same_conditions(&self, other: &RowDetector) -> bool {
        self.detectors == other.detectors
    }

    /// Same keys, and every constraint of `self` implies the matching one in `other`
    pub fn is_narrower_than(&self, other: &RowDetector) -> bool {
        self.same_keys(other)
            && !self.same_conditions(other)
            && self.detectors.iter().all(|(key, detector)| {
                other
                    .detectors
                    .get(key)
                    .is_some_and(|theirs| detector.is_subset_of(theirs))
            })
    }
}

pub(crate) fn detector_error(key: &FieldKey, source: DetectorError) -> Error {
    Error::Detector {
        field: key.field.clone(),
        source,
    }
}
