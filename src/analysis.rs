//! Table analysis - impossible, duplicate, subsumed and conflicting rows
//!
//! ```text
//!  Table + rows ──► resolve column types (once per column)
//!                         │
//!                         ▼
//!            per row: fold non-blank cells into a RowDetector
//!                         │
//!                         ▼
//!            per row: evaluate against every RowDetector ──► Analysis
//! ```
//!
//! Each row's [`Analysis`] is a pure function of its own detector and the
//! immutable collection of all detectors; results come back in input order.

use crate::config::AnalyzerConfig;
use crate::detector::ValueDetector;
use crate::error::{Error, Result};
use crate::oracle::FactOracle;
use crate::resolve::{resolve, FieldType};
use crate::row::{detector_error, FieldKey, RowDetector};
use crate::table::{Operator, Row, Table};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Analyze every row of `table` with the default configuration
pub fn analyze<O: FactOracle + ?Sized>(
    table: &Table,
    rows: &[Row],
    oracle: &O,
) -> Result<Vec<Analysis>> {
    Analyzer::new(oracle).analyze(table, rows)
}

/// Category of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Impossible,
    Duplicate,
    SubsumedBy,
    Conflict,
}

/// One observation about a row; referenced rows are 0-based indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// The constraints on this field contradict each other
    Impossible { pattern: String, field: String },
    /// Identical conditions to another row
    Duplicate { row: usize },
    /// Conditions strictly narrower than another row's
    SubsumedBy { row: usize },
    /// Identical conditions to another row, different actions
    Conflict { row: usize },
}

impl Finding {
    pub fn kind(&self) -> FindingKind {
        match self {
            Finding::Impossible { .. } => FindingKind::Impossible,
            Finding::Duplicate { .. } => FindingKind::Duplicate,
            Finding::SubsumedBy { .. } => FindingKind::SubsumedBy,
            Finding::Conflict { .. } => FindingKind::Conflict,
        }
    }

    /// Row index referenced by a cross-row finding
    pub fn other_row(&self) -> Option<usize> {
        match self {
            Finding::Impossible { .. } => None,
            Finding::Duplicate { row }
            | Finding::SubsumedBy { row }
            | Finding::Conflict { row } => Some(*row),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::Impossible { pattern, field } => {
                write!(f, "impossible match on {}.{}", pattern, field)
            }
            Finding::Duplicate { row } => write!(f, "duplicate of row {}", row + 1),
            Finding::SubsumedBy { row } => write!(f, "subsumed by row {}", row + 1),
            Finding::Conflict { row } => write!(f, "conflicts with row {}", row + 1),
        }
    }
}

/// Findings for a single row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Analysis {
    /// 0-based row index, from the row-number cell
    pub row: usize,
    pub findings: Vec<Finding>,
}

impl Analysis {
    pub fn new(row: usize) -> Self {
        Self {
            row,
            findings: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn is_impossible(&self) -> bool {
        self.has(FindingKind::Impossible)
    }

    pub fn has(&self, kind: FindingKind) -> bool {
        self.findings.iter().any(|f| f.kind() == kind)
    }

    /// Rows referenced by findings of `kind`
    pub fn rows_for(&self, kind: FindingKind) -> Vec<usize> {
        self.findings
            .iter()
            .filter(|f| f.kind() == kind)
            .filter_map(Finding::other_row)
            .collect()
    }
}

/// A condition column resolved for one analysis pass
struct ResolvedColumn<'t> {
    key: FieldKey,
    position: usize,
    operator: &'t Operator,
    field_type: FieldType,
}

/// Decision table analyzer
pub struct Analyzer<'o, O: FactOracle + ?Sized> {
    oracle: &'o O,
    config: AnalyzerConfig,
}

impl<'o, O: FactOracle + ?Sized> Analyzer<'o, O> {
    pub fn new(oracle: &'o O) -> Self {
        Self {
            oracle,
            config: AnalyzerConfig::default(),
        }
    }

    pub fn with_config(oracle: &'o O, config: AnalyzerConfig) -> Self {
        Self { oracle, config }
    }

    /// Analyze `rows` against `table`
    ///
    /// Fails without partial results if any row is malformed (wrong width,
    /// bad row number) or holds cells that contradict its column's type.
    pub fn analyze(&self, table: &Table, rows: &[Row]) -> Result<Vec<Analysis>> {
        let columns = self.resolve_columns(table);
        let detectors = rows
            .iter()
            .enumerate()
            .map(|(input_row, row)| build_row_detector(table, &columns, input_row, row))
            .collect::<Result<Vec<_>>>()?;

        let analyses: Vec<Analysis> = detectors
            .iter()
            .enumerate()
            .map(|(position, detector)| self.evaluate(table, position, detector, &detectors))
            .collect();

        tracing::debug!(
            table = %table.name,
            rows = analyses.len(),
            flagged = analyses.iter().filter(|a| !a.is_clean()).count(),
            "analyzed decision table"
        );
        Ok(analyses)
    }

    fn resolve_columns<'t>(&self, table: &'t Table) -> Vec<ResolvedColumn<'t>> {
        table
            .condition_columns()
            .into_iter()
            .map(|c| ResolvedColumn {
                key: FieldKey::new(c.pattern_index, c.column.field.as_str()),
                position: c.position,
                operator: &c.column.operator,
                field_type: resolve(c.pattern, c.column, self.oracle),
            })
            .collect()
    }

    /// Findings for the detector at `position` against all detectors
    fn evaluate(
        &self,
        table: &Table,
        position: usize,
        detector: &RowDetector,
        all: &[RowDetector],
    ) -> Analysis {
        let mut analysis = Analysis::new(detector.row());

        if detector.is_impossible() {
            for key in detector.impossible_keys() {
                let pattern = table
                    .patterns
                    .get(key.pattern)
                    .map(|p| p.label().to_string())
                    .unwrap_or_default();
                analysis.findings.push(Finding::Impossible {
                    pattern,
                    field: key.field.clone(),
                });
            }
            tracing::debug!(row = detector.row() + 1, "impossible match");
            return analysis;
        }

        // Unconstrained rows match everything and are never flagged
        if detector.is_empty() {
            return analysis;
        }

        for (other_position, other) in all.iter().enumerate() {
            if other_position == position || other.is_impossible() || other.is_empty() {
                continue;
            }
            if detector.same_conditions(other) {
                if self.config.detect_duplicates {
                    analysis.findings.push(Finding::Duplicate { row: other.row() });
                }
                if self.config.detect_conflicts && detector.actions() != other.actions() {
                    analysis.findings.push(Finding::Conflict { row: other.row() });
                }
            } else if self.config.detect_subsumption && detector.is_narrower_than(other) {
                analysis.findings.push(Finding::SubsumedBy { row: other.row() });
            }
        }

        analysis
    }
}

fn build_row_detector(
    table: &Table,
    columns: &[ResolvedColumn<'_>],
    input_row: usize,
    row: &Row,
) -> Result<RowDetector> {
    let expected = table.column_count();
    if row.len() != expected {
        return Err(Error::CellCount {
            row: input_row,
            expected,
            found: row.len(),
        });
    }

    let actions = row.cells()[table.action_positions()].to_vec();
    let mut detector = RowDetector::new(row.index(input_row)?).with_actions(actions);

    for column in columns {
        let Some(cell) = row.get(column.position) else {
            continue;
        };
        // Blank cells are wildcards
        if !cell.has_value() {
            continue;
        }
        let value = ValueDetector::build(&column.field_type, cell, column.operator)
            .map_err(|source| detector_error(&column.key, source))?;
        detector.put_or_merge(column.key.clone(), value)?;
    }

    Ok(detector)
}
