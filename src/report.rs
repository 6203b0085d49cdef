//! Analysis reports for callers that render findings

use crate::analysis::{Analysis, FindingKind};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// All findings for one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    pub table: String,
    pub rows: Vec<Analysis>,
    pub summary: Summary,
}

/// Number of rows carrying each kind of finding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub total_rows: usize,
    pub clean_rows: usize,
    pub impossible: usize,
    pub duplicate: usize,
    pub subsumed: usize,
    pub conflicting: usize,
}

impl Summary {
    pub fn from_analyses(analyses: &[Analysis]) -> Self {
        let count = |kind| analyses.iter().filter(|a| a.has(kind)).count();
        Self {
            total_rows: analyses.len(),
            clean_rows: analyses.iter().filter(|a| a.is_clean()).count(),
            impossible: count(FindingKind::Impossible),
            duplicate: count(FindingKind::Duplicate),
            subsumed: count(FindingKind::SubsumedBy),
            conflicting: count(FindingKind::Conflict),
        }
    }
}

impl AnalysisReport {
    pub fn new(table: impl Into<String>, rows: Vec<Analysis>) -> Self {
        let summary = Summary::from_analyses(&rows);
        Self {
            table: table.into(),
            rows,
            summary,
        }
    }

    /// Impossible or conflicting rows are errors; duplicates and subsumption are warnings
    pub fn has_errors(&self) -> bool {
        self.summary.impossible > 0 || self.summary.conflicting > 0
    }

    /// Human-readable listing, one line per finding, 1-based row numbers
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let name = if self.table.is_empty() {
            "decision table"
        } else {
            self.table.as_str()
        };
        let _ = writeln!(out, "{}: {} row(s) analyzed", name, self.summary.total_rows);

        for analysis in self.rows.iter().filter(|a| !a.is_clean()) {
            for finding in &analysis.findings {
                let marker = match finding.kind() {
                    FindingKind::Impossible | FindingKind::Conflict => "✗",
                    FindingKind::Duplicate | FindingKind::SubsumedBy => "⚠",
                };
                let _ = writeln!(out, "  {} row {}: {}", marker, analysis.row + 1, finding);
            }
        }

        if self.summary.clean_rows == self.summary.total_rows {
            let _ = writeln!(out, "✓ no issues found");
        } else {
            let s = &self.summary;
            let _ = writeln!(
                out,
                "{} impossible, {} duplicate, {} subsumed, {} conflicting",
                s.impossible, s.duplicate, s.subsumed, s.conflicting
            );
        }
        out
    }
}
