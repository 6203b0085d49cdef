// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # dtanalyze - Decision Table Consistency Analysis
//!
//! Finds rule rows in a decision table that can never fire, and rows that
//! relate to each other in ways a rule author usually wants to know about.
//!
//! ## Core Concept
//!
//! A decision table is a grid: each row is a rule, each condition column
//! constrains one field of a fact pattern. For every row the analyzer folds
//! the non-blank condition cells into per-field constraints (value detectors)
//! and then compares rows:
//!
//! - **Impossible**: two cells on the same field contradict (`age > 10` and `age < 5`)
//! - **Duplicate**: another row has exactly the same conditions
//! - **Subsumed**: another row has the same fields with broader constraints
//! - **Conflict**: a duplicate whose actions differ
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dtanalyze::{analyze, DecisionTable, FactModel};
//!
//! let doc = DecisionTable::from_yaml(&std::fs::read_to_string("premiums.yaml")?)?;
//! let model = FactModel::from_yaml(&std::fs::read_to_string("facts.yaml")?)?;
//!
//! for analysis in analyze(&doc.table, &doc.rows, &model)? {
//!     for finding in &analysis.findings {
//!         println!("row {}: {}", analysis.row + 1, finding);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                             │
//! │  Table + Rows            FactOracle (types, enumerations)   │
//! │       │                        │                            │
//! │       └──► resolve(column) ◄───┘ ──► FieldType              │
//! │                  │                                          │
//! │                  ▼                                          │
//! │       ValueDetector::build(type, cell, operator)            │
//! │                  │                                          │
//! │                  ▼                                          │
//! │       RowDetector::put_or_merge(key, detector)              │
//! │                  │                                          │
//! │                  ▼                                          │
//! │       Analyzer::analyze ──► Vec<Analysis> (input order)     │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Blank cells are wildcards. Fields without a recognizable type are
//! free-format and never produce findings of their own.

pub mod analysis;
pub mod config;
pub mod detector;
pub mod error;
pub mod logging;
pub mod oracle;
pub mod report;
pub mod resolve;
pub mod row;
pub mod table;

// Re-exports
pub use analysis::{analyze, Analysis, Analyzer, Finding, FindingKind};
pub use config::{AnalyzerConfig, LoggingConfig, CONFIG_FILE};
pub use detector::{DetectorError, ValueDetector};
pub use error::{Error, Result};
pub use oracle::{DeclaredType, FactModel, FactOracle, FieldDefinition};
pub use report::{AnalysisReport, Summary};
pub use resolve::{resolve, FieldType};
pub use row::{FieldKey, RowDetector};
pub use table::{
    ActionColumn, Cell, ConditionColumn, DecisionTable, Operator, Pattern, Row, Table,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
