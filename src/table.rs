//! Decision table types - the input data model
//!
//! A table is a list of condition patterns (each a fact binding with one or
//! more condition columns) followed by action columns. Rows are supplied as
//! flat cell lists aligned with [`Table::column_count`]:
//!
//! ```text
//! | # | description | attributes... | conditions (pattern order)... | actions... |
//! ```
//!
//! ## Example Table
//!
//! ```yaml
//! name: driver_premium
//! patterns:
//!   - fact_type: Driver
//!     binding: d
//!     conditions:
//!       - field: age
//!         operator: ">="
//!       - field: age
//!         operator: "<"
//! actions:
//!   - header: premium
//! rows:
//!   - [1, "young", 18, 25, 450]
//!   - [2, "adult", 25, 70, 300]
//! ```

use crate::error::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Number of fixed columns before the attribute columns (row number, description)
const LEADING_COLUMNS: usize = 2;

/// A decision table definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Table {
    /// Table name, used in reports
    #[serde(default)]
    pub name: String,

    /// Rule attribute columns (salience, agenda-group, ...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,

    /// Condition patterns in column order
    #[serde(default)]
    pub patterns: Vec<Pattern>,

    /// Action columns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionColumn>,
}

/// A fact binding grouping one or more condition columns
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Pattern {
    /// Fact type the conditions apply to
    pub fact_type: String,

    /// Variable the fact is bound to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,

    #[serde(default)]
    pub conditions: Vec<ConditionColumn>,
}

impl Pattern {
    /// Display label: the binding if present, otherwise the fact type
    pub fn label(&self) -> &str {
        self.binding.as_deref().unwrap_or(&self.fact_type)
    }
}

/// A column expressing one constraint on a pattern
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConditionColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    /// Fact field the column constrains
    pub field: String,

    #[serde(default)]
    pub operator: Operator,

    /// Cells are ticks (true/false) rather than values
    #[serde(default)]
    pub limited_entry: bool,

    /// Comma-separated list of permitted values, overriding the fact model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_list: Option<String>,
}

impl ConditionColumn {
    /// Values declared by `value_list`, trimmed, blanks dropped
    pub fn declared_values(&self) -> Vec<String> {
        self.value_list
            .as_deref()
            .map(split_list)
            .unwrap_or_default()
    }
}

/// An action column; its cells are compared verbatim for conflict detection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionColumn {
    pub header: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// A condition column with its resolved place in the table
#[derive(Debug, Clone, Copy)]
pub struct ConditionRef<'a> {
    pub pattern_index: usize,
    pub pattern: &'a Pattern,
    pub column: &'a ConditionColumn,
    /// Index into the flattened column list
    pub position: usize,
}

impl Table {
    /// Total width of a row, including the row-number and description columns
    pub fn column_count(&self) -> usize {
        self.first_action_position() + self.actions.len()
    }

    /// Every condition column in pattern order, then condition order
    pub fn condition_columns(&self) -> Vec<ConditionRef<'_>> {
        let mut position = LEADING_COLUMNS + self.attributes.len();
        let mut refs = Vec::new();
        for (pattern_index, pattern) in self.patterns.iter().enumerate() {
            for column in &pattern.conditions {
                refs.push(ConditionRef {
                    pattern_index,
                    pattern,
                    column,
                    position,
                });
                position += 1;
            }
        }
        refs
    }

    /// Positions of the action columns in the flattened column list
    pub fn action_positions(&self) -> std::ops::Range<usize> {
        let first = self.first_action_position();
        first..first + self.actions.len()
    }

    fn first_action_position(&self) -> usize {
        let conditions: usize = self.patterns.iter().map(|p| p.conditions.len()).sum();
        LEADING_COLUMNS + self.attributes.len() + conditions
    }
}

/// Comparison operator of a condition column
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    #[default]
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    /// Any operator the analyzer has no semantics for (`matches`, `soundslike`, ...)
    Other(String),
}

impl Operator {
    /// `in` / `not in`, whose cells hold comma-separated lists
    pub fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

impl FromStr for Operator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        Ok(match normalized.as_str() {
            "" | "==" | "=" => Operator::Eq,
            "!=" | "<>" => Operator::Ne,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "in" => Operator::In,
            "not in" => Operator::NotIn,
            _ => Operator::Other(normalized),
        })
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(op) => op,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        Operator::from(s.to_string())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Eq => write!(f, "=="),
            Operator::Ne => write!(f, "!="),
            Operator::Lt => write!(f, "<"),
            Operator::Le => write!(f, "<="),
            Operator::Gt => write!(f, ">"),
            Operator::Ge => write!(f, ">="),
            Operator::In => write!(f, "in"),
            Operator::NotIn => write!(f, "not in"),
            Operator::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A single table cell
///
/// In documents: `null` is blank, booleans and numbers map directly, strings
/// are strings, and `{ date: "2024-01-31" }` / `{ numeric: "0.10" }` give
/// dates and exact decimals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Blank,
    Bool(bool),
    Numeric(Decimal),
    String(String),
    Date(NaiveDate),
}

impl Cell {
    /// Blank cells and empty strings are wildcards
    pub fn has_value(&self) -> bool {
        match self {
            Cell::Blank => false,
            Cell::String(s) => !s.trim().is_empty(),
            Cell::Bool(_) | Cell::Numeric(_) | Cell::Date(_) => true,
        }
    }

    /// Tag name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Blank => "blank",
            Cell::Bool(_) => "boolean",
            Cell::Numeric(_) => "numeric",
            Cell::String(_) => "string",
            Cell::Date(_) => "date",
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Blank => Ok(()),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Numeric(n) => write!(f, "{}", n),
            Cell::String(s) => write!(f, "\"{}\"", s),
            Cell::Date(d) => write!(f, "{}", d),
        }
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Numeric(Decimal::from(n))
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Cell::Numeric(Decimal::from(n))
    }
}

impl From<Decimal> for Cell {
    fn from(n: Decimal) -> Self {
        Cell::Numeric(n)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::String(s.to_string())
    }
}

impl From<NaiveDate> for Cell {
    fn from(d: NaiveDate) -> Self {
        Cell::Date(d)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Cell::Blank => serializer.serialize_none(),
            Cell::Bool(b) => serializer.serialize_bool(*b),
            Cell::String(s) => serializer.serialize_str(s),
            Cell::Numeric(n) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("numeric", &n.to_string())?;
                map.end()
            }
            Cell::Date(d) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("date", &d.to_string())?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(CellVisitor)
    }
}

struct CellVisitor;

impl<'de> Visitor<'de> for CellVisitor {
    type Value = Cell;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, a boolean, a number, a string, or a {date|numeric|string: ...} map")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Cell, E> {
        Ok(Cell::Blank)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Cell, E> {
        Ok(Cell::Blank)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Cell, D::Error> {
        d.deserialize_any(CellVisitor)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Cell, E> {
        Ok(Cell::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Cell, E> {
        Ok(Cell::Numeric(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Cell, E> {
        Ok(Cell::Numeric(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Cell, E> {
        Decimal::from_f64(v)
            .map(Cell::Numeric)
            .ok_or_else(|| E::custom(format!("number {} is not representable", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Cell, E> {
        Ok(Cell::String(v.to_string()))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Cell, A::Error> {
        let Some((tag, raw)) = map.next_entry::<String, String>()? else {
            return Ok(Cell::Blank);
        };
        if map.next_key::<String>()?.is_some() {
            return Err(de::Error::custom("typed cell must have exactly one key"));
        }
        match tag.as_str() {
            "date" => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(Cell::Date)
                .map_err(|e| de::Error::custom(format!("invalid date '{}': {}", raw, e))),
            "numeric" => Decimal::from_str(raw.trim())
                .map(Cell::Numeric)
                .map_err(|e| de::Error::custom(format!("invalid number '{}': {}", raw, e))),
            "string" => Ok(Cell::String(raw)),
            other => Err(de::Error::unknown_variant(other, &["date", "numeric", "string"])),
        }
    }
}

/// One table row: cell 0 is the 1-based row number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub Vec<Cell>);

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Row(cells)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    pub fn get(&self, position: usize) -> Option<&Cell> {
        self.0.get(position)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 0-based row index derived from the sequence-number cell
    ///
    /// `input_row` is this row's position in the input, used for error reporting.
    pub fn index(&self, input_row: usize) -> Result<usize> {
        let number = match self.0.first() {
            Some(Cell::Numeric(n)) if n.fract().is_zero() && *n >= Decimal::ONE => *n,
            _ => return Err(Error::RowNumber { row: input_row }),
        };
        number
            .to_usize()
            .map(|n| n - 1)
            .ok_or(Error::RowNumber { row: input_row })
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Row(cells)
    }
}

/// A table definition together with its rows, as stored in a document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DecisionTable {
    #[serde(flatten)]
    pub table: Table,

    #[serde(default)]
    pub rows: Vec<Row>,
}

impl DecisionTable {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::TableParse(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::TableParse(e.to_string()))
    }

    /// Load a `.json`, `.yaml` or `.yml` document
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks
pub(crate) fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
