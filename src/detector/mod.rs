//! Value detectors - per-field constraints built from table cells
//!
//! A [`ValueDetector`] captures what one or more cells assert about a single
//! fact field. Detectors on the same field merge by intersection; a merge that
//! leaves no satisfying value yields [`ValueDetector::Impossible`].
//!
//! ## Submodules
//!
//! - `set` - finite allow/deny sets (strings, enumerations)
//! - `interval` - interval constraints over numbers and dates
//!
//! Merging is commutative and associative: detectors are kept in canonical
//! form, so folding a row's cells in any order gives the same detector.

mod interval;
mod set;

pub use interval::{Bound, Ordered, Ordinal};
pub use set::ValueSet;

use crate::resolve::FieldType;
use crate::table::{split_list, Cell, Operator};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Detector construction and merge failures
///
/// Both indicate an internal inconsistency between column types and cell
/// data rather than a rule-authoring mistake.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectorError {
    #[error("expected a {expected} cell, found {found}")]
    CellType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot merge a {left} detector with a {right} detector")]
    Incompatible {
        left: &'static str,
        right: &'static str,
    },
}

/// Constraint on one fact field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueDetector {
    Boolean(bool),
    /// Permitted members of an enumeration
    Enumerated(BTreeSet<String>),
    String(ValueSet<String>),
    Numeric(Ordered<Decimal>),
    Date(Ordered<NaiveDate>),
    /// Free-format field or unsupported operator; never contradicts anything.
    /// Holds the rendered `operator value` assertions so rows stay distinguishable.
    Unrecognized(BTreeSet<String>),
    /// No value can satisfy the merged constraints
    Impossible,
}

impl ValueDetector {
    /// Build a detector for a non-blank cell of a column resolved to `field_type`
    pub fn build(
        field_type: &FieldType,
        cell: &Cell,
        operator: &Operator,
    ) -> Result<Self, DetectorError> {
        let detector = match field_type {
            FieldType::FreeFormat => Self::unrecognized(cell, operator),
            FieldType::Boolean => {
                let Cell::Bool(value) = cell else {
                    return Err(mismatch(field_type, cell));
                };
                match operator {
                    Operator::Eq => ValueDetector::Boolean(*value),
                    Operator::Ne => ValueDetector::Boolean(!*value),
                    _ => Self::unrecognized(cell, operator),
                }
            }
            FieldType::Enumerated(members) => {
                let Some(text) = cell_text(cell) else {
                    return Err(mismatch(field_type, cell));
                };
                let everything_but = |excluded: &[String]| -> BTreeSet<String> {
                    members
                        .iter()
                        .filter(|m| !excluded.contains(m))
                        .cloned()
                        .collect()
                };
                let detector = match operator {
                    Operator::Eq => ValueDetector::Enumerated(BTreeSet::from([text])),
                    Operator::Ne => ValueDetector::Enumerated(everything_but(&[text])),
                    Operator::In => {
                        ValueDetector::Enumerated(split_list(&text).into_iter().collect())
                    }
                    Operator::NotIn => {
                        ValueDetector::Enumerated(everything_but(&split_list(&text)))
                    }
                    _ => Self::unrecognized(cell, operator),
                };
                detector.settle()
            }
            FieldType::String => {
                let Cell::String(text) = cell else {
                    return Err(mismatch(field_type, cell));
                };
                let detector = match operator {
                    Operator::Eq => ValueDetector::String(ValueSet::only([text.clone()])),
                    Operator::Ne => ValueDetector::String(ValueSet::except([text.clone()])),
                    Operator::In => ValueDetector::String(ValueSet::only(split_list(text))),
                    Operator::NotIn => ValueDetector::String(ValueSet::except(split_list(text))),
                    _ => Self::unrecognized(cell, operator),
                };
                detector.settle()
            }
            FieldType::Numeric => match cell {
                Cell::Numeric(value) => Self::ordered(*value, operator)
                    .map(ValueDetector::Numeric)
                    .unwrap_or_else(|| Self::unrecognized(cell, operator)),
                // String cells are only meaningful as `in` / `not in` lists
                Cell::String(list) if operator.is_membership() => {
                    let values = parse_list(list, |s| Decimal::from_str(s).ok())
                        .ok_or_else(|| mismatch(field_type, cell))?;
                    Self::listed(values, operator, ValueDetector::Numeric)
                }
                _ => return Err(mismatch(field_type, cell)),
            },
            FieldType::Date => match cell {
                Cell::Date(value) => Self::ordered(*value, operator)
                    .map(ValueDetector::Date)
                    .unwrap_or_else(|| Self::unrecognized(cell, operator)),
                Cell::String(list) if operator.is_membership() => {
                    let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
                    let values = parse_list(list, parse).ok_or_else(|| mismatch(field_type, cell))?;
                    Self::listed(values, operator, ValueDetector::Date)
                }
                _ => return Err(mismatch(field_type, cell)),
            },
        };
        Ok(detector)
    }

    /// Single-value constraint for comparison operators
    fn ordered<T: Ordinal>(value: T, operator: &Operator) -> Option<Ordered<T>> {
        Some(match operator {
            Operator::Eq | Operator::In => Ordered::equal_to(value),
            Operator::Ne | Operator::NotIn => Ordered::not_equal_to(value),
            Operator::Lt => Ordered::less_than(value, false),
            Operator::Le => Ordered::less_than(value, true),
            Operator::Gt => Ordered::greater_than(value, false),
            Operator::Ge => Ordered::greater_than(value, true),
            Operator::Other(_) => return None,
        })
    }

    /// `in` / `not in` over a parsed list
    fn listed<T: Ordinal>(
        values: Vec<T>,
        operator: &Operator,
        wrap: fn(Ordered<T>) -> ValueDetector,
    ) -> ValueDetector {
        match operator {
            Operator::NotIn => wrap(Ordered::none_of(values)),
            _ => Ordered::one_of(values).map_or(ValueDetector::Impossible, wrap),
        }
    }

    fn unrecognized(cell: &Cell, operator: &Operator) -> Self {
        ValueDetector::Unrecognized(BTreeSet::from([format!("{} {}", operator, cell)]))
    }

    /// Collapse empty value sets into the impossible sentinel
    fn settle(self) -> Self {
        match &self {
            ValueDetector::Enumerated(allowed) if allowed.is_empty() => ValueDetector::Impossible,
            ValueDetector::String(values) if values.is_empty() => ValueDetector::Impossible,
            _ => self,
        }
    }

    /// Combine two detectors on the same field
    pub fn merge_with(&self, other: &Self) -> Result<Self, DetectorError> {
        use ValueDetector as V;

        let merged = match (self, other) {
            (V::Impossible, _) | (_, V::Impossible) => V::Impossible,
            (V::Unrecognized(a), V::Unrecognized(b)) => {
                V::Unrecognized(a.union(b).cloned().collect())
            }
            (V::Unrecognized(_), known) | (known, V::Unrecognized(_)) => known.clone(),
            (V::Boolean(a), V::Boolean(b)) => {
                if a == b {
                    V::Boolean(*a)
                } else {
                    V::Impossible
                }
            }
            (V::Enumerated(a), V::Enumerated(b)) => {
                V::Enumerated(a.intersection(b).cloned().collect()).settle()
            }
            (V::Enumerated(allowed), V::String(values))
            | (V::String(values), V::Enumerated(allowed)) => {
                let kept = allowed.iter().filter(|v| values.contains(v)).cloned();
                V::Enumerated(kept.collect()).settle()
            }
            (V::String(a), V::String(b)) => V::String(a.intersect(b)).settle(),
            (V::Numeric(a), V::Numeric(b)) => a.intersect(b).map_or(V::Impossible, V::Numeric),
            (V::Date(a), V::Date(b)) => a.intersect(b).map_or(V::Impossible, V::Date),
            (left, right) => {
                return Err(DetectorError::Incompatible {
                    left: left.kind_name(),
                    right: right.kind_name(),
                })
            }
        };

        tracing::trace!(left = %self, right = %other, merged = %merged, "merged detectors");
        Ok(merged)
    }

    pub fn is_impossible(&self) -> bool {
        matches!(self, ValueDetector::Impossible)
    }

    /// Does `candidate` satisfy this detector
    pub fn accepts(&self, candidate: &Cell) -> bool {
        match (self, candidate) {
            (ValueDetector::Impossible, _) => false,
            (ValueDetector::Unrecognized(_), _) => true,
            (ValueDetector::Boolean(v), Cell::Bool(c)) => v == c,
            (ValueDetector::Enumerated(allowed), cell) => {
                cell_text(cell).is_some_and(|text| allowed.contains(&text))
            }
            (ValueDetector::String(values), Cell::String(c)) => values.contains(c),
            (ValueDetector::Numeric(range), Cell::Numeric(c)) => range.accepts(c),
            (ValueDetector::Date(range), Cell::Date(c)) => range.accepts(c),
            _ => false,
        }
    }

    /// Every value this detector accepts is accepted by `other`
    ///
    /// Only provable implications count; unrecognized detectors imply nothing
    /// but themselves.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        use ValueDetector as V;

        match (self, other) {
            (V::Impossible, _) => true,
            (_, V::Impossible) => false,
            (V::Unrecognized(a), V::Unrecognized(b)) => a == b,
            (V::Unrecognized(_), _) | (_, V::Unrecognized(_)) => false,
            (V::Boolean(a), V::Boolean(b)) => a == b,
            (V::Enumerated(a), V::Enumerated(b)) => a.is_subset(b),
            (V::Enumerated(a), V::String(b)) => a.iter().all(|v| b.contains(v)),
            (V::String(a), V::Enumerated(b)) => {
                matches!(a, ValueSet::Only(values) if values.is_subset(b))
            }
            (V::String(a), V::String(b)) => a.is_subset_of(b),
            (V::Numeric(a), V::Numeric(b)) => a.is_subset_of(b),
            (V::Date(a), V::Date(b)) => a.is_subset_of(b),
            _ => false,
        }
    }

    /// Variant name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueDetector::Boolean(_) => "boolean",
            ValueDetector::Enumerated(_) => "enumerated",
            ValueDetector::String(_) => "string",
            ValueDetector::Numeric(_) => "numeric",
            ValueDetector::Date(_) => "date",
            ValueDetector::Unrecognized(_) => "unrecognized",
            ValueDetector::Impossible => "impossible",
        }
    }
}

impl fmt::Display for ValueDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueDetector::Boolean(v) => write!(f, "== {}", v),
            ValueDetector::Enumerated(allowed) => {
                let items: Vec<&str> = allowed.iter().map(String::as_str).collect();
                write!(f, "in {{{}}}", items.join(", "))
            }
            ValueDetector::String(values) => write!(f, "{}", values),
            ValueDetector::Numeric(range) => write!(f, "{}", range),
            ValueDetector::Date(range) => write!(f, "{}", range),
            ValueDetector::Unrecognized(raw) => {
                let items: Vec<&str> = raw.iter().map(String::as_str).collect();
                write!(f, "unrecognized [{}]", items.join("; "))
            }
            ValueDetector::Impossible => write!(f, "impossible"),
        }
    }
}

fn mismatch(field_type: &FieldType, cell: &Cell) -> DetectorError {
    DetectorError::CellType {
        expected: field_type.cell_type_name(),
        found: cell.type_name(),
    }
}

/// Text form of a cell for enumeration membership
fn cell_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Blank => None,
        Cell::String(s) => Some(s.clone()),
        Cell::Bool(b) => Some(b.to_string()),
        Cell::Numeric(n) => Some(n.normalize().to_string()),
        Cell::Date(d) => Some(d.to_string()),
    }
}

/// Parse every entry of a comma-separated list; `None` if any entry fails
fn parse_list<T>(list: &str, parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
    split_list(list).iter().map(|s| parse(s.as_str())).collect()
}
