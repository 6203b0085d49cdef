//! Finite allow/deny value sets

use std::collections::BTreeSet;
use std::fmt;

/// Either an explicit set of permitted values or everything except a set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSet<T: Ord> {
    Only(BTreeSet<T>),
    Except(BTreeSet<T>),
}

impl<T: Ord + Clone> ValueSet<T> {
    /// Every value permitted
    pub fn any() -> Self {
        ValueSet::Except(BTreeSet::new())
    }

    pub fn only(values: impl IntoIterator<Item = T>) -> Self {
        ValueSet::Only(values.into_iter().collect())
    }

    pub fn except(values: impl IntoIterator<Item = T>) -> Self {
        ValueSet::Except(values.into_iter().collect())
    }

    pub fn contains(&self, value: &T) -> bool {
        match self {
            ValueSet::Only(allowed) => allowed.contains(value),
            ValueSet::Except(excluded) => !excluded.contains(value),
        }
    }

    /// Only an explicit empty set is empty; the domain itself is unbounded
    pub fn is_empty(&self) -> bool {
        matches!(self, ValueSet::Only(allowed) if allowed.is_empty())
    }

    pub fn intersect(&self, other: &Self) -> Self {
        match (self, other) {
            (ValueSet::Only(a), ValueSet::Only(b)) => {
                ValueSet::Only(a.intersection(b).cloned().collect())
            }
            (ValueSet::Only(a), ValueSet::Except(b)) | (ValueSet::Except(b), ValueSet::Only(a)) => {
                ValueSet::Only(a.difference(b).cloned().collect())
            }
            (ValueSet::Except(a), ValueSet::Except(b)) => {
                ValueSet::Except(a.union(b).cloned().collect())
            }
        }
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueSet::Only(a), ValueSet::Only(b)) => a.is_subset(b),
            (ValueSet::Only(a), ValueSet::Except(b)) => a.is_disjoint(b),
            (ValueSet::Except(_), ValueSet::Only(_)) => false,
            (ValueSet::Except(a), ValueSet::Except(b)) => b.is_subset(a),
        }
    }
}

impl<T: Ord + fmt::Display> fmt::Display for ValueSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, values) = match self {
            ValueSet::Only(values) => ("in", values),
            ValueSet::Except(values) if values.is_empty() => return write!(f, "any"),
            ValueSet::Except(values) => ("not in", values),
        };
        let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        write!(f, "{} {{{}}}", prefix, items.join(", "))
    }
}
