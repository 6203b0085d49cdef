//! Constraints over ordered domains (numbers, dates)
//!
//! An [`Ordered`] constraint is an interval intersected with a [`ValueSet`].
//! Constraints are kept in a canonical form so that two constraints admitting
//! the same values compare equal:
//!
//! - an explicit value set drops values outside the interval and clears the bounds
//! - exclusions sit strictly inside the interval (a boundary exclusion opens the bound)
//! - in discrete domains exclusive bounds are closed onto the neighbouring value
//! - a single-point interval becomes an explicit one-value set
//! - in discrete domains a closed interval of at most [`EXPANSION_LIMIT`]
//!   values becomes the explicit set of those values

use super::set::ValueSet;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Largest closed discrete interval rewritten as an explicit value set
pub const EXPANSION_LIMIT: usize = 1024;

/// A totally ordered value domain
pub trait Ordinal: Ord + Clone + fmt::Display {
    /// Next value in a discrete domain; `None` for dense domains
    fn successor(&self) -> Option<Self> {
        None
    }

    /// Previous value in a discrete domain; `None` for dense domains
    fn predecessor(&self) -> Option<Self> {
        None
    }
}

impl Ordinal for Decimal {}

impl Ordinal for NaiveDate {
    fn successor(&self) -> Option<Self> {
        self.succ_opt()
    }

    fn predecessor(&self) -> Option<Self> {
        self.pred_opt()
    }
}

/// One end of an interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound<T> {
    pub value: T,
    pub inclusive: bool,
}

impl<T: Ordinal> Bound<T> {
    fn inclusive(value: T) -> Self {
        Bound {
            value,
            inclusive: true,
        }
    }

    fn exclusive(value: T) -> Self {
        Bound {
            value,
            inclusive: false,
        }
    }

    fn close_lower(self) -> Self {
        match (self.inclusive, self.value.successor()) {
            (false, Some(next)) => Bound::inclusive(next),
            _ => self,
        }
    }

    fn close_upper(self) -> Self {
        match (self.inclusive, self.value.predecessor()) {
            (false, Some(prev)) => Bound::inclusive(prev),
            _ => self,
        }
    }

    fn admits_above(&self, v: &T) -> bool {
        match v.cmp(&self.value) {
            Ordering::Greater => true,
            Ordering::Equal => self.inclusive,
            Ordering::Less => false,
        }
    }

    fn admits_below(&self, v: &T) -> bool {
        match v.cmp(&self.value) {
            Ordering::Less => true,
            Ordering::Equal => self.inclusive,
            Ordering::Greater => false,
        }
    }
}

/// The tighter of two lower bounds; on a tie the exclusive bound wins
fn tighter_lower<T: Ordinal>(a: &Option<Bound<T>>, b: &Option<Bound<T>>) -> Option<Bound<T>> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) | (None, Some(x)) => Some(x.clone()),
        (Some(x), Some(y)) => Some(match x.value.cmp(&y.value) {
            Ordering::Greater => x.clone(),
            Ordering::Less => y.clone(),
            Ordering::Equal => Bound {
                value: x.value.clone(),
                inclusive: x.inclusive && y.inclusive,
            },
        }),
    }
}

fn tighter_upper<T: Ordinal>(a: &Option<Bound<T>>, b: &Option<Bound<T>>) -> Option<Bound<T>> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) | (None, Some(x)) => Some(x.clone()),
        (Some(x), Some(y)) => Some(match x.value.cmp(&y.value) {
            Ordering::Less => x.clone(),
            Ordering::Greater => y.clone(),
            Ordering::Equal => Bound {
                value: x.value.clone(),
                inclusive: x.inclusive && y.inclusive,
            },
        }),
    }
}

/// `a` is at least as tight as `b` (as lower bounds)
fn lower_within<T: Ordinal>(a: &Option<Bound<T>>, b: &Option<Bound<T>>) -> bool {
    match (a, b) {
        (_, None) => true,
        (None, Some(_)) => false,
        (Some(a), Some(b)) => match a.value.cmp(&b.value) {
            Ordering::Greater => true,
            Ordering::Equal => !a.inclusive || b.inclusive,
            Ordering::Less => false,
        },
    }
}

fn upper_within<T: Ordinal>(a: &Option<Bound<T>>, b: &Option<Bound<T>>) -> bool {
    match (a, b) {
        (_, None) => true,
        (None, Some(_)) => false,
        (Some(a), Some(b)) => match a.value.cmp(&b.value) {
            Ordering::Less => true,
            Ordering::Equal => !a.inclusive || b.inclusive,
            Ordering::Greater => false,
        },
    }
}

/// Values in `[lower, upper]` minus `excluded`, walking successors
///
/// `None` when the domain is dense or more than `limit` values remain.
fn enumerate<T: Ordinal>(
    lower: &T,
    upper: &T,
    excluded: &BTreeSet<T>,
    limit: usize,
) -> Option<BTreeSet<T>> {
    let mut values = BTreeSet::new();
    let mut current = lower.clone();
    loop {
        if !excluded.contains(&current) {
            if values.len() == limit {
                return None;
            }
            values.insert(current.clone());
        }
        if current >= *upper {
            return Some(values);
        }
        current = current.successor()?;
    }
}

/// Interval and value-set constraint on an ordered field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordered<T: Ordinal> {
    lower: Option<Bound<T>>,
    upper: Option<Bound<T>>,
    values: ValueSet<T>,
}

impl<T: Ordinal> Ordered<T> {
    fn new(
        lower: Option<Bound<T>>,
        upper: Option<Bound<T>>,
        values: ValueSet<T>,
    ) -> Option<Self> {
        Ordered {
            lower,
            upper,
            values,
        }
        .canonicalize()
    }

    /// No restriction at all
    pub fn unbounded() -> Self {
        Ordered {
            lower: None,
            upper: None,
            values: ValueSet::any(),
        }
    }

    pub fn equal_to(value: T) -> Self {
        Ordered {
            lower: None,
            upper: None,
            values: ValueSet::only([value]),
        }
    }

    pub fn not_equal_to(value: T) -> Self {
        Self::none_of([value])
    }

    /// Permit exactly the listed values; `None` when the list is empty
    pub fn one_of(values: impl IntoIterator<Item = T>) -> Option<Self> {
        Self::new(None, None, ValueSet::only(values))
    }

    pub fn none_of(values: impl IntoIterator<Item = T>) -> Self {
        Ordered {
            lower: None,
            upper: None,
            values: ValueSet::except(values),
        }
    }

    pub fn greater_than(value: T, inclusive: bool) -> Self {
        let bound = if inclusive {
            Bound::inclusive(value)
        } else {
            Bound::exclusive(value)
        };
        Ordered {
            lower: Some(bound.close_lower()),
            upper: None,
            values: ValueSet::any(),
        }
    }

    pub fn less_than(value: T, inclusive: bool) -> Self {
        let bound = if inclusive {
            Bound::inclusive(value)
        } else {
            Bound::exclusive(value)
        };
        Ordered {
            lower: None,
            upper: Some(bound.close_upper()),
            values: ValueSet::any(),
        }
    }

    /// Intersection of two constraints; `None` when nothing satisfies both
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        Self::new(
            tighter_lower(&self.lower, &other.lower),
            tighter_upper(&self.upper, &other.upper),
            self.values.intersect(&other.values),
        )
    }

    pub fn accepts(&self, value: &T) -> bool {
        self.within_bounds(value) && self.values.contains(value)
    }

    /// Every value accepted by `self` is accepted by `other`
    pub fn is_subset_of(&self, other: &Self) -> bool {
        match (&self.values, &other.values) {
            (ValueSet::Only(values), _) => values.iter().all(|v| other.accepts(v)),
            (ValueSet::Except(excluded), ValueSet::Only(allowed)) => self
                .finite_values(excluded, allowed.len())
                .is_some_and(|values| values.iter().all(|v| other.accepts(v))),
            (ValueSet::Except(_), ValueSet::Except(excluded)) => {
                lower_within(&self.lower, &other.lower)
                    && upper_within(&self.upper, &other.upper)
                    && excluded.iter().all(|v| !self.accepts(v))
            }
        }
    }

    /// Every accepted value, if the interval is closed, discrete and holds at most `limit`
    fn finite_values(&self, excluded: &BTreeSet<T>, limit: usize) -> Option<BTreeSet<T>> {
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper)) if lower.inclusive && upper.inclusive => {
                enumerate(&lower.value, &upper.value, excluded, limit)
            }
            _ => None,
        }
    }

    fn within_bounds(&self, value: &T) -> bool {
        self.lower.as_ref().is_none_or(|b| b.admits_above(value))
            && self.upper.as_ref().is_none_or(|b| b.admits_below(value))
    }

    fn canonicalize(mut self) -> Option<Self> {
        self.lower = self.lower.map(Bound::close_lower);
        self.upper = self.upper.map(Bound::close_upper);

        let mut excluded = match std::mem::replace(&mut self.values, ValueSet::any()) {
            ValueSet::Only(mut allowed) => {
                allowed.retain(|v| self.within_bounds(v));
                if allowed.is_empty() {
                    return None;
                }
                return Some(Ordered {
                    lower: None,
                    upper: None,
                    values: ValueSet::Only(allowed),
                });
            }
            ValueSet::Except(mut excluded) => {
                excluded.retain(|v| self.within_bounds(v));
                excluded
            }
        };

        // Fold exclusions that sit on a closed boundary into the bound
        loop {
            let mut changed = false;
            if let Some(lower) = self.lower.clone() {
                if lower.inclusive && excluded.remove(&lower.value) {
                    self.lower = Some(Bound::exclusive(lower.value).close_lower());
                    changed = true;
                }
            }
            if let Some(upper) = self.upper.clone() {
                if upper.inclusive && excluded.remove(&upper.value) {
                    self.upper = Some(Bound::exclusive(upper.value).close_upper());
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        if let (Some(lower), Some(upper)) = (&self.lower, &self.upper) {
            match lower.value.cmp(&upper.value) {
                Ordering::Greater => return None,
                Ordering::Equal if !(lower.inclusive && upper.inclusive) => return None,
                Ordering::Equal => return Some(Self::equal_to(lower.value.clone())),
                _ => {}
            }
        }

        if let Some(values) = self.finite_values(&excluded, EXPANSION_LIMIT) {
            return Some(Ordered {
                lower: None,
                upper: None,
                values: ValueSet::Only(values),
            });
        }

        self.values = ValueSet::Except(excluded);
        Some(self)
    }
}

impl<T: Ordinal> fmt::Display for Ordered<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(lower) = &self.lower {
            let op = if lower.inclusive { ">=" } else { ">" };
            parts.push(format!("{} {}", op, lower.value));
        }
        if let Some(upper) = &self.upper {
            let op = if upper.inclusive { "<=" } else { "<" };
            parts.push(format!("{} {}", op, upper.value));
        }
        if !matches!(&self.values, ValueSet::Except(e) if e.is_empty()) || parts.is_empty() {
            parts.push(self.values.to_string());
        }
        write!(f, "{}", parts.join(" and "))
    }
}
