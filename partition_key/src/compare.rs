//! Per-column value ordering.

use crate::{DataType, Datum};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Orders the values of one partition key column.
///
/// One comparator is captured per key column when the [`crate::PartitionKey`] is built and is
/// reused for every comparison that key takes part in.
///
/// # Correctness
///
/// Implementations must be a deterministic total order over values of the column's
/// [`DataType`]. Canonical bound collections are only comparable between relations whose keys
/// use comparators that agree.
pub trait KeyComparator: std::fmt::Debug + Send + Sync + 'static {
    fn compare(&self, a: &Datum, b: &Datum) -> Ordering;
}

/// How string values are ordered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collation {
    /// Byte-wise ordering.
    #[default]
    Binary,
    /// Ordering on the lowercased characters. Strings differing only in case compare equal.
    CaseInsensitive,
}

/// The default [`KeyComparator`] for the built-in [`DataType`]s.
///
/// Floats are ordered with [`f64::total_cmp`]. Values of differing types never reach a
/// comparator through validated bounds or rows, but are still given a stable order (by type) so
/// the comparator stays total.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinComparator {
    collation: Collation,
}

impl BuiltinComparator {
    pub fn new(collation: Collation) -> Self {
        Self { collation }
    }

    pub fn collation(&self) -> Collation {
        self.collation
    }
}

impl KeyComparator for BuiltinComparator {
    fn compare(&self, a: &Datum, b: &Datum) -> Ordering {
        match (a, b) {
            (Datum::Bool(a), Datum::Bool(b)) => a.cmp(b),
            (Datum::I64(a), Datum::I64(b)) => a.cmp(b),
            (Datum::U64(a), Datum::U64(b)) => a.cmp(b),
            (Datum::F64(a), Datum::F64(b)) => a.total_cmp(b),
            (Datum::Timestamp(a), Datum::Timestamp(b)) => a.cmp(b),
            (Datum::String(a), Datum::String(b)) => match self.collation {
                Collation::Binary => a.as_bytes().cmp(b.as_bytes()),
                Collation::CaseInsensitive => a
                    .chars()
                    .flat_map(char::to_lowercase)
                    .cmp(b.chars().flat_map(char::to_lowercase)),
            },
            (a, b) => type_rank(a.data_type()).cmp(&type_rank(b.data_type())),
        }
    }
}

fn type_rank(t: DataType) -> u8 {
    match t {
        DataType::Bool => 0,
        DataType::I64 => 1,
        DataType::U64 => 2,
        DataType::F64 => 3,
        DataType::String => 4,
        DataType::Timestamp => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_order_naturally() {
        let c = BuiltinComparator::default();
        assert_eq!(c.compare(&Datum::I64(-5), &Datum::I64(3)), Ordering::Less);
        assert_eq!(c.compare(&Datum::I64(3), &Datum::I64(3)), Ordering::Equal);
        assert_eq!(
            c.compare(&Datum::Timestamp(9), &Datum::Timestamp(1)),
            Ordering::Greater
        );
    }

    #[test]
    fn floats_use_total_order() {
        let c = BuiltinComparator::default();
        assert_eq!(
            c.compare(&Datum::F64(f64::NAN), &Datum::F64(f64::INFINITY)),
            Ordering::Greater
        );
        assert_eq!(c.compare(&Datum::F64(-0.0), &Datum::F64(0.0)), Ordering::Less);
    }

    #[test]
    fn collation_changes_string_order() {
        let binary = BuiltinComparator::new(Collation::Binary);
        let ci = BuiltinComparator::new(Collation::CaseInsensitive);
        let upper = Datum::string("B");
        let lower = Datum::string("a");

        assert_eq!(binary.compare(&upper, &lower), Ordering::Less);
        assert_eq!(ci.compare(&upper, &lower), Ordering::Greater);
        assert_eq!(
            ci.compare(&Datum::string("Apple"), &Datum::string("aPPLE")),
            Ordering::Equal
        );
    }

    #[test]
    fn mismatched_types_still_totally_ordered() {
        let c = BuiltinComparator::default();
        assert_eq!(c.compare(&Datum::Bool(true), &Datum::I64(0)), Ordering::Less);
        assert_eq!(c.compare(&Datum::I64(0), &Datum::Bool(true)), Ordering::Greater);
    }
}
