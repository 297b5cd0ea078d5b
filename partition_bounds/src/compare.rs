//! The total order over partition bounds and key tuples.
//!
//! All comparisons are column-major and stop at the first column that differs. Finite values
//! are ordered with the key column's [`partition_key::KeyComparator`]; infinities need no
//! comparator: negative infinity precedes, and positive infinity follows, every finite value.

use crate::spec::{RangeDatumSpec, check_datum};
use crate::{Error, Result};
use partition_key::{Datum, PartitionKey};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One column of a range bound: a finite value or an infinity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeDatum {
    NegInf,
    Finite(Datum),
    PosInf,
}

impl RangeDatum {
    pub fn is_finite(&self) -> bool {
        matches!(self, Self::Finite(_))
    }

    fn rank(&self) -> i8 {
        match self {
            Self::NegInf => -1,
            Self::Finite(_) => 0,
            Self::PosInf => 1,
        }
    }
}

/// A lower or upper edge of one range partition, ready to be sorted with every other edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeBound {
    /// Input position of the partition the edge came from; `None` for a candidate that is not
    /// part of any collection yet.
    pub(crate) index: Option<usize>,
    pub(crate) datums: Vec<RangeDatum>,
    pub(crate) lower: bool,
}

impl RangeBound {
    /// Build the lower (`lower == true`) or upper edge of a declared range.
    ///
    /// An unbounded column becomes [`RangeDatum::NegInf`] in a lower edge and
    /// [`RangeDatum::PosInf`] in an upper edge.
    pub fn new(
        key: &PartitionKey,
        index: Option<usize>,
        datums: &[RangeDatumSpec],
        lower: bool,
    ) -> Result<Self> {
        if datums.len() != key.num_columns() {
            return Err(Error::BoundArityMismatch {
                expected: key.num_columns(),
                actual: datums.len(),
            });
        }

        let datums = datums
            .iter()
            .enumerate()
            .map(|(column, d)| match d {
                RangeDatumSpec::Value(v) => {
                    check_datum(key, column, v)?;
                    Ok(RangeDatum::Finite(v.clone()))
                }
                RangeDatumSpec::Unbounded if lower => Ok(RangeDatum::NegInf),
                RangeDatumSpec::Unbounded => Ok(RangeDatum::PosInf),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            index,
            datums,
            lower,
        })
    }

    pub fn datums(&self) -> &[RangeDatum] {
        &self.datums
    }

    pub fn is_lower(&self) -> bool {
        self.lower
    }

    /// Compare `self` to `other` under `key`.
    pub fn compare(&self, key: &PartitionKey, other: &Self) -> Ordering {
        compare_range_bounds(key, &self.datums, self.lower, &other.datums, other.lower)
    }

    /// Same values and the same infinity pattern in every column, ignoring which edge each is.
    pub(crate) fn same_values(&self, key: &PartitionKey, other: &Self) -> bool {
        self.datums
            .iter()
            .zip(&other.datums)
            .enumerate()
            .all(|(column, pair)| match pair {
                (RangeDatum::Finite(a), RangeDatum::Finite(b)) => {
                    key.compare_column(column, a, b) == Ordering::Equal
                }
                (a, b) => a == b,
            })
    }
}

/// Compare two values of the (single) list key column.
#[inline]
pub fn compare_list_values(key: &PartitionKey, a: &Datum, b: &Datum) -> Ordering {
    key.compare_column(0, a, b)
}

/// Compare range bound `(datums1, lower1)` to `(datums2, lower2)`.
///
/// When every column compares equal, a lower edge sorts strictly after an upper edge: `[x, ..)`
/// begins exactly where a preceding `(.., x)` ends, and the two are never the same boundary.
///
/// Equal infinities do not end the walk. Columns after them only order edges among each other;
/// against a row's key tuple the infinity decides on its own (see
/// [`compare_range_bound_to_tuple`]).
pub fn compare_range_bounds(
    key: &PartitionKey,
    datums1: &[RangeDatum],
    lower1: bool,
    datums2: &[RangeDatum],
    lower2: bool,
) -> Ordering {
    for (column, pair) in datums1.iter().zip(datums2).enumerate() {
        let cmp = match pair {
            (RangeDatum::Finite(a), RangeDatum::Finite(b)) => key.compare_column(column, a, b),
            (a, b) => a.rank().cmp(&b.rank()),
        };
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    match (lower1, lower2) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Compare the range bound `bound` to the key tuple of a row.
///
/// There is no lower/upper tie break here: a row's key tuple has no edge of its own.
pub fn compare_range_bound_to_tuple(
    key: &PartitionKey,
    bound: &[RangeDatum],
    tuple: &[Datum],
) -> Ordering {
    for (column, (b, t)) in bound.iter().zip(tuple).enumerate() {
        let cmp = match b {
            RangeDatum::NegInf => return Ordering::Less,
            RangeDatum::PosInf => return Ordering::Greater,
            RangeDatum::Finite(b) => key.compare_column(column, b, t),
        };
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    Ordering::Equal
}
