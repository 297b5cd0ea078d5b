//! Builders shared by this crate's tests.

use crate::{PartitionBoundSpec, RangeDatumSpec};
use partition_key::{DataType, Datum, PartitionKey, PartitionStrategy};

pub(crate) fn int_list_key() -> PartitionKey {
    PartitionKey::columns(PartitionStrategy::List, [(0, DataType::I64)]).unwrap()
}

pub(crate) fn int_range_key(columns: usize) -> PartitionKey {
    PartitionKey::columns(
        PartitionStrategy::Range,
        (0..columns).map(|i| (i, DataType::I64)),
    )
    .unwrap()
}

/// A list bound over i64 values; `None` is the null marker.
pub(crate) fn list(values: &[Option<i64>]) -> PartitionBoundSpec {
    PartitionBoundSpec::list(values.iter().map(|v| v.map(Datum::I64)))
}

/// A range endpoint over i64 values; `None` is unbounded.
pub(crate) fn edge(values: &[Option<i64>]) -> Vec<RangeDatumSpec> {
    values
        .iter()
        .map(|v| match v {
            Some(v) => RangeDatumSpec::Value(Datum::I64(*v)),
            None => RangeDatumSpec::Unbounded,
        })
        .collect()
}

/// A single column range `[lower, upper)`.
pub(crate) fn range(lower: i64, upper: i64) -> PartitionBoundSpec {
    PartitionBoundSpec::range(edge(&[Some(lower)]), edge(&[Some(upper)]))
}
