//! Canonical partition bounds.
//!
//! Raw per-partition bound declarations ([`PartitionBoundSpec`]) are turned into a single
//! canonical, deterministic [`PartitionBoundInfo`] per partitioned relation, wrapped in a
//! [`PartitionDesc`] that also records which partition owns each canonical ordinal. The
//! canonical form is what the DDL path checks new partitions against
//! ([`overlap::check_new_partition_bound`]) and what tuple routing binary-searches
//! ([`PartitionBoundInfo::bsearch`]).
//!
//! Descriptors are cached per relation by [`PartitionDescCache`].

use partition_id::RelationId;
use partition_key::{DataType, Datum, PartitionStrategy};
use thiserror::Error;

pub mod bound_info;
pub mod bsearch;
pub mod cache;
pub mod canonicalize;
pub mod compare;
pub mod overlap;
pub mod spec;

#[cfg(test)]
pub(crate) mod test_util;

pub use bound_info::{BoundDatums, PartitionBoundInfo};
pub use bsearch::{BoundProbe, BoundSearch};
pub use cache::{CacheLimits, PartitionDescCache, PartitionSource};
pub use canonicalize::{Canonicalized, PartitionDesc};
pub use compare::{RangeBound, RangeDatum};
pub use overlap::{check_new_partition_bound, find_overlap};
pub use spec::{PartitionBoundSpec, RangeDatumSpec};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Key(#[from] partition_key::Error),

    #[error("invalid strategy in partition bound spec: key is {key} but bound is {bound}")]
    StrategyMismatch {
        key: PartitionStrategy,
        bound: PartitionStrategy,
    },

    #[error("found null more than once in list partition bounds")]
    DuplicateNull,

    #[error("list value {value} is declared by more than one partition")]
    DuplicateListValue { value: Datum },

    #[error("list partition bound must contain at least one value")]
    EmptyListBound,

    #[error("range bound has {actual} values but the partition key has {expected} columns")]
    BoundArityMismatch { expected: usize, actual: usize },

    #[error("bound value {value} for key column {column} has type {actual}, expected {expected}")]
    DatumTypeMismatch {
        column: usize,
        value: Datum,
        expected: DataType,
        actual: DataType,
    },

    #[error("cannot create range partition with empty range")]
    EmptyRange,

    #[error("partition \"{partition}\" would overlap partition {existing}")]
    Overlap {
        partition: String,
        existing: RelationId,
    },

    #[error("partition at input position {position} was given no canonical ordinal")]
    UnassignedPartition { position: usize },

    #[error("canonical partition bounds are malformed: {0}")]
    CorruptBoundInfo(&'static str),

    #[error("relation {0} not found")]
    UnknownRelation(RelationId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
