//! The canonical bound collection of one partitioned relation.

use crate::compare::RangeDatum;
use partition_key::{Datum, PartitionStrategy};
use serde::{Deserialize, Serialize};

/// Boundary values of a [`PartitionBoundInfo`], strictly ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundDatums {
    /// One value per slot. Null is never stored here, see
    /// [`PartitionBoundInfo::null_index`].
    List(Vec<Datum>),
    /// One key tuple per slot, each column finite or infinite.
    Range(Vec<Vec<RangeDatum>>),
}

/// Canonical, deterministic description of how a relation's rows are divided among its
/// partitions.
///
/// Two relations with the same partitions produce equal collections no matter the order their
/// declarations were read in, because partition ordinals are assigned by first appearance in
/// the sorted boundary sequence.
///
/// # Layout
///
/// `indexes` maps each boundary slot to a canonical partition ordinal:
///
/// * list: one entry per value, the ordinal of the partition accepting it;
/// * range: one entry per boundary plus a trailing one for the region past the last boundary.
///   A slot holds the ordinal of the partition for which that boundary is the (exclusive) upper
///   edge, or `None` when it is a lower edge with nothing below it (a gap).
///
/// # Equality
///
/// [`PartialEq`] compares values structurally rather than with the key's comparators, so any
/// change to the bounds is observed, including one the comparator considers insignificant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionBoundInfo {
    pub(crate) strategy: PartitionStrategy,
    pub(crate) datums: BoundDatums,
    pub(crate) indexes: Vec<Option<usize>>,
    pub(crate) null_index: Option<usize>,
}

impl PartitionBoundInfo {
    pub fn strategy(&self) -> PartitionStrategy {
        self.strategy
    }

    pub fn datums(&self) -> &BoundDatums {
        &self.datums
    }

    /// Number of boundary slots.
    pub fn ndatums(&self) -> usize {
        match &self.datums {
            BoundDatums::List(d) => d.len(),
            BoundDatums::Range(d) => d.len(),
        }
    }

    pub fn indexes(&self) -> &[Option<usize>] {
        &self.indexes
    }

    /// The ordinal stored in slot `slot`, `None` for a gap or a slot past the end.
    #[inline]
    pub fn index_at(&self, slot: usize) -> Option<usize> {
        self.indexes.get(slot).copied().flatten()
    }

    /// Ordinal of the partition accepting null list keys.
    pub fn null_index(&self) -> Option<usize> {
        self.null_index
    }

    pub fn accepts_nulls(&self) -> bool {
        self.null_index.is_some()
    }
}
