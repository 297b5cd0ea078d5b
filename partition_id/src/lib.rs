//! Identity and version tokens shared by the partitioning crates.

use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

/// Identifies a relation (a plain table, a partitioned table, or a partition of either kind).
#[derive(Debug, Copy, Clone, Eq, PartialOrd, Ord, PartialEq, Serialize, Deserialize, Hash)]
pub struct RelationId(u32);

static NEXT_RELATION_ID: AtomicU32 = AtomicU32::new(0);

impl RelationId {
    pub fn new() -> Self {
        Self(
            NEXT_RELATION_ID
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
                .expect("Overflowed with Relation IDs"),
        )
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Default for RelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u32> for RelationId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Display for RelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Version token of a relation's partition membership.
///
/// The catalog bumps a relation's generation every time a partition is attached to, detached
/// from, or altered under it. Cached descriptors remember the generation they were built at and
/// are rebuilt once the catalog reports a different one.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CatalogGeneration(u64);

impl CatalogGeneration {
    pub fn new(generation: u64) -> Self {
        Self(generation)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for CatalogGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}", self.0)
    }
}
