//! Traits and types shared between the catalog and its routing consumers.

use partition_bounds::{PartitionDesc, PartitionSource};
use partition_id::RelationId;
use partition_key::RowShape;
use std::fmt::Display;
use std::sync::Arc;

/// Table lock levels, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockMode {
    AccessShare,
    RowShare,
    RowExclusive,
    ShareUpdateExclusive,
    Share,
    Exclusive,
    AccessExclusive,
}

impl Display for LockMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AccessShare => "AccessShareLock",
            Self::RowShare => "RowShareLock",
            Self::RowExclusive => "RowExclusiveLock",
            Self::ShareUpdateExclusive => "ShareUpdateExclusiveLock",
            Self::Share => "ShareLock",
            Self::Exclusive => "ExclusiveLock",
            Self::AccessExclusive => "AccessExclusiveLock",
        };
        f.write_str(name)
    }
}

/// Catalog access needed to build and walk a dispatch forest.
pub trait RoutingCatalog: PartitionSource {
    /// Human readable name of `relation`, used in diagnostics.
    fn relation_name(&self, relation: RelationId) -> Option<Arc<str>>;

    /// Physical row layout of `relation`.
    fn row_shape(&self, relation: RelationId) -> Option<Arc<RowShape>>;

    /// The partitioned relation `relation` is attached to, if any.
    fn partition_parent(&self, relation: RelationId) -> Option<RelationId>;

    /// The (possibly cached) partition descriptor of `relation`; `None` if it is not
    /// partitioned.
    fn partition_desc(
        &self,
        relation: RelationId,
    ) -> partition_bounds::Result<Option<Arc<PartitionDesc>>>;

    /// Acquire `mode` on `relation`. Held until the caller releases it, which is outside the
    /// scope of routing.
    fn lock_relation(&self, relation: RelationId, mode: LockMode);

    fn is_partitioned(&self, relation: RelationId) -> bool {
        self.partition_key(relation).is_some()
    }
}
