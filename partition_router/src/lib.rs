//! Routing rows through a partition hierarchy.
//!
//! A [`DispatchForest`] is built once per routing operation from the catalog: one
//! [`PartitionDispatch`] node per partitioned relation in the hierarchy, in breadth-first order,
//! each mapping its partitions' canonical ordinals either to a leaf partition or to another
//! node. [`DispatchForest::route`] then classifies rows against it without touching the catalog
//! again.

use partition_id::RelationId;
use thiserror::Error;

pub mod dispatch;
pub mod route;

pub use dispatch::{DispatchForest, DispatchTarget, PartitionDispatch};
pub use route::NoPartitionFound;

/// Errors building a [`DispatchForest`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Bounds(#[from] partition_bounds::Error),

    #[error(transparent)]
    Key(#[from] partition_key::Error),

    #[error("relation {0} does not exist")]
    RelationNotFound(RelationId),

    #[error("relation {0} is not partitioned")]
    NotPartitioned(RelationId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
