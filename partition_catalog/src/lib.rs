//! The catalog collaborator of partition routing.
//!
//! [`RoutingCatalog`] is everything the dispatch builder needs to know about a partition
//! hierarchy: relation names and row shapes, partition keys, descriptors and a way to lock
//! relations. [`MemCatalog`] is an in-memory implementation that also carries the DDL path
//! (attaching and detaching partitions), used by tests and embedders without persistent storage.

use partition_id::RelationId;
use thiserror::Error;

pub mod interface;
pub mod mem;

pub use interface::{LockMode, RoutingCatalog};
pub use mem::MemCatalog;
pub use partition_bounds::PartitionSource;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Bounds(#[from] partition_bounds::Error),

    #[error(transparent)]
    Key(#[from] partition_key::Error),

    #[error("relation {0} does not exist")]
    RelationNotFound(RelationId),

    #[error("relation \"{0}\" already exists")]
    NameExists(String),

    #[error("table \"{name}\" is not partitioned")]
    NotPartitioned { name: String },

    #[error("\"{name}\" is already a partition of \"{parent}\"")]
    AlreadyAPartition { name: String, parent: String },

    #[error("relation \"{partition}\" is not a partition of relation \"{parent}\"")]
    NotAPartitionOf { partition: String, parent: String },

    #[error("cannot attach \"{name}\" as a partition of itself")]
    SelfAttach { name: String },

    #[error("cannot attach \"{partition}\" as a partition of its own descendant \"{parent}\"")]
    CyclicAttach { partition: String, parent: String },

    #[error("table \"{partition}\" does not have the same columns as \"{parent}\": {reason}")]
    ShapeMismatch {
        partition: String,
        parent: String,
        reason: String,
    },

    #[error("partition \"{partition}\" would overlap partition \"{existing}\"")]
    Overlap { partition: String, existing: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
