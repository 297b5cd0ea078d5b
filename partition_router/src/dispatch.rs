//! Building the flat, breadth-first dispatch structure of a partition hierarchy.

use crate::{Error, Result};
use partition_bounds::PartitionDesc;
use partition_catalog::{LockMode, RoutingCatalog};
use partition_id::RelationId;
use partition_key::{PartitionKey, RowShape, TupleConversionMap};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Where a canonical partition ordinal of a [`PartitionDispatch`] leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchTarget {
    /// Index into [`DispatchForest::leaf_partitions`].
    Leaf(usize),
    /// Index into [`DispatchForest::nodes`].
    Child(usize),
}

/// Routing state of one partitioned relation.
#[derive(Debug)]
pub struct PartitionDispatch {
    pub(crate) relation: RelationId,
    pub(crate) relation_name: Arc<str>,
    pub(crate) key: Arc<PartitionKey>,
    pub(crate) desc: Arc<PartitionDesc>,
    pub(crate) shape: Arc<RowShape>,
    /// Converts rows from the parent node's shape into this relation's; `None` for the root and
    /// for relations laid out like their parent.
    pub(crate) conversion: Option<TupleConversionMap>,
    /// Indexed by canonical partition ordinal.
    pub(crate) targets: Vec<DispatchTarget>,
}

impl PartitionDispatch {
    pub fn relation(&self) -> RelationId {
        self.relation
    }

    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    pub fn key(&self) -> &PartitionKey {
        &self.key
    }

    pub fn desc(&self) -> &PartitionDesc {
        &self.desc
    }

    pub fn shape(&self) -> &RowShape {
        &self.shape
    }

    pub fn conversion(&self) -> Option<&TupleConversionMap> {
        self.conversion.as_ref()
    }

    pub fn targets(&self) -> &[DispatchTarget] {
        &self.targets
    }
}

/// The dispatch nodes of a partition hierarchy, root first, plus its leaf partitions.
///
/// Every relation in the hierarchy was locked with [`DispatchForest::lock_mode`] while the
/// forest was built; releasing those locks is up to the caller once routing is done.
#[derive(Debug)]
pub struct DispatchForest {
    pub(crate) nodes: Vec<PartitionDispatch>,
    leaf_partitions: Vec<RelationId>,
    locked: Vec<RelationId>,
    lock_mode: LockMode,
}

impl DispatchForest {
    /// Build the forest rooted at the partitioned relation `root`.
    ///
    /// Nodes are laid out breadth-first. Within a node partitions are visited in canonical
    /// ordinal order; each leaf takes the next leaf ordinal and each partitioned child the next
    /// node position.
    pub fn build(
        catalog: &dyn RoutingCatalog,
        root: RelationId,
        lock_mode: LockMode,
    ) -> Result<Self> {
        if catalog.row_shape(root).is_none() {
            return Err(Error::RelationNotFound(root));
        }
        if !catalog.is_partitioned(root) {
            return Err(Error::NotPartitioned(root));
        }

        catalog.lock_relation(root, lock_mode);
        let mut locked = vec![root];
        let mut nodes = vec![];
        let mut leaf_partitions = vec![];

        let mut queue: VecDeque<(RelationId, Option<Arc<RowShape>>)> = VecDeque::new();
        queue.push_back((root, None));
        let mut next_node = 1;

        while let Some((relation, parent_shape)) = queue.pop_front() {
            let shape = catalog
                .row_shape(relation)
                .ok_or(Error::RelationNotFound(relation))?;
            let key = catalog
                .partition_key(relation)
                .ok_or(Error::NotPartitioned(relation))?;
            let desc = catalog
                .partition_desc(relation)?
                .ok_or(Error::NotPartitioned(relation))?;
            let relation_name = catalog
                .relation_name(relation)
                .ok_or(Error::RelationNotFound(relation))?;

            let conversion = match &parent_shape {
                Some(parent) => TupleConversionMap::by_name(parent, &shape)?,
                None => None,
            };

            let mut targets = Vec::with_capacity(desc.nparts());
            for &partition in desc.oids() {
                catalog.lock_relation(partition, lock_mode);
                locked.push(partition);

                if catalog.is_partitioned(partition) {
                    targets.push(DispatchTarget::Child(next_node));
                    next_node += 1;
                    queue.push_back((partition, Some(Arc::clone(&shape))));
                } else {
                    targets.push(DispatchTarget::Leaf(leaf_partitions.len()));
                    leaf_partitions.push(partition);
                }
            }

            nodes.push(PartitionDispatch {
                relation,
                relation_name,
                key,
                desc,
                shape,
                conversion,
                targets,
            });
        }

        debug!(
            %root,
            nodes = nodes.len(),
            leaves = leaf_partitions.len(),
            %lock_mode,
            "built partition dispatch forest"
        );

        Ok(Self {
            nodes,
            leaf_partitions,
            locked,
            lock_mode,
        })
    }

    /// Dispatch nodes, the root first.
    pub fn nodes(&self) -> &[PartitionDispatch] {
        &self.nodes
    }

    pub fn root(&self) -> &PartitionDispatch {
        &self.nodes[0]
    }

    /// Leaf partitions indexed by leaf ordinal.
    pub fn leaf_partitions(&self) -> &[RelationId] {
        &self.leaf_partitions
    }

    pub fn leaf_partition(&self, ordinal: usize) -> Option<RelationId> {
        self.leaf_partitions.get(ordinal).copied()
    }

    /// Every relation locked while building, in lock order.
    pub fn locked_relations(&self) -> &[RelationId] {
        &self.locked
    }

    pub fn lock_mode(&self) -> LockMode {
        self.lock_mode
    }
}
