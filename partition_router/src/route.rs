//! Classifying rows against a [`DispatchForest`].

use crate::dispatch::{DispatchForest, DispatchTarget, PartitionDispatch};
use partition_bounds::BoundProbe;
use partition_id::RelationId;
use partition_key::{Datum, PartitionStrategy, Row};
use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// No partition accepts a row.
///
/// Names the deepest partitioned relation the row reached and carries the row as it was laid
/// out for that relation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no partition of relation \"{relation_name}\" found for row: Failing row contains {row}")]
pub struct NoPartitionFound {
    pub relation: RelationId,
    pub relation_name: Arc<str>,
    pub row: Row,
}

impl PartitionDispatch {
    /// Where `row`, laid out in this relation's shape, goes next. `None` if no partition of this
    /// relation accepts it.
    fn find_target(&self, row: &Row) -> Option<DispatchTarget> {
        let info = self.desc.boundinfo()?;
        let key = &*self.key;
        let datums = key.form_key_datums(row);

        let ordinal = match key.strategy() {
            PartitionStrategy::List => match &datums[0] {
                None => info.null_index(),
                Some(value) => {
                    let found = info.bsearch(key, BoundProbe::Value(value));
                    found
                        .offset
                        .filter(|_| found.equal)
                        .and_then(|offset| info.index_at(offset))
                }
            },
            PartitionStrategy::Range => {
                // A null in any key column never matches a range partition.
                let tuple = datums.into_iter().collect::<Option<Vec<Datum>>>()?;
                let found = info.bsearch(key, BoundProbe::Tuple(&tuple));
                // The row lies above the boundary found, so the slot after it says who owns
                // that region.
                info.index_at(found.next_slot())
            }
        }?;

        self.targets.get(ordinal).copied()
    }
}

impl DispatchForest {
    /// Find the leaf ordinal of the partition `row` belongs to.
    ///
    /// `row` must be laid out in the root relation's shape; it is converted on its way down
    /// wherever a partitioned child lays its columns out differently.
    pub fn route(&self, row: &Row) -> Result<usize, NoPartitionFound> {
        let mut row = Cow::Borrowed(row);
        let mut node = self.root();

        loop {
            if let Some(conversion) = &node.conversion {
                row = Cow::Owned(conversion.convert(&row));
            }

            match node.find_target(&row) {
                Some(DispatchTarget::Leaf(leaf)) => {
                    trace!(relation = %node.relation, leaf, "routed row");
                    return Ok(leaf);
                }
                Some(DispatchTarget::Child(child)) => {
                    trace!(relation = %node.relation, child, "descending");
                    node = &self.nodes[child];
                }
                None => {
                    trace!(relation = %node.relation, row = %row, "no partition for row");
                    return Err(NoPartitionFound {
                        relation: node.relation,
                        relation_name: Arc::clone(&node.relation_name),
                        row: row.into_owned(),
                    });
                }
            }
        }
    }

    /// Like [`DispatchForest::route`], returning the leaf partition's identity.
    pub fn route_to_partition(&self, row: &Row) -> Result<RelationId, NoPartitionFound> {
        let leaf = self.route(row)?;
        Ok(self.leaf_partitions()[leaf])
    }
}
