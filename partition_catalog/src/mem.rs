//! An in-memory catalog of relations and their partitions.

use crate::interface::{LockMode, RoutingCatalog};
use crate::{Error, Result};
use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use partition_bounds::{
    CacheLimits, PartitionBoundSpec, PartitionDesc, PartitionDescCache, PartitionSource,
    check_new_partition_bound,
};
use partition_id::{CatalogGeneration, RelationId};
use partition_key::{PartitionKey, RowShape, TupleConversionMap};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
struct Relation {
    name: Arc<str>,
    shape: Arc<RowShape>,
    key: Option<Arc<PartitionKey>>,
    /// Attached partitions in attach order, which is the catalog scan order.
    partitions: Vec<RelationId>,
    /// Set while attached to a parent.
    bound: Option<PartitionBoundSpec>,
    parent: Option<RelationId>,
    generation: CatalogGeneration,
}

#[derive(Debug, Default)]
struct State {
    relations: HashMap<RelationId, Relation>,
    by_name: HashMap<Arc<str>, RelationId>,
}

impl State {
    fn get(&self, id: RelationId) -> Result<&Relation> {
        self.relations.get(&id).ok_or(Error::RelationNotFound(id))
    }

    fn get_mut(&mut self, id: RelationId) -> Result<&mut Relation> {
        self.relations.get_mut(&id).ok_or(Error::RelationNotFound(id))
    }

    fn name(&self, id: RelationId) -> String {
        self.relations
            .get(&id)
            .map(|r| r.name.to_string())
            .unwrap_or_else(|| id.to_string())
    }

    /// Whether `ancestor` is `relation` or one of the relations it is (transitively) attached to.
    fn is_ancestor(&self, ancestor: RelationId, relation: RelationId) -> bool {
        let mut current = Some(relation);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.relations.get(&id).and_then(|r| r.parent);
        }
        false
    }
}

/// In-memory catalog holding relations, their partition keys and the bounds of attached
/// partitions.
///
/// Descriptors are served from an internal [`PartitionDescCache`]. Every attach or detach bumps
/// the parent's [`CatalogGeneration`] and drops its cached descriptor. Lock requests are only
/// recorded, see [`MemCatalog::recorded_locks`].
#[derive(Debug, Default)]
pub struct MemCatalog {
    state: RwLock<State>,
    /// Serialises membership changes so that an overlap check and the attach it guards see the
    /// same partitions.
    ddl: Mutex<()>,
    cache: PartitionDescCache,
    locks: Mutex<Vec<(RelationId, LockMode)>>,
}

impl MemCatalog {
    pub fn new(limits: CacheLimits) -> Self {
        Self {
            cache: PartitionDescCache::new(limits),
            ..Default::default()
        }
    }

    /// Create a relation that is not partitioned.
    pub fn create_table(&self, name: &str, shape: RowShape) -> Result<RelationId> {
        self.create(name, shape, None)
    }

    /// Create a relation partitioned by `key`. Plain key columns must exist in `shape` with the
    /// key's types.
    pub fn create_partitioned(
        &self,
        name: &str,
        shape: RowShape,
        key: PartitionKey,
    ) -> Result<RelationId> {
        key.validate_against(&shape)?;
        self.create(name, shape, Some(key))
    }

    fn create(&self, name: &str, shape: RowShape, key: Option<PartitionKey>) -> Result<RelationId> {
        let mut state = self.state.write();
        if state.by_name.contains_key(name) {
            return Err(Error::NameExists(name.to_string()));
        }

        let id = RelationId::new();
        let name: Arc<str> = Arc::from(name);
        info!(relation = %id, %name, partitioned = key.is_some(), "created relation");

        state.by_name.insert(Arc::clone(&name), id);
        state.relations.insert(
            id,
            Relation {
                name,
                shape: Arc::new(shape),
                key: key.map(Arc::new),
                partitions: vec![],
                bound: None,
                parent: None,
                generation: CatalogGeneration::default(),
            },
        );
        Ok(id)
    }

    /// Attach `partition` to the partitioned relation `parent` with bound `bound`.
    ///
    /// Fails without changing anything if the bound does not fit the parent's key, is an empty
    /// range, or overlaps a partition already attached to `parent`.
    pub fn attach_partition(
        &self,
        parent: RelationId,
        partition: RelationId,
        bound: PartitionBoundSpec,
    ) -> Result<()> {
        let _ddl = self.ddl.lock();

        let (partition_name, key) = {
            let state = self.state.read();
            let p = state.get(parent)?;
            let c = state.get(partition)?;

            if parent == partition {
                return Err(Error::SelfAttach {
                    name: c.name.to_string(),
                });
            }
            let key = p.key.as_ref().map(Arc::clone).ok_or_else(|| Error::NotPartitioned {
                name: p.name.to_string(),
            })?;
            if let Some(existing) = c.parent {
                return Err(Error::AlreadyAPartition {
                    name: c.name.to_string(),
                    parent: state.name(existing),
                });
            }
            if state.is_ancestor(partition, parent) {
                return Err(Error::CyclicAttach {
                    partition: c.name.to_string(),
                    parent: p.name.to_string(),
                });
            }

            let shape_mismatch = |reason: String| Error::ShapeMismatch {
                partition: c.name.to_string(),
                parent: p.name.to_string(),
                reason,
            };
            TupleConversionMap::by_name(&p.shape, &c.shape)
                .map_err(|e| shape_mismatch(e.to_string()))?;
            if c.shape.len() != p.shape.len() {
                return Err(shape_mismatch(format!(
                    "has {} columns, expected {}",
                    c.shape.len(),
                    p.shape.len()
                )));
            }

            (c.name.to_string(), key)
        };

        let desc = self
            .cache
            .partition_desc(self, parent)?
            .ok_or(Error::RelationNotFound(parent))?;
        match check_new_partition_bound(&partition_name, &key, &desc, &bound) {
            Ok(()) => {}
            Err(partition_bounds::Error::Overlap {
                partition,
                existing,
            }) => {
                return Err(Error::Overlap {
                    partition,
                    existing: self.state.read().name(existing),
                });
            }
            Err(e) => return Err(e.into()),
        }

        {
            let mut state = self.state.write();
            let c = state.get_mut(partition)?;
            c.bound = Some(bound);
            c.parent = Some(parent);
            let p = state.get_mut(parent)?;
            p.partitions.push(partition);
            p.generation = p.generation.next();
            info!(
                %parent,
                %partition,
                generation = %p.generation,
                nparts = p.partitions.len(),
                "attached partition"
            );
        }
        self.cache.invalidate(parent);

        Ok(())
    }

    /// Detach `partition` from `parent`. The detached relation keeps existing as a standalone
    /// table.
    pub fn detach_partition(&self, parent: RelationId, partition: RelationId) -> Result<()> {
        let _ddl = self.ddl.lock();

        {
            let mut state = self.state.write();
            let c = state.get(partition)?;
            if c.parent != Some(parent) {
                return Err(Error::NotAPartitionOf {
                    partition: c.name.to_string(),
                    parent: state.name(parent),
                });
            }

            let c = state.get_mut(partition)?;
            c.parent = None;
            c.bound = None;
            let p = state.get_mut(parent)?;
            p.partitions.retain(|&id| id != partition);
            p.generation = p.generation.next();
            info!(
                %parent,
                %partition,
                generation = %p.generation,
                nparts = p.partitions.len(),
                "detached partition"
            );
        }
        self.cache.invalidate(parent);

        Ok(())
    }

    /// Partitions attached to `relation`, in attach order.
    pub fn partitions(&self, relation: RelationId) -> Vec<RelationId> {
        self.state
            .read()
            .relations
            .get(&relation)
            .map(|r| r.partitions.clone())
            .unwrap_or_default()
    }

    /// Every lock requested through [`RoutingCatalog::lock_relation`] since the last
    /// [`MemCatalog::release_locks`], in request order.
    pub fn recorded_locks(&self) -> Vec<(RelationId, LockMode)> {
        self.locks.lock().clone()
    }

    /// Release every recorded lock, returning them.
    pub fn release_locks(&self) -> Vec<(RelationId, LockMode)> {
        std::mem::take(&mut *self.locks.lock())
    }

    pub fn cache(&self) -> &PartitionDescCache {
        &self.cache
    }
}

impl PartitionSource for MemCatalog {
    fn partition_key(&self, relation: RelationId) -> Option<Arc<PartitionKey>> {
        self.state
            .read()
            .relations
            .get(&relation)
            .and_then(|r| r.key.as_ref().map(Arc::clone))
    }

    fn partition_bound_specs(
        &self,
        relation: RelationId,
    ) -> partition_bounds::Result<Vec<(RelationId, PartitionBoundSpec)>> {
        let state = self.state.read();
        let r = state
            .relations
            .get(&relation)
            .ok_or(partition_bounds::Error::UnknownRelation(relation))?;

        Ok(r.partitions
            .iter()
            .filter_map(|id| {
                let bound = state.relations.get(id)?.bound.clone()?;
                Some((*id, bound))
            })
            .collect())
    }

    fn generation(&self, relation: RelationId) -> CatalogGeneration {
        self.state
            .read()
            .relations
            .get(&relation)
            .map(|r| r.generation)
            .unwrap_or_default()
    }
}

impl RoutingCatalog for MemCatalog {
    fn relation_name(&self, relation: RelationId) -> Option<Arc<str>> {
        self.state
            .read()
            .relations
            .get(&relation)
            .map(|r| Arc::clone(&r.name))
    }

    fn row_shape(&self, relation: RelationId) -> Option<Arc<RowShape>> {
        self.state
            .read()
            .relations
            .get(&relation)
            .map(|r| Arc::clone(&r.shape))
    }

    fn partition_parent(&self, relation: RelationId) -> Option<RelationId> {
        self.state.read().relations.get(&relation)?.parent
    }

    fn partition_desc(
        &self,
        relation: RelationId,
    ) -> partition_bounds::Result<Option<Arc<PartitionDesc>>> {
        self.cache.partition_desc(self, relation)
    }

    fn lock_relation(&self, relation: RelationId, mode: LockMode) {
        debug!(%relation, %mode, "lock relation");
        self.locks.lock().push((relation, mode));
    }
}
