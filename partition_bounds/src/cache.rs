//! Process-wide cache of partition descriptors, keyed by relation.

use crate::canonicalize::PartitionDesc;
use crate::spec::PartitionBoundSpec;
use crate::Result;
use hashbrown::HashMap;
use parking_lot::RwLock;
use partition_id::{CatalogGeneration, RelationId};
use partition_key::PartitionKey;
use std::fmt::Debug;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Where partition keys and raw bound declarations are read from.
pub trait PartitionSource: Debug + Send + Sync {
    /// The partition key of `relation`, or `None` if it is not partitioned.
    fn partition_key(&self, relation: RelationId) -> Option<Arc<PartitionKey>>;

    /// The attached partitions of `relation` with their declared bounds, in catalog scan order.
    fn partition_bound_specs(
        &self,
        relation: RelationId,
    ) -> Result<Vec<(RelationId, PartitionBoundSpec)>>;

    /// Version token of `relation`'s partition membership. Any change to the set of partitions
    /// or to their bounds must produce a different token.
    fn generation(&self, relation: RelationId) -> CatalogGeneration;
}

/// Sizing and retention policy of a [`PartitionDescCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    /// Evict the least recently used descriptor once this many are cached.
    pub max_entries: Option<NonZeroUsize>,
    /// Keep the cached descriptor, and so its address, when a rebuild produces an equal one.
    pub retain_unchanged: bool,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            max_entries: None,
            retain_unchanged: true,
        }
    }
}

#[derive(Debug)]
struct Entry {
    generation: CatalogGeneration,
    desc: Arc<PartitionDesc>,
    last_used: AtomicU64,
}

/// Caches one [`PartitionDesc`] per partitioned relation.
///
/// An entry is valid as long as its generation token matches the source's. A stale entry is
/// rebuilt on the next lookup; if the rebuilt descriptor equals the cached one the cached [`Arc`]
/// is kept, so holders of the old descriptor and new readers keep sharing it.
#[derive(Debug, Default)]
pub struct PartitionDescCache {
    limits: CacheLimits,
    entries: RwLock<HashMap<RelationId, Entry>>,
    clock: AtomicU64,
}

impl PartitionDescCache {
    pub fn new(limits: CacheLimits) -> Self {
        Self {
            limits,
            ..Default::default()
        }
    }

    pub fn limits(&self) -> CacheLimits {
        self.limits
    }

    /// The descriptor of `relation`, building it from `source` if not cached at the current
    /// generation. `None` if `relation` is not partitioned.
    pub fn partition_desc(
        &self,
        source: &dyn PartitionSource,
        relation: RelationId,
    ) -> Result<Option<Arc<PartitionDesc>>> {
        let Some(key) = source.partition_key(relation) else {
            return Ok(None);
        };
        let generation = source.generation(relation);

        if let Some(entry) = self.entries.read().get(&relation) {
            if entry.generation == generation {
                entry.last_used.store(self.tick(), Ordering::Relaxed);
                return Ok(Some(Arc::clone(&entry.desc)));
            }
        }

        let specs = source.partition_bound_specs(relation)?;
        let rebuilt = PartitionDesc::build(&key, &specs)?;
        debug!(
            %relation,
            %generation,
            nparts = rebuilt.nparts(),
            strategy = %key.strategy(),
            "built partition descriptor"
        );

        let mut entries = self.entries.write();
        let desc = match entries.get(&relation) {
            Some(old) if self.limits.retain_unchanged && *old.desc == rebuilt => {
                debug!(%relation, %generation, "partition descriptor unchanged, retaining");
                Arc::clone(&old.desc)
            }
            _ => Arc::new(rebuilt),
        };
        entries.insert(
            relation,
            Entry {
                generation,
                desc: Arc::clone(&desc),
                last_used: AtomicU64::new(self.tick()),
            },
        );
        self.evict(&mut entries, relation);

        Ok(Some(desc))
    }

    /// Drop the cached descriptor of `relation`, returning whether there was one.
    pub fn invalidate(&self, relation: RelationId) -> bool {
        let removed = self.entries.write().remove(&relation).is_some();
        if removed {
            debug!(%relation, "invalidated partition descriptor");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Evict least recently used entries, never `keep`, until within `max_entries`.
    fn evict(&self, entries: &mut HashMap<RelationId, Entry>, keep: RelationId) {
        let Some(max) = self.limits.max_entries else {
            return;
        };
        while entries.len() > max.get() {
            let victim = entries
                .iter()
                .filter(|(id, _)| **id != keep)
                .min_by_key(|(_, e)| e.last_used.load(Ordering::Relaxed))
                .map(|(id, _)| *id);
            let Some(victim) = victim else {
                return;
            };
            entries.remove(&victim);
            info!(relation = %victim, max_entries = max.get(), "evicted partition descriptor");
        }
    }
}
