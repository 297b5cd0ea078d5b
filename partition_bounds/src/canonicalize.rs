//! Building the canonical bound collection from raw per-partition declarations.

use crate::bound_info::{BoundDatums, PartitionBoundInfo};
use crate::compare::{RangeBound, compare_list_values};
use crate::spec::{PartitionBoundSpec, check_datum};
use crate::{Error, Result};
use partition_id::RelationId;
use partition_key::{Datum, PartitionKey, PartitionStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Output of [`canonicalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonicalized {
    /// `None` when there were no partitions.
    pub boundinfo: Option<PartitionBoundInfo>,
    /// For each input position, the canonical ordinal given to that partition.
    pub mapping: Vec<usize>,
}

/// Build the canonical bound collection for partitions declared with `specs`, in any order.
///
/// Fails if a declaration does not fit `key` (strategy, arity or value types), if more than one
/// null is declared across list partitions, or if two list partitions declare the same value.
pub fn canonicalize<'a>(
    key: &PartitionKey,
    specs: impl IntoIterator<Item = &'a PartitionBoundSpec>,
) -> Result<Canonicalized> {
    let specs: Vec<&PartitionBoundSpec> = specs.into_iter().collect();
    if specs.is_empty() {
        return Ok(Canonicalized {
            boundinfo: None,
            mapping: vec![],
        });
    }

    match key.strategy() {
        PartitionStrategy::List => canonicalize_list(key, &specs),
        PartitionStrategy::Range => canonicalize_range(key, &specs),
    }
}

/// Hands out canonical ordinals in first-appearance order.
#[derive(Debug)]
struct OrdinalTable {
    mapping: Vec<Option<usize>>,
    next: usize,
}

impl OrdinalTable {
    fn new(nparts: usize) -> Self {
        Self {
            mapping: vec![None; nparts],
            next: 0,
        }
    }

    /// The ordinal of the partition at input `position`, assigning the next free one on its
    /// first appearance.
    fn assign(&mut self, position: usize) -> usize {
        let next = &mut self.next;
        *self.mapping[position].get_or_insert_with(|| {
            let ordinal = *next;
            *next += 1;
            ordinal
        })
    }

    fn finish(self) -> Result<Vec<usize>> {
        self.mapping
            .into_iter()
            .enumerate()
            .map(|(position, ordinal)| ordinal.ok_or(Error::UnassignedPartition { position }))
            .collect()
    }
}

fn canonicalize_list(key: &PartitionKey, specs: &[&PartitionBoundSpec]) -> Result<Canonicalized> {
    let mut values: Vec<(&Datum, usize)> = vec![];
    let mut null_owner = None;

    for (position, spec) in specs.iter().enumerate() {
        let declared = match spec {
            PartitionBoundSpec::List { values } => values,
            PartitionBoundSpec::Range { .. } => {
                return Err(Error::StrategyMismatch {
                    key: PartitionStrategy::List,
                    bound: PartitionStrategy::Range,
                });
            }
        };
        if declared.is_empty() {
            return Err(Error::EmptyListBound);
        }

        for value in declared {
            match value {
                Some(d) => {
                    check_datum(key, 0, d)?;
                    values.push((d, position));
                }
                // Nulls never go into the sorted values, only the owner is remembered.
                None => {
                    if null_owner.replace(position).is_some() {
                        return Err(Error::DuplicateNull);
                    }
                }
            }
        }
    }

    values.sort_by(|a, b| compare_list_values(key, a.0, b.0));

    let mut sorted: Vec<(&Datum, usize)> = Vec::with_capacity(values.len());
    for (value, owner) in values {
        if let Some(&(prev, prev_owner)) = sorted.last() {
            if compare_list_values(key, prev, value) == Ordering::Equal {
                if prev_owner == owner {
                    continue;
                }
                return Err(Error::DuplicateListValue {
                    value: value.clone(),
                });
            }
        }
        sorted.push((value, owner));
    }

    let mut ordinals = OrdinalTable::new(specs.len());
    let indexes = sorted
        .iter()
        .map(|&(_, owner)| Some(ordinals.assign(owner)))
        .collect();
    // A partition accepting only null has not been seen by the scan above.
    let null_index = null_owner.map(|owner| ordinals.assign(owner));
    let mapping = ordinals.finish()?;

    Ok(Canonicalized {
        boundinfo: Some(PartitionBoundInfo {
            strategy: PartitionStrategy::List,
            datums: BoundDatums::List(sorted.into_iter().map(|(d, _)| d.clone()).collect()),
            indexes,
            null_index,
        }),
        mapping,
    })
}

fn canonicalize_range(key: &PartitionKey, specs: &[&PartitionBoundSpec]) -> Result<Canonicalized> {
    let mut edges = Vec::with_capacity(2 * specs.len());
    for (position, spec) in specs.iter().enumerate() {
        match spec {
            PartitionBoundSpec::Range { lower, upper } => {
                edges.push(RangeBound::new(key, Some(position), lower, true)?);
                edges.push(RangeBound::new(key, Some(position), upper, false)?);
            }
            PartitionBoundSpec::List { .. } => {
                return Err(Error::StrategyMismatch {
                    key: PartitionStrategy::Range,
                    bound: PartitionStrategy::List,
                });
            }
        }
    }

    edges.sort_by(|a, b| a.compare(key, b));

    // Of a run of edges with equal values only the first survives. Upper edges sort before
    // lower edges of the same value, so a shared boundary keeps the upper edge's partition.
    let mut distinct: Vec<RangeBound> = Vec::with_capacity(edges.len());
    for edge in edges {
        if distinct
            .last()
            .is_some_and(|prev| prev.same_values(key, &edge))
        {
            continue;
        }
        distinct.push(edge);
    }

    let mut ordinals = OrdinalTable::new(specs.len());
    let mut indexes: Vec<Option<usize>> = distinct
        .iter()
        .map(|edge| match (edge.lower, edge.index) {
            // Nothing between the previous boundary and a lower edge belongs to a partition.
            (true, _) => None,
            (false, position) => position.map(|p| ordinals.assign(p)),
        })
        .collect();
    indexes.push(None);
    let mapping = ordinals.finish()?;

    Ok(Canonicalized {
        boundinfo: Some(PartitionBoundInfo {
            strategy: PartitionStrategy::Range,
            datums: BoundDatums::Range(distinct.into_iter().map(|e| e.datums).collect()),
            indexes,
            null_index: None,
        }),
        mapping,
    })
}

/// The partitions of a partitioned relation: their identities ordered by canonical ordinal,
/// and the canonical bound collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionDesc {
    oids: Vec<RelationId>,
    boundinfo: Option<PartitionBoundInfo>,
}

impl PartitionDesc {
    /// Build the descriptor of a relation partitioned by `key` from its partitions' identities
    /// and declarations, in catalog scan order.
    pub fn build(
        key: &PartitionKey,
        partitions: &[(RelationId, PartitionBoundSpec)],
    ) -> Result<Self> {
        let Canonicalized { boundinfo, mapping } =
            canonicalize(key, partitions.iter().map(|(_, spec)| spec))?;

        let mut oids = vec![None; partitions.len()];
        for ((id, _), ordinal) in partitions.iter().zip(mapping) {
            oids[ordinal] = Some(*id);
        }
        let oids = oids
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(Error::CorruptBoundInfo("partition ordinals are not a bijection"))?;

        Ok(Self { oids, boundinfo })
    }

    pub fn nparts(&self) -> usize {
        self.oids.len()
    }

    /// Partition identities indexed by canonical ordinal.
    pub fn oids(&self) -> &[RelationId] {
        &self.oids
    }

    pub fn oid(&self, ordinal: usize) -> Option<RelationId> {
        self.oids.get(ordinal).copied()
    }

    pub fn ordinal_of(&self, partition: RelationId) -> Option<usize> {
        self.oids.iter().position(|&id| id == partition)
    }

    pub fn boundinfo(&self) -> Option<&PartitionBoundInfo> {
        self.boundinfo.as_ref()
    }
}
