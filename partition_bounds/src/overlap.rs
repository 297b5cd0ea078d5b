//! Validating a new partition's bound against the partitions a relation already has.

use crate::bsearch::BoundProbe;
use crate::canonicalize::PartitionDesc;
use crate::compare::{RangeBound, compare_range_bounds};
use crate::spec::{PartitionBoundSpec, check_datum};
use crate::{Error, Result};
use partition_key::PartitionKey;
use std::cmp::Ordering;
use tracing::debug;

/// Find an existing partition of `desc` that a partition declared with `spec` would share
/// rows with.
///
/// Returns the canonical ordinal of one colliding partition, or `None` if the candidate fits.
/// A candidate the canonicalizer would refuse is rejected whether or not any partitions
/// exist: an empty list, a list declaring null twice, or a range whose lower edge is not
/// below its upper edge.
pub fn find_overlap(
    key: &PartitionKey,
    desc: &PartitionDesc,
    spec: &PartitionBoundSpec,
) -> Result<Option<usize>> {
    spec.ensure_strategy(key)?;

    match spec {
        PartitionBoundSpec::List { values } => {
            if values.is_empty() {
                return Err(Error::EmptyListBound);
            }
            if values.iter().filter(|v| v.is_none()).count() > 1 {
                return Err(Error::DuplicateNull);
            }
            for value in values.iter().flatten() {
                check_datum(key, 0, value)?;
            }
            let Some(info) = desc.boundinfo() else {
                return Ok(None);
            };

            for value in values {
                match value {
                    Some(v) => {
                        let found = info.bsearch(key, BoundProbe::Value(v));
                        if let (Some(offset), true) = (found.offset, found.equal) {
                            return info
                                .index_at(offset)
                                .map(Some)
                                .ok_or(Error::CorruptBoundInfo("list value without a partition"));
                        }
                    }
                    None if info.accepts_nulls() => return Ok(info.null_index()),
                    None => {}
                }
            }
            Ok(None)
        }
        PartitionBoundSpec::Range { lower, upper } => {
            let lower = RangeBound::new(key, None, lower, true)?;
            let upper = RangeBound::new(key, None, upper, false)?;

            if compare_range_bounds(key, lower.datums(), true, upper.datums(), false)
                != Ordering::Less
            {
                return Err(Error::EmptyRange);
            }

            let Some(info) = desc.boundinfo() else {
                return Ok(None);
            };

            // Greatest existing boundary at or below the new lower edge.
            let off1 = info.bsearch(key, BoundProbe::Bound(&lower));

            let with = if !off1.equal && info.index_at(off1.next_slot()).is_none() {
                // The new lower edge sits in a gap; the candidate fits if its upper edge stays
                // inside that same gap.
                let off2 = info.bsearch(key, BoundProbe::Bound(&upper));
                if !off2.equal && off1.offset == off2.offset {
                    return Ok(None);
                }
                let off2 = off2
                    .offset
                    .ok_or(Error::CorruptBoundInfo("upper edge precedes lower edge"))?;
                // A lower edge at off2 belongs to the partition whose upper edge follows it.
                info.index_at(off2).or_else(|| info.index_at(off2 + 1))
            } else {
                info.index_at(off1.next_slot())
            };

            with.map(Some)
                .ok_or(Error::CorruptBoundInfo("overlapping region has no partition"))
        }
    }
}

/// Fail with [`Error::Overlap`] if the partition `name`, declared with `spec`, would share rows
/// with an existing partition of `desc`.
pub fn check_new_partition_bound(
    name: &str,
    key: &PartitionKey,
    desc: &PartitionDesc,
    spec: &PartitionBoundSpec,
) -> Result<()> {
    let Some(ordinal) = find_overlap(key, desc, spec)? else {
        debug!(partition = name, nparts = desc.nparts(), "new partition bound fits");
        return Ok(());
    };

    let existing = desc
        .oid(ordinal)
        .ok_or(Error::CorruptBoundInfo("colliding ordinal out of range"))?;
    debug!(partition = name, %existing, "new partition bound overlaps");

    Err(Error::Overlap {
        partition: name.to_string(),
        existing,
    })
}
