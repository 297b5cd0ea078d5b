//! Binary search over a canonical bound collection.

use crate::bound_info::{BoundDatums, PartitionBoundInfo};
use crate::compare::{
    RangeBound, compare_list_values, compare_range_bound_to_tuple, compare_range_bounds,
};
use partition_key::{Datum, PartitionKey};
use std::cmp::Ordering;

/// What to search a [`PartitionBoundInfo`] for.
#[derive(Debug, Clone, Copy)]
pub enum BoundProbe<'a> {
    /// A list value.
    Value(&'a Datum),
    /// A range edge. Stored slots without an ordinal are treated as lower edges so that equal
    /// valued lower and upper edges are not regarded as equal.
    Bound(&'a RangeBound),
    /// The non-null key tuple of a row being routed through a range partitioned relation.
    Tuple(&'a [Datum]),
}

/// Result of [`PartitionBoundInfo::bsearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundSearch {
    /// Slot of the greatest boundary `<=` the probe; `None` if the probe precedes every
    /// boundary.
    pub offset: Option<usize>,
    /// Whether the boundary at `offset` is equal to the probe.
    pub equal: bool,
}

impl BoundSearch {
    /// The slot just above `offset`: the region from the found boundary up to the next one.
    #[inline]
    pub fn next_slot(&self) -> usize {
        self.offset.map_or(0, |o| o + 1)
    }
}

impl PartitionBoundInfo {
    /// Compare the boundary in slot `offset` to `probe`.
    ///
    /// # Panics
    ///
    /// If the probe kind does not belong to this collection's strategy.
    fn compare_at(&self, key: &PartitionKey, offset: usize, probe: BoundProbe<'_>) -> Ordering {
        match (&self.datums, probe) {
            (BoundDatums::List(values), BoundProbe::Value(v)) => {
                compare_list_values(key, &values[offset], v)
            }
            (BoundDatums::Range(bounds), BoundProbe::Bound(b)) => {
                let lower = self.indexes[offset].is_none();
                compare_range_bounds(key, &bounds[offset], lower, b.datums(), b.is_lower())
            }
            (BoundDatums::Range(bounds), BoundProbe::Tuple(t)) => {
                compare_range_bound_to_tuple(key, &bounds[offset], t)
            }
            (_, probe) => unreachable!(
                "unexpected probe {probe:?} for {} partition bounds",
                self.strategy
            ),
        }
    }

    /// Find the greatest boundary less than or equal to `probe`.
    pub fn bsearch(&self, key: &PartitionKey, probe: BoundProbe<'_>) -> BoundSearch {
        let mut lo: isize = -1;
        let mut hi: isize = self.ndatums() as isize - 1;
        let mut equal = false;

        while lo < hi {
            let mid = (lo + hi + 1) / 2;
            let cmp = self.compare_at(key, mid as usize, probe);
            if cmp != Ordering::Greater {
                lo = mid;
                equal = cmp == Ordering::Equal;
                // Boundaries are unique, nothing further right can be equal too.
                if equal {
                    break;
                }
            } else {
                hi = mid - 1;
            }
        }

        BoundSearch {
            offset: usize::try_from(lo).ok(),
            equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PartitionDesc;
    use crate::test_util::{edge, int_list_key, int_range_key, list, range};
    use partition_id::RelationId;
    use proptest::prelude::*;

    fn list_info(values: &[i64]) -> PartitionBoundInfo {
        let key = int_list_key();
        let partitions: Vec<_> = values
            .iter()
            .map(|v| (RelationId::new(), list(&[Some(*v)])))
            .collect();
        PartitionDesc::build(&key, &partitions)
            .unwrap()
            .boundinfo()
            .cloned()
            .unwrap()
    }

    #[test]
    fn list_search() {
        let key = int_list_key();
        let info = list_info(&[10, 20, 30]);

        let search = |v: i64| info.bsearch(&key, BoundProbe::Value(&Datum::I64(v)));

        assert_eq!(search(5), BoundSearch { offset: None, equal: false });
        assert_eq!(search(10), BoundSearch { offset: Some(0), equal: true });
        assert_eq!(search(25), BoundSearch { offset: Some(1), equal: false });
        assert_eq!(search(30), BoundSearch { offset: Some(2), equal: true });
        assert_eq!(search(99), BoundSearch { offset: Some(2), equal: false });
    }

    #[test]
    fn range_tuple_search() {
        let key = int_range_key(1);
        let desc = PartitionDesc::build(
            &key,
            &[(RelationId::new(), range(10, 20)), (RelationId::new(), range(20, 30))],
        )
        .unwrap();
        let info = desc.boundinfo().unwrap();

        let search = |v: i64| info.bsearch(&key, BoundProbe::Tuple(&[Datum::I64(v)]));

        assert_eq!(search(9).offset, None);
        assert_eq!(search(9).next_slot(), 0);
        assert_eq!(search(10), BoundSearch { offset: Some(0), equal: true });
        assert_eq!(search(19).next_slot(), 1);
        // The upper edge of the first partition is the lower edge of the second.
        assert_eq!(search(20), BoundSearch { offset: Some(1), equal: true });
        assert_eq!(search(20).next_slot(), 2);
        assert_eq!(search(30).next_slot(), 3);
    }

    #[test]
    fn range_bound_search_separates_edges() {
        let key = int_range_key(1);
        let desc = PartitionDesc::build(&key, &[(RelationId::new(), range(10, 20))]).unwrap();
        let info = desc.boundinfo().unwrap();

        // A lower edge at 20 sorts after the stored upper edge at 20.
        let lower = RangeBound::new(&key, None, &edge(&[Some(20)]), true).unwrap();
        assert_eq!(
            info.bsearch(&key, BoundProbe::Bound(&lower)),
            BoundSearch { offset: Some(1), equal: false }
        );

        let upper = RangeBound::new(&key, None, &edge(&[Some(20)]), false).unwrap();
        assert_eq!(
            info.bsearch(&key, BoundProbe::Bound(&upper)),
            BoundSearch { offset: Some(1), equal: true }
        );

        // A stored lower edge only equals a lower edge probe.
        let lower = RangeBound::new(&key, None, &edge(&[Some(10)]), true).unwrap();
        assert_eq!(
            info.bsearch(&key, BoundProbe::Bound(&lower)),
            BoundSearch { offset: Some(0), equal: true }
        );
        let upper = RangeBound::new(&key, None, &edge(&[Some(10)]), false).unwrap();
        assert_eq!(
            info.bsearch(&key, BoundProbe::Bound(&upper)),
            BoundSearch { offset: None, equal: false }
        );
    }

    proptest! {
        #[test]
        fn search_brackets_probe(
            values in prop::collection::btree_set(-500i64..500, 1..50),
            probe in -600i64..600,
        ) {
            let values: Vec<i64> = values.into_iter().collect();
            let key = int_list_key();
            let info = list_info(&values);
            let got = info.bsearch(&key, BoundProbe::Value(&Datum::I64(probe)));

            match got.offset {
                None => prop_assert!(probe < values[0]),
                Some(o) => {
                    prop_assert!(values[o] <= probe);
                    prop_assert_eq!(got.equal, values[o] == probe);
                    if o + 1 < values.len() {
                        prop_assert!(values[o + 1] > probe);
                    } else {
                        prop_assert!(probe >= *values.last().unwrap());
                    }
                }
            }
        }
    }
}
