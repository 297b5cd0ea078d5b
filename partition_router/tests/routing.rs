//! Routing rows through catalog-built partition hierarchies.

use assert_matches::assert_matches;
use partition_bounds::{PartitionBoundSpec, RangeDatumSpec};
use partition_catalog::{LockMode, MemCatalog, RoutingCatalog};
use partition_id::RelationId;
use partition_key::{DataType, Datum, PartitionKey, PartitionStrategy, Row, RowShape};
use partition_router::{DispatchForest, NoPartitionFound};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn list(values: &[Option<i64>]) -> PartitionBoundSpec {
    PartitionBoundSpec::list(values.iter().map(|v| v.map(Datum::I64)))
}

fn range(lower: i64, upper: i64) -> PartitionBoundSpec {
    PartitionBoundSpec::range(
        [RangeDatumSpec::Value(Datum::I64(lower))],
        [RangeDatumSpec::Value(Datum::I64(upper))],
    )
}

#[test_log::test(test)]
fn list_partitions_with_null() {
    let catalog = MemCatalog::default();
    let shape = RowShape::new([("v", DataType::I64)]).unwrap();
    let key = PartitionKey::columns(PartitionStrategy::List, [(0, DataType::I64)]).unwrap();
    let root = catalog
        .create_partitioned("measurements", shape.clone(), key)
        .unwrap();

    let p1 = catalog.create_table("p1", shape.clone()).unwrap();
    let p2 = catalog.create_table("p2", shape.clone()).unwrap();
    let p3 = catalog.create_table("p3", shape).unwrap();
    catalog.attach_partition(root, p3, list(&[None])).unwrap();
    catalog.attach_partition(root, p2, list(&[Some(3), Some(4)])).unwrap();
    catalog.attach_partition(root, p1, list(&[Some(1), Some(2)])).unwrap();

    let forest = DispatchForest::build(&catalog, root, LockMode::RowExclusive).unwrap();
    let route = |v: Option<i64>| forest.route_to_partition(&Row::new(vec![v.map(Datum::I64)]));

    assert_eq!(route(Some(2)), Ok(p1));
    assert_eq!(route(Some(3)), Ok(p2));
    assert_eq!(route(None), Ok(p3));

    let err = route(Some(5)).unwrap_err();
    assert_eq!(
        err,
        NoPartitionFound {
            relation: root,
            relation_name: Arc::from("measurements"),
            row: Row::new(vec![Some(Datum::I64(5))]),
        }
    );
    assert_eq!(
        err.to_string(),
        "no partition of relation \"measurements\" found for row: Failing row contains (5)"
    );
}

/// `events` is range partitioned by month. March is sub-partitioned by day and lays its columns
/// out in a different order than its parent.
struct Events {
    catalog: MemCatalog,
    root: RelationId,
    march: RelationId,
    february: RelationId,
    march_early: RelationId,
    march_late: RelationId,
}

fn events() -> Events {
    let catalog = MemCatalog::default();
    let root_shape = RowShape::new([
        ("month", DataType::I64),
        ("day", DataType::I64),
        ("payload", DataType::String),
    ])
    .unwrap();
    let march_shape = RowShape::new([
        ("payload", DataType::String),
        ("day", DataType::I64),
        ("month", DataType::I64),
    ])
    .unwrap();

    let by_month = PartitionKey::columns(PartitionStrategy::Range, [(0, DataType::I64)]).unwrap();
    let root = catalog
        .create_partitioned("events", root_shape.clone(), by_month)
        .unwrap();

    let february = catalog.create_table("events_feb", root_shape).unwrap();
    catalog.attach_partition(root, february, range(2, 3)).unwrap();

    // In march's own layout the day is the second column.
    let by_day = PartitionKey::columns(PartitionStrategy::Range, [(1, DataType::I64)]).unwrap();
    let march = catalog
        .create_partitioned("events_mar", march_shape.clone(), by_day)
        .unwrap();
    catalog.attach_partition(root, march, range(3, 4)).unwrap();

    let march_early = catalog
        .create_table("events_mar_early", march_shape.clone())
        .unwrap();
    let march_late = catalog
        .create_table("events_mar_late", march_shape)
        .unwrap();
    catalog.attach_partition(march, march_early, range(1, 16)).unwrap();
    // Days 16-19 are not covered.
    catalog.attach_partition(march, march_late, range(20, 32)).unwrap();

    Events {
        catalog,
        root,
        march,
        february,
        march_early,
        march_late,
    }
}

fn event(month: i64, day: i64) -> Row {
    Row::new(vec![
        Some(Datum::I64(month)),
        Some(Datum::I64(day)),
        Some(Datum::string("payload")),
    ])
}

#[test_log::test(test)]
fn two_level_hierarchy() {
    let e = events();
    let forest = DispatchForest::build(&e.catalog, e.root, LockMode::RowExclusive).unwrap();

    assert_eq!(forest.route_to_partition(&event(2, 16)), Ok(e.february));
    assert_eq!(forest.route_to_partition(&event(3, 1)), Ok(e.march_early));
    assert_eq!(forest.route_to_partition(&event(3, 31)), Ok(e.march_late));
}

#[test_log::test(test)]
fn failure_names_deepest_relation_reached() {
    let e = events();
    let forest = DispatchForest::build(&e.catalog, e.root, LockMode::RowExclusive).unwrap();

    let err = forest.route(&event(3, 17)).unwrap_err();
    assert_eq!(err.relation, e.march);
    assert_eq!(&*err.relation_name, "events_mar");
    // The row is reported in march's own column order.
    assert_eq!(
        err.row,
        Row::new(vec![
            Some(Datum::string("payload")),
            Some(Datum::I64(17)),
            Some(Datum::I64(3)),
        ])
    );

    // A month nobody covers fails at the root.
    let err = forest.route(&event(4, 1)).unwrap_err();
    assert_eq!(err.relation, e.root);
    assert_eq!(err.row, event(4, 1));
}

#[test]
fn build_locks_whole_hierarchy() {
    let e = events();
    let forest = DispatchForest::build(&e.catalog, e.root, LockMode::RowExclusive).unwrap();

    let mut expected = vec![e.root, e.february, e.march, e.march_early, e.march_late];
    let mut locked: Vec<_> = e
        .catalog
        .recorded_locks()
        .into_iter()
        .map(|(id, mode)| {
            assert_eq!(mode, LockMode::RowExclusive);
            id
        })
        .collect();
    expected.sort();
    locked.sort();
    assert_eq!(locked, expected);
    assert_eq!(forest.locked_relations().len(), 5);

    // Routing does not release anything; the caller does once the forest is done with.
    assert_eq!(forest.route_to_partition(&event(2, 1)), Ok(e.february));
    assert_eq!(e.catalog.release_locks().len(), 5);
    assert!(e.catalog.recorded_locks().is_empty());
}

#[test]
fn forest_reflects_partitions_attached_since_last_build() {
    let e = events();
    let before = DispatchForest::build(&e.catalog, e.root, LockMode::RowExclusive).unwrap();
    assert!(before.route(&event(3, 17)).is_err());

    let gap = e
        .catalog
        .create_table("events_mar_mid", e.catalog.row_shape(e.march).unwrap().as_ref().clone())
        .unwrap();
    e.catalog.attach_partition(e.march, gap, range(16, 20)).unwrap();

    // A forest lives for one routing operation; the old one still sees the old bounds.
    assert!(before.route(&event(3, 17)).is_err());

    let after = DispatchForest::build(&e.catalog, e.root, LockMode::RowExclusive).unwrap();
    assert_eq!(after.route_to_partition(&event(3, 17)), Ok(gap));

    assert_matches!(
        e.catalog.attach_partition(e.march, gap, range(40, 50)),
        Err(partition_catalog::Error::AlreadyAPartition { .. })
    );
}
