use waymark_core::error::{DocumentError, Error};
use waymark_core::schema::{AttrValue, FieldDef, FieldType, FormatSchema};
use waymark_core::transform::{MapTransform, MetricPoint, PixelPoint};
use waymark_core::waypoint::{normalize_degrees, Waypoint, WaypointAction, WaypointCollection};

fn transform() -> MapTransform {
    MapTransform::new(
        PixelPoint::new(100.0, 100.0),
        MetricPoint::new(0.0, 0.0),
        0.05,
        true,
    )
    .unwrap()
}

fn collection_of(n: u32) -> (WaypointCollection, MapTransform) {
    let t = transform();
    let mut c = WaypointCollection::new();
    for i in 0..n {
        c.add(PixelPoint::new(10.0 * i as f64, 20.0 * i as f64), 0.0, &t);
    }
    (c, t)
}

#[test]
fn test_normalize_degrees() {
    assert_eq!(normalize_degrees(0.0), 0.0);
    assert_eq!(normalize_degrees(360.0), 0.0);
    assert_eq!(normalize_degrees(540.0), 180.0);
    assert_eq!(normalize_degrees(-90.0), 270.0);
    assert!(normalize_degrees(359.999) < 360.0);
}

#[test]
fn test_add_assigns_dense_numbers() {
    let (collection, _) = collection_of(4);
    assert_eq!(collection.numbers(), vec![1, 2, 3, 4]);
}

#[test]
fn test_remove_renumbers_down() {
    // Three waypoints; removing #2 leaves {1, 2} with the old #3 demoted.
    let (mut collection, _) = collection_of(3);
    let third_pixel = collection.get(3).unwrap().pixel();

    let removed = collection.remove(2).unwrap();
    assert_eq!(removed.number(), 2);
    assert_eq!(collection.numbers(), vec![1, 2]);
    assert_eq!(collection.get(2).unwrap().pixel(), third_pixel);
}

#[test]
fn test_remove_unknown_number() {
    let (mut collection, _) = collection_of(2);
    assert!(matches!(
        collection.remove(5),
        Err(DocumentError::UnknownWaypoint { number: 5 })
    ));
    assert!(collection.remove(0).is_err());
}

#[test]
fn test_restore_is_inverse_of_remove() {
    let (mut collection, _) = collection_of(3);
    let before: Vec<_> = collection.iter().cloned().collect();

    let removed = collection.remove(2).unwrap();
    collection.restore(removed);

    let after: Vec<_> = collection.iter().cloned().collect();
    assert_eq!(before, after);
}

#[test]
fn test_reorder_renumbers() {
    let (mut collection, _) = collection_of(3);
    let first_pixel = collection.get(1).unwrap().pixel();

    collection.reorder(1, 3).unwrap();
    assert_eq!(collection.numbers(), vec![1, 2, 3]);
    assert_eq!(collection.get(3).unwrap().pixel(), first_pixel);
}

#[test]
fn test_reorder_clamps_target() {
    let (mut collection, _) = collection_of(3);
    let first_pixel = collection.get(1).unwrap().pixel();
    collection.reorder(1, 99).unwrap();
    assert_eq!(collection.get(3).unwrap().pixel(), first_pixel);
}

#[test]
fn test_mixed_operations_keep_numbering_dense() {
    let (mut collection, t) = collection_of(5);
    collection.remove(3).unwrap();
    collection.add(PixelPoint::new(77.0, 77.0), 45.0, &t);
    collection.reorder(5, 1).unwrap();
    collection.remove(2).unwrap();
    assert_eq!(collection.numbers(), vec![1, 2, 3, 4]);
}

#[test]
fn test_set_position_recomputes_metric() {
    let (mut collection, t) = collection_of(1);
    collection
        .set_position(1, PixelPoint::new(120.0, 80.0), &t)
        .unwrap();
    let wp = collection.get(1).unwrap();
    assert!((wp.metric().x - 1.0).abs() < 1e-12);
    assert!((wp.metric().y - 1.0).abs() < 1e-12);
}

#[test]
fn test_set_angle_normalizes() {
    let (mut collection, _) = collection_of(1);
    collection.set_angle(1, -45.0).unwrap();
    assert_eq!(collection.get(1).unwrap().angle_degrees(), 315.0);
    let radians = collection.get(1).unwrap().angle_radians();
    assert!((radians - 315.0_f64.to_radians()).abs() < 1e-12);
}

#[test]
fn test_set_attribute_checks_schema() {
    let (mut collection, _) = collection_of(1);
    let mut schema = FormatSchema::default();
    schema.fields.push(FieldDef::new("name", FieldType::Str));

    collection
        .set_attribute(1, "name", AttrValue::Str("dock".to_string()), &schema)
        .unwrap();
    assert_eq!(
        collection.get(1).unwrap().attributes().get("name"),
        Some(&AttrValue::Str("dock".to_string()))
    );

    let err = collection
        .set_attribute(1, "color", AttrValue::Str("red".to_string()), &schema)
        .unwrap_err();
    assert!(err.is_schema_error());
    assert!(collection.get(1).unwrap().attributes().get("color").is_none());

    // Built-ins never live in the attribute map.
    let err = collection
        .set_attribute(1, "x", AttrValue::Float(3.0), &schema)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Schema(waymark_core::error::SchemaError::ReservedField { .. })
    ));
}

#[test]
fn test_remove_attribute() {
    let (mut collection, _) = collection_of(1);
    let mut schema = FormatSchema::default();
    schema.fields.push(FieldDef::new("name", FieldType::Str));
    collection
        .set_attribute(1, "name", AttrValue::Str("dock".to_string()), &schema)
        .unwrap();

    let prior = collection.remove_attribute(1, "name").unwrap();
    assert_eq!(prior, Some(AttrValue::Str("dock".to_string())));
    assert_eq!(collection.remove_attribute(1, "name").unwrap(), None);
}

#[test]
fn test_actions() {
    let (mut collection, _) = collection_of(1);
    collection
        .push_action(
            1,
            WaypointAction::new("wait").with_parameter("seconds", AttrValue::Int(5)),
        )
        .unwrap();
    collection.push_action(1, WaypointAction::new("beep")).unwrap();
    assert_eq!(collection.get(1).unwrap().actions().len(), 2);

    let removed = collection.remove_action(1, 0).unwrap();
    assert_eq!(removed.kind, "wait");
    assert_eq!(collection.get(1).unwrap().actions()[0].kind, "beep");

    assert!(collection.remove_action(1, 7).is_err());
}

#[test]
fn test_sync_metric_after_origin_change() {
    let (mut collection, mut t) = collection_of(2);
    t.set_origin(PixelPoint::new(0.0, 0.0), MetricPoint::new(0.0, 0.0), 1.0)
        .unwrap();
    collection.sync_metric(&t);
    let wp = collection.get(2).unwrap();
    assert_eq!(wp.metric().x, wp.pixel().x);
    assert_eq!(wp.metric().y, -wp.pixel().y);
}

#[test]
fn test_from_waypoints_rejects_duplicates() {
    let t = transform();
    let a = Waypoint::new(1, PixelPoint::new(0.0, 0.0), 0.0, &t);
    let b = Waypoint::new(1, PixelPoint::new(5.0, 5.0), 0.0, &t);
    assert!(matches!(
        WaypointCollection::from_waypoints(vec![a, b]),
        Err(DocumentError::DuplicateNumber { number: 1 })
    ));
}

#[test]
fn test_from_waypoints_renumbers_sparse_input() {
    let t = transform();
    let a = Waypoint::new(7, PixelPoint::new(0.0, 0.0), 0.0, &t);
    let b = Waypoint::new(3, PixelPoint::new(5.0, 5.0), 0.0, &t);
    let collection = WaypointCollection::from_waypoints(vec![a, b]).unwrap();
    assert_eq!(collection.numbers(), vec![1, 2]);
    // Order follows the original numbers.
    assert_eq!(collection.get(1).unwrap().pixel(), PixelPoint::new(5.0, 5.0));
}

#[test]
fn test_label_format() {
    let t = transform();
    let wp = Waypoint::new(3, PixelPoint::new(125.0, 92.0), 90.0, &t);
    assert_eq!(wp.label(), "#03 (1.25, 0.40) 90°");
}

#[test]
fn test_clear() {
    let (mut collection, _) = collection_of(3);
    collection.clear();
    assert!(collection.is_empty());
}
