use std::sync::{Arc, Mutex};

use waymark_core::error::SchemaError;
use waymark_core::schema::{
    AttrValue, FieldDef, FieldType, FormatSchema, SchemaRegistry, BUILTIN_FIELDS,
};

fn schema_with_custom_field(name: &str, field_type: FieldType) -> FormatSchema {
    let mut schema = FormatSchema::default();
    schema.fields.push(FieldDef::new(name, field_type));
    schema
}

#[test]
fn test_default_schema_is_valid() {
    let schema = FormatSchema::default();
    schema.validate().unwrap();
    assert_eq!(schema.fields.len(), BUILTIN_FIELDS.len());
    assert_eq!(schema.custom_fields().count(), 0);
}

#[test]
fn test_missing_builtin_rejected() {
    let mut schema = FormatSchema::default();
    schema.fields.retain(|f| f.name != "angle_radians");
    assert!(matches!(
        schema.validate(),
        Err(SchemaError::MissingBuiltin { .. })
    ));
}

#[test]
fn test_builtin_type_mismatch_rejected() {
    let mut schema = FormatSchema::default();
    for field in &mut schema.fields {
        if field.name == "number" {
            field.field_type = FieldType::Str;
        }
    }
    assert!(matches!(
        schema.validate(),
        Err(SchemaError::BuiltinTypeMismatch { .. })
    ));
}

#[test]
fn test_duplicate_field_rejected() {
    let mut schema = schema_with_custom_field("name", FieldType::Str);
    schema.fields.push(FieldDef::new("name", FieldType::Int));
    assert!(matches!(
        schema.validate(),
        Err(SchemaError::DuplicateField { .. })
    ));
}

#[test]
fn test_field_type_tokens() {
    assert_eq!(FieldType::parse("int"), Some(FieldType::Int));
    assert_eq!(FieldType::parse("float"), Some(FieldType::Float));
    assert_eq!(FieldType::parse("str"), Some(FieldType::Str));
    assert_eq!(FieldType::parse("bool"), Some(FieldType::Bool));
    assert_eq!(FieldType::parse("decimal"), None);
}

#[test]
fn test_field_from_tokens() {
    let field = FieldDef::from_tokens("speed", "float").unwrap();
    assert_eq!(field.field_type, FieldType::Float);
    assert!(!field.required);

    assert!(matches!(
        FieldDef::from_tokens("speed", "decimal"),
        Err(SchemaError::MalformedType { .. })
    ));
}

#[test]
fn test_check_attribute() {
    let schema = schema_with_custom_field("speed", FieldType::Float);

    schema
        .check_attribute("speed", &AttrValue::Float(0.5))
        .unwrap();
    // Structured text makes no distinction between 5 and 5.0.
    schema.check_attribute("speed", &AttrValue::Int(5)).unwrap();

    assert!(matches!(
        schema.check_attribute("speed", &AttrValue::Str("fast".to_string())),
        Err(SchemaError::TypeMismatch { .. })
    ));
    assert!(matches!(
        schema.check_attribute("color", &AttrValue::Str("red".to_string())),
        Err(SchemaError::UnknownField { .. })
    ));
    assert!(matches!(
        schema.check_attribute("number", &AttrValue::Int(7)),
        Err(SchemaError::ReservedField { .. })
    ));
}

#[test]
fn test_registry_set_notifies_observers_in_order() {
    let registry = SchemaRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let first = Arc::clone(&log);
    registry.subscribe(Box::new(move |_| {
        first.lock().unwrap().push("first");
        Ok(())
    }));
    let second = Arc::clone(&log);
    registry.subscribe(Box::new(move |_| {
        second.lock().unwrap().push("second");
        Ok(())
    }));

    registry
        .set(schema_with_custom_field("name", FieldType::Str))
        .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    assert!(registry.get().field("name").is_some());
}

#[test]
fn test_registry_rejects_invalid_candidate_without_notifying() {
    let registry = SchemaRegistry::new();
    let notified = Arc::new(Mutex::new(0u32));

    let counter = Arc::clone(&notified);
    registry.subscribe(Box::new(move |_| {
        *counter.lock().unwrap() += 1;
        Ok(())
    }));

    let mut bad = FormatSchema::default();
    bad.fields.retain(|f| f.name != "x");
    let before = registry.get();

    assert!(registry.set(bad).is_err());
    assert_eq!(*notified.lock().unwrap(), 0);
    assert_eq!(registry.get(), before);
}

#[test]
fn test_failing_observer_does_not_block_later_observers() {
    let registry = SchemaRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    registry.subscribe(Box::new(|_| anyhow::bail!("observer exploded")));
    let tail = Arc::clone(&log);
    registry.subscribe(Box::new(move |schema| {
        tail.lock().unwrap().push(schema.fields.len());
        Ok(())
    }));

    registry
        .set(schema_with_custom_field("name", FieldType::Str))
        .unwrap();
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn test_unsubscribe() {
    let registry = SchemaRegistry::new();
    let count = Arc::new(Mutex::new(0u32));

    let counter = Arc::clone(&count);
    let id = registry.subscribe(Box::new(move |_| {
        *counter.lock().unwrap() += 1;
        Ok(())
    }));
    assert_eq!(registry.observer_count(), 1);

    registry.unsubscribe(id);
    assert_eq!(registry.observer_count(), 0);

    registry
        .set(schema_with_custom_field("name", FieldType::Str))
        .unwrap();
    assert_eq!(*count.lock().unwrap(), 0);
}
