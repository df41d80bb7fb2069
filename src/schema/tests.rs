#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use serde_json::json;

fn pet_schema() -> Schema {
    Schema::new(json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "tags": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["name"]
    }))
    .unwrap()
}

#[test]
fn test_invalid_schema_is_rejected() {
    let err = Schema::new(json!({"type": 12})).unwrap_err();
    assert!(matches!(err, SchemaError::Compile { .. }));
}

#[test]
fn test_missing_required_field_is_named() {
    let errors = pet_schema().safe_parse(&json!({})).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "name");
    assert_eq!(errors[0].message, "Required");
}

#[test]
fn test_nested_field_path_is_dotted() {
    let errors = pet_schema()
        .safe_parse(&json!({"name": "Rex", "tags": ["a", 3]}))
        .unwrap_err();
    assert_eq!(errors[0].field, "tags.1");
}

#[test]
fn test_strict_rejects_unknown_keys() {
    let strict = pet_schema().strict().unwrap();
    let errors = strict
        .safe_parse(&json!({"name": "Rex", "color": "brown"}))
        .unwrap_err();
    assert_eq!(errors[0].field, "color");
    assert_eq!(errors[0].message, "Unrecognized key");

    // the lax original still accepts it
    assert!(pet_schema()
        .safe_parse(&json!({"name": "Rex", "color": "brown"}))
        .is_ok());
}

#[test]
fn test_strict_keeps_explicit_additional_properties() {
    let open = Schema::new(json!({
        "type": "object",
        "additionalProperties": true
    }))
    .unwrap();
    assert!(open.strict().unwrap().is_valid(&json!({"anything": 1})));
}

#[test]
fn test_safe_parse_is_idempotent() {
    let schema = pet_schema();
    let first = schema.safe_parse(&json!({"name": "Rex"})).unwrap();
    let second = schema.safe_parse(&first).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_classify_field_kinds() {
    assert_eq!(
        FieldKind::classify(&json!({"type": "number"})).unwrap(),
        FieldKind::Number
    );
    assert_eq!(
        FieldKind::classify(&json!({"type": "string", "format": "date"})).unwrap(),
        FieldKind::Date
    );
    assert_eq!(
        FieldKind::classify(&json!({"type": ["integer", "null"]})).unwrap(),
        FieldKind::Integer
    );
    assert_eq!(
        FieldKind::classify(&json!({"type": "array", "items": {"type": "boolean"}})).unwrap(),
        FieldKind::Array(Box::new(FieldKind::Boolean))
    );
    assert_eq!(
        FieldKind::classify(&json!({"enum": ["a", "b"]})).unwrap(),
        FieldKind::Enum(vec![json!("a"), json!("b")])
    );
    assert!(FieldKind::classify(&json!({"type": "object"})).is_err());
    assert!(FieldKind::classify(&json!({
        "type": "array",
        "items": {"type": "array", "items": {"type": "string"}}
    }))
    .is_err());
}

#[test]
fn test_paginated_query_adds_page_fields() {
    let filter = Schema::new(json!({
        "type": "object",
        "properties": {"name": {"type": "string", "description": "Name filter"}}
    }))
    .unwrap();
    let query = paginated_query(&filter).unwrap();
    let props = query.properties().unwrap();
    assert!(props.contains_key("name"));
    assert_eq!(props["page"]["default"], json!(1));
    assert!(query.is_valid(&json!({"page": 2, "pageSize": 10})));
    assert!(!query.is_valid(&json!({"page": 0})));
}

#[test]
fn test_paginated_response_envelope() {
    let item = Schema::new(json!({"type": "string"})).unwrap();
    let list = paginated_response(&item).unwrap();
    assert!(list.is_valid(&json!({
        "items": ["a", "b"],
        "info": {"count": 2, "page": 1, "pageSize": 20}
    })));
    assert!(!list.is_valid(&json!({"items": [1], "info": {"count": 1, "page": 1, "pageSize": 1}})));
}
