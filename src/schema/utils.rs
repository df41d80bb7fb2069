use serde_json::{json, Map, Value};

use super::core::{is_object_schema, Schema, SchemaError};

/// Extend an object schema with `page` and `pageSize` query fields.
///
/// `page` defaults to 1 when absent; `pageSize` is optional. Both must be at
/// least 1.
///
/// # Errors
///
/// Returns [`SchemaError::NotAnObject`] when `filter` is not an object schema.
pub fn paginated_query(filter: &Schema) -> Result<Schema, SchemaError> {
    let mut raw = match filter.raw() {
        Value::Object(map) if is_object_schema(map) => map.clone(),
        _ => {
            return Err(SchemaError::NotAnObject {
                usage: "paginated query".to_string(),
            })
        }
    };

    let mut properties = raw
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(Map::new);
    properties.insert(
        "page".to_string(),
        json!({
            "type": "integer",
            "minimum": 1,
            "default": 1,
            "description": "Page number, starting at 1"
        }),
    );
    properties.insert(
        "pageSize".to_string(),
        json!({
            "type": "integer",
            "minimum": 1,
            "description": "Number of items per page"
        }),
    );
    raw.insert("type".to_string(), json!("object"));
    raw.insert("properties".to_string(), Value::Object(properties));
    Schema::new(Value::Object(raw))
}

/// Wrap an item schema into the paginated list envelope.
///
/// ```json
/// {"items": [item], "info": {"count": 0, "page": 1, "pageSize": 20}}
/// ```
///
/// # Errors
///
/// Returns [`SchemaError::Compile`] when `item` is not a valid schema.
pub fn paginated_response(item: &Schema) -> Result<Schema, SchemaError> {
    Schema::new(json!({
        "type": "object",
        "description": "Paginated list of items",
        "properties": {
            "items": {
                "type": "array",
                "description": "Items on the requested page",
                "items": item.raw(),
            },
            "info": {
                "type": "object",
                "description": "Pagination details",
                "properties": {
                    "count": {"type": "integer", "minimum": 0, "description": "Total number of items"},
                    "page": {"type": "integer", "minimum": 1, "description": "Current page"},
                    "pageSize": {"type": "integer", "minimum": 1, "description": "Items per page"}
                },
                "required": ["count", "page", "pageSize"]
            }
        },
        "required": ["items", "info"]
    }))
}
