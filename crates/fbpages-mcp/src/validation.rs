//! Structural argument validation.
//!
//! Checks tool arguments against the `required` list and the primitive
//! `type` of each declared property in a tool's input schema. Semantic
//! constraints (timestamp windows, metric names) are left to the Graph API.

use serde_json::{Map, Value};

/// Validate `arguments` against `schema`, returning the arguments as an object.
///
/// A missing (`null`) argument value is treated as an empty object. Fields
/// that the schema does not declare are passed through untouched.
pub fn validate_arguments(schema: &Value, arguments: Value) -> Result<Value, String> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        Value::Object(map) => Value::Object(map),
        other => {
            return Err(format!(
                "arguments must be an object, got {}",
                type_name(&other)
            ))
        }
    };

    let required = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|r| r.iter().filter_map(|f| f.as_str()).collect::<Vec<_>>())
        .unwrap_or_default();

    let missing: Vec<&str> = required
        .into_iter()
        .filter(|field| arguments.get(*field).map_or(true, Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(format!("missing required field(s): {}", missing.join(", ")));
    }

    if let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) {
        for (field, declared) in properties {
            let value = match arguments.get(field) {
                Some(Value::Null) | None => continue,
                Some(value) => value,
            };
            let expected = match declared.get("type").and_then(|t| t.as_str()) {
                Some(expected) => expected,
                None => continue,
            };
            if !matches_type(expected, value) {
                return Err(format!(
                    "field '{}' must be a {}, got {}",
                    field,
                    expected,
                    type_name(value)
                ));
            }
        }
    }

    Ok(arguments)
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
