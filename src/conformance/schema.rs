//! Translation of OpenAPI 3.0 schema objects into plain JSON Schema (draft 4).

use crate::conformance::{document::MAX_REF_DEPTH, ConformanceError, OpenApiDocument};
use jsonschema::Draft;
use serde_json::{Map, Value};

/// Which side of the exchange a schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Request,
    Response,
}

impl Direction {
    /// Whether a property with these flags is absent on this side.
    pub(crate) fn hides(&self, property: &Value) -> bool {
        let flag = |name: &str| property.get(name).and_then(Value::as_bool).unwrap_or(false);
        match self {
            Direction::Request => flag("readOnly"),
            Direction::Response => flag("writeOnly"),
        }
    }
}

/// Inlines `$ref`s and rewrites `nullable`.
///
/// Recursive schemas are cut at a fixed depth, below which anything is accepted.
pub(crate) fn prepare(document: &OpenApiDocument, schema: &Value, direction: Direction) -> Value {
    prepare_at(document, schema, direction, 0)
}

fn prepare_at(document: &OpenApiDocument, schema: &Value, direction: Direction, depth: usize) -> Value {
    if depth > MAX_REF_DEPTH {
        return Value::Object(Map::new());
    }

    let schema = document.deref(schema);
    let object = match schema.as_object() {
        Some(object) => object,
        None => return schema.clone(),
    };

    let mut out = Map::new();
    for (key, value) in object {
        let prepared = match key.as_str() {
            "$ref" | "nullable" | "discriminator" | "example" | "xml" | "externalDocs" => continue,
            "properties" => Value::Object(
                value
                    .as_object()
                    .into_iter()
                    .flatten()
                    .map(|(name, property)| {
                        (name.clone(), prepare_at(document, property, direction, depth + 1))
                    })
                    .collect(),
            ),
            "required" => Value::Array(
                value
                    .as_array()
                    .into_iter()
                    .flatten()
                    .filter(|name| {
                        let property = name
                            .as_str()
                            .and_then(|name| object.get("properties")?.get(name))
                            .map(|property| document.deref(property));
                        !property.map(|p| direction.hides(p)).unwrap_or(false)
                    })
                    .cloned()
                    .collect(),
            ),
            "items" | "not" => prepare_at(document, value, direction, depth + 1),
            "additionalProperties" if value.is_object() => {
                prepare_at(document, value, direction, depth + 1)
            }
            "allOf" | "oneOf" | "anyOf" => Value::Array(
                value
                    .as_array()
                    .into_iter()
                    .flatten()
                    .map(|sub| prepare_at(document, sub, direction, depth + 1))
                    .collect(),
            ),
            _ => value.clone(),
        };
        out.insert(key.clone(), prepared);
    }

    // Draft 4 rejects an empty `required` array
    if matches!(out.get("required"), Some(Value::Array(required)) if required.is_empty()) {
        out.remove("required");
    }

    if object.get("nullable").and_then(Value::as_bool) == Some(true) {
        return make_nullable(out);
    }

    Value::Object(out)
}

fn make_nullable(mut schema: Map<String, Value>) -> Value {
    if let Some(Value::Array(values)) = schema.get_mut("enum") {
        if !values.contains(&Value::Null) {
            values.push(Value::Null);
        }
    }

    match schema.get("type").cloned() {
        Some(Value::String(ty)) => {
            schema.insert(
                "type".to_string(),
                Value::Array(vec![Value::String(ty), Value::String("null".to_string())]),
            );
            Value::Object(schema)
        }
        _ => {
            let mut null = Map::new();
            null.insert("type".to_string(), Value::String("null".to_string()));
            let mut any_of = Map::new();
            any_of.insert(
                "anyOf".to_string(),
                Value::Array(vec![Value::Object(schema), Value::Object(null)]),
            );
            Value::Object(any_of)
        }
    }
}

/// Validates `instance` against an already prepared schema.
pub(crate) fn validate(
    schema: &Value,
    instance: &Value,
    context: &str,
) -> Result<(), ConformanceError> {
    let mut options = jsonschema::options();
    options.with_draft(Draft::Draft4);
    let validator = options
        .build(schema)
        .map_err(|e| ConformanceError::InvalidSchema(e.to_string()))?;

    let violations = validator
        .iter_errors(instance)
        .map(|e| format!("{}: {}", e.instance_path, e))
        .collect::<Vec<_>>();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ConformanceError::SchemaViolation {
            context: context.to_string(),
            violations,
        })
    }
}
