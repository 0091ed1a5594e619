//! Property name sets used to compare the SDK models with the upstream schemas.

use crate::conformance::{
    document::MAX_REF_DEPTH, schema::Direction, ConformanceError, OpenApiDocument,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Envelope wrappers whose own name is not reported, only their children.
const TRANSPARENT_KEYS: [&str; 2] = ["data", "details"];

impl OpenApiDocument {
    /// Property names of the JSON request body of `method path`.
    ///
    /// `readOnly` properties are left out. Operations without a body yield an empty set.
    pub fn openapi_request_keys(
        &self,
        method: &str,
        path: &str,
    ) -> Result<BTreeSet<String>, ConformanceError> {
        let route = self.match_route(method, path)?;
        let mut keys = BTreeSet::new();

        if let Some(schema) = route
            .operation
            .get("requestBody")
            .map(|body| self.deref(body))
            .and_then(|body| json_schema(body))
        {
            self.collect_keys(schema, Direction::Request, &mut keys, 0);
        }

        Ok(keys)
    }

    /// Property names of the JSON response body of `method path` for `status`.
    ///
    /// `writeOnly` properties are left out.
    pub fn openapi_response_keys(
        &self,
        method: &str,
        path: &str,
        status: u16,
    ) -> Result<BTreeSet<String>, ConformanceError> {
        let route = self.match_route(method, path)?;
        let mut keys = BTreeSet::new();

        if let Some(schema) = json_schema(self.response(&route, status)?) {
            self.collect_keys(schema, Direction::Response, &mut keys, 0);
        }

        Ok(keys)
    }

    fn collect_keys(
        &self,
        schema: &Value,
        direction: Direction,
        keys: &mut BTreeSet<String>,
        depth: usize,
    ) {
        if depth > MAX_REF_DEPTH {
            return;
        }
        let schema = self.deref(schema);

        for combinator in ["allOf", "oneOf", "anyOf"] {
            for sub in schema
                .get(combinator)
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                self.collect_keys(sub, direction, keys, depth + 1);
            }
        }

        if let Some(items) = schema.get("items") {
            self.collect_keys(items, direction, keys, depth + 1);
        }

        for (name, property) in schema
            .get("properties")
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
        {
            if direction.hides(self.deref(property)) {
                continue;
            }
            if !TRANSPARENT_KEYS.contains(&name.as_str()) {
                keys.insert(name.clone());
            }
            self.collect_keys(property, direction, keys, depth + 1);
        }
    }
}

/// Schema of the `application/json` content of a request body or response object.
pub(crate) fn json_schema(body: &Value) -> Option<&Value> {
    body.get("content")?
        .as_object()?
        .iter()
        .find(|(media_type, _)| is_json(media_type))
        .and_then(|(_, media)| media.get("schema"))
}

pub(crate) fn is_json(media_type: &str) -> bool {
    let media_type = media_type.split(';').next().unwrap_or_default().trim();
    media_type.eq_ignore_ascii_case("application/json") || media_type.ends_with("+json")
}

/// Every object key found in the JSON form of `value`, `data`/`details` wrappers excluded.
pub fn sdk_json_keys<T: Serialize + ?Sized>(value: &T) -> Result<BTreeSet<String>, serde_json::Error> {
    let mut keys = BTreeSet::new();
    collect_json_keys(&serde_json::to_value(value)?, &mut keys);
    Ok(keys)
}

fn collect_json_keys(value: &Value, keys: &mut BTreeSet<String>) {
    match value {
        Value::Object(fields) => {
            for (name, field) in fields {
                if !TRANSPARENT_KEYS.contains(&name.as_str()) {
                    keys.insert(name.clone());
                }
                collect_json_keys(field, keys);
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_json_keys(item, keys)),
        _ => {}
    }
}

/// `a \ b`.
pub fn difference(a: &BTreeSet<String>, b: &BTreeSet<String>) -> BTreeSet<String> {
    a.difference(b).cloned().collect()
}
