//! Offline harness checking requests and responses against the OpenAPI description
//! of the CoreLedger API.
//!
//! The harness never touches the network. A test builds the request the SDK would
//! send, feeds it to [`Conformance::validate_request`], then validates a sample response
//! with [`Conformance::validate_response`]. Field coverage is checked by comparing
//! [`OpenApiDocument::openapi_request_keys`] and
//! [`OpenApiDocument::openapi_response_keys`] with [`sdk_json_keys`] of the SDK models.

use crate::dispatcher::QueryParams;
use serde_json::{Number, Value};
use std::fmt::{Debug, Formatter};

mod coverage;
mod document;
mod keys;
mod schema;

pub use coverage::Coverage;
pub use document::{OpenApiDocument, RouteHandle};
pub use keys::{difference, sdk_json_keys};

use keys::{is_json, json_schema};
use schema::{prepare, validate, Direction};

/// Reasons a request or a response does not conform to the document.
#[derive(thiserror::Error, Debug)]
pub enum ConformanceError {
    #[error("Failed to load OpenAPI document: {0}")]
    Load(String),
    #[error("No route matches {method} {path}")]
    RouteNotFound { method: String, path: String },
    #[error("Method {method} is not declared for {path}")]
    MethodNotAllowed { method: String, path: String },
    #[error("Unresolved reference `{0}`")]
    UnresolvedRef(String),
    #[error("Missing required {location} parameter `{name}`")]
    MissingParameter { name: String, location: String },
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("Missing required request body")]
    MissingBody,
    #[error("Operation does not accept a request body")]
    UnexpectedBody,
    #[error("Request rejected by the authentication check")]
    Unauthenticated,
    #[error("Status {status} is not declared")]
    UndeclaredStatus { status: u16 },
    #[error("Unsupported content type `{0}`")]
    UnsupportedContentType(String),
    #[error("Response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    #[error("{context} does not match the schema: {}", .violations.join("; "))]
    SchemaViolation {
        context: String,
        violations: Vec<String>,
    },
}

type AuthenticationCheck = Box<dyn Fn(&RouteHandle) -> bool + Send + Sync>;

/// Validator of requests and responses against an [`OpenApiDocument`].
pub struct Conformance {
    document: OpenApiDocument,
    authenticate: AuthenticationCheck,
}

impl Debug for Conformance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conformance")
            .field("base_path", &self.document.base_path())
            .finish_non_exhaustive()
    }
}

impl Conformance {
    /// Creates a harness whose authentication check accepts every request.
    pub fn new(document: OpenApiDocument) -> Self {
        Self {
            document,
            authenticate: Box::new(|_| true),
        }
    }

    /// Replaces the authentication check.
    pub fn with_authentication(
        mut self,
        authenticate: impl Fn(&RouteHandle) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.authenticate = Box::new(authenticate);
        self
    }

    pub fn document(&self) -> &OpenApiDocument {
        &self.document
    }

    /// Validates a request and returns the matched route.
    ///
    /// Checks path and query parameters (presence, type and schema), the JSON body
    /// and finally the authentication check.
    pub fn validate_request(
        &self,
        method: &str,
        path: &str,
        query: &QueryParams,
        body: Option<&Value>,
    ) -> Result<RouteHandle, ConformanceError> {
        let route = self.document.match_route(method, path)?;

        for parameter in self.document.parameters(&route) {
            let name = parameter
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let location = parameter
                .get("in")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let required = parameter
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(location == "path");

            let raw = match location {
                "path" => route.path_params.get(name).map(String::as_str),
                "query" => query.get(name),
                _ => continue,
            };

            match raw {
                Some(raw) => self.validate_parameter(parameter, name, raw)?,
                None if required => {
                    return Err(ConformanceError::MissingParameter {
                        name: name.to_string(),
                        location: location.to_string(),
                    })
                }
                None => {}
            }
        }

        let request_body = route
            .operation
            .get("requestBody")
            .map(|body| self.document.deref(body));
        match (request_body, body) {
            (Some(declared), Some(body)) => {
                if let Some(schema) = json_schema(declared) {
                    let schema = prepare(&self.document, schema, Direction::Request);
                    validate(&schema, body, "Request body")?;
                }
            }
            (Some(declared), None) => {
                if declared.get("required").and_then(Value::as_bool) == Some(true) {
                    return Err(ConformanceError::MissingBody);
                }
            }
            (None, Some(body)) if !body.is_null() => return Err(ConformanceError::UnexpectedBody),
            (None, _) => {}
        }

        if !(self.authenticate)(&route) {
            return Err(ConformanceError::Unauthenticated);
        }

        Ok(route)
    }

    /// Validates a response body against the response declared for `status`.
    ///
    /// JSON bodies are validated against the schema. Images and PDFs are accepted
    /// as-is when the operation declares them.
    pub fn validate_response(
        &self,
        status: u16,
        body: &[u8],
        content_type: &str,
        route: &RouteHandle,
    ) -> Result<(), ConformanceError> {
        let response = self.document.response(route, status)?;

        let content = match response.get("content").and_then(Value::as_object) {
            Some(content) if !content.is_empty() => content,
            _ if body.is_empty() => return Ok(()),
            _ => {
                return Err(ConformanceError::UnsupportedContentType(
                    content_type.to_string(),
                ))
            }
        };

        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let declared = content
            .iter()
            .find(|(declared, _)| media_type_matches(declared, &media_type))
            .map(|(_, media)| media)
            .ok_or_else(|| ConformanceError::UnsupportedContentType(content_type.to_string()))?;

        if is_json(&media_type) {
            let instance: Value = serde_json::from_slice(body)?;
            if let Some(schema) = declared.get("schema") {
                let schema = prepare(&self.document, schema, Direction::Response);
                validate(&schema, &instance, "Response body")?;
            }
            Ok(())
        } else if media_type.starts_with("image/")
            || media_type == "application/pdf"
            || media_type == "application/octet-stream"
        {
            Ok(())
        } else {
            Err(ConformanceError::UnsupportedContentType(
                content_type.to_string(),
            ))
        }
    }

    fn validate_parameter(
        &self,
        parameter: &Value,
        name: &str,
        raw: &str,
    ) -> Result<(), ConformanceError> {
        let schema = match parameter.get("schema") {
            Some(schema) => prepare(&self.document, schema, Direction::Request),
            None => return Ok(()),
        };

        let value = coerce(&schema, raw).ok_or_else(|| ConformanceError::InvalidParameter {
            name: name.to_string(),
            reason: format!("`{}` does not match the declared type", raw),
        })?;

        validate(&schema, &value, &format!("Parameter `{}`", name)).map_err(|e| {
            ConformanceError::InvalidParameter {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

fn media_type_matches(declared: &str, actual: &str) -> bool {
    let declared = declared.trim().to_ascii_lowercase();
    match declared.strip_suffix("/*") {
        Some(prefix) if prefix == "*" => true,
        Some(prefix) => actual.split('/').next() == Some(prefix),
        None => declared == actual,
    }
}

/// Converts a raw parameter string into the JSON type its schema declares.
fn coerce(schema: &Value, raw: &str) -> Option<Value> {
    let ty = match schema.get("type") {
        Some(Value::String(ty)) => ty.as_str(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|ty| *ty != "null")
            .unwrap_or("string"),
        _ => "string",
    };

    match ty {
        "integer" => raw.parse::<i64>().ok().map(Value::from),
        "number" => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        "boolean" => raw.parse::<bool>().ok().map(Value::Bool),
        "array" => {
            let items = schema.get("items").cloned().unwrap_or(Value::Null);
            raw.split(',')
                .map(|item| coerce(&items, item))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array)
        }
        _ => Some(Value::String(raw.to_string())),
    }
}
