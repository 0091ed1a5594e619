use crate::conformance::ConformanceError;
use reqwest::Url;
use serde_json::{Map, Value};
use std::{collections::BTreeMap, path::Path};

const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Maximum number of `$ref` hops followed before giving up.
pub(crate) const MAX_REF_DEPTH: usize = 32;

/// An OpenAPI 3 description of the CoreLedger API.
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    root: Value,
    base_path: String,
    routes: Vec<Route>,
}

#[derive(Debug, Clone)]
struct Route {
    template: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

impl Route {
    fn parse(template: &str) -> Self {
        let segments = split_path(template)
            .map(|segment| {
                match segment
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                {
                    Some(name) => Segment::Param(name.to_string()),
                    None => Segment::Literal(segment.to_string()),
                }
            })
            .collect();

        Self {
            template: template.to_string(),
            segments,
        }
    }

    fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    fn matches(&self, segments: &[&str]) -> Option<BTreeMap<String, String>> {
        if self.segments.len() != segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, actual) in self.segments.iter().zip(segments) {
            match expected {
                Segment::Literal(literal) if literal == actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    let value = urlencoding::decode(actual)
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| actual.to_string());
                    params.insert(name.clone(), value);
                }
            }
        }

        Some(params)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Operation of the document matched by a concrete request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteHandle {
    /// Templated path as declared in the document, e.g. `/customers/{uid}`.
    pub path_template: String,
    /// Uppercase HTTP method.
    pub method: String,
    /// Decoded values of the templated path segments.
    pub path_params: BTreeMap<String, String>,
    /// The operation object.
    pub operation: Value,
    pub(crate) path_item_parameters: Vec<Value>,
}

impl OpenApiDocument {
    pub fn from_value(root: Value) -> Result<Self, ConformanceError> {
        let paths = root
            .get("paths")
            .and_then(Value::as_object)
            .ok_or_else(|| ConformanceError::Load("document has no `paths` object".to_string()))?;

        let routes = paths.keys().map(|template| Route::parse(template)).collect();
        let base_path = base_path(&root);

        Ok(Self {
            root,
            base_path,
            routes,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ConformanceError> {
        let root = serde_json::from_str(json).map_err(|e| ConformanceError::Load(e.to_string()))?;
        Self::from_value(root)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConformanceError> {
        let root = serde_yaml::from_str(yaml).map_err(|e| ConformanceError::Load(e.to_string()))?;
        Self::from_value(root)
    }

    /// Loads a document from disk. Files ending in `.json` are parsed as JSON,
    /// anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConformanceError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConformanceError::Load(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    /// Path prefix of the first declared server, without trailing slash.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// All declared `(path template, METHOD)` pairs.
    pub fn operations(&self) -> Vec<(String, String)> {
        let mut operations = Vec::new();
        for route in &self.routes {
            if let Some(item) = self.path_item(&route.template) {
                for method in HTTP_METHODS {
                    if item.contains_key(method) {
                        operations.push((route.template.clone(), method.to_uppercase()));
                    }
                }
            }
        }
        operations
    }

    fn path_item(&self, template: &str) -> Option<&Map<String, Value>> {
        self.root
            .get("paths")
            .and_then(|paths| paths.get(template))
            .map(|item| self.deref(item))
            .and_then(Value::as_object)
    }

    /// Resolves a local `$ref` such as `#/components/schemas/Customer`.
    pub fn resolve_ref(&self, reference: &str) -> Result<&Value, ConformanceError> {
        reference
            .strip_prefix('#')
            .and_then(|pointer| self.root.pointer(pointer))
            .ok_or_else(|| ConformanceError::UnresolvedRef(reference.to_string()))
    }

    /// Follows `$ref` chains until a concrete object is found.
    ///
    /// Unresolvable or overly long chains yield the last value reached.
    pub fn deref<'a>(&'a self, mut value: &'a Value) -> &'a Value {
        for _ in 0..MAX_REF_DEPTH {
            match value.get("$ref").and_then(Value::as_str) {
                Some(reference) => match self.resolve_ref(reference) {
                    Ok(target) => value = target,
                    Err(_) => return value,
                },
                None => return value,
            }
        }
        value
    }

    /// Matches a concrete request against the declared routes.
    ///
    /// `path` may carry the server base path and a query string; both are ignored.
    /// When several templates match, the one with the most literal segments wins.
    pub fn match_route(&self, method: &str, path: &str) -> Result<RouteHandle, ConformanceError> {
        let path = path.split('?').next().unwrap_or_default();
        let relative = if self.base_path.is_empty() {
            path
        } else {
            path.strip_prefix(self.base_path.as_str()).unwrap_or(path)
        };
        let segments = split_path(relative).collect::<Vec<_>>();

        let (route, path_params) = self
            .routes
            .iter()
            .filter_map(|route| route.matches(&segments).map(|params| (route, params)))
            .max_by_key(|(route, _)| route.literal_count())
            .ok_or_else(|| ConformanceError::RouteNotFound {
                method: method.to_uppercase(),
                path: path.to_string(),
            })?;

        let item = self
            .path_item(&route.template)
            .ok_or_else(|| ConformanceError::RouteNotFound {
                method: method.to_uppercase(),
                path: path.to_string(),
            })?;
        let operation = item
            .get(&method.to_lowercase())
            .map(|op| self.deref(op).clone())
            .ok_or_else(|| ConformanceError::MethodNotAllowed {
                method: method.to_uppercase(),
                path: route.template.clone(),
            })?;
        let path_item_parameters = item
            .get("parameters")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(RouteHandle {
            path_template: route.template.clone(),
            method: method.to_uppercase(),
            path_params,
            operation,
            path_item_parameters,
        })
    }

    /// Parameters of an operation, path-level ones overridden by operation-level ones.
    pub(crate) fn parameters<'a>(&'a self, route: &'a RouteHandle) -> Vec<&'a Value> {
        let mut parameters: Vec<&Value> = Vec::new();
        let operation_parameters = route
            .operation
            .get("parameters")
            .and_then(Value::as_array)
            .into_iter()
            .flatten();

        for parameter in route.path_item_parameters.iter().chain(operation_parameters) {
            let parameter = self.deref(parameter);
            let key = |p: &Value| (p.get("name").cloned(), p.get("in").cloned());
            parameters.retain(|existing| key(*existing) != key(parameter));
            parameters.push(parameter);
        }

        parameters
    }

    /// Response object declared for `status`: exact code, then `NXX` range, then `default`.
    pub(crate) fn response<'a>(
        &'a self,
        route: &'a RouteHandle,
        status: u16,
    ) -> Result<&'a Value, ConformanceError> {
        let responses = route
            .operation
            .get("responses")
            .and_then(Value::as_object)
            .ok_or(ConformanceError::UndeclaredStatus { status })?;

        let range = format!("{}XX", status / 100);
        [status.to_string(), range.clone(), range.to_lowercase(), "default".to_string()]
            .iter()
            .find_map(|key| responses.get(key))
            .map(|response| self.deref(response))
            .ok_or(ConformanceError::UndeclaredStatus { status })
    }
}

fn base_path(root: &Value) -> String {
    let server_url = root
        .get("servers")
        .and_then(Value::as_array)
        .and_then(|servers| servers.first())
        .and_then(|server| server.get("url"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let path = match Url::parse(server_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => server_url.to_string(),
    };

    path.trim_end_matches('/').to_string()
}
