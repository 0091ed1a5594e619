use crate::conformance::{OpenApiDocument, RouteHandle};
use std::{
    collections::BTreeSet,
    sync::{Mutex, PoisonError},
};

/// Records which declared operations a test suite exercised.
///
/// Shareable between tests running in parallel.
#[derive(Debug, Default)]
pub struct Coverage {
    exercised: Mutex<BTreeSet<(String, String)>>,
}

impl Coverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `method path_template` as exercised.
    pub fn record(&self, method: &str, path_template: &str) {
        self.exercised
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((path_template.to_string(), method.to_uppercase()));
    }

    /// Marks the operation of a matched route as exercised.
    pub fn record_route(&self, route: &RouteHandle) {
        self.record(&route.method, &route.path_template);
    }

    /// Declared `(path template, METHOD)` pairs never recorded.
    pub fn uncovered(&self, document: &OpenApiDocument) -> BTreeSet<(String, String)> {
        let exercised = self
            .exercised
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        document
            .operations()
            .into_iter()
            .filter(|operation| !exercised.contains(operation))
            .collect()
    }
}
