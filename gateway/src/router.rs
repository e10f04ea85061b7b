//! Gateway Router
//!
//! Maps an HTTP method and path to the upstream operation serving it.
//! Matching is exact on both; the first registered route wins.

use http::Method;

use crate::adapter::Operation;

/// A registered route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub path: String,
    pub operation: Operation,
}

/// Route table built once at startup
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with every operation under its default `GET` path
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for operation in Operation::ALL {
            table.register(Method::GET, default_path(operation), operation);
        }
        table
    }

    /// Register a route
    pub fn register(
        &mut self,
        method: Method,
        path: impl Into<String>,
        operation: Operation,
    ) -> &mut Self {
        let path = path.into();
        if self.dispatch(&method, &path).is_some() {
            tracing::warn!("Duplicate route {} {}; the first registration wins", method, path);
        }
        self.routes.push(Route {
            method,
            path,
            operation,
        });
        self
    }

    /// Find the route for a request, `None` if nothing matches
    pub fn dispatch(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|route| route.method == *method && route.path == path)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// HTTP path an operation is served on by default
pub fn default_path(operation: Operation) -> &'static str {
    match operation {
        Operation::NewsBulk => "/news",
        Operation::FreshNews => "/fresh-news",
        Operation::DbNews => "/db-news",
        Operation::NewsStream => "/news-stream",
        Operation::Products => "/products",
        Operation::ProductStream => "/product-stream",
    }
}
