//! Route lookup.
//!
//! # Responsibilities
//! - Store registered routes
//! - Look up the route for an exact (method, path)
//! - Return the matched route or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after `build()` (thread-safe without locks)
//! - O(1) lookup via HashMap keyed by (method, path)
//! - No pattern segments, no normalization
//! - Duplicates rejected at registration instead of silently shadowed

use std::collections::{HashMap, HashSet};

use axum::http::Method;
use thiserror::Error;

use crate::routing::route::Route;

/// Route registration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("route {method} {path} is already registered")]
    Duplicate { method: Method, path: String },

    #[error("route {method} {path} declares parameter '{name}' twice")]
    DuplicateParam { method: Method, path: String, name: String },
}

/// Collects routes during process setup.
#[derive(Debug, Default)]
pub struct RouterBuilder {
    routes: HashMap<(Method, String), Route>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, route: Route) -> Result<Self, RegistrationError> {
        self.add(route)?;
        Ok(self)
    }

    pub fn add(&mut self, route: Route) -> Result<(), RegistrationError> {
        let mut seen = HashSet::new();
        for param in route.params() {
            if !seen.insert(param.name()) {
                return Err(RegistrationError::DuplicateParam {
                    method: route.method().clone(),
                    path: route.path().to_string(),
                    name: param.name().to_string(),
                });
            }
        }

        let key = (route.method().clone(), route.path().to_string());
        if self.routes.contains_key(&key) {
            return Err(RegistrationError::Duplicate {
                method: key.0,
                path: key.1,
            });
        }
        self.routes.insert(key, route);
        Ok(())
    }

    /// Freeze the table.
    pub fn build(self) -> Router {
        tracing::debug!(routes = self.routes.len(), "Router built");
        Router { routes: self.routes }
    }
}

/// Frozen route table.
#[derive(Debug, Default)]
pub struct Router {
    routes: HashMap<(Method, String), Route>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn lookup(&self, method: &Method, path: &str) -> Option<&Route> {
        // Owned key: HashMap<(Method, String)> cannot borrow-lookup a tuple of refs.
        self.routes.get(&(method.clone(), path.to_string()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Param;
    use crate::error::RouteError;

    fn route(method: Method, path: &str) -> Route {
        Route::new(method, path, |_args| async { Ok::<_, RouteError>(()) })
    }

    #[test]
    fn test_exact_lookup() {
        let router = Router::builder()
            .route(route(Method::GET, "/item"))
            .unwrap()
            .route(route(Method::POST, "/item"))
            .unwrap()
            .build();

        assert_eq!(router.len(), 2);
        assert!(router.lookup(&Method::GET, "/item").is_some());
        assert!(router.lookup(&Method::POST, "/item").is_some());
        assert!(router.lookup(&Method::GET, "/items").is_none());
        assert!(router.lookup(&Method::GET, "/item/").is_none());
        assert!(router.lookup(&Method::GET, "/Item").is_none());
        assert!(router.lookup(&Method::PUT, "/item").is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = Router::builder()
            .route(route(Method::GET, "/item"))
            .unwrap()
            .route(route(Method::GET, "/item"))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Duplicate { ref path, .. } if path == "/item"));
    }

    #[test]
    fn test_duplicate_param_rejected() {
        let dup = route(Method::GET, "/item").param(Param::text("a")).param(Param::integer("a"));
        let err = Router::builder().route(dup).unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateParam { ref name, .. } if name == "a"));
    }
}
