//! Insertion-ordered route storage.
//!
//! The registry owns the route table the pipeline matches against. Routes are
//! added during setup, optionally linted for documentation first, and never
//! change afterwards.

use http::Method;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::linter::{format_lint_issues, lint_route, LintIssue};
use crate::route::{Route, RouteType};
use crate::router::{ParamVec, Router};

/// Why a route was not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The route failed the description check
    Lint {
        /// Route as `METHOD:path`
        route: String,
        /// Every issue found on the route
        issues: Vec<LintIssue>,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Lint { route, issues } => write!(
                f,
                "route '{}' failed the description check: {}",
                route,
                format_lint_issues(issues)
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

/// A matched route with its raw path parameters.
pub struct Resolved<R, C> {
    pub route: Arc<Route<R, C>>,
    pub path_params: ParamVec,
}

/// Routes in registration order.
pub struct RouteRegistry<R, C> {
    router: Router<Arc<Route<R, C>>>,
    check_descriptions: bool,
}

impl<R, C> RouteRegistry<R, C>
where
    R: RouteType,
    C: Send + Sync + 'static,
{
    /// An empty registry. With `check_descriptions` set, each route is
    /// linted before it is stored.
    #[must_use]
    pub fn new(check_descriptions: bool) -> Self {
        Self {
            router: Router::new(),
            check_descriptions,
        }
    }

    /// Store one route as is.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Lint`] if the description check is on and
    /// the route has issues. Nothing is stored in that case.
    pub fn add_route(&mut self, route: Route<R, C>) -> Result<(), RegistryError> {
        if self.check_descriptions {
            let issues = lint_route(&route);
            if !issues.is_empty() {
                return Err(RegistryError::Lint {
                    route: format!("{}:{}", route.method(), route.path()),
                    issues,
                });
            }
        }
        info!(
            method = %route.method(),
            path = %route.path(),
            route_type = %route.route_type(),
            "Route added"
        );
        let method = route.method().clone();
        let path = route.path().to_string();
        self.router.insert(method, &path, Arc::new(route));
        Ok(())
    }

    /// Mount routes under `prefix`. Each route is copied with the prefix
    /// prepended; the originals are not modified.
    ///
    /// # Errors
    ///
    /// Stops at the first route that fails the description check. Routes
    /// before it stay registered.
    pub fn add_routes<'r, I>(&mut self, prefix: &str, routes: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = &'r Route<R, C>>,
    {
        for route in routes {
            self.add_route(route.with_path_prefix(prefix))?;
        }
        Ok(())
    }

    /// Mount several route groups, each under its own prefix.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add_routes`].
    pub fn add_route_map<'r, M, I>(&mut self, map: M) -> Result<(), RegistryError>
    where
        M: IntoIterator<Item = (&'r str, I)>,
        I: IntoIterator<Item = &'r Route<R, C>>,
    {
        for (prefix, routes) in map {
            debug!(prefix = %prefix, "Mounting route group");
            self.add_routes(prefix, routes)?;
        }
        Ok(())
    }

    /// The first registered route matching `method` and `path`.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Option<Resolved<R, C>> {
        self.router.match_route(method, path).map(|m| Resolved {
            route: Arc::clone(m.value),
            path_params: m.path_params,
        })
    }

    /// Registered routes in order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route<R, C>>> {
        self.router.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.router.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.router.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::config::Config;
    use crate::route::SampleRouteType;
    use serde_json::json;

    fn route(path: &str, description: &str) -> Route<SampleRouteType, ()> {
        let config = Config::default_config().unwrap();
        config
            .factory()
            .create(
                Route::builder(SampleRouteType::Public, Method::GET, path)
                    .description(description)
                    .handler(|_ctx| async { Ok(json!(null)) }),
            )
            .unwrap()
    }

    #[test]
    fn test_prefix_copies_route() {
        let original = route("/one", "First route in the group");
        let mut registry = RouteRegistry::new(true);
        registry.add_routes("/group", [&original]).unwrap();

        assert_eq!(original.path(), "/one");
        let stored: Vec<_> = registry.routes().map(|r| r.path().to_string()).collect();
        assert_eq!(stored, vec!["/group/one"]);
        assert!(registry.resolve(&Method::GET, "/group/one").is_some());
        assert!(registry.resolve(&Method::GET, "/one").is_none());
    }

    #[test]
    fn test_lint_failure_rejects_route() {
        let mut registry = RouteRegistry::new(true);
        let err = registry.add_route(route("/short", "tiny")).unwrap_err();
        let RegistryError::Lint { route, issues } = &err;
        assert_eq!(route, "GET:/short");
        assert_eq!(issues.len(), 1);
        assert!(err.to_string().contains("Description for /short is missing or too small"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lint_can_be_skipped() {
        let mut registry = RouteRegistry::new(false);
        registry.add_route(route("/short", "tiny")).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_route_map_mounts_each_group() {
        let a = route("/one", "Route one of group one");
        let b = route("/two", "Route two of group two");
        let c = route("/three", "Route three of group one");
        let mut registry = RouteRegistry::new(true);
        registry
            .add_route_map([("/path1", vec![&a, &c]), ("/path2", vec![&b])])
            .unwrap();

        assert!(registry.resolve(&Method::GET, "/path1/one").is_some());
        assert!(registry.resolve(&Method::GET, "/path1/three").is_some());
        assert!(registry.resolve(&Method::GET, "/path2/two").is_some());
        assert!(registry.resolve(&Method::GET, "/path1/two").is_none());
    }
}
