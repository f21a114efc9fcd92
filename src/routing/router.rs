//! Route registry and lookup.
//!
//! # Responsibilities
//! - Store compiled routes in global registration order
//! - Keep a per-method index of the same routes
//! - Look up the first matching route, or every matching route in order
//!
//! # Design Decisions
//! - Written only while the application is being set up; read-only (and
//!   lock-free) once frozen behind an `Arc`
//! - A single ordered scan: `ALL` and `USE` routes interleave with exact-method
//!   routes by registration index, never by bucket
//! - Explicit NoMatch (`None`) rather than a silent default

use std::collections::HashMap;
use std::fmt;

use axum::http::Method;

use crate::dispatch::chain::Handler;
use crate::routing::matcher::{match_pattern, Capture, PathSegments};
use crate::routing::pattern::{CompileError, Pattern, RouteOptions};

/// Which requests a route is registered for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodFilter {
    /// A single HTTP method; the route must match the whole path.
    Exact(Method),
    /// Any method; the route must match the whole path.
    All,
    /// Any method; the route matches by path prefix (middleware).
    Use,
}

impl MethodFilter {
    pub fn accepts(&self, method: &Method) -> bool {
        match self {
            MethodFilter::Exact(expected) => expected == method,
            MethodFilter::All | MethodFilter::Use => true,
        }
    }

    pub fn is_middleware(&self) -> bool {
        matches!(self, MethodFilter::Use)
    }

    pub fn as_str(&self) -> &str {
        match self {
            MethodFilter::Exact(method) => method.as_str(),
            MethodFilter::All => "ALL",
            MethodFilter::Use => "USE",
        }
    }
}

impl From<Method> for MethodFilter {
    fn from(method: Method) -> Self {
        MethodFilter::Exact(method)
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled registration entry. Immutable once registered.
pub struct Route {
    filter: MethodFilter,
    path: String,
    pattern: Pattern,
    handlers: Vec<Handler>,
    index: usize,
}

impl Route {
    pub fn filter(&self) -> &MethodFilter {
        &self.filter
    }

    /// The path as registered (after group prefixes were applied).
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    /// Position in global registration order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_middleware(&self) -> bool {
        self.filter.is_middleware()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("filter", &self.filter)
            .field("path", &self.path)
            .field("handlers", &self.handlers.len())
            .field("index", &self.index)
            .finish()
    }
}

/// A matched route with the parameters it captured.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: Vec<(&'a str, &'a str)>,
}

impl<'a> RouteMatch<'a> {
    /// Get a parameter value by name.
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }
}

/// Ordered collection of compiled routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    by_filter: HashMap<MethodFilter, Vec<usize>>,
    options: RouteOptions,
}

impl RouteTable {
    pub fn new(options: RouteOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Compile `path` and append a route for `filter`.
    pub fn register(
        &mut self,
        filter: MethodFilter,
        path: &str,
        handlers: Vec<Handler>,
    ) -> Result<&Route, CompileError> {
        let path = normalize(path);
        let pattern = Pattern::compile(&path, self.options)?;
        let index = self.routes.len();

        if handlers.is_empty() {
            tracing::warn!(method = %filter, path = %path, "Route registered without handlers");
        }
        tracing::debug!(method = %filter, path = %path, index, "Route registered");

        self.by_filter.entry(filter.clone()).or_default().push(index);
        self.routes.push(Route {
            filter,
            path,
            pattern,
            handlers,
            index,
        });
        Ok(&self.routes[index])
    }

    /// All routes in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Routes registered for exactly `filter`, in registration order.
    pub fn bucket<'a>(&'a self, filter: &MethodFilter) -> impl Iterator<Item = &'a Route> + 'a {
        self.by_filter
            .get(filter)
            .into_iter()
            .flatten()
            .map(move |&i| &self.routes[i])
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn options(&self) -> RouteOptions {
        self.options
    }

    /// Index of the first route at or after `from` that matches.
    ///
    /// `captures` is cleared and then holds the winning route's parameters.
    pub fn find_from(
        &self,
        from: usize,
        method: &Method,
        path: &str,
        segments: &PathSegments,
        captures: &mut Vec<Capture>,
    ) -> Option<usize> {
        captures.clear();
        self.routes
            .iter()
            .enumerate()
            .skip(from)
            .filter(|(_, route)| route.filter.accepts(method))
            .find(|(_, route)| {
                match_pattern(&route.pattern, path, segments, route.is_middleware(), captures)
            })
            .map(|(i, _)| i)
    }

    /// First matching route for `method` and `path`.
    pub fn find<'a>(&'a self, method: &Method, path: &'a str) -> Option<RouteMatch<'a>> {
        let segments = PathSegments::parse(path);
        let mut captures = Vec::new();
        let index = self.find_from(0, method, path, &segments, &mut captures)?;
        Some(self.route_match(index, path, &captures))
    }

    /// Every matching route in registration order: the full handler chain.
    pub fn matches<'a>(
        &'a self,
        method: &Method,
        path: &'a str,
    ) -> impl Iterator<Item = RouteMatch<'a>> + 'a {
        let method = method.clone();
        let segments = PathSegments::parse(path);
        let mut captures = Vec::new();
        let mut from = 0;
        std::iter::from_fn(move || {
            let index = self.find_from(from, &method, path, &segments, &mut captures)?;
            from = index + 1;
            Some(self.route_match(index, path, &captures))
        })
    }

    fn route_match<'a>(&'a self, index: usize, path: &'a str, captures: &[Capture]) -> RouteMatch<'a> {
        let route = &self.routes[index];
        RouteMatch {
            route,
            params: captures
                .iter()
                .map(|c| (route.pattern.param_name(&c.name), &path[c.value.clone()]))
                .collect(),
        }
    }
}

/// Ensure a leading slash; the empty path is the root.
fn normalize(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::chain::handler;

    fn noop() -> Vec<Handler> {
        vec![handler(|_| Ok(()))]
    }

    fn table(routes: &[(MethodFilter, &str)]) -> RouteTable {
        let mut table = RouteTable::new(RouteOptions::default());
        for (filter, path) in routes {
            table.register(filter.clone(), path, noop()).unwrap();
        }
        table
    }

    #[test]
    fn test_static_route_matches_without_params() {
        let table = table(&[
            (Method::GET.into(), "/users"),
            (Method::GET.into(), "/users/list"),
        ]);
        let found = table.find(&Method::GET, "/users/list").unwrap();
        assert_eq!(found.route.path(), "/users/list");
        assert!(found.params.is_empty());

        let found = table.find(&Method::GET, "/users/").unwrap();
        assert_eq!(found.route.path(), "/users");
    }

    #[test]
    fn test_method_filtering() {
        let table = table(&[(Method::POST.into(), "/items"), (MethodFilter::All, "/any")]);
        assert!(table.find(&Method::GET, "/items").is_none());
        assert!(table.find(&Method::POST, "/items").is_some());
        assert!(table.find(&Method::DELETE, "/any").is_some());
        assert!(table.find(&Method::from_bytes(b"PURGE").unwrap(), "/any").is_some());
    }

    #[test]
    fn test_all_requires_full_path_use_does_not() {
        let table = table(&[(MethodFilter::All, "/product"), (MethodFilter::Use, "/shop")]);
        assert!(table.find(&Method::GET, "/product").is_some());
        assert!(table.find(&Method::GET, "/product/cool").is_none());
        assert!(table.find(&Method::GET, "/shop/cool/thing").is_some());
    }

    #[test]
    fn test_registration_order_wins() {
        let table = table(&[
            (MethodFilter::Use, "/api"),
            (Method::GET.into(), "/api/users/:id"),
            (Method::GET.into(), "/api/users/me"),
        ]);
        let chain: Vec<_> = table
            .matches(&Method::GET, "/api/users/me")
            .map(|m| m.route.index())
            .collect();
        assert_eq!(chain, vec![0, 1, 2]);
        assert_eq!(table.find(&Method::GET, "/api/users/me").unwrap().route.index(), 0);
    }

    #[test]
    fn test_matches_carry_their_own_params() {
        let table = table(&[
            (MethodFilter::Use, "/prefix/:param"),
            (MethodFilter::Use, "/:param/*"),
        ]);
        let path = "/prefix/john";
        let chain: Vec<_> = table.matches(&Method::GET, path).collect();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].param("param"), Some("john"));
        assert_eq!(chain[1].param("param"), Some("prefix"));
        assert_eq!(chain[1].param("*"), Some("john"));
    }

    #[test]
    fn test_matching_is_idempotent() {
        let table = table(&[
            (Method::GET.into(), "/a/:b?/c"),
            (MethodFilter::Use, "/"),
        ]);
        let snapshot = |path: &'static str| {
            table
                .matches(&Method::GET, path)
                .map(|m| (m.route.index(), m.params))
                .collect::<Vec<_>>()
        };
        let first = snapshot("/a/x/c");
        for _ in 0..3 {
            assert_eq!(snapshot("/a/x/c"), first);
        }
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_no_match_is_none() {
        let table = table(&[(Method::GET.into(), "/a"), (MethodFilter::Use, "/b")]);
        assert!(table.find(&Method::GET, "/c").is_none());
        assert!(table.find(&Method::POST, "/a").is_none());
        assert_eq!(table.matches(&Method::GET, "/nothing/here").count(), 0);
    }

    #[test]
    fn test_buckets_and_normalization() {
        let table = table(&[
            (Method::GET.into(), "users"),
            (MethodFilter::Use, ""),
            (Method::GET.into(), "/posts"),
        ]);
        let gets: Vec<_> = table.bucket(&Method::GET.into()).map(|r| r.path()).collect();
        assert_eq!(gets, vec!["/users", "/posts"]);
        let uses: Vec<_> = table.bucket(&MethodFilter::Use).map(|r| r.path()).collect();
        assert_eq!(uses, vec!["/"]);
    }

    #[test]
    fn test_compile_error_surfaces_at_registration() {
        let mut table = RouteTable::new(RouteOptions::default());
        let err = table.register(Method::GET.into(), "/users/:", noop()).unwrap_err();
        assert!(matches!(err, CompileError::EmptyParamName { .. }));
        assert!(table.is_empty());
    }
}
