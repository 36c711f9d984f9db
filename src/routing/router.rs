//! Route table: registration, lookup and handler wrapping.
//!
//! # Responsibilities
//! - Store routes in registration order
//! - Look up the first route matching a request path
//! - Extract request parameters and wrap controller actions
//!
//! # Design Decisions
//! - Mutated only through `&mut self` during startup; shared as
//!   `Arc<Router>` while serving (thread-safe without locks)
//! - O(n) scan in registration order: first match wins, no specificity ranking
//! - Explicit `None` on no match rather than a silent default
//! - Snapshots are owned clones; callers can never reach internal state

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::PathsConfig;
use crate::dispatch::controller::ControllerRegistry;
use crate::dispatch::handler::{
    redirect_handler, unresolved_handler, wrap_action, Action, Handler,
};
use crate::http::request::RouteRequest;
use crate::routing::definitions::load_routes_file;
use crate::routing::error::RouteError;
use crate::routing::meta::{ActionSpec, RouteMeta, RouteTarget};
use crate::routing::params::{self, ParamBag};
use crate::routing::pattern::Pattern;

/// A registered route: normalized pattern, metadata and handler.
#[derive(Clone)]
pub struct Route {
    pub pattern: String,
    pub meta: RouteMeta,
    pub handler: Handler,
}

impl Route {
    pub fn into_parts(self) -> (String, RouteMeta, Handler) {
        (self.pattern, self.meta, self.handler)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// A successful lookup with the bound captures.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub pattern: &'a Pattern,
    pub captures: HashMap<String, String>,
}

struct RouteEntry {
    compiled: Pattern,
    route: Route,
}

/// Ordered route table.
pub struct Router {
    entries: Vec<RouteEntry>,
    paths: PathsConfig,
    controllers: ControllerRegistry,
}

impl Router {
    pub fn new(paths: PathsConfig) -> Self {
        Self {
            entries: Vec::new(),
            paths,
            controllers: ControllerRegistry::new(),
        }
    }

    /// Resolve controller actions from `controllers` for routes registered afterwards.
    pub fn with_controllers(mut self, controllers: ControllerRegistry) -> Self {
        self.controllers = controllers;
        self
    }

    pub fn paths(&self) -> &PathsConfig {
        &self.paths
    }

    /// Append a route and return it.
    ///
    /// `to` is `"controller#action"`, a [`RouteTarget`] or a mapping with
    /// `controller`/`action`/`redirect` keys. Keys of `extra` override keys
    /// from `to`.
    pub fn route(
        &mut self,
        pattern: &str,
        to: impl Into<ActionSpec>,
        extra: Option<Map<String, Value>>,
    ) -> Result<Route, RouteError> {
        let compiled = Pattern::compile(pattern);
        let meta = build_meta(to.into(), extra).map_err(|source| RouteError::InvalidRoute {
            pattern: compiled.as_str().to_string(),
            source: Box::new(source),
        })?;

        let handler = match meta.target() {
            RouteTarget::Controller { controller, action } => {
                match self.controllers.get(controller, action) {
                    Some(found) => wrap_action(found, compiled.clone(), meta.clone()),
                    None => {
                        tracing::debug!(
                            pattern = %compiled,
                            controller = %controller,
                            action = %action,
                            "No action registered, installing placeholder"
                        );
                        unresolved_handler(controller.clone(), action.clone())
                    }
                }
            }
            RouteTarget::Redirect { to } => redirect_handler(to.clone()),
        };

        let route = Route {
            pattern: compiled.as_str().to_string(),
            meta,
            handler,
        };

        tracing::debug!(pattern = %route.pattern, target = %route.meta.target(), "Route registered");

        self.entries.push(RouteEntry {
            compiled,
            route: route.clone(),
        });
        Ok(route)
    }

    /// Snapshot of the table in registration order.
    pub fn routes(&self) -> Vec<Route> {
        self.entries.iter().map(|e| e.route.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register every route of the configured routes file, in file order.
    ///
    /// Returns the number of routes added. Any failure is fatal: a routes
    /// file that cannot be read, parsed or registered is an error, never an
    /// empty table.
    pub fn build_routes(&mut self) -> Result<usize, RouteError> {
        let path = self.paths.routes_path();
        let file = load_routes_file(&path)?;
        let count = file.routes.len();

        for declaration in file.routes {
            self.route(&declaration.pattern, declaration.to, declaration.meta)?;
        }

        tracing::info!(path = %path.display(), routes = count, "Routes built");
        Ok(count)
    }

    /// First route whose pattern matches `path`, in registration order.
    pub fn match_path(&self, path: &str) -> Option<Route> {
        self.resolve(path).map(|m| m.route.clone())
    }

    /// Like [`match_path`](Self::match_path), also returning the captures.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.entries.iter().find_map(|entry| {
            entry.compiled.captures(path).map(|captures| RouteMatch {
                route: &entry.route,
                pattern: &entry.compiled,
                captures,
            })
        })
    }

    /// Sanitized query and path-capture params of an in-flight request.
    pub fn get_params(&self, req: &RouteRequest) -> ParamBag {
        params::get_params(req)
    }

    /// Wrap `action` into a framework handler for `pattern`.
    pub fn get_handler(&self, action: Arc<dyn Action>, pattern: &str, meta: RouteMeta) -> Handler {
        wrap_action(action, Pattern::compile(pattern), meta)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(PathsConfig::default())
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes())
            .field("paths", &self.paths)
            .field("controllers", &self.controllers)
            .finish()
    }
}

fn build_meta(to: ActionSpec, extra: Option<Map<String, Value>>) -> Result<RouteMeta, RouteError> {
    let mut map = to.into_map()?;
    if let Some(extra) = extra {
        for (k, v) in extra {
            map.insert(k, v);
        }
    }
    RouteMeta::try_from(map)
}
