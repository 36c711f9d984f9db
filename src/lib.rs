//! MVC request router.
//!
//! Registers URL patterns against controller actions or redirect targets,
//! matches request paths in registration order, extracts sanitized params
//! and wraps actions into handlers that render or redirect.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::RouterConfig;
pub use dispatch::{Action, Completion, ControllerRegistry, DispatchError, ExecutionContext, View};
pub use http::{AppHandle, HttpServer, RouteRequest, RouteResponse};
pub use routing::{ParamBag, Route, RouteError, RouteMeta, RouteTarget, Router};
