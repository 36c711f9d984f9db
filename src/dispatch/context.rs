//! Per-request execution context and completion callback.

use std::sync::Arc;

use serde_json::Value;

use crate::dispatch::error::DispatchError;
use crate::dispatch::handler::Next;
use crate::http::request::{AppHandle, RouteRequest};
use crate::http::response::{Redirect, RenderOptions, RouteResponse};
use crate::routing::meta::RouteMeta;

/// What an action runs against: the app, the current route and a redirect capability.
///
/// Created fresh for every dispatched request and handed to the action by value,
/// so it can be moved into a spawned task.
pub struct ExecutionContext {
    app: AppHandle,
    current_route: Arc<RouteMeta>,
    response: Arc<dyn RouteResponse>,
}

impl ExecutionContext {
    pub(crate) fn new(
        app: AppHandle,
        current_route: Arc<RouteMeta>,
        response: Arc<dyn RouteResponse>,
    ) -> Self {
        Self {
            app,
            current_route,
            response,
        }
    }

    pub fn app(&self) -> &AppHandle {
        &self.app
    }

    pub fn current_route(&self) -> &RouteMeta {
        &self.current_route
    }

    /// Redirect the client, either to a path or with an explicit status:
    ///
    /// ```ignore
    /// ctx.redirect_to("/login");
    /// ctx.redirect_to((301, "/moved"));
    /// ```
    pub fn redirect_to(&self, target: impl Into<Redirect>) {
        let redirect = target.into();
        tracing::debug!(status = ?redirect.status, path = %redirect.path, "Action redirect");
        self.response.redirect(redirect);
    }
}

/// Template and data an action wants rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub template: String,
    pub locals: Value,
}

impl View {
    pub fn new(template: impl Into<String>, locals: Value) -> Self {
        Self {
            template: template.into(),
            locals,
        }
    }
}

/// One-shot completion callback handed to every action.
///
/// Consumed on use, so an action completes at most once.
pub struct Completion {
    request: Arc<RouteRequest>,
    response: Arc<dyn RouteResponse>,
    next: Next,
}

impl Completion {
    pub(crate) fn new(request: Arc<RouteRequest>, response: Arc<dyn RouteResponse>, next: Next) -> Self {
        Self {
            request,
            response,
            next,
        }
    }

    /// Finish the action. `Ok` renders the view; `Err` skips rendering and
    /// hands the error to the framework error chain.
    pub fn complete(self, result: Result<View, DispatchError>) {
        match result {
            Ok(view) => {
                let options = RenderOptions {
                    locals: view.locals,
                    app: self.request.app.clone(),
                    req: self.request,
                };
                self.response.render(&view.template, options);
            }
            Err(err) => self.next.call(err),
        }
    }

    pub fn render(self, template: impl Into<String>, locals: Value) {
        self.complete(Ok(View::new(template, locals)));
    }

    pub fn fail(self, err: impl Into<DispatchError>) {
        self.complete(Err(err.into()));
    }
}
