//! Wrapping controller actions into framework handlers.
//!
//! # Responsibilities
//! - Compute the parameter bag for the request
//! - Build the execution context and the completion callback
//! - Invoke the action; render or redirect happen on the response
//!
//! # Design Decisions
//! - Handlers return nothing; side effects live on the response
//! - Action errors bypass render/redirect and go to `Next`
//! - The wrapper never waits on the action; completion is a callback

use std::fmt;
use std::sync::Arc;

use crate::dispatch::context::{Completion, ExecutionContext};
use crate::dispatch::error::DispatchError;
use crate::http::request::RouteRequest;
use crate::http::response::{Redirect, RouteResponse};
use crate::routing::meta::RouteMeta;
use crate::routing::params::{extract, ParamBag};
use crate::routing::pattern::Pattern;

/// A controller action.
///
/// Implemented for any `Fn(ExecutionContext, ParamBag, Completion)`.
pub trait Action: Send + Sync {
    fn call(&self, ctx: ExecutionContext, params: ParamBag, done: Completion);
}

impl<F> Action for F
where
    F: Fn(ExecutionContext, ParamBag, Completion) + Send + Sync,
{
    fn call(&self, ctx: ExecutionContext, params: ParamBag, done: Completion) {
        self(ctx, params, done)
    }
}

/// Box a closure as an [`Action`].
pub fn action<F>(f: F) -> Arc<dyn Action>
where
    F: Fn(ExecutionContext, ParamBag, Completion) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Framework-compatible request handler.
pub type Handler = Arc<dyn Fn(RouteRequest, Arc<dyn RouteResponse>, Next) + Send + Sync>;

/// The surrounding framework's error continuation.
pub struct Next(Box<dyn FnOnce(DispatchError) + Send>);

impl Next {
    pub fn new(f: impl FnOnce(DispatchError) + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    /// A continuation that only logs the error.
    pub fn log() -> Self {
        Self::new(|err| tracing::error!(error = %err, "Unhandled dispatch error"))
    }

    pub fn call(self, err: DispatchError) {
        (self.0)(err)
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Next(..)")
    }
}

/// Wrap `action` into a handler for routes compiled from `pattern`.
///
/// Capture names come from `pattern`, values from the request's bound params.
pub fn wrap_action(action: Arc<dyn Action>, pattern: Pattern, meta: RouteMeta) -> Handler {
    let keys = pattern.keys();
    let meta = Arc::new(meta);

    Arc::new(move |req: RouteRequest, res: Arc<dyn RouteResponse>, next: Next| {
        let params = extract(&req.query, &keys, &req.params);
        tracing::debug!(
            pattern = %pattern,
            target = %meta.target(),
            params = params.len(),
            "Dispatching action"
        );

        let req = Arc::new(req);
        let ctx = ExecutionContext::new(req.app.clone(), meta.clone(), res.clone());
        let done = Completion::new(req, res, next);
        action.call(ctx, params, done);
    })
}

/// Handler for a `redirect` route.
pub fn redirect_handler(to: String) -> Handler {
    Arc::new(move |_req: RouteRequest, res: Arc<dyn RouteResponse>, _next: Next| {
        res.redirect(Redirect::to(to.clone()));
    })
}

/// Placeholder for a controller action that no registry provides.
pub fn unresolved_handler(controller: String, action: String) -> Handler {
    Arc::new(move |_req: RouteRequest, _res: Arc<dyn RouteResponse>, next: Next| {
        next.call(DispatchError::UnknownAction {
            controller: controller.clone(),
            action: action.clone(),
        });
    })
}
