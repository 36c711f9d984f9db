//! Action dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Matched route (pattern, meta, handler)
//!     → handler.rs (params via routing::params, fresh ExecutionContext)
//!     → action(ctx, params, completion)
//!         ctx.redirect_to(..)          → response.redirect(..)
//!         completion.complete(Ok(view)) → response.render(template, {locals, app, req})
//!         completion.complete(Err(e))   → next(e)  (framework error chain)
//! ```
//!
//! # Design Decisions
//! - The context is an explicit value, not an implicit receiver
//! - Completion is one-shot and may outlive the handler call (async actions)
//! - Controllers are looked up once, at route registration

pub mod context;
pub mod controller;
pub mod error;
pub mod handler;

pub use context::{Completion, ExecutionContext, View};
pub use controller::ControllerRegistry;
pub use error::DispatchError;
pub use handler::{action, Action, Handler, Next};
