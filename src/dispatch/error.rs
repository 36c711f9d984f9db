//! Errors surfaced through the framework error path.

use thiserror::Error;

use crate::http::response::RenderError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no action `{action}` registered for controller `{controller}`")]
    UnknownAction { controller: String, action: String },

    #[error("action failed: {0}")]
    Action(Box<dyn std::error::Error + Send + Sync>),

    #[error("action finished without rendering or redirecting")]
    Abandoned,

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl DispatchError {
    /// Wrap an arbitrary action failure.
    pub fn action(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        DispatchError::Action(err.into())
    }
}
