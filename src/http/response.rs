//! Response side contracts.
//!
//! # Responsibilities
//! - `RouteResponse`: the two side effects a wrapped handler can trigger
//!   (render a template, redirect)
//! - `ViewRenderer`: the view engine contract used by the HTTP adapter
//!
//! # Design Decisions
//! - Handlers never return a value; everything observable happens on the
//!   response object
//! - A redirect without status leaves the status choice to the framework
//!   (302 in the HTTP adapter)

use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;

use crate::http::request::{AppHandle, RouteRequest};

/// Options passed to `render`: the action's view data plus the app and request.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub locals: Value,
    pub app: AppHandle,
    pub req: Arc<RouteRequest>,
}

/// A redirect issued by an action or a redirect route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub status: Option<u16>,
    pub path: String,
}

impl Redirect {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            status: None,
            path: path.into(),
        }
    }

    pub fn with_status(status: u16, path: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            path: path.into(),
        }
    }
}

impl From<&str> for Redirect {
    fn from(path: &str) -> Self {
        Redirect::to(path)
    }
}

impl From<String> for Redirect {
    fn from(path: String) -> Self {
        Redirect::to(path)
    }
}

impl From<(u16, &str)> for Redirect {
    fn from((status, path): (u16, &str)) -> Self {
        Redirect::with_status(status, path)
    }
}

impl From<(u16, String)> for Redirect {
    fn from((status, path): (u16, String)) -> Self {
        Redirect::with_status(status, path)
    }
}

/// Outgoing response as seen by a wrapped handler.
pub trait RouteResponse: Send + Sync {
    /// Render `template` with `options`.
    fn render(&self, template: &str, options: RenderOptions);

    /// Redirect the client.
    fn redirect(&self, redirect: Redirect);
}

#[derive(Debug, Error)]
#[error("failed to render `{template}`: {message}")]
pub struct RenderError {
    pub template: String,
    pub message: String,
}

/// View engine contract.
pub trait ViewRenderer: Send + Sync {
    /// Content type of rendered output.
    fn content_type(&self) -> &'static str;

    fn render(&self, template: &str, options: &RenderOptions) -> Result<String, RenderError>;
}

/// Renders the template name, request path and locals as a JSON document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonViewRenderer;

impl ViewRenderer for JsonViewRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, template: &str, options: &RenderOptions) -> Result<String, RenderError> {
        let doc = json!({
            "template": template,
            "path": options.req.path,
            "locals": options.locals,
        });
        serde_json::to_string(&doc).map_err(|e| RenderError {
            template: template.to_string(),
            message: e.to_string(),
        })
    }
}
