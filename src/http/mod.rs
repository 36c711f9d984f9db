//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout)
//!     → [routing layer finds the route, builds RouteRequest]
//!     → request.rs (query, capture names, bound params, app handle)
//!     → [route handler runs the action]
//!     → response.rs (render via ViewRenderer, or redirect)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{AppHandle, RouteRequest};
pub use response::{
    JsonViewRenderer, Redirect, RenderError, RenderOptions, RouteResponse, ViewRenderer,
};
pub use server::HttpServer;
