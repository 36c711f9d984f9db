//! The request as seen by the router.
//!
//! # Responsibilities
//! - Carry the query mapping, the matched route's capture names and the
//!   bound params into parameter extraction
//! - Carry the application handle into actions and render locals
//!
//! # Design Decisions
//! - Plain struct with public fields, built by the HTTP adapter or directly
//!   in tests; no framework types leak into the core
//! - Repeated query keys: last value wins

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::Utf8Error;
use std::sync::Arc;

use percent_encoding::percent_decode_str;

/// Opaque handle to the application instance.
///
/// The router never inspects it; it is passed through to execution contexts
/// and render locals. Clones share identity.
#[derive(Clone)]
pub struct AppHandle(Arc<dyn Any + Send + Sync>);

impl AppHandle {
    pub fn new<T: Any + Send + Sync>(app: T) -> Self {
        Self(Arc::new(app))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// True if both handles refer to the same application instance.
    pub fn ptr_eq(&self, other: &AppHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for AppHandle {
    fn default() -> Self {
        Self::new(())
    }
}

impl fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AppHandle(..)")
    }
}

/// An in-flight request.
#[derive(Debug, Clone, Default)]
pub struct RouteRequest {
    /// Request path, without the query string.
    pub path: String,

    /// Decoded query-string parameters.
    pub query: BTreeMap<String, String>,

    /// Capture names of the matched route's pattern.
    pub route_keys: Vec<String>,

    /// Params bound by the framework. Only entries named in `route_keys`
    /// are treated as path captures.
    pub params: HashMap<String, String>,

    /// Application the request is served by.
    pub app: AppHandle,
}

impl RouteRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Parse and add every pair of a raw (still encoded) query string.
    pub fn with_query_string(mut self, raw: &str) -> Self {
        self.query.extend(parse_query(raw));
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_route_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn with_app(mut self, app: AppHandle) -> Self {
        self.app = app;
        self
    }
}

/// Decode an `application/x-www-form-urlencoded` query string.
pub fn parse_query(raw: &str) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(raw.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

/// Percent-decode a path segment. Unlike query decoding, `+` stays literal.
pub fn decode_segment(raw: &str) -> Result<String, Utf8Error> {
    percent_decode_str(raw).decode_utf8().map(|s| s.into_owned())
}

/// Percent-decode every capture value.
pub fn decode_captures(
    captures: HashMap<String, String>,
) -> Result<HashMap<String, String>, Utf8Error> {
    captures
        .into_iter()
        .map(|(k, v)| decode_segment(&v).map(|v| (k, v)))
        .collect()
}
