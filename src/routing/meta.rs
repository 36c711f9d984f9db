//! Route metadata: what a matched route dispatches to.
//!
//! A route points either at a controller action or at a redirect target,
//! optionally carrying extra application metadata (such as a required
//! `role`). On the wire (routes file, JSON output) the metadata is one flat
//! mapping: `{controller, action, ...extra}` or `{redirect, ...extra}`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::routing::error::RouteError;

const CONTROLLER: &str = "controller";
const ACTION: &str = "action";
const REDIRECT: &str = "redirect";

/// Where a route sends the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    Controller { controller: String, action: String },
    Redirect { to: String },
}

impl RouteTarget {
    pub fn controller(controller: impl Into<String>, action: impl Into<String>) -> Self {
        RouteTarget::Controller {
            controller: controller.into(),
            action: action.into(),
        }
    }

    pub fn redirect(to: impl Into<String>) -> Self {
        RouteTarget::Redirect { to: to.into() }
    }

    fn write_into(&self, map: &mut Map<String, Value>) {
        match self {
            RouteTarget::Controller { controller, action } => {
                map.insert(CONTROLLER.into(), Value::String(controller.clone()));
                map.insert(ACTION.into(), Value::String(action.clone()));
            }
            RouteTarget::Redirect { to } => {
                map.insert(REDIRECT.into(), Value::String(to.clone()));
            }
        }
    }
}

/// Parses the `controller#action` shorthand.
impl FromStr for RouteTarget {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('#') {
            Some((controller, action)) if !controller.is_empty() && !action.is_empty() => {
                Ok(RouteTarget::controller(controller, action))
            }
            _ => Err(RouteError::InvalidShorthand(s.to_string())),
        }
    }
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteTarget::Controller { controller, action } => write!(f, "{}#{}", controller, action),
            RouteTarget::Redirect { to } => write!(f, "redirect -> {}", to),
        }
    }
}

/// Validated metadata of a registered route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct RouteMeta {
    target: RouteTarget,
    extra: Map<String, Value>,
}

impl RouteMeta {
    pub fn new(target: RouteTarget) -> Self {
        Self {
            target,
            extra: Map::new(),
        }
    }

    /// Attach an extra metadata entry. Target keys cannot be set this way.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if !matches!(key.as_str(), CONTROLLER | ACTION | REDIRECT) {
            self.extra.insert(key, value.into());
        }
        self
    }

    pub fn target(&self) -> &RouteTarget {
        &self.target
    }

    pub fn controller(&self) -> Option<&str> {
        match &self.target {
            RouteTarget::Controller { controller, .. } => Some(controller.as_str()),
            RouteTarget::Redirect { .. } => None,
        }
    }

    pub fn action(&self) -> Option<&str> {
        match &self.target {
            RouteTarget::Controller { action, .. } => Some(action.as_str()),
            RouteTarget::Redirect { .. } => None,
        }
    }

    pub fn redirect(&self) -> Option<&str> {
        match &self.target {
            RouteTarget::Redirect { to } => Some(to.as_str()),
            RouteTarget::Controller { .. } => None,
        }
    }

    /// Extra metadata, excluding the target keys.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Look up a key in the flat view (`controller`, `action`, `redirect` or extra).
    pub fn get(&self, key: &str) -> Option<Value> {
        match (key, &self.target) {
            (CONTROLLER, RouteTarget::Controller { controller, .. }) => {
                Some(Value::String(controller.clone()))
            }
            (ACTION, RouteTarget::Controller { action, .. }) => Some(Value::String(action.clone())),
            (REDIRECT, RouteTarget::Redirect { to }) => Some(Value::String(to.clone())),
            (CONTROLLER | ACTION | REDIRECT, _) => None,
            _ => self.extra.get(key).cloned(),
        }
    }

    /// The flat mapping form.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        self.target.write_into(&mut map);
        for (k, v) in &self.extra {
            map.insert(k.clone(), v.clone());
        }
        map
    }
}

impl From<RouteTarget> for RouteMeta {
    fn from(target: RouteTarget) -> Self {
        RouteMeta::new(target)
    }
}

impl From<RouteMeta> for Map<String, Value> {
    fn from(meta: RouteMeta) -> Self {
        meta.to_map()
    }
}

impl TryFrom<Map<String, Value>> for RouteMeta {
    type Error = RouteError;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        let controller = take_string(&mut map, CONTROLLER)?;
        let action = take_string(&mut map, ACTION)?;
        let redirect = take_string(&mut map, REDIRECT)?;

        let target = match (controller, action, redirect) {
            (None, None, Some(to)) => RouteTarget::Redirect { to },
            (_, _, Some(_)) => return Err(RouteError::ConflictingTarget),
            (Some(controller), Some(action), None) => RouteTarget::Controller { controller, action },
            _ => return Err(RouteError::MissingTarget),
        };

        Ok(Self { target, extra: map })
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Result<Option<String>, RouteError> {
    match map.remove(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(RouteError::InvalidField(key.to_string())),
    }
}

/// The second argument of route registration.
///
/// Accepts the `controller#action` shorthand, a typed target, or a raw
/// mapping that may carry extra keys next to the target keys.
#[derive(Debug, Clone)]
pub enum ActionSpec {
    Shorthand(String),
    Target(RouteTarget),
    Meta(Map<String, Value>),
}

impl ActionSpec {
    /// Resolve to the flat mapping form.
    pub fn into_map(self) -> Result<Map<String, Value>, RouteError> {
        match self {
            ActionSpec::Shorthand(s) => {
                let mut map = Map::new();
                s.parse::<RouteTarget>()?.write_into(&mut map);
                Ok(map)
            }
            ActionSpec::Target(target) => {
                let mut map = Map::new();
                target.write_into(&mut map);
                Ok(map)
            }
            ActionSpec::Meta(map) => Ok(map),
        }
    }
}

impl From<&str> for ActionSpec {
    fn from(s: &str) -> Self {
        ActionSpec::Shorthand(s.to_string())
    }
}

impl From<String> for ActionSpec {
    fn from(s: String) -> Self {
        ActionSpec::Shorthand(s)
    }
}

impl From<RouteTarget> for ActionSpec {
    fn from(target: RouteTarget) -> Self {
        ActionSpec::Target(target)
    }
}

impl From<RouteMeta> for ActionSpec {
    fn from(meta: RouteMeta) -> Self {
        ActionSpec::Meta(meta.to_map())
    }
}

impl From<Map<String, Value>> for ActionSpec {
    fn from(map: Map<String, Value>) -> Self {
        ActionSpec::Meta(map)
    }
}
