//! Routes definition file.
//!
//! ```toml
//! [[route]]
//! pattern = "users/login"
//! to = "users#login"
//!
//! [[route]]
//! pattern = "/admin"
//! to = { controller = "admin", action = "index" }
//! meta = { role = "admin" }
//!
//! [[route]]
//! pattern = "/old"
//! to = { redirect = "/new" }
//! ```
//!
//! Declaration order is preserved; it is the match priority.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::routing::error::RouteError;
use crate::routing::meta::ActionSpec;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutesFile {
    #[serde(default, rename = "route")]
    pub routes: Vec<RouteDeclaration>,
}

/// One `[[route]]` entry: the arguments of a `route()` call.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteDeclaration {
    pub pattern: String,
    pub to: DeclaredAction,
    #[serde(default)]
    pub meta: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DeclaredAction {
    Shorthand(String),
    Meta(Map<String, Value>),
}

impl From<DeclaredAction> for ActionSpec {
    fn from(action: DeclaredAction) -> Self {
        match action {
            DeclaredAction::Shorthand(s) => ActionSpec::Shorthand(s),
            DeclaredAction::Meta(map) => ActionSpec::Meta(map),
        }
    }
}

/// Read and parse a routes file.
pub fn load_routes_file(path: &Path) -> Result<RoutesFile, RouteError> {
    let content = fs::read_to_string(path).map_err(|source| RouteError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| RouteError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
