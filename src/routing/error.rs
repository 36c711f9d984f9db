//! Route registration and table assembly errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid action shorthand `{0}`: expected `controller#action`")]
    InvalidShorthand(String),

    #[error("route meta combines `redirect` with `controller`/`action`")]
    ConflictingTarget,

    #[error("route meta needs either `redirect` or both `controller` and `action`")]
    MissingTarget,

    #[error("route meta field `{0}` must be a string")]
    InvalidField(String),

    #[error("invalid route `{pattern}`: {source}")]
    InvalidRoute {
        pattern: String,
        #[source]
        source: Box<RouteError>,
    },

    #[error("failed to read routes file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse routes file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
