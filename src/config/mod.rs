//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → paths handed to the Router, the rest to the server
//! ```
//!
//! # Design Decisions
//! - An empty file is a valid config; every section has defaults
//! - The routes file is separate from this file and read by the router
//! - `--entry-path` on the command line overrides `paths.entry_path`

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, PathsConfig, RouterConfig, TimeoutConfig,
};
