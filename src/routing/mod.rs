//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     routes file / route() calls
//!     → definitions.rs (parse declarations, file order kept)
//!     → meta.rs (controller#action | redirect, plus extra meta)
//!     → pattern.rs (compile "/users/:id")
//!     → router.rs (append to ordered table, resolve handler)
//!
//! Incoming Request (path, query):
//!     → router.rs (first matching route in registration order)
//!     → params.rs (merge query + captures, sanitize)
//!     → Return: matched Route or None
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable while serving
//! - No regex in the matcher (literal and `:name` segments only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod definitions;
pub mod error;
pub mod meta;
pub mod params;
pub mod pattern;
pub mod router;

pub use error::RouteError;
pub use meta::{ActionSpec, RouteMeta, RouteTarget};
pub use params::ParamBag;
pub use pattern::Pattern;
pub use router::{Route, RouteMatch, Router};
