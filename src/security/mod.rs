//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Extracted parameter (query or path capture):
//!     → sanitizer.rs (strip script markers, escape dangerous calls)
//!     → ParamBag handed to the controller action
//! ```
//!
//! # Design Decisions
//! - No trust in client input: every extracted value is sanitized
//! - Authorization (e.g. a route's `role` meta) is left to the application

pub mod sanitizer;

pub use sanitizer::sanitize;
