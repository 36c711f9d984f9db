//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration, table build, unmatched paths, dispatch outcomes
//!     → logging.rs (tracing events, request id on every dispatch event)
//!     → metrics.rs (per controller/action/outcome counters and latency)
//!
//! Output:
//!     → stdout, pretty for humans or one JSON object per line
//!     → Prometheus scrape endpoint when `metrics_enabled` is set
//! ```

pub mod logging;
pub mod metrics;
