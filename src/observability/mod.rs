//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! pipeline / rewrite / admin
//!     → logging.rs (tracing events with structured fields)
//!     → metrics.rs (labelled counters)
//!
//! Consumers:
//!     → stdout log lines
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Counters only: every recorded event is a single atomic increment
//! - Labels are static strings to keep cardinality bounded
//! - Log level comes from config unless `RUST_LOG` overrides it

pub mod logging;
pub mod metrics;
