//! Domain registry subsystem.
//!
//! # Design Decisions
//! - Sharded concurrent map (DashMap): put/fetch/remove are individually
//!   atomic, no cross-key transactions
//! - Global fallback in a dedicated `ArcSwapOption` slot, read lock-free
//! - URLs validated on the way in; stored values are always valid

pub mod domains;

pub use domains::{DomainRegistry, GLOBAL_DOMAIN_NAME};
