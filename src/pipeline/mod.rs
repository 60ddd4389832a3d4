//! Request pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! outgoing request (reqwest::Request or any HostRequest)
//!     → manager.rs: enabled? ignore marker? (early exits)
//!     → manager.rs: take + remove the Domain-Name header
//!     → listener.rs: before-resolve handlers (may register the domain)
//!     → registry: hint → named entry, no hint → global
//!     → rewrite: installed UrlRewriter
//!     → listener.rs: after-rewrite handlers
//!     → request with new target URL
//! ```
//!
//! # Design Decisions
//! - All state sits in one `UrlManager` passed explicitly, never in globals
//! - An unresolved domain leaves the request untouched; it is not an error
//! - Listeners run synchronously on the calling thread, in registration order
//! - middleware.rs plugs the pipeline into reqwest-middleware chains

pub mod listener;
pub mod manager;
pub mod middleware;
pub mod request;

pub use listener::{AfterRewriteHandler, BeforeResolveHandler, ListenerId, Listeners, UrlChangeListener};
pub use manager::UrlManager;
pub use middleware::RewriteMiddleware;
pub use request::{HostRequest, DOMAIN_NAME_HEADER};
