//! Runtime base URL rewriting for outgoing HTTP requests.
//!
//! A [`UrlManager`] holds a registry of symbolic domain names mapped to
//! replacement base URLs. Every request passed through
//! [`UrlManager::process_request`] (directly, or via [`RewriteMiddleware`]
//! on a reqwest client) gets its scheme, host and port swapped for the
//! registered base URL. Its path prefix is spliced according to one of
//! three modes:
//!
//! - **Domain**: the replacement path is prepended to the whole request path
//! - **Advanced**: the first N segments are replaced, N taken from the base
//!   URL the client was built with
//! - **Super**: N comes from a `#baseurl_path_size=N` fragment on the request
//!
//! ```no_run
//! use std::sync::Arc;
//! use baseurl_rewriter::{RewriteMiddleware, UrlManager};
//!
//! let manager = Arc::new(UrlManager::new());
//! manager.registry().put("douban", "https://api.douban.com").unwrap();
//! let client = RewriteMiddleware::wrap(manager, reqwest::Client::new());
//! ```

pub mod address;
pub mod admin;
pub mod config;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod registry;
pub mod rewrite;

pub use address::{ignore_url, with_path_size, AbsoluteUrl};
pub use config::RewriterConfig;
pub use error::{RewriteError, RewriteResult};
pub use pipeline::{HostRequest, ListenerId, RewriteMiddleware, UrlChangeListener, UrlManager, DOMAIN_NAME_HEADER};
pub use registry::{DomainRegistry, GLOBAL_DOMAIN_NAME};
pub use rewrite::{AdvancedBasis, DefaultRewriter, RewriteMode, UrlRewriter};
