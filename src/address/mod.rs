//! URL values and inline directives.
//!
//! # Data Flow
//! ```text
//! request URL string
//!     → directive.rs (ignore marker? path-size directive?)
//!     → absolute.rs (validated AbsoluteUrl, segment operations)
//!     → rewrite strategies splice segments and rebase onto a replacement
//! ```
//!
//! # Design Decisions
//! - Only absolute http/https URLs with a host are accepted
//! - Segments stay percent-encoded end to end (no re-encoding)
//! - Values are immutable; every operation returns a new URL

pub mod absolute;
pub mod directive;

pub use absolute::AbsoluteUrl;
pub use directive::{ignore_url, with_path_size, IGNORE_MARKER, PATH_SIZE_MARKER};
