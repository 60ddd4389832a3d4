//! Base URL rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! (replacement base URL, request URL, advanced basis?)
//!     → selector.rs (Super > Advanced > Domain)
//!     → domain.rs | advanced.rs | super_mode.rs
//!     → cache.rs (memoized spliced path, per strategy)
//!     → request URL rebased onto replacement scheme/host/port
//! ```
//!
//! # Design Decisions
//! - Mode is decided once per request and passed explicitly
//! - Caches are built with the rewriter, never lazily
//! - Only the spliced path is cached; query and fragment come from each request

pub mod advanced;
pub mod cache;
pub mod domain;
pub mod selector;
pub mod super_mode;

pub use advanced::AdvancedBasis;
pub use cache::{CacheKey, CacheStats, RewriteCache};
pub use selector::{select_mode, DefaultRewriter, RewriteMode, Selection};

use std::sync::Arc;

use crate::address::absolute::{encode_path, splice_segments};
use crate::address::AbsoluteUrl;
use crate::error::{RewriteError, RewriteResult};

/// Computes a new request URL from a replacement base URL.
///
/// [`DefaultRewriter`] is installed by default; an application can swap in
/// its own implementation through `UrlManager::set_rewriter`.
pub trait UrlRewriter: Send + Sync {
    fn rewrite(
        &self,
        replacement: &AbsoluteUrl,
        original: &AbsoluteUrl,
        advanced: Option<&AdvancedBasis>,
    ) -> RewriteResult<AbsoluteUrl>;
}

impl<R: UrlRewriter + ?Sized> UrlRewriter for Arc<R> {
    fn rewrite(
        &self,
        replacement: &AbsoluteUrl,
        original: &AbsoluteUrl,
        advanced: Option<&AdvancedBasis>,
    ) -> RewriteResult<AbsoluteUrl> {
        (**self).rewrite(replacement, original, advanced)
    }
}

/// Drop the first `path_size` segments of `original`, prefix the rest with
/// the replacement's path and rebase onto the replacement.
pub(crate) fn splice_beyond(
    cache: &RewriteCache,
    replacement: &AbsoluteUrl,
    original: &AbsoluteUrl,
    path_size: usize,
    basis: impl FnOnce() -> String,
) -> RewriteResult<AbsoluteUrl> {
    let key = CacheKey::new(replacement.path(), original.path(), Some(path_size));
    let path = cache.get_or_try_insert(key, || {
        let segments = original.path_segments();
        if segments.len() < path_size {
            return Err(RewriteError::PathSizeMismatch {
                final_path: original.location(),
                segments: segments.len(),
                path_size,
                basis: basis(),
            });
        }
        let spliced = splice_segments(&replacement.path_segments(), &segments[path_size..]);
        Ok(encode_path(&spliced))
    })?;
    original.rebase(replacement, &path)
}
