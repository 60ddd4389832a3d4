//! Super mode: the path size comes from each request's own directive.
//!
//! `https://a.com/wiki/part/issues/1#baseurl_path_size=3` with replacement
//! `https://b.com/api` becomes `https://b.com/api/1`. The directive itself is
//! consumed by the selector before this strategy runs.

use crate::address::{AbsoluteUrl, PATH_SIZE_MARKER};
use crate::error::RewriteResult;
use crate::rewrite::cache::RewriteCache;
use crate::rewrite::splice_beyond;

#[derive(Debug)]
pub struct SuperStrategy {
    cache: RewriteCache,
}

impl SuperStrategy {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: RewriteCache::new("super", cache_capacity),
        }
    }

    /// `original` must already have its directive removed.
    pub fn rewrite(
        &self,
        replacement: &AbsoluteUrl,
        original: &AbsoluteUrl,
        path_size: usize,
    ) -> RewriteResult<AbsoluteUrl> {
        splice_beyond(&self.cache, replacement, original, path_size, || {
            format!("{}{PATH_SIZE_MARKER}{path_size}", original.location())
        })
    }

    pub fn cache(&self) -> &RewriteCache {
        &self.cache
    }
}
