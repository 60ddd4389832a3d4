//! Advanced mode: a process-wide base URL whose path segments are replaced.
//!
//! With a basis of `https://a.com/wiki/part` (path size 2), the request
//! `https://a.com/wiki/part/issue` and replacement `https://b.com/api`
//! become `https://b.com/api/issue`.

use crate::address::AbsoluteUrl;
use crate::error::RewriteResult;
use crate::rewrite::cache::RewriteCache;
use crate::rewrite::splice_beyond;

/// The base URL handed to advanced mode, with its derived path size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancedBasis {
    base_url: AbsoluteUrl,
    path_size: usize,
}

impl AdvancedBasis {
    pub fn new(base_url: AbsoluteUrl) -> Self {
        let path_size = base_url.base_path_size();
        Self { base_url, path_size }
    }

    pub fn parse(base_url: &str) -> RewriteResult<Self> {
        AbsoluteUrl::parse(base_url).map(Self::new)
    }

    pub fn base_url(&self) -> &AbsoluteUrl {
        &self.base_url
    }

    pub fn path_size(&self) -> usize {
        self.path_size
    }
}

#[derive(Debug)]
pub struct AdvancedStrategy {
    cache: RewriteCache,
}

impl AdvancedStrategy {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: RewriteCache::new("advanced", cache_capacity),
        }
    }

    pub fn rewrite(
        &self,
        replacement: &AbsoluteUrl,
        original: &AbsoluteUrl,
        basis: &AdvancedBasis,
    ) -> RewriteResult<AbsoluteUrl> {
        splice_beyond(&self.cache, replacement, original, basis.path_size(), || {
            basis.base_url().location()
        })
    }

    pub fn cache(&self) -> &RewriteCache {
        &self.cache
    }
}
