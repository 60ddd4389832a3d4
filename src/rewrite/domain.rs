//! Domain mode: swap scheme, host and port, prefix the replacement's path.
//!
//! `https://a.com/wiki` with replacement `https://b.com/api` becomes
//! `https://b.com/api/wiki`. Nothing of the original path is dropped.

use crate::address::absolute::{encode_path, splice_segments};
use crate::address::AbsoluteUrl;
use crate::error::{RewriteError, RewriteResult};
use crate::rewrite::cache::{CacheKey, RewriteCache};

#[derive(Debug)]
pub struct DomainStrategy {
    cache: RewriteCache,
}

impl DomainStrategy {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: RewriteCache::new("domain", cache_capacity),
        }
    }

    pub fn rewrite(&self, replacement: &AbsoluteUrl, original: &AbsoluteUrl) -> RewriteResult<AbsoluteUrl> {
        let key = CacheKey::new(replacement.path(), original.path(), None);
        let path = self.cache.get_or_try_insert(key, || {
            let segments = splice_segments(&replacement.path_segments(), &original.path_segments());
            Ok::<_, RewriteError>(encode_path(&segments))
        })?;
        original.rebase(replacement, &path)
    }

    pub fn cache(&self) -> &RewriteCache {
        &self.cache
    }
}
