//! Symbolic domain names and the global fallback.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use dashmap::DashMap;

use crate::address::AbsoluteUrl;
use crate::error::RewriteResult;

/// Name reported to listeners when a request carries no domain hint.
pub const GLOBAL_DOMAIN_NAME: &str = "baseurl_rewriter.global_domain";

/// Concurrent map of domain name → replacement base URL.
///
/// The global entry lives in its own slot, so no user name can shadow it.
#[derive(Debug, Default)]
pub struct DomainRegistry {
    domains: DashMap<String, AbsoluteUrl>,
    global: ArcSwapOption<AbsoluteUrl>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name`. Fails without touching the registry if
    /// `url` is not a valid absolute URL.
    pub fn put(&self, name: impl Into<String>, url: &str) -> RewriteResult<()> {
        let url = AbsoluteUrl::parse(url)?;
        self.put_url(name, url);
        Ok(())
    }

    pub fn put_url(&self, name: impl Into<String>, url: AbsoluteUrl) {
        let name = name.into();
        tracing::debug!(domain = %name, url = %url, "Domain registered");
        self.domains.insert(name, url);
    }

    pub fn fetch(&self, name: &str) -> Option<AbsoluteUrl> {
        self.domains.get(name).map(|entry| entry.value().clone())
    }

    /// Remove `name`, returning its URL if it was present.
    pub fn remove(&self, name: &str) -> Option<AbsoluteUrl> {
        self.domains.remove(name).map(|(_, url)| url)
    }

    /// Remove every named entry. The global slot is left alone.
    pub fn clear(&self) {
        self.domains.clear();
    }

    /// Make the named entries exactly `entries`.
    ///
    /// New values are upserted before stale names are dropped, so a name
    /// present in both sets is never missing to a concurrent `fetch`.
    pub fn replace_all(&self, entries: BTreeMap<String, AbsoluteUrl>) {
        for (name, url) in &entries {
            self.domains.insert(name.clone(), url.clone());
        }
        self.domains.retain(|name, _| entries.contains_key(name));
        tracing::debug!(domains = entries.len(), "Domain registry replaced");
    }

    pub fn contains(&self, name: &str) -> bool {
        self.domains.contains_key(name)
    }

    /// Number of named entries, not counting the global slot.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Sorted snapshot of the named entries.
    pub fn entries(&self) -> BTreeMap<String, AbsoluteUrl> {
        self.domains
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn set_global(&self, url: &str) -> RewriteResult<()> {
        let url = AbsoluteUrl::parse(url)?;
        self.set_global_url(url);
        Ok(())
    }

    pub fn set_global_url(&self, url: AbsoluteUrl) {
        tracing::debug!(url = %url, "Global domain set");
        self.global.store(Some(Arc::new(url)));
    }

    pub fn global(&self) -> Option<AbsoluteUrl> {
        self.global.load().as_deref().cloned()
    }

    pub fn remove_global(&self) -> Option<AbsoluteUrl> {
        self.global.swap(None).map(|url| url.as_ref().clone())
    }

    /// Resolve a hint, falling back to the global slot when there is none.
    pub fn resolve(&self, hint: Option<&str>) -> Option<AbsoluteUrl> {
        match hint {
            Some(name) => self.fetch(name),
            None => self.global(),
        }
    }
}
