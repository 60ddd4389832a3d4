//! The rewriting context and per-request pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use reqwest::header::HeaderMap;
use url::Url;

use crate::address::{directive, AbsoluteUrl};
use crate::config::RewriterConfig;
use crate::error::{RewriteError, RewriteResult};
use crate::observability::metrics;
use crate::pipeline::listener::Listeners;
use crate::pipeline::request::{HostRequest, DOMAIN_NAME_HEADER};
use crate::registry::{DomainRegistry, GLOBAL_DOMAIN_NAME};
use crate::rewrite::cache::DEFAULT_CAPACITY;
use crate::rewrite::{AdvancedBasis, DefaultRewriter, UrlRewriter};

/// Everything the pipeline consults for a request: enable flag, registry,
/// advanced basis, listeners and the installed rewriter.
///
/// Built once by the host application and shared behind an `Arc`.
pub struct UrlManager {
    enabled: AtomicBool,
    registry: DomainRegistry,
    advanced: ArcSwapOption<AdvancedBasis>,
    listeners: Listeners,
    rewriter: ArcSwap<Box<dyn UrlRewriter>>,
}

impl UrlManager {
    pub fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CAPACITY)
    }

    /// Build a manager whose default rewriter keeps `capacity` entries per strategy.
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            enabled: AtomicBool::new(true),
            registry: DomainRegistry::new(),
            advanced: ArcSwapOption::empty(),
            listeners: Listeners::new(),
            rewriter: ArcSwap::from_pointee(Box::new(DefaultRewriter::new(capacity))),
        }
    }

    /// Build a manager from a validated configuration.
    pub fn from_config(config: &RewriterConfig) -> RewriteResult<Self> {
        let manager = Self::with_cache_capacity(config.rewrite.cache_capacity);
        manager.apply_config(config)?;
        Ok(manager)
    }

    /// Apply a (re)loaded configuration.
    ///
    /// All URLs are parsed before anything changes, so a bad file leaves the
    /// current state in place. The named domains are replaced by the file's
    /// set; the advanced basis is only touched when the file names one.
    pub fn apply_config(&self, config: &RewriterConfig) -> RewriteResult<()> {
        let global = config
            .rewrite
            .global_domain
            .as_deref()
            .map(AbsoluteUrl::parse)
            .transpose()?;
        let basis = config
            .rewrite
            .advanced_base_url
            .as_deref()
            .map(AdvancedBasis::parse)
            .transpose()?;
        let domains = config
            .domains
            .iter()
            .map(|(name, url)| AbsoluteUrl::parse(url).map(|url| (name.clone(), url)))
            .collect::<RewriteResult<BTreeMap<_, _>>>()?;

        self.set_enabled(config.rewrite.enabled);
        match global {
            Some(url) => self.registry.set_global_url(url),
            None => {
                self.registry.remove_global();
            }
        }
        self.registry.replace_all(domains);
        if let Some(basis) = basis {
            self.set_advanced_basis(basis);
        }

        tracing::info!(
            enabled = config.rewrite.enabled,
            domains = self.registry.len(),
            global = self.registry.global().is_some(),
            advanced = self.is_advanced_mode(),
            "Rewrite configuration applied"
        );
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Turn rewriting on or off. While off, requests pass through untouched.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    /// Activate advanced mode with the base URL the client was built with.
    ///
    /// Its path size (ignoring a trailing slash) is how many leading
    /// segments of every request are replaced.
    pub fn start_advanced_mode(&self, base_url: &str) -> RewriteResult<()> {
        let basis = AdvancedBasis::parse(base_url)?;
        self.set_advanced_basis(basis);
        Ok(())
    }

    fn set_advanced_basis(&self, basis: AdvancedBasis) {
        tracing::info!(
            base_url = %basis.base_url(),
            path_size = basis.path_size(),
            "Advanced mode active"
        );
        self.advanced.store(Some(Arc::new(basis)));
    }

    pub fn advanced_basis(&self) -> Option<AdvancedBasis> {
        self.advanced.load().as_deref().cloned()
    }

    pub fn is_advanced_mode(&self) -> bool {
        self.advanced.load().is_some()
    }

    /// Install a custom rewriter in place of [`DefaultRewriter`].
    pub fn set_rewriter<R>(&self, rewriter: R)
    where
        R: UrlRewriter + 'static,
    {
        self.rewriter.store(Arc::new(Box::new(rewriter)));
    }

    /// Rewrite the target of one outgoing request.
    ///
    /// Errors are returned as is; the caller decides whether to abort the
    /// request. A failed rewrite never yields a half-modified request.
    pub fn process_request<R: HostRequest>(&self, request: R) -> RewriteResult<R> {
        let result = self.run_pipeline(request);
        if let Err(err) = &result {
            tracing::warn!(error = %err, kind = err.kind(), "Request rewrite failed");
            metrics::record_request("failed");
            metrics::record_rewrite_error(err.kind());
        }
        result
    }

    fn run_pipeline<R: HostRequest>(&self, mut request: R) -> RewriteResult<R> {
        if !self.is_enabled() {
            metrics::record_request("disabled");
            return Ok(request);
        }

        let target = request.target().as_str();
        if directive::has_ignore_marker(target) {
            let cleaned = directive::strip_ignore_marker(target);
            let url = Url::parse(&cleaned).map_err(|e| RewriteError::invalid_url(cleaned.as_str(), e))?;
            tracing::debug!(url = %url, "Ignore marker found, url left unchanged");
            request.set_target(url);
            metrics::record_request("ignored");
            return Ok(request);
        }

        let hint = take_domain_hint(request.headers_mut())?;
        let old_url = AbsoluteUrl::from_url(request.target().clone())?;
        let domain_name = hint.as_deref().unwrap_or(GLOBAL_DOMAIN_NAME);

        // Before the lookup, so a listener can register the domain on demand.
        self.listeners.notify_before_resolve(&old_url, domain_name);

        let Some(replacement) = self.registry.resolve(hint.as_deref()) else {
            tracing::debug!(domain = domain_name, url = %old_url, "No base url registered");
            metrics::record_request("unresolved");
            return Ok(request);
        };

        let advanced = self.advanced.load_full();
        let new_url = self
            .rewriter
            .load()
            .rewrite(&replacement, &old_url, advanced.as_deref())?;

        tracing::debug!(domain = domain_name, from = %old_url, to = %new_url, "Base url rewritten");
        self.listeners.notify_after_rewrite(&new_url, &old_url);

        request.set_target(new_url.into_url());
        metrics::record_request("rewritten");
        Ok(request)
    }
}

/// Read and remove the domain-name header. A blank value counts as no hint.
fn take_domain_hint(headers: &mut HeaderMap) -> RewriteResult<Option<String>> {
    let values: Vec<_> = headers.get_all(DOMAIN_NAME_HEADER).iter().collect();
    let value = match values.as_slice() {
        [] => return Ok(None),
        [value] => *value,
        many => {
            return Err(RewriteError::Configuration(format!(
                "only one {DOMAIN_NAME_HEADER} header is allowed, found {}",
                many.len()
            )))
        }
    };
    let name = value
        .to_str()
        .map_err(|_| RewriteError::Configuration(format!("{DOMAIN_NAME_HEADER} header is not valid UTF-8")))?
        .to_string();

    headers.remove(DOMAIN_NAME_HEADER);
    Ok((!name.trim().is_empty()).then_some(name))
}

impl Default for UrlManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UrlManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlManager")
            .field("enabled", &self.is_enabled())
            .field("registry", &self.registry)
            .field("advanced", &self.advanced_basis())
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}
