//! Before-resolve and after-rewrite notifications.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::address::AbsoluteUrl;

/// Called with (request URL, domain name about to be looked up).
pub type BeforeResolveHandler = Arc<dyn Fn(&AbsoluteUrl, &str) + Send + Sync>;

/// Called with (new URL, old URL) after a rewrite.
pub type AfterRewriteHandler = Arc<dyn Fn(&AbsoluteUrl, &AbsoluteUrl) + Send + Sync>;

/// Handle returned on registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listener covering both events. Both methods default to no-ops.
pub trait UrlChangeListener: Send + Sync {
    /// Runs before the registry lookup, so it may register the domain on demand.
    fn on_before_resolve(&self, _old_url: &AbsoluteUrl, _domain_name: &str) {}

    fn on_after_rewrite(&self, _new_url: &AbsoluteUrl, _old_url: &AbsoluteUrl) {}
}

/// Ordered handler collections. Handlers run synchronously in registration
/// order, on a snapshot, so a handler may register or unregister others.
#[derive(Default)]
pub struct Listeners {
    next_id: AtomicU64,
    before: RwLock<Vec<(ListenerId, BeforeResolveHandler)>>,
    after: RwLock<Vec<(ListenerId, AfterRewriteHandler)>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_before_resolve<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&AbsoluteUrl, &str) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.before
            .write()
            .expect("listener lock poisoned")
            .push((id, Arc::new(handler)));
        id
    }

    pub fn on_after_rewrite<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&AbsoluteUrl, &AbsoluteUrl) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.after
            .write()
            .expect("listener lock poisoned")
            .push((id, Arc::new(handler)));
        id
    }

    /// Register both halves of a listener under one id.
    pub fn register(&self, listener: Arc<dyn UrlChangeListener>) -> ListenerId {
        let id = self.next_id();
        let before = listener.clone();
        self.before.write().expect("listener lock poisoned").push((
            id,
            Arc::new(move |url: &AbsoluteUrl, name: &str| before.on_before_resolve(url, name)),
        ));
        self.after.write().expect("listener lock poisoned").push((
            id,
            Arc::new(move |new: &AbsoluteUrl, old: &AbsoluteUrl| listener.on_after_rewrite(new, old)),
        ));
        id
    }

    /// Remove every handler registered under `id`. Returns whether any was found.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut before = self.before.write().expect("listener lock poisoned");
        let mut after = self.after.write().expect("listener lock poisoned");
        let count = before.len() + after.len();
        before.retain(|(handler_id, _)| *handler_id != id);
        after.retain(|(handler_id, _)| *handler_id != id);
        before.len() + after.len() != count
    }

    pub fn before_resolve_count(&self) -> usize {
        self.before.read().expect("listener lock poisoned").len()
    }

    pub fn after_rewrite_count(&self) -> usize {
        self.after.read().expect("listener lock poisoned").len()
    }

    pub(crate) fn notify_before_resolve(&self, old_url: &AbsoluteUrl, domain_name: &str) {
        let handlers: Vec<BeforeResolveHandler> = self
            .before
            .read()
            .expect("listener lock poisoned")
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(old_url, domain_name);
        }
    }

    pub(crate) fn notify_after_rewrite(&self, new_url: &AbsoluteUrl, old_url: &AbsoluteUrl) {
        let handlers: Vec<AfterRewriteHandler> = self
            .after
            .read()
            .expect("listener lock poisoned")
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(new_url, old_url);
        }
    }

    fn next_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("before_resolve", &self.before_resolve_count())
            .field("after_rewrite", &self.after_rewrite_count())
            .finish()
    }
}
