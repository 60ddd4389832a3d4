//! End-to-end tests for the request pipeline.

use std::sync::{Arc, Mutex};

use baseurl_rewriter::{
    ignore_url, with_path_size, AbsoluteUrl, DefaultRewriter, HostRequest, RewriteError, UrlChangeListener,
    UrlManager, DOMAIN_NAME_HEADER, GLOBAL_DOMAIN_NAME,
};

mod common;
use common::request;

fn rewritten(manager: &UrlManager, target: &str, domain: Option<&str>) -> String {
    manager
        .process_request(request(target, domain))
        .unwrap()
        .target()
        .to_string()
}

#[test]
fn test_domain_mode_example() {
    let manager = UrlManager::new();
    manager.registry().set_global("https://b.com/api").unwrap();

    assert_eq!(rewritten(&manager, "https://a.com/wiki", None), "https://b.com/api/wiki");
}

#[test]
fn test_advanced_mode_example() {
    let manager = UrlManager::new();
    manager.start_advanced_mode("https://a.com/wiki/part").unwrap();
    manager.registry().put("b", "https://b.com/api").unwrap();

    assert_eq!(
        rewritten(&manager, "https://a.com/wiki/part/issue", Some("b")),
        "https://b.com/api/issue"
    );
}

#[test]
fn test_super_mode_example() {
    let manager = UrlManager::new();
    manager.registry().set_global("https://b.com/api").unwrap();

    assert_eq!(
        rewritten(&manager, "https://a.com/wiki/part/issues/1#baseurl_path_size=3", None),
        "https://b.com/api/1"
    );
}

#[test]
fn test_super_mode_overrides_advanced() {
    let manager = UrlManager::new();
    manager.start_advanced_mode("https://a.com/wiki/part").unwrap();
    manager.registry().set_global("https://b.com/api").unwrap();

    let target = with_path_size("https://a.com/v1/issues/7", 1);
    assert_eq!(rewritten(&manager, &target, None), "https://b.com/api/issues/7");
}

#[test]
fn test_path_size_mismatch_example() {
    let manager = UrlManager::new();
    manager.start_advanced_mode("https://a.com/wiki/part").unwrap();
    manager.registry().set_global("https://b.com/api").unwrap();

    let err = manager.process_request(request("https://a.com/wiki", None)).unwrap_err();
    let RewriteError::PathSizeMismatch { segments, path_size, .. } = &err else {
        panic!("expected a path size mismatch, got {err:?}");
    };
    assert_eq!((*segments, *path_size), (1, 2));
    let message = err.to_string();
    assert!(message.contains("https://a.com/wiki"), "{message}");
    assert!(message.contains("https://a.com/wiki/part"), "{message}");
}

#[test]
fn test_super_fragment_in_either_order() {
    let manager = UrlManager::new();
    manager.registry().set_global("https://b.com/api").unwrap();

    assert_eq!(
        rewritten(&manager, "https://a.com/x/y#baseurl_path_size=1#top", None),
        "https://b.com/api/y#top"
    );
    assert_eq!(
        rewritten(&manager, "https://a.com/x/y#top#baseurl_path_size=1", None),
        "https://b.com/api/y#top"
    );
    assert_eq!(rewritten(&manager, "https://a.com/x/y#top", None), "https://b.com/api/x/y#top");
}

#[test]
fn test_invalid_directive_fails_request() {
    let manager = UrlManager::new();
    manager.registry().set_global("https://b.com/api").unwrap();

    let err = manager
        .process_request(request("https://a.com/x#baseurl_path_size=-1", None))
        .unwrap_err();
    assert!(matches!(err, RewriteError::InvalidDirective(_)));
}

#[test]
fn test_query_and_user_info_survive() {
    let manager = UrlManager::new();
    manager.registry().put("b", "http://b.com:8080/api/").unwrap();

    assert_eq!(
        rewritten(&manager, "https://user:pw@a.com/wiki?page=2&q=rust", Some("b")),
        "http://user:pw@b.com:8080/api/wiki?page=2&q=rust"
    );
}

#[test]
fn test_ignore_marker_wins_over_everything() {
    let manager = UrlManager::new();
    manager.registry().set_global("https://b.com/api").unwrap();
    manager.registry().put("b", "https://b.com/api").unwrap();

    let target = ignore_url("https://a.com/wiki?x=1");
    let processed = manager.process_request(request(&target, Some("b"))).unwrap();
    assert_eq!(processed.target().as_str(), "https://a.com/wiki?x=1");
    assert_eq!(processed.headers().get(DOMAIN_NAME_HEADER).unwrap(), "b");

    // Works with an empty registry too.
    let empty = UrlManager::new();
    assert_eq!(rewritten(&empty, "https://a.com/a#url_ignore", None), "https://a.com/a");
}

#[test]
fn test_hint_header_is_removed() {
    let manager = UrlManager::new();
    manager.registry().put("douban", "https://api.douban.com").unwrap();

    let processed = manager
        .process_request(request("https://a.com/v2/movie", Some("douban")))
        .unwrap();
    assert_eq!(processed.target().as_str(), "https://api.douban.com/v2/movie");
    assert!(processed.headers().get(DOMAIN_NAME_HEADER).is_none());
}

#[test]
fn test_unknown_domain_only_removes_header() {
    let manager = UrlManager::new();
    manager.registry().set_global("https://b.com/api").unwrap();

    let processed = manager
        .process_request(request("https://a.com/wiki", Some("missing")))
        .unwrap();
    assert_eq!(processed.target().as_str(), "https://a.com/wiki");
    assert!(processed.headers().get(DOMAIN_NAME_HEADER).is_none());
}

#[test]
fn test_hint_is_matched_exactly() {
    let manager = UrlManager::new();
    manager.registry().put("douban", "https://api.douban.com").unwrap();

    assert_eq!(rewritten(&manager, "https://a.com/v2", Some(" douban")), "https://a.com/v2");
    assert_eq!(rewritten(&manager, "https://a.com/v2", Some("douban")), "https://api.douban.com/v2");
}

#[test]
fn test_blank_hint_falls_back_to_global() {
    let manager = UrlManager::new();
    manager.registry().set_global("https://b.com/api").unwrap();

    assert_eq!(rewritten(&manager, "https://a.com/wiki", Some(" ")), "https://b.com/api/wiki");
}

#[test]
fn test_multiple_hint_headers_rejected() {
    let manager = UrlManager::new();
    manager.registry().put("a", "https://a.com").unwrap();

    let mut req = request("https://x.com/p", Some("a"));
    req.headers_mut().append(DOMAIN_NAME_HEADER, "b".parse().unwrap());
    let err = manager.process_request(req).unwrap_err();
    assert!(matches!(err, RewriteError::Configuration(_)));
}

#[test]
fn test_disabled_passes_through() {
    let manager = UrlManager::new();
    manager.registry().set_global("https://b.com/api").unwrap();
    manager.set_enabled(false);

    let processed = manager
        .process_request(request("https://a.com/wiki#url_ignore", Some("x")))
        .unwrap();
    assert_eq!(processed.target().as_str(), "https://a.com/wiki#url_ignore");
    assert!(processed.headers().get(DOMAIN_NAME_HEADER).is_some());

    manager.set_enabled(true);
    assert_eq!(rewritten(&manager, "https://a.com/wiki", None), "https://b.com/api/wiki");
}

#[test]
fn test_listeners_see_both_events_in_order() {
    let manager = UrlManager::new();
    manager.registry().set_global("https://b.com/api").unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));

    let before = log.clone();
    manager
        .listeners()
        .on_before_resolve(move |old, name| before.lock().unwrap().push(format!("before {old} {name}")));
    let after = log.clone();
    manager
        .listeners()
        .on_after_rewrite(move |new, old| after.lock().unwrap().push(format!("after {new} {old}")));

    rewritten(&manager, "https://a.com/wiki", None);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            format!("before https://a.com/wiki {GLOBAL_DOMAIN_NAME}"),
            "after https://b.com/api/wiki https://a.com/wiki".to_string(),
        ]
    );
}

#[test]
fn test_before_resolve_fires_even_when_unresolved() {
    let manager = UrlManager::new();
    let names = Arc::new(Mutex::new(Vec::new()));
    let seen = names.clone();
    manager
        .listeners()
        .on_before_resolve(move |_, name| seen.lock().unwrap().push(name.to_string()));
    let after_calls = Arc::new(Mutex::new(0));
    let counter = after_calls.clone();
    manager.listeners().on_after_rewrite(move |_, _| *counter.lock().unwrap() += 1);

    rewritten(&manager, "https://a.com/wiki", Some("nobody"));
    assert_eq!(*names.lock().unwrap(), vec!["nobody"]);
    assert_eq!(*after_calls.lock().unwrap(), 0);
}

/// Registers a domain the first time it is asked for.
struct LazyDomains {
    manager: std::sync::Weak<UrlManager>,
}

impl UrlChangeListener for LazyDomains {
    fn on_before_resolve(&self, _old_url: &AbsoluteUrl, domain_name: &str) {
        if let Some(manager) = self.manager.upgrade() {
            if domain_name == "lazy" && !manager.registry().contains("lazy") {
                manager.registry().put("lazy", "https://lazy.example.com/v3").unwrap();
            }
        }
    }
}

#[test]
fn test_listener_can_populate_registry_lazily() {
    let manager = Arc::new(UrlManager::new());
    manager.listeners().register(Arc::new(LazyDomains {
        manager: Arc::downgrade(&manager),
    }));

    assert!(!manager.registry().contains("lazy"));
    assert_eq!(
        rewritten(&manager, "https://a.com/users/1", Some("lazy")),
        "https://lazy.example.com/v3/users/1"
    );
}

#[test]
fn test_repeat_rewrite_hits_cache() {
    let manager = UrlManager::new();
    let rewriter = Arc::new(DefaultRewriter::new(8));
    manager.set_rewriter(rewriter.clone());
    manager.registry().set_global("https://b.com/api").unwrap();

    let first = rewritten(&manager, "https://a.com/wiki?page=1", None);
    let second = rewritten(&manager, "https://a.com/wiki?page=2", None);
    assert_eq!(first, "https://b.com/api/wiki?page=1");
    assert_eq!(second, "https://b.com/api/wiki?page=2");

    let stats = rewriter.domain().cache().stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
}

#[test]
fn test_custom_rewriter_is_used() {
    struct HostOnly;

    impl baseurl_rewriter::UrlRewriter for HostOnly {
        fn rewrite(
            &self,
            replacement: &AbsoluteUrl,
            _original: &AbsoluteUrl,
            _advanced: Option<&baseurl_rewriter::AdvancedBasis>,
        ) -> baseurl_rewriter::RewriteResult<AbsoluteUrl> {
            Ok(replacement.clone())
        }
    }

    let manager = UrlManager::new();
    manager.set_rewriter(HostOnly);
    manager.registry().set_global("https://b.com/api").unwrap();
    assert_eq!(rewritten(&manager, "https://a.com/wiki", None), "https://b.com/api");
}
