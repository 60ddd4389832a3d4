//! Mode selection and the default rewriter.
//!
//! # Precedence
//! 1. Super, when the URL carries a path-size directive
//! 2. Advanced, when a basis has been configured
//! 3. Domain otherwise

use crate::address::directive::take_path_size;
use crate::address::AbsoluteUrl;
use crate::error::RewriteResult;
use crate::observability::metrics;
use crate::rewrite::advanced::{AdvancedBasis, AdvancedStrategy};
use crate::rewrite::cache::DEFAULT_CAPACITY;
use crate::rewrite::domain::DomainStrategy;
use crate::rewrite::super_mode::SuperStrategy;
use crate::rewrite::UrlRewriter;

/// Which strategy handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteMode {
    Domain,
    Advanced,
    Super { path_size: usize },
}

impl RewriteMode {
    pub fn label(&self) -> &'static str {
        match self {
            RewriteMode::Domain => "domain",
            RewriteMode::Advanced => "advanced",
            RewriteMode::Super { .. } => "super",
        }
    }
}

/// A selected mode plus the URL the strategy should operate on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub mode: RewriteMode,
    /// The request URL with any path-size directive removed.
    pub url: AbsoluteUrl,
}

/// Pick exactly one mode for `original`.
pub fn select_mode(original: &AbsoluteUrl, advanced: Option<&AdvancedBasis>) -> RewriteResult<Selection> {
    if let Some((path_size, url)) = take_path_size(original)? {
        return Ok(Selection {
            mode: RewriteMode::Super { path_size },
            url,
        });
    }
    let mode = if advanced.is_some() {
        RewriteMode::Advanced
    } else {
        RewriteMode::Domain
    };
    Ok(Selection {
        mode,
        url: original.clone(),
    })
}

/// Dispatches to the three built-in strategies, each with its own cache.
#[derive(Debug)]
pub struct DefaultRewriter {
    domain: DomainStrategy,
    advanced: AdvancedStrategy,
    super_mode: SuperStrategy,
}

impl DefaultRewriter {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            domain: DomainStrategy::new(cache_capacity),
            advanced: AdvancedStrategy::new(cache_capacity),
            super_mode: SuperStrategy::new(cache_capacity),
        }
    }

    pub fn domain(&self) -> &DomainStrategy {
        &self.domain
    }

    pub fn advanced(&self) -> &AdvancedStrategy {
        &self.advanced
    }

    pub fn super_mode(&self) -> &SuperStrategy {
        &self.super_mode
    }
}

impl Default for DefaultRewriter {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl UrlRewriter for DefaultRewriter {
    fn rewrite(
        &self,
        replacement: &AbsoluteUrl,
        original: &AbsoluteUrl,
        advanced: Option<&AdvancedBasis>,
    ) -> RewriteResult<AbsoluteUrl> {
        let selection = select_mode(original, advanced)?;
        tracing::debug!(mode = selection.mode.label(), url = %original, "Rewrite mode selected");

        let rewritten = match (selection.mode, advanced) {
            (RewriteMode::Super { path_size }, _) => {
                self.super_mode.rewrite(replacement, &selection.url, path_size)
            }
            (RewriteMode::Advanced, Some(basis)) => {
                self.advanced.rewrite(replacement, &selection.url, basis)
            }
            _ => self.domain.rewrite(replacement, &selection.url),
        }?;

        metrics::record_rewrite(selection.mode.label());
        Ok(rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RewriteError;

    fn url(s: &str) -> AbsoluteUrl {
        AbsoluteUrl::parse(s).unwrap()
    }

    #[test]
    fn test_precedence() {
        let basis = AdvancedBasis::parse("https://a.com/wiki").unwrap();
        let plain = url("https://a.com/wiki/part");
        let directed = url("https://a.com/wiki/part#baseurl_path_size=2");

        assert_eq!(select_mode(&plain, None).unwrap().mode, RewriteMode::Domain);
        assert_eq!(select_mode(&plain, Some(&basis)).unwrap().mode, RewriteMode::Advanced);
        assert_eq!(
            select_mode(&directed, Some(&basis)).unwrap().mode,
            RewriteMode::Super { path_size: 2 }
        );
        assert_eq!(
            select_mode(&directed, None).unwrap().mode,
            RewriteMode::Super { path_size: 2 }
        );
    }

    #[test]
    fn test_selection_strips_directive() {
        let selection = select_mode(&url("https://a.com/x#baseurl_path_size=1#top"), None).unwrap();
        assert_eq!(selection.url.as_str(), "https://a.com/x#top");

        let selection = select_mode(&url("https://a.com/x#top"), None).unwrap();
        assert_eq!(selection.mode, RewriteMode::Domain);
        assert_eq!(selection.url.as_str(), "https://a.com/x#top");
    }

    #[test]
    fn test_bad_directive_fails_selection() {
        let err = select_mode(&url("https://a.com/x#baseurl_path_size=abc"), None).unwrap_err();
        assert!(matches!(err, RewriteError::InvalidDirective(_)));
    }

    #[test]
    fn test_default_rewriter_examples() {
        let rewriter = DefaultRewriter::default();
        let replacement = url("https://b.com/api");

        let domain = rewriter.rewrite(&replacement, &url("https://a.com/wiki"), None).unwrap();
        assert_eq!(domain.as_str(), "https://b.com/api/wiki");

        let basis = AdvancedBasis::parse("https://a.com/wiki/part").unwrap();
        let advanced = rewriter
            .rewrite(&replacement, &url("https://a.com/wiki/part/issue"), Some(&basis))
            .unwrap();
        assert_eq!(advanced.as_str(), "https://b.com/api/issue");

        let super_mode = rewriter
            .rewrite(&replacement, &url("https://a.com/wiki/part/issues/1#baseurl_path_size=3"), None)
            .unwrap();
        assert_eq!(super_mode.as_str(), "https://b.com/api/1");
        assert_eq!(super_mode.fragment(), None);

        assert_eq!(rewriter.domain().cache().len(), 1);
        assert_eq!(rewriter.advanced().cache().len(), 1);
        assert_eq!(rewriter.super_mode().cache().len(), 1);
    }

    #[test]
    fn test_super_keeps_user_fragment_in_either_order() {
        let rewriter = DefaultRewriter::default();
        let replacement = url("https://b.com/api");
        for input in [
            "https://a.com/wiki/part#baseurl_path_size=1#top",
            "https://a.com/wiki/part#top#baseurl_path_size=1",
        ] {
            let out = rewriter.rewrite(&replacement, &url(input), None).unwrap();
            assert_eq!(out.as_str(), "https://b.com/api/part#top", "{input}");
        }
    }
}
