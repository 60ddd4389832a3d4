//! Inline directives carried in a URL's fragment.
//!
//! Two markers are recognized, both bit-exact:
//! - `#url_ignore` anywhere in the URL: leave the request alone.
//! - `#baseurl_path_size=<N>` in the fragment: rewrite in super mode,
//!   treating the first `N` path segments as part of the base URL.

use crate::address::AbsoluteUrl;
use crate::error::{RewriteError, RewriteResult};

/// Marker that disables rewriting for one URL.
pub const IGNORE_MARKER: &str = "#url_ignore";

/// Marker that selects super mode with an explicit path size.
pub const PATH_SIZE_MARKER: &str = "#baseurl_path_size=";

/// Append the ignore marker to `url`.
pub fn ignore_url(url: &str) -> String {
    format!("{url}{IGNORE_MARKER}")
}

/// Append a path-size directive to `url`.
pub fn with_path_size(url: &str, path_size: usize) -> String {
    format!("{url}{PATH_SIZE_MARKER}{path_size}")
}

pub fn has_ignore_marker(url: &str) -> bool {
    url.contains(IGNORE_MARKER)
}

/// Remove every occurrence of the ignore marker.
pub fn strip_ignore_marker(url: &str) -> String {
    url.replace(IGNORE_MARKER, "")
}

/// A path-size directive consumed from a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSizeDirective {
    pub path_size: usize,
    /// What is left of the user's own fragment, if anything.
    pub fragment: Option<String>,
}

/// Find and consume a path-size directive in a fragment (without its leading `#`).
///
/// Text between the directive and the next `#` is the directive value.
/// Everything else is the user's fragment and is kept verbatim.
pub fn parse_path_size(fragment: &str) -> RewriteResult<Option<PathSizeDirective>> {
    let key = &PATH_SIZE_MARKER[1..];

    let (head, after) = if let Some(rest) = fragment.strip_prefix(key) {
        ("", rest)
    } else if let Some(idx) = fragment.find(PATH_SIZE_MARKER) {
        (&fragment[..idx], &fragment[idx + PATH_SIZE_MARKER.len()..])
    } else {
        return Ok(None);
    };

    let (value, tail) = match after.find('#') {
        Some(idx) => (&after[..idx], &after[idx..]),
        None => (after, ""),
    };
    let path_size = parse_value(value)?;

    let remaining = if head.is_empty() {
        tail.strip_prefix('#').unwrap_or(tail).to_string()
    } else {
        format!("{head}{tail}")
    };

    Ok(Some(PathSizeDirective {
        path_size,
        fragment: (!remaining.is_empty()).then_some(remaining),
    }))
}

/// Consume the path-size directive of `url`, returning the path size and
/// the URL with the directive removed from its fragment.
pub fn take_path_size(url: &AbsoluteUrl) -> RewriteResult<Option<(usize, AbsoluteUrl)>> {
    let Some(fragment) = url.fragment() else {
        return Ok(None);
    };
    Ok(parse_path_size(fragment)?.map(|directive| {
        let stripped = url.with_fragment(directive.fragment.as_deref());
        (directive.path_size, stripped)
    }))
}

fn parse_value(value: &str) -> RewriteResult<usize> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RewriteError::InvalidDirective(format!("{PATH_SIZE_MARKER}{value}")));
    }
    value
        .parse()
        .map_err(|_| RewriteError::InvalidDirective(format!("{PATH_SIZE_MARKER}{value}")))
}
