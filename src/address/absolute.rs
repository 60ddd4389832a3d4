//! Validated absolute http(s) URL with path-segment operations.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{RewriteError, RewriteResult};

/// An absolute `http`/`https` URL with a non-empty host.
///
/// Path segments are the percent-encoded `/`-separated components of the
/// path. A bare root path (`/`) has no segments; a trailing slash shows up
/// as a single empty last segment. Every operation returns a new value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AbsoluteUrl {
    inner: Url,
}

impl AbsoluteUrl {
    /// Parse and validate a URL string.
    pub fn parse(input: &str) -> RewriteResult<Self> {
        let url = Url::parse(input).map_err(|e| RewriteError::invalid_url(input, e))?;
        Self::from_url(url)
    }

    /// Validate an already parsed URL.
    pub fn from_url(url: Url) -> RewriteResult<Self> {
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(RewriteError::invalid_url(
                    url.as_str(),
                    format!("unsupported scheme `{other}`"),
                ))
            }
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(RewriteError::invalid_url(url.as_str(), "missing host"));
        }
        Ok(Self { inner: url })
    }

    pub fn scheme(&self) -> &str {
        self.inner.scheme()
    }

    pub fn host(&self) -> &str {
        self.inner.host_str().unwrap_or_default()
    }

    /// Explicit port, `None` when the scheme default is used.
    pub fn port(&self) -> Option<u16> {
        self.inner.port()
    }

    /// Effective port, falling back to the scheme default.
    pub fn port_or_default(&self) -> u16 {
        self.inner
            .port_or_known_default()
            .unwrap_or(if self.scheme() == "https" { 443 } else { 80 })
    }

    /// Percent-encoded path, always starting with `/`.
    pub fn path(&self) -> &str {
        self.inner.path()
    }

    pub fn path_segments(&self) -> Vec<&str> {
        let path = self.inner.path();
        if path.is_empty() || path == "/" {
            return Vec::new();
        }
        path.strip_prefix('/').unwrap_or(path).split('/').collect()
    }

    pub fn path_segment_count(&self) -> usize {
        self.path_segments().len()
    }

    /// Number of path segments this URL covers when used as a base,
    /// i.e. ignoring a trailing empty segment left by a trailing slash.
    pub fn base_path_size(&self) -> usize {
        let segments = self.path_segments();
        match segments.last() {
            Some(last) if last.is_empty() => segments.len() - 1,
            _ => segments.len(),
        }
    }

    pub fn query(&self) -> Option<&str> {
        self.inner.query()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.inner.fragment()
    }

    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.inner
    }

    pub fn into_url(self) -> Url {
        self.inner
    }

    /// `scheme://host[:port]/path`, without query or fragment.
    pub fn location(&self) -> String {
        match self.port() {
            Some(port) => format!("{}://{}:{}{}", self.scheme(), self.host(), port, self.path()),
            None => format!("{}://{}{}", self.scheme(), self.host(), self.path()),
        }
    }

    pub fn with_fragment(&self, fragment: Option<&str>) -> Self {
        let mut url = self.inner.clone();
        url.set_fragment(fragment);
        Self { inner: url }
    }

    /// Replace the whole path with the given encoded segments.
    pub fn with_path_segments<I, S>(&self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<S> = segments.into_iter().collect();
        let refs: Vec<&str> = segments.iter().map(|s| s.as_ref()).collect();
        self.with_encoded_path(&encode_path(&refs))
    }

    /// Append one encoded segment, absorbing a trailing empty segment.
    pub fn push_segment(&self, segment: &str) -> Self {
        let segments = splice_segments(&self.path_segments(), &[segment]);
        self.with_path_segments(segments)
    }

    /// Remove the segment at `index`; out-of-range indices leave the path as is.
    pub fn remove_segment(&self, index: usize) -> Self {
        let mut segments = self.path_segments();
        if index < segments.len() {
            segments.remove(index);
        }
        self.with_path_segments(segments)
    }

    /// Replace the segment at `index`; out-of-range indices leave the path as is.
    pub fn replace_segment(&self, index: usize, segment: &str) -> Self {
        let mut segments = self.path_segments();
        if let Some(slot) = segments.get_mut(index) {
            *slot = segment;
        }
        self.with_path_segments(segments)
    }

    pub(crate) fn with_encoded_path(&self, path: &str) -> Self {
        let mut url = self.inner.clone();
        url.set_path(path);
        Self { inner: url }
    }

    /// Move this URL onto `replacement`'s scheme, host and port with the
    /// given encoded path. Query, fragment and user-info stay.
    pub(crate) fn rebase(&self, replacement: &AbsoluteUrl, encoded_path: &str) -> RewriteResult<Self> {
        let mut url = replacement.inner.clone();
        url.set_path(encoded_path);
        url.set_query(self.query());
        url.set_fragment(self.fragment());

        if !self.inner.username().is_empty() {
            url.set_username(self.inner.username())
                .map_err(|()| RewriteError::invalid_url(url.as_str(), "cannot carry username"))?;
        }
        if self.inner.password().is_some() {
            url.set_password(self.inner.password())
                .map_err(|()| RewriteError::invalid_url(url.as_str(), "cannot carry password"))?;
        }
        Ok(Self { inner: url })
    }
}

/// Join `rest` onto `prefix`. A trailing empty segment of the running path
/// is dropped before each appended segment, so `api/` + `wiki` is `api/wiki`.
pub fn splice_segments<'a>(prefix: &[&'a str], rest: &[&'a str]) -> Vec<&'a str> {
    let mut joined = prefix.to_vec();
    for segment in rest {
        if joined.last().is_some_and(|last| last.is_empty()) {
            joined.pop();
        }
        joined.push(segment);
    }
    joined
}

/// Encoded path string for a list of encoded segments.
pub fn encode_path(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

impl fmt::Display for AbsoluteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.inner.as_str())
    }
}

impl fmt::Debug for AbsoluteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AbsoluteUrl").field(&self.inner.as_str()).finish()
    }
}

impl FromStr for AbsoluteUrl {
    type Err = RewriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Url> for AbsoluteUrl {
    type Error = RewriteError;

    fn try_from(url: Url) -> Result<Self, Self::Error> {
        Self::from_url(url)
    }
}

impl From<AbsoluteUrl> for Url {
    fn from(url: AbsoluteUrl) -> Self {
        url.inner
    }
}
