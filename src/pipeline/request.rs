//! The view of a host request the pipeline needs.

use reqwest::header::HeaderMap;
use url::Url;

/// Header carrying the symbolic domain name of a request.
pub const DOMAIN_NAME_HEADER: &str = "Domain-Name";

/// An outgoing request whose target URL and headers can be rewritten.
///
/// The target must keep its fragment: both directives travel there.
pub trait HostRequest {
    fn target(&self) -> &Url;

    fn set_target(&mut self, url: Url);

    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;
}

impl HostRequest for reqwest::Request {
    fn target(&self) -> &Url {
        self.url()
    }

    fn set_target(&mut self, url: Url) {
        *self.url_mut() = url;
    }

    fn headers(&self) -> &HeaderMap {
        reqwest::Request::headers(self)
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        reqwest::Request::headers_mut(self)
    }
}
