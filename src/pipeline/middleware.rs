//! reqwest client integration.

use std::sync::Arc;

use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next};

use crate::pipeline::manager::UrlManager;

/// Runs every outgoing request through [`UrlManager::process_request`].
///
/// A rewrite error aborts the request with `reqwest_middleware::Error::Middleware`.
#[derive(Debug, Clone)]
pub struct RewriteMiddleware {
    manager: Arc<UrlManager>,
}

impl RewriteMiddleware {
    pub fn new(manager: Arc<UrlManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<UrlManager> {
        &self.manager
    }

    /// Wrap `client` so that every request it sends is rewritten.
    pub fn wrap(manager: Arc<UrlManager>, client: reqwest::Client) -> ClientWithMiddleware {
        ClientBuilder::new(client).with(Self::new(manager)).build()
    }
}

#[async_trait::async_trait]
impl Middleware for RewriteMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let req = self
            .manager
            .process_request(req)
            .map_err(reqwest_middleware::Error::middleware)?;
        next.run(req, extensions).await
    }
}
