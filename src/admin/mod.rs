//! Admin HTTP API over a shared [`UrlManager`].
//!
//! Every route sits behind bearer-token auth. Mutations take effect on the
//! next processed request.

pub mod auth;
pub mod handlers;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::pipeline::UrlManager;

/// State shared by admin handlers.
#[derive(Debug, Clone)]
pub struct AdminState {
    pub manager: Arc<UrlManager>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(manager: Arc<UrlManager>, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            manager,
            api_key: api_key.into(),
        }
    }
}

#[allow(deprecated)]
pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/enabled", put(put_enabled))
        .route("/admin/domains", get(list_domains).delete(clear_domains))
        .route(
            "/admin/domains/{name}",
            get(get_domain).put(put_domain).delete(delete_domain),
        )
        .route("/admin/global", get(get_global).put(put_global).delete(delete_global))
        .route("/admin/advanced", put(put_advanced))
        .route("/admin/resolve", post(resolve))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Serve the admin API until `shutdown` resolves.
pub async fn serve_admin(
    listener: TcpListener,
    state: AdminState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
