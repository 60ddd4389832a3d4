use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::admin::AdminState;
use crate::error::RewriteError;
use crate::pipeline::{HostRequest, DOMAIN_NAME_HEADER};
use crate::rewrite::AdvancedBasis;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemStatus {
    pub version: String,
    pub enabled: bool,
    pub advanced: Option<AdvancedStatus>,
    pub domains: usize,
    pub global: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdvancedStatus {
    pub base_url: String,
    pub path_size: usize,
}

impl From<AdvancedBasis> for AdvancedStatus {
    fn from(basis: AdvancedBasis) -> Self {
        Self {
            base_url: basis.base_url().to_string(),
            path_size: basis.path_size(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnabledBody {
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UrlBody {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DomainEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdvancedBody {
    pub base_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveBody {
    pub url: String,
    #[serde(default)]
    pub domain: Option<String>,
}

/// Errors returned by admin handlers as `{ "error", "kind" }`.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            AdminError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AdminError::Rewrite(err) => (StatusCode::BAD_REQUEST, err.kind()),
        };
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": kind,
        });
        (status, Json(body)).into_response()
    }
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let manager = &state.manager;
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        enabled: manager.is_enabled(),
        advanced: manager.advanced_basis().map(AdvancedStatus::from),
        domains: manager.registry().len(),
        global: manager.registry().global().map(|url| url.to_string()),
    })
}

pub async fn put_enabled(State(state): State<AdminState>, Json(body): Json<EnabledBody>) -> Json<EnabledBody> {
    state.manager.set_enabled(body.enabled);
    tracing::info!(enabled = body.enabled, "Rewriting toggled via admin API");
    Json(body)
}

pub async fn list_domains(State(state): State<AdminState>) -> Json<BTreeMap<String, String>> {
    let entries = state
        .manager
        .registry()
        .entries()
        .into_iter()
        .map(|(name, url)| (name, url.to_string()))
        .collect();
    Json(entries)
}

pub async fn clear_domains(State(state): State<AdminState>) -> StatusCode {
    state.manager.registry().clear();
    tracing::info!("Domain registry cleared via admin API");
    StatusCode::NO_CONTENT
}

pub async fn get_domain(
    State(state): State<AdminState>,
    Path(name): Path<String>,
) -> Result<Json<DomainEntry>, AdminError> {
    let url = state
        .manager
        .registry()
        .fetch(&name)
        .ok_or_else(|| AdminError::NotFound(format!("domain `{name}`")))?;
    Ok(Json(DomainEntry {
        name,
        url: url.to_string(),
    }))
}

pub async fn put_domain(
    State(state): State<AdminState>,
    Path(name): Path<String>,
    Json(body): Json<UrlBody>,
) -> Result<Json<DomainEntry>, AdminError> {
    state.manager.registry().put(name.as_str(), &body.url)?;
    let url = state
        .manager
        .registry()
        .fetch(&name)
        .map(|url| url.to_string())
        .unwrap_or(body.url);
    Ok(Json(DomainEntry { name, url }))
}

pub async fn delete_domain(
    State(state): State<AdminState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AdminError> {
    match state.manager.registry().remove(&name) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AdminError::NotFound(format!("domain `{name}`"))),
    }
}

pub async fn get_global(State(state): State<AdminState>) -> Result<Json<UrlBody>, AdminError> {
    let url = state
        .manager
        .registry()
        .global()
        .ok_or_else(|| AdminError::NotFound("global domain".to_string()))?;
    Ok(Json(UrlBody { url: url.to_string() }))
}

pub async fn put_global(
    State(state): State<AdminState>,
    Json(body): Json<UrlBody>,
) -> Result<Json<UrlBody>, AdminError> {
    state.manager.registry().set_global(&body.url)?;
    let url = state
        .manager
        .registry()
        .global()
        .map(|url| url.to_string())
        .unwrap_or(body.url);
    Ok(Json(UrlBody { url }))
}

pub async fn delete_global(State(state): State<AdminState>) -> Result<StatusCode, AdminError> {
    match state.manager.registry().remove_global() {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AdminError::NotFound("global domain".to_string())),
    }
}

pub async fn put_advanced(
    State(state): State<AdminState>,
    Json(body): Json<AdvancedBody>,
) -> Result<Json<AdvancedStatus>, AdminError> {
    state.manager.start_advanced_mode(&body.base_url)?;
    let basis = state
        .manager
        .advanced_basis()
        .ok_or_else(|| AdminError::NotFound("advanced basis".to_string()))?;
    Ok(Json(basis.into()))
}

/// Run a URL through the pipeline as if a client were about to request it.
pub async fn resolve(
    State(state): State<AdminState>,
    Json(body): Json<ResolveBody>,
) -> Result<Json<UrlBody>, AdminError> {
    let url = Url::parse(&body.url).map_err(|e| RewriteError::invalid_url(body.url.as_str(), e))?;
    let mut request = reqwest::Request::new(reqwest::Method::GET, url);
    if let Some(domain) = &body.domain {
        let value = HeaderValue::from_str(domain)
            .map_err(|_| RewriteError::Configuration(format!("`{domain}` is not a valid header value")))?;
        request.headers_mut().insert(DOMAIN_NAME_HEADER, value);
    }

    let request = state.manager.process_request(request)?;
    Ok(Json(UrlBody {
        url: request.target().to_string(),
    }))
}
