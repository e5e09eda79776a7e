//! Route handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::{Incident, IncidentId, IncidentPatch, NewIncident, NewSite, Site, SiteId};
use crate::registry::{SharedRegistry, Stats};

/// Application name reported by the status endpoint.
pub const APP_NAME: &str = "Worksite Secure";

/// Routes listed by GET /docs, as (method, path, description).
pub const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/", "Service banner"),
    ("GET", "/docs", "This endpoint list"),
    ("GET", "/status", "Liveness plus site and incident counts"),
    ("GET", "/stats", "Dashboard statistics"),
    ("GET", "/sites", "All sites"),
    ("POST", "/sites", "Create a site"),
    ("GET", "/sites/:id", "One site"),
    ("GET", "/incidents", "All incidents, optionally ?site_id=N"),
    ("GET", "/incidents/open", "Incidents not yet resolved"),
    ("POST", "/incidents", "Report an incident"),
    ("GET", "/incidents/:id", "One incident"),
    ("PATCH", "/incidents/:id", "Update status, severity or description"),
];

/// GET /
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Worksite Secure API",
        "docs": "/docs",
        "status_endpoint": "/status",
    }))
}

/// GET /docs
pub async fn docs() -> impl IntoResponse {
    let endpoints: Vec<_> = ENDPOINTS
        .iter()
        .map(|(method, path, description)| {
            serde_json::json!({
                "method": method,
                "path": path,
                "description": description,
            })
        })
        .collect();

    Json(serde_json::json!({
        "app": APP_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
    }))
}

/// Liveness plus collection sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Application name.
    pub app: String,
    /// Always "OK" while the process is serving.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Number of sites.
    pub sites: usize,
    /// Number of incidents.
    pub incidents: usize,
}

/// GET /status
pub async fn status(State(registry): State<SharedRegistry>) -> Json<StatusResponse> {
    let registry = registry.read().await;

    Json(StatusResponse {
        app: APP_NAME.to_string(),
        status: "OK".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sites: registry.site_count(),
        incidents: registry.incident_count(),
    })
}

/// GET /stats
pub async fn stats(State(registry): State<SharedRegistry>) -> Json<Stats> {
    let registry = registry.read().await;
    Json(registry.stats())
}

// === Sites ===

/// GET /sites
pub async fn list_sites(State(registry): State<SharedRegistry>) -> Json<Vec<Site>> {
    let registry = registry.read().await;
    Json(registry.sites().to_vec())
}

/// GET /sites/:id
pub async fn get_site(
    State(registry): State<SharedRegistry>,
    id: std::result::Result<Path<SiteId>, PathRejection>,
) -> Result<Json<Site>> {
    let Path(id) = id?;
    let registry = registry.read().await;
    registry
        .site(id)
        .cloned()
        .map(Json)
        .ok_or(Error::SiteNotFound { site_id: id })
}

/// POST /sites
pub async fn create_site(
    State(registry): State<SharedRegistry>,
    new: std::result::Result<Json<NewSite>, JsonRejection>,
) -> Result<(StatusCode, Json<Site>)> {
    let Json(new) = new?;
    new.validate()?;
    let site = registry.write().await.create_site(new);
    Ok((StatusCode::CREATED, Json(site)))
}

// === Incidents ===

/// Query string accepted by GET /incidents.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct IncidentFilter {
    /// Only return incidents for this site.
    pub site_id: Option<SiteId>,
}

/// GET /incidents
pub async fn list_incidents(
    State(registry): State<SharedRegistry>,
    filter: std::result::Result<Query<IncidentFilter>, QueryRejection>,
) -> Result<Json<Vec<Incident>>> {
    let Query(filter) = filter?;
    let registry = registry.read().await;
    Ok(Json(registry.incidents(filter.site_id)))
}

/// GET /incidents/open
pub async fn list_open_incidents(State(registry): State<SharedRegistry>) -> Json<Vec<Incident>> {
    let registry = registry.read().await;
    Json(registry.open_incidents())
}

/// GET /incidents/:id
pub async fn get_incident(
    State(registry): State<SharedRegistry>,
    id: std::result::Result<Path<IncidentId>, PathRejection>,
) -> Result<Json<Incident>> {
    let Path(id) = id?;
    let registry = registry.read().await;
    registry
        .incident(id)
        .cloned()
        .map(Json)
        .ok_or(Error::IncidentNotFound { incident_id: id })
}

/// POST /incidents
pub async fn create_incident(
    State(registry): State<SharedRegistry>,
    new: std::result::Result<Json<NewIncident>, JsonRejection>,
) -> Result<(StatusCode, Json<Incident>)> {
    let Json(new) = new?;
    new.validate()?;
    let incident = registry.write().await.create_incident(new)?;
    Ok((StatusCode::CREATED, Json(incident)))
}

/// PATCH /incidents/:id
pub async fn update_incident(
    State(registry): State<SharedRegistry>,
    id: std::result::Result<Path<IncidentId>, PathRejection>,
    patch: std::result::Result<Json<IncidentPatch>, JsonRejection>,
) -> Result<Json<Incident>> {
    let Path(id) = id?;
    let Json(patch) = patch?;
    let incident = registry.write().await.update_incident(id, patch)?;
    Ok(Json(incident))
}
