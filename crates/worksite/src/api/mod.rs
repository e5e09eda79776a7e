//! HTTP API for worksite.
//!
//! Routes translate requests into registry calls and registry results into
//! JSON responses for the dashboard.

mod handlers;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
use crate::error::{Error, Result};
use crate::registry::SharedRegistry;

pub use handlers::{IncidentFilter, StatusResponse, APP_NAME, ENDPOINTS};

/// Build the API routes over a shared registry.
pub fn routes(registry: SharedRegistry) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/docs", get(handlers::docs))
        .route("/status", get(handlers::status))
        .route("/stats", get(handlers::stats))
        // Sites
        .route("/sites", get(handlers::list_sites).post(handlers::create_site))
        .route("/sites/:id", get(handlers::get_site))
        // Incidents
        .route(
            "/incidents",
            get(handlers::list_incidents).post(handlers::create_incident),
        )
        .route("/incidents/open", get(handlers::list_open_incidents))
        .route(
            "/incidents/:id",
            get(handlers::get_incident).patch(handlers::update_incident),
        )
        .with_state(registry)
}

/// Build the full application: routes plus CORS and request tracing.
///
/// # Errors
///
/// Returns an error if a configured origin is not a valid header value.
pub fn app(registry: SharedRegistry, cors: &CorsConfig) -> Result<Router> {
    Ok(routes(registry)
        .layer(cors_layer(cors)?)
        .layer(TraceLayer::new_for_http()))
}

/// Build the CORS layer for the dashboard origins.
///
/// # Errors
///
/// Returns an error if a configured origin is not a valid header value.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    if config.allows_any_origin() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| Error::ConfigValidation {
                message: format!("invalid CORS origin: {origin}"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Credentialed requests cannot use wildcards, so methods and headers
    // echo back whatever the preflight asked for.
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

impl Error {
    /// HTTP status code this error is reported with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ if self.is_client_error() => StatusCode::BAD_REQUEST,
            _ if self.is_not_found() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Extractor rejections are shape failures: report them like any other
// invalid input so clients always get a JSON `error` body and a 422.

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_input("body", rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid_input("query", rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::invalid_input("path", rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::ANY_ORIGIN;
    use crate::registry::{Registry, RegistryDefaults};

    fn seeded_state() -> SharedRegistry {
        Registry::with_seed_data(RegistryDefaults::default())
            .unwrap()
            .into_shared()
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, Method::GET, uri, None).await
    }

    #[tokio::test]
    async fn test_root_banner() {
        let (status, json) = get(routes(seeded_state()), "/").await;
        assert_eq!(status, StatusCode::OK);
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["docs", "message", "status_endpoint"]);
        assert_eq!(json["message"], "Worksite Secure API");
        assert_eq!(json["docs"], "/docs");
        assert_eq!(json["status_endpoint"], "/status");
    }

    #[tokio::test]
    async fn test_docs_lists_every_route() {
        let (status, json) = get(routes(seeded_state()), "/docs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["app"], APP_NAME);
        let endpoints = json["endpoints"].as_array().unwrap();
        assert_eq!(endpoints.len(), ENDPOINTS.len());
        assert!(endpoints
            .iter()
            .any(|e| e["method"] == "PATCH" && e["path"] == "/incidents/:id"));
    }

    #[tokio::test]
    async fn test_status_reports_counts() {
        let (status, json) = get(routes(seeded_state()), "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["app"], APP_NAME);
        assert_eq!(json["status"], "OK");
        assert_eq!(json["sites"], 3);
        assert_eq!(json["incidents"], 3);
    }

    #[tokio::test]
    async fn test_list_sites() {
        let (status, json) = get(routes(seeded_state()), "/sites").await;
        assert_eq!(status, StatusCode::OK);
        let sites = json.as_array().unwrap();
        assert_eq!(sites.len(), 3);
        assert_eq!(sites[0]["id"], 1);
        assert_eq!(sites[0]["name"], "Immeuble Plateau A");
        assert_eq!(sites[2]["risk_score"], 80);
    }

    #[tokio::test]
    async fn test_create_site() {
        let state = seeded_state();
        let (status, json) = send(
            routes(state.clone()),
            Method::POST,
            "/sites",
            Some(json!({ "name": "Tour Horizon", "location": "Abidjan" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["id"], 4);
        assert_eq!(json["risk_score"], 50);
        assert_eq!(json["workers_present_today"], 0);
        assert_eq!(state.read().await.site_count(), 4);
    }

    #[tokio::test]
    async fn test_create_site_rejects_blank_name() {
        let state = seeded_state();
        let (status, json) = send(
            routes(state.clone()),
            Method::POST,
            "/sites",
            Some(json!({ "name": "  " })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("name"));
        assert_eq!(state.read().await.site_count(), 3);
    }

    #[tokio::test]
    async fn test_get_site() {
        let (status, json) = get(routes(seeded_state()), "/sites/2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Chantier Zone Industrielle");

        let (status, _) = get(routes(seeded_state()), "/sites/99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_incidents_with_site_filter() {
        let (status, json) = get(routes(seeded_state()), "/incidents").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 3);

        let (status, json) = get(routes(seeded_state()), "/incidents?site_id=1").await;
        assert_eq!(status, StatusCode::OK);
        let incidents = json.as_array().unwrap();
        assert_eq!(incidents.len(), 2);
        assert!(incidents.iter().all(|i| i["site_id"] == 1));
        assert_eq!(incidents[0]["type"], "Vol");
    }

    #[tokio::test]
    async fn test_list_open_incidents() {
        let (status, json) = get(routes(seeded_state()), "/incidents/open").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<_> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_create_incident_defaults_status() {
        let state = seeded_state();
        let (status, json) = send(
            routes(state.clone()),
            Method::POST,
            "/incidents",
            Some(json!({
                "site_id": 2,
                "type": "Accident",
                "severity": "Minor",
                "description": "Worker slipped on scaffolding"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["id"], 4);
        assert_eq!(json["status"], "New");
        assert!(json["created_at"].is_string());
        assert_eq!(state.read().await.incident_count(), 4);
    }

    #[tokio::test]
    async fn test_create_incident_unknown_site() {
        let state = seeded_state();
        let (status, json) = send(
            routes(state.clone()),
            Method::POST,
            "/incidents",
            Some(json!({
                "site_id": 999,
                "type": "Theft",
                "severity": "Minor",
                "description": "Nothing"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "unknown site: 999");
        assert_eq!(state.read().await.incident_count(), 3);
    }

    #[tokio::test]
    async fn test_create_incident_missing_field() {
        let state = seeded_state();
        let (status, json) = send(
            routes(state.clone()),
            Method::POST,
            "/incidents",
            Some(json!({ "site_id": 1, "type": "Theft", "severity": "Minor" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = json["error"].as_str().unwrap();
        assert!(message.starts_with("invalid body"));
        assert!(message.contains("description"));
        assert_eq!(state.read().await.incident_count(), 3);
    }

    #[tokio::test]
    async fn test_malformed_json_body_is_invalid_input() {
        let state = seeded_state();
        let response = routes(state.clone())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/incidents")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"site_id\": 1,"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["error"].is_string());
        assert_eq!(state.read().await.incident_count(), 3);
    }

    #[tokio::test]
    async fn test_patch_with_wrong_field_type_is_invalid_input() {
        let state = seeded_state();
        let before = state.read().await.incident(1).cloned();
        let (status, json) = send(
            routes(state.clone()),
            Method::PATCH,
            "/incidents/1",
            Some(json!({ "status": 5 })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].is_string());
        assert_eq!(state.read().await.incident(1).cloned(), before);
    }

    #[tokio::test]
    async fn test_bad_path_and_query_are_invalid_input() {
        let (status, json) = get(routes(seeded_state()), "/incidents/abc").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().starts_with("invalid path"));

        let (status, json) = get(routes(seeded_state()), "/incidents?site_id=two").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().starts_with("invalid query"));
    }

    #[tokio::test]
    async fn test_update_incident() {
        let state = seeded_state();
        let (status, json) = send(
            routes(state.clone()),
            Method::PATCH,
            "/incidents/1",
            Some(json!({ "status": "Résolu" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "Résolu");
        assert_eq!(json["severity"], "Moyen");
        assert_eq!(json["description"], "Vol de ciment");
        assert_eq!(json["created_at"], "2025-12-30T08:20:13Z");

        let (_, stats) = get(routes(state), "/stats").await;
        assert_eq!(stats["resolved_percentage"], 67);
    }

    #[tokio::test]
    async fn test_update_unknown_incident() {
        let (status, json) = send(
            routes(seeded_state()),
            Method::PATCH,
            "/incidents/42",
            Some(json!({ "status": "Resolved" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "incident not found: 42");
    }

    #[tokio::test]
    async fn test_get_incident() {
        let (status, json) = get(routes(seeded_state()), "/incidents/3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["type"], "Intrusion");

        let (status, _) = get(routes(seeded_state()), "/incidents/30").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stats() {
        let (status, json) = get(routes(seeded_state()), "/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_sites"], 3);
        assert_eq!(json["total_incidents"], 3);
        assert_eq!(json["resolved_percentage"], 33);
        assert_eq!(json["critical_incidents"], 1);
    }

    #[tokio::test]
    async fn test_stats_on_empty_registry() {
        let state = Registry::default().into_shared();
        let (status, json) = get(routes(state), "/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_incidents"], 0);
        assert_eq!(json["resolved_percentage"], 0);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_dashboard_origin() {
        let app = app(seeded_state(), &CorsConfig::default()).unwrap();
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/incidents")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_cors_rejects_unknown_origin() {
        let app = app(seeded_state(), &CorsConfig::default()).unwrap();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/sites")
                    .header(header::ORIGIN, "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[test]
    fn test_cors_layer_any_origin() {
        let config = CorsConfig {
            allowed_origins: vec![ANY_ORIGIN.to_string()],
        };
        assert!(cors_layer(&config).is_ok());
    }

    #[test]
    fn test_cors_layer_invalid_origin() {
        let config = CorsConfig {
            allowed_origins: vec!["bad\norigin".to_string()],
        };
        assert!(matches!(
            cors_layer(&config),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            Error::UnknownSite { site_id: 1 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::IncidentNotFound { incident_id: 1 }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::invalid_input("name", "empty").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::SiteNotFound { site_id: 1 }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::ConfigValidation {
                message: "bad".to_string()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
