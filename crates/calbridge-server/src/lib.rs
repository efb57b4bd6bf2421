//! HTTP bridge exposing CalDAV operations as JSON endpoints.
//!
//! | Route                      | Operation                           |
//! |----------------------------|-------------------------------------|
//! | `GET /health`              | liveness                            |
//! | `GET /principal`           | principal discovery                 |
//! | `GET /home`                | calendar home discovery             |
//! | `GET /calendars`           | full discovery + calendar listing   |
//! | `POST /events`             | time-range event query              |
//! | `POST /create`             | event creation                      |
//! | `POST /delete`             | event deletion                      |
//! | `GET /debug/principal-xml` | raw principal PROPFIND response     |
//!
//! When an API key is configured every route, health included, requires a
//! matching `X-Api-Key` header.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use calbridge_caldav::CalDavClient;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ServerError, ServerResult};
pub use state::{AppState, SharedState};

/// Builds the router over `state`.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/principal", get(handlers::principal))
        .route("/home", get(handlers::home))
        .route("/calendars", get(handlers::calendars))
        .route("/events", post(handlers::events))
        .route("/create", post(handlers::create))
        .route("/delete", post(handlers::delete))
        .route("/debug/principal-xml", get(handlers::principal_xml))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the shared state described by `config`.
pub fn build_state(config: &ServerConfig) -> ServerResult<SharedState> {
    let mut state = AppState::new();

    match config.caldav_config()? {
        Some(caldav) => {
            info!(base_url = %caldav.base_url, "CalDAV account configured");
            state = state.with_client(CalDavClient::new(caldav)?);
        }
        None => warn!("APPLE_ID or APPLE_APP_PASSWORD missing, calendar endpoints will fail"),
    }

    if let Some(key) = config.api_key() {
        state = state.with_api_key(key);
    }

    Ok(state.into_shared())
}

/// Serves the bridge until interrupted.
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    let state = build_state(&config)?;
    let listener = TcpListener::bind(config.listen).await?;
    info!(addr = %config.listen, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received interrupt, shutting down"),
        Err(e) => warn!(error = %e, "Failed to listen for interrupt"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use calbridge_caldav::{CalDavConfig, DavMethod, ScriptedTransport};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn scripted_state(transport: ScriptedTransport) -> (AppState, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let config = CalDavConfig::new("https://caldav.example.com")
            .unwrap()
            .with_credentials("me", "pw");
        let client = CalDavClient::with_transport(config, transport.clone());
        (AppState::new().with_client(client), transport)
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router(state.into_shared()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(state, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const PRINCIPAL: &str = r#"<d:multistatus xmlns:d="DAV:"><d:response><d:propstat><d:prop>
        <d:current-user-principal><d:href>/123/principal/</d:href></d:current-user-principal>
        </d:prop></d:propstat></d:response></d:multistatus>"#;

    const HOME: &str = r#"<d:multistatus xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
        <d:response><d:propstat><d:prop>
        <c:calendar-home-set><d:href>/123/calendars/</d:href></c:calendar-home-set>
        </d:prop></d:propstat></d:response></d:multistatus>"#;

    const LISTING: &str = r#"<d:multistatus xmlns:d="DAV:">
        <d:response><d:href>/123/calendars/work/</d:href>
        <d:propstat><d:prop><d:displayname>Work</d:displayname></d:prop></d:propstat></d:response>
        <d:response><d:href>/123/calendars/inbox/</d:href>
        <d:propstat><d:prop><d:resourcetype/></d:prop></d:propstat></d:response>
        </d:multistatus>"#;

    #[tokio::test]
    async fn health_without_api_key() {
        let (status, body) = send_json(AppState::new(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn api_key_guards_every_route() {
        let state = AppState::new().with_api_key("sekrit");

        let (status, body) = send_json(state.clone(), get("/health")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"detail": "Invalid API key"}));

        let wrong = Request::builder()
            .uri("/calendars")
            .header("X-Api-Key", "nope")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send_json(state.clone(), wrong).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let right = Request::builder()
            .uri("/health")
            .header("X-Api-Key", "sekrit")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send_json(state, right).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn api_key_checked_before_credentials() {
        let state = AppState::new().with_api_key("k");
        let (status, _) = send_json(state, get("/principal")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_credentials_is_server_error() {
        let (status, body) = send_json(AppState::new(), get("/calendars")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"detail": "Server misconfigured: APPLE_ID or APPLE_APP_PASSWORD missing"})
        );
    }

    #[tokio::test]
    async fn principal_endpoint() {
        let (state, _) = scripted_state(ScriptedTransport::new().respond(207, PRINCIPAL));
        let (status, body) = send_json(state, get("/principal")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"principalHref": "/123/principal/"}));
    }

    #[tokio::test]
    async fn home_endpoint() {
        let (state, _) = scripted_state(
            ScriptedTransport::new()
                .respond(207, PRINCIPAL)
                .respond(207, HOME),
        );
        let (status, body) = send_json(state, get("/home")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"calendarHome": "/123/calendars/"}));
    }

    #[tokio::test]
    async fn calendars_endpoint() {
        let (state, transport) = scripted_state(
            ScriptedTransport::new()
                .respond(207, PRINCIPAL)
                .respond(207, HOME)
                .respond(207, LISTING),
        );
        let (status, body) = send_json(state, get("/calendars")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "home": "/123/calendars/",
                "items": [{"href": "/123/calendars/work/", "displayname": "Work"}]
            })
        );
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn events_endpoint() {
        let report = r#"<d:multistatus xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
            <d:response><d:href>/123/calendars/work/a.ics</d:href>
            <d:propstat><d:prop><c:calendar-data>BEGIN:VCALENDAR</c:calendar-data></d:prop></d:propstat>
            </d:response></d:multistatus>"#;
        let (state, transport) = scripted_state(ScriptedTransport::new().respond(207, report));

        let request = post(
            "/events",
            json!({
                "calendar_href": "/123/calendars/work/",
                "start_z": "20250201T000000Z",
                "end_z": "20250301T000000Z"
            }),
        );
        let (status, body) = send_json(state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"items": [{"href": "/123/calendars/work/a.ics", "ics": "BEGIN:VCALENDAR"}]})
        );
        assert_eq!(transport.requests()[0].method, DavMethod::Report);
    }

    #[tokio::test]
    async fn create_endpoint() {
        let (state, transport) = scripted_state(ScriptedTransport::new().respond(201, ""));
        let request = post(
            "/create",
            json!({
                "calendar_href": "/123/calendars/work/",
                "summary": "Standup",
                "dtstart_z": "20250101T090000Z",
                "dtend_z": "20250101T093000Z",
                "uid": "abc"
            }),
        );
        let (status, body) = send_json(state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"ok": true, "uid": "ABC", "href": "/123/calendars/work/ABC.ics"})
        );

        let put = &transport.requests()[0];
        assert_eq!(put.method, DavMethod::Put);
        assert_eq!(put.url, "https://caldav.example.com/123/calendars/work/ABC.ics");
        assert!(put.body.as_deref().unwrap().contains("DESCRIPTION:\r\n"));
    }

    #[tokio::test]
    async fn create_conflict_passes_status_through() {
        let (state, _) = scripted_state(ScriptedTransport::new().respond(412, ""));
        let request = post(
            "/create",
            json!({
                "calendar_href": "/c/",
                "summary": "S",
                "dtstart_z": "A",
                "dtend_z": "B"
            }),
        );
        let (status, body) = send_json(state, request).await;
        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(body, json!({"detail": "Precondition Failed"}));
    }

    #[tokio::test]
    async fn create_with_missing_field_is_rejected() {
        let (state, transport) = scripted_state(ScriptedTransport::new());
        let request = post("/create", json!({"calendar_href": "/c/"}));
        let (status, body) = send_json(state, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn delete_endpoint() {
        let (state, _) = scripted_state(ScriptedTransport::new().respond(204, ""));
        let request = post("/delete", json!({"href": "/123/calendars/work/ABC.ics"}));
        let (status, body) = send_json(state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn delete_missing_event_passes_404_through() {
        let (state, _) = scripted_state(ScriptedTransport::new().respond(404, "Not Found"));
        let request = post("/delete", json!({"href": "/123/calendars/work/ABC.ics"}));
        let (status, body) = send_json(state, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Not Found"}));
    }

    #[tokio::test]
    async fn transport_failure_is_bad_gateway() {
        let (state, _) = scripted_state(ScriptedTransport::new().fail("connection refused"));
        let (status, body) = send_json(state, get("/principal")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body,
            json!({"detail": "Upstream request failed: connection refused"})
        );
    }

    #[tokio::test]
    async fn principal_xml_is_raw_text() {
        let (state, _) = scripted_state(ScriptedTransport::new().respond(207, "<raw/>"));
        let (status, body) = send(state, get("/debug/principal-xml")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<raw/>");
    }
}
