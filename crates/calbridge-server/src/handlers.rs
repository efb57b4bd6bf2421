//! Request handlers.
//!
//! Each handler maps one JSON request onto one [`CalDavClient`] operation
//! and renders the result.
//!
//! [`CalDavClient`]: calbridge_caldav::CalDavClient

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use calbridge_core::{CalendarListing, EventItem, NewEvent, TimeRange};

use crate::error::ApiResult;
use crate::state::SharedState;

/// `{"ok": true}`
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    fn ok() -> Json<Self> {
        Json(Self { ok: true })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalResponse {
    pub principal_href: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    pub calendar_home: String,
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub items: Vec<EventItem>,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub ok: bool,
    pub uid: String,
    pub href: String,
}

/// Body of `POST /events`.
#[derive(Debug, Deserialize)]
pub struct EventsRequest {
    pub calendar_href: String,
    pub start_z: String,
    pub end_z: String,
}

/// Body of `POST /create`.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub calendar_href: String,
    pub summary: String,
    pub dtstart_z: String,
    pub dtend_z: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
}

impl From<CreateRequest> for NewEvent {
    fn from(req: CreateRequest) -> Self {
        Self {
            calendar_href: req.calendar_href,
            summary: req.summary,
            start: req.dtstart_z,
            end: req.dtend_z,
            description: req.description,
            uid: req.uid,
        }
    }
}

/// Body of `POST /delete`.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub href: String,
}

pub async fn health() -> Json<OkResponse> {
    OkResponse::ok()
}

pub async fn principal(State(state): State<SharedState>) -> ApiResult<Json<PrincipalResponse>> {
    let principal_href = state.client()?.discover_principal().await?;
    Ok(Json(PrincipalResponse { principal_href }))
}

/// Raw current-user-principal PROPFIND response, for diagnostics.
pub async fn principal_xml(State(state): State<SharedState>) -> ApiResult<String> {
    Ok(state.client()?.principal_xml().await?)
}

pub async fn home(State(state): State<SharedState>) -> ApiResult<Json<HomeResponse>> {
    let calendar_home = state.client()?.discover_calendar_home().await?;
    Ok(Json(HomeResponse { calendar_home }))
}

pub async fn calendars(State(state): State<SharedState>) -> ApiResult<Json<CalendarListing>> {
    Ok(Json(state.client()?.list_calendars().await?))
}

pub async fn events(
    State(state): State<SharedState>,
    payload: Result<Json<EventsRequest>, JsonRejection>,
) -> ApiResult<Json<EventsResponse>> {
    let Json(req) = payload?;
    let range = TimeRange::new(req.start_z, req.end_z);
    let items = state
        .client()?
        .query_events(&req.calendar_href, &range)
        .await?;
    Ok(Json(EventsResponse { items }))
}

pub async fn create(
    State(state): State<SharedState>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> ApiResult<Json<CreateResponse>> {
    let Json(req) = payload?;
    let created = state.client()?.create_event(&req.into()).await?;
    Ok(Json(CreateResponse {
        ok: true,
        uid: created.uid,
        href: created.href,
    }))
}

pub async fn delete(
    State(state): State<SharedState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> ApiResult<Json<OkResponse>> {
    let Json(req) = payload?;
    state.client()?.delete_event(&req.href).await?;
    Ok(OkResponse::ok())
}
