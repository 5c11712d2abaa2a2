use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::decorators::auth_required;
use crate::domain::repository::EventListenerRepository;
use crate::domain::types::{EventListener, EventListenerChanges};
use crate::error::WebservicesError;
use crate::http::{RequestContext, extend_uri_path};
use crate::managers::Operation;
use crate::state::AppState;
use crate::usecase::event::{
    CreateEventListenerInput, CreateEventListenerUseCase, DeleteEventListenerUseCase,
    GetEventListenerUseCase, ListEventListenersUseCase, UpdateEventListenerUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EventListenerResponse {
    pub id: Uuid,
    pub notifier_type_id: String,
    pub notifier_config: Map<String, Value>,
    pub event_types: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "_href")]
    pub href: String,
}

impl EventListenerResponse {
    fn new(listener: EventListener, href: String) -> Self {
        Self {
            id: listener.id,
            notifier_type_id: listener.notifier_type_id,
            notifier_config: listener.notifier_config,
            event_types: listener.event_types,
            created_at: listener.created_at,
            href,
        }
    }
}

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateEventListenerRequest {
    pub notifier_type_id: String,
    #[serde(default)]
    pub notifier_config: Value,
    pub event_types: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventListenerRequest {
    #[serde(default)]
    pub notifier_config: Option<Value>,
    #[serde(default)]
    pub event_types: Option<Vec<String>>,
}

fn notifier_config(value: Value) -> Result<Map<String, Value>, WebservicesError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(WebservicesError::InvalidNotifierConfig),
    }
}

fn parse_id(raw: &str) -> Result<Uuid, WebservicesError> {
    raw.parse()
        .map_err(|_| WebservicesError::EventListenerNotFound)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, WebservicesError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| WebservicesError::InvalidRequestBody(rejection.body_text()))
}

fn listener_href(base: &str, listener: &EventListener) -> String {
    extend_uri_path(base, &listener.id.to_string())
}

// ── GET /pulp/api/v2/events/ ─────────────────────────────────────────────────

pub async fn list_event_listeners<R>(
    ctx: RequestContext,
    State(state): State<AppState<R>>,
) -> Result<Json<Vec<EventListenerResponse>>, WebservicesError>
where
    R: EventListenerRepository + Clone,
{
    let _principal = auth_required(&state.collaborators, &ctx, Operation::Read)?;
    let uc = ListEventListenersUseCase {
        repo: state.event_repo(),
    };
    let listeners = uc.execute().await?;

    let base = state.collaborators.uri_path.get().uri_path(&ctx);
    let items = listeners
        .into_iter()
        .map(|l| {
            let href = listener_href(&base, &l);
            EventListenerResponse::new(l, href)
        })
        .collect();
    Ok(Json(items))
}

// ── POST /pulp/api/v2/events/ ────────────────────────────────────────────────

pub async fn create_event_listener<R>(
    ctx: RequestContext,
    State(state): State<AppState<R>>,
    payload: Result<Json<CreateEventListenerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EventListenerResponse>), WebservicesError>
where
    R: EventListenerRepository + Clone,
{
    let _principal = auth_required(&state.collaborators, &ctx, Operation::Create)?;
    let req = body(payload)?;
    let uc = CreateEventListenerUseCase {
        repo: state.event_repo(),
    };
    let listener = uc
        .execute(CreateEventListenerInput {
            notifier_type_id: req.notifier_type_id,
            notifier_config: notifier_config(req.notifier_config)?,
            event_types: req.event_types,
        })
        .await?;

    let base = state.collaborators.uri_path.get().uri_path(&ctx);
    let href = listener_href(&base, &listener);
    Ok((
        StatusCode::CREATED,
        Json(EventListenerResponse::new(listener, href)),
    ))
}

// ── GET /pulp/api/v2/events/{event_listener_id}/ ─────────────────────────────

pub async fn get_event_listener<R>(
    ctx: RequestContext,
    State(state): State<AppState<R>>,
    Path(event_listener_id): Path<String>,
) -> Result<Json<EventListenerResponse>, WebservicesError>
where
    R: EventListenerRepository + Clone,
{
    let _principal = auth_required(&state.collaborators, &ctx, Operation::Read)?;
    let uc = GetEventListenerUseCase {
        repo: state.event_repo(),
    };
    let listener = uc.execute(parse_id(&event_listener_id)?).await?;

    let href = state.collaborators.uri_path.get().uri_path(&ctx);
    Ok(Json(EventListenerResponse::new(listener, href)))
}

// ── PUT /pulp/api/v2/events/{event_listener_id}/ ─────────────────────────────

pub async fn update_event_listener<R>(
    ctx: RequestContext,
    State(state): State<AppState<R>>,
    Path(event_listener_id): Path<String>,
    payload: Result<Json<UpdateEventListenerRequest>, JsonRejection>,
) -> Result<Json<EventListenerResponse>, WebservicesError>
where
    R: EventListenerRepository + Clone,
{
    let _principal = auth_required(&state.collaborators, &ctx, Operation::Update)?;
    let req = body(payload)?;
    let changes = EventListenerChanges {
        notifier_config: req.notifier_config.map(notifier_config).transpose()?,
        event_types: req.event_types,
    };
    let uc = UpdateEventListenerUseCase {
        repo: state.event_repo(),
    };
    let listener = uc.execute(parse_id(&event_listener_id)?, changes).await?;

    let href = state.collaborators.uri_path.get().uri_path(&ctx);
    Ok(Json(EventListenerResponse::new(listener, href)))
}

// ── DELETE /pulp/api/v2/events/{event_listener_id}/ ──────────────────────────

pub async fn delete_event_listener<R>(
    ctx: RequestContext,
    State(state): State<AppState<R>>,
    Path(event_listener_id): Path<String>,
) -> Result<StatusCode, WebservicesError>
where
    R: EventListenerRepository + Clone,
{
    let _principal = auth_required(&state.collaborators, &ctx, Operation::Delete)?;
    let uc = DeleteEventListenerUseCase {
        repo: state.event_repo(),
    };
    uc.execute(parse_id(&event_listener_id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
