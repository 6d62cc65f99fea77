//! REST endpoints.
//!
//! - `POST /api/chat`                      — one chat turn
//! - `GET  /api/knowledge/teachers`        — directory, `?search=` filter
//! - `GET  /api/knowledge/schedule`        — the schedule document
//! - `GET  /api/knowledge/current-day`     — today's rotation day
//! - `GET  /api/knowledge/events`          — upcoming events, `?limit=`
//! - `GET  /api/knowledge/clubs`           — clubs, `?name=` lookup
//! - `GET  /api/knowledge/rooms`           — room directory
//! - `GET  /api/knowledge/handbook`        — handbook text
//! - `GET|PUT /api/user/profile`
//! - `GET|POST /api/user/todos`, `PATCH|DELETE /api/user/todos/{id}`
//! - `GET|DELETE /api/user/history`
//! - `GET  /health`

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use briar_assistant::ChatMode;
use briar_core::{
    CalendarEvent, ChatMessage, Club, ContextUsed, Error, ScheduleInfo, StudentProfile, Teacher,
    TodoItem,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiError, SharedState};

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/knowledge/teachers", get(knowledge_teachers))
        .route("/api/knowledge/schedule", get(knowledge_schedule))
        .route("/api/knowledge/current-day", get(knowledge_current_day))
        .route("/api/knowledge/events", get(knowledge_events))
        .route("/api/knowledge/clubs", get(knowledge_clubs))
        .route("/api/knowledge/rooms", get(knowledge_rooms))
        .route("/api/knowledge/handbook", get(knowledge_handbook))
        .route("/api/user/profile", get(get_profile).put(put_profile))
        .route("/api/user/todos", get(get_todos).post(post_todo))
        .route(
            "/api/user/todos/{id}",
            axum::routing::patch(patch_todo).delete(delete_todo),
        )
        .route("/api/user/history", get(get_history).delete(delete_history))
        .with_state(state)
}

/// Identity comes from upstream auth; absent means an anonymous session.
fn user_id(headers: &HeaderMap) -> String {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .unwrap_or("anonymous")
        .to_string()
}

// ── Health ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ── Chat ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChatBody {
    message: String,
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Serialize)]
struct ChatResponseBody {
    message: ChatMessage,
    mode: String,
    context_used: ContextUsed,
    suggestions: Vec<String>,
    tokens_used: Option<u32>,
}

async fn chat(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let user = user_id(&headers);
    let mode = body
        .mode
        .as_deref()
        .map(ChatMode::parse)
        .unwrap_or_default();

    let reply = state.assistant.respond(&user, &body.message, mode).await?;

    Ok(Json(ChatResponseBody {
        message: reply.message,
        mode: mode.as_str().to_string(),
        context_used: reply.context_used,
        suggestions: reply.suggestions,
        tokens_used: reply.usage.map(|u| u.total_tokens),
    }))
}

// ── Knowledge ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    search: Option<String>,
}

async fn knowledge_teachers(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Teacher>>, ApiError> {
    let snapshot = state.store.snapshot().await?;
    let teachers = match params.search.as_deref() {
        Some(term) if !term.is_empty() => snapshot.search_teachers(term),
        _ => snapshot.teachers.clone(),
    };
    Ok(Json(teachers))
}

async fn knowledge_schedule(
    State(state): State<SharedState>,
) -> Result<Json<ScheduleInfo>, ApiError> {
    let snapshot = state.store.snapshot().await?;
    Ok(Json(snapshot.schedule.clone()))
}

#[derive(Serialize)]
struct CurrentDayResponse {
    date: String,
    rotation_day: String,
}

async fn knowledge_current_day(
    State(state): State<SharedState>,
) -> Result<Json<CurrentDayResponse>, ApiError> {
    let snapshot = state.store.snapshot().await?;
    let today = Utc::now().date_naive();
    Ok(Json(CurrentDayResponse {
        date: today.format("%Y-%m-%d").to_string(),
        rotation_day: snapshot.rotation_day(today).to_string(),
    }))
}

#[derive(Deserialize)]
struct EventsParams {
    #[serde(default)]
    limit: Option<usize>,
}

async fn knowledge_events(
    State(state): State<SharedState>,
    Query(params): Query<EventsParams>,
) -> Result<Json<Vec<CalendarEvent>>, ApiError> {
    let snapshot = state.store.snapshot().await?;
    let limit = params.limit.unwrap_or(state.max_events);
    Ok(Json(snapshot.upcoming_events(Utc::now(), limit)))
}

#[derive(Deserialize)]
struct ClubsParams {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ClubsResponse {
    All(Vec<Club>),
    One(Club),
}

async fn knowledge_clubs(
    State(state): State<SharedState>,
    Query(params): Query<ClubsParams>,
) -> Result<Json<ClubsResponse>, ApiError> {
    let snapshot = state.store.snapshot().await?;
    match params.name.as_deref() {
        Some(name) if !name.is_empty() => {
            let club = snapshot.club_info(name).ok_or_else(|| {
                ApiError(Error::Profile(briar_core::ProfileError::NotFound(
                    name.to_string(),
                )))
            })?;
            Ok(Json(ClubsResponse::One(club)))
        }
        _ => Ok(Json(ClubsResponse::All(snapshot.clubs.clone()))),
    }
}

async fn knowledge_rooms(
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let snapshot = state.store.snapshot().await?;
    Ok(Json(snapshot.rooms.clone()))
}

#[derive(Serialize)]
struct HandbookResponse {
    content: String,
}

async fn knowledge_handbook(
    State(state): State<SharedState>,
) -> Result<Json<HandbookResponse>, ApiError> {
    let snapshot = state.store.snapshot().await?;
    Ok(Json(HandbookResponse {
        content: snapshot.handbook.clone(),
    }))
}

// ── User ──────────────────────────────────────────────────────────────────

async fn get_profile(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<StudentProfile>, ApiError> {
    let profile = state.profiles.profile(&user_id(&headers)).await?;
    Ok(Json(profile))
}

async fn put_profile(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(profile): Json<StudentProfile>,
) -> Result<Json<StudentProfile>, ApiError> {
    let user = user_id(&headers);
    state.profiles.update_profile(&user, profile).await?;
    let stored = state.profiles.profile(&user).await?;
    Ok(Json(stored))
}

async fn get_todos(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let todos = state.profiles.todos(&user_id(&headers)).await?;
    Ok(Json(todos))
}

#[derive(Deserialize)]
struct NewTodoBody {
    text: String,
}

async fn post_todo(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<NewTodoBody>,
) -> Result<(StatusCode, Json<TodoItem>), ApiError> {
    let text = body.text.trim();
    if text.is_empty() {
        return Err(ApiError(Error::InvalidInput(
            "todo text must not be empty".into(),
        )));
    }
    let todo = state
        .profiles
        .add_todo(&user_id(&headers), text.to_string())
        .await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

#[derive(Deserialize)]
struct UpdateTodoBody {
    done: bool,
}

async fn patch_todo(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTodoBody>,
) -> Result<Json<TodoItem>, ApiError> {
    let todo = state
        .profiles
        .set_todo_done(&user_id(&headers), id, body.done)
        .await?;
    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.profiles.remove_todo(&user_id(&headers), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_history(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let history = state.profiles.history(&user_id(&headers)).await?;
    Ok(Json(history))
}

async fn delete_history(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    state.profiles.clear_history(&user_id(&headers)).await?;
    Ok(StatusCode::NO_CONTENT)
}
