use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use jotter_auth::{AuthError, PasswordPolicy, TokenPair, TokenService, UserIdentity};
use jotter_store::{Database, Note, StoreError, User};

use crate::auth::require_auth;
use crate::error::ApiError;

/// Maximum note title length in characters.  Longer input is an error, never
/// silently truncated.
const MAX_TITLE_LEN: usize = 200;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub tokens: Arc<TokenService>,
    pub policy: PasswordPolicy,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    // Everything behind the access-control layer.
    let protected = Router::new()
        .route("/notes", get(notes_list).post(notes_create))
        .route(
            "/notes/{id}",
            get(notes_get)
                .put(notes_update)
                .patch(notes_update)
                .delete(notes_delete),
        )
        .route("/test", get(test_echo_get).post(test_echo_post))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/token", post(token_obtain))
        .route("/token/refresh", post(token_refresh))
        .route("/routes", get(routes_list))
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Deserialize)]
struct RegisterRequest {
    username: Option<String>,
    password: Option<String>,
    password2: Option<String>,
}

/// User shape returned by registration: never includes the password hash.
#[derive(Serialize)]
struct UserResponse {
    id: Uuid,
    username: String,
    email: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Deserialize)]
struct TokenRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
struct RefreshRequest {
    refresh: Option<String>,
}

#[derive(Serialize)]
struct AccessResponse {
    access: String,
}

#[derive(Deserialize)]
struct NoteCreateRequest {
    title: Option<String>,
    content: Option<String>,
}

#[derive(Deserialize)]
struct NoteUpdateRequest {
    title: Option<String>,
    content: Option<String>,
}

/// Note shape on the wire.  `user` is the owner's username; id, timestamp,
/// and owner are read-only.
#[derive(Serialize)]
struct NoteResponse {
    id: Uuid,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    user: String,
}

impl NoteResponse {
    fn new(note: Note, username: &str) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            created_at: note.created_at,
            user: username.to_string(),
        }
    }
}

#[derive(Serialize)]
struct EchoResponse {
    response: String,
}

/// Pull a required string field out of a request DTO.
fn require_field(value: Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("Field '{name}' is required"))),
    }
}

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let username = require_field(req.username, "username")?;
    let password = require_field(req.password, "password")?;
    let password2 = require_field(req.password2, "password2")?;

    if password != password2 {
        return Err(ApiError::Validation(
            "Password fields didn't match".to_string(),
        ));
    }

    state.policy.check(&password)?;

    // Hash before taking the db lock; bcrypt is slow on purpose.
    let password_hash = jotter_auth::password::hash_password(&password).await?;

    let user = User {
        id: Uuid::new_v4(),
        username,
        password_hash,
        email: None,
        created_at: Utc::now(),
    };

    // A concurrent duplicate registration loses inside SQLite and surfaces
    // here as UsernameTaken -> 409.
    state.db.lock().await.insert_user(&user)?;

    info!(user = %user.username, "user registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

async fn token_obtain(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let username = require_field(req.username, "username")?;
    let password = require_field(req.password, "password")?;

    // Unknown user and wrong password collapse into one generic failure.
    let user = match state.db.lock().await.get_user_by_username(&username) {
        Ok(user) => user,
        Err(StoreError::NotFound) => return Err(AuthError::InvalidCredentials.into()),
        Err(other) => return Err(other.into()),
    };

    let valid = jotter_auth::password::verify_password(&password, &user.password_hash).await?;
    if !valid {
        return Err(AuthError::InvalidCredentials.into());
    }

    let pair = state
        .tokens
        .issue_pair(user.id, &user.username, user.email.as_deref())?;

    info!(user = %user.username, "token pair issued");

    Ok(Json(pair))
}

async fn token_refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AccessResponse>, ApiError> {
    let refresh = require_field(req.refresh, "refresh")
        .map_err(|_| ApiError::Authentication("Missing refresh token".to_string()))?;

    let access = state.tokens.refresh(&refresh)?;
    Ok(Json(AccessResponse { access }))
}

async fn notes_list(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    let notes = state.db.lock().await.list_notes_for_user(user.id)?;
    let notes = notes
        .into_iter()
        .map(|note| NoteResponse::new(note, &user.username))
        .collect();
    Ok(Json(notes))
}

async fn notes_create(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(req): Json<NoteCreateRequest>,
) -> Result<(StatusCode, Json<NoteResponse>), ApiError> {
    let title = require_field(req.title, "title")?;
    validate_title(&title)?;
    let content = require_field(req.content, "content")?;

    let note = Note {
        id: Uuid::new_v4(),
        user_id: user.id,
        title,
        content,
        created_at: Utc::now(),
    };

    state.db.lock().await.insert_note(&note)?;

    info!(user = %user.username, note = %note.id, "note created");

    Ok((
        StatusCode::CREATED,
        Json(NoteResponse::new(note, &user.username)),
    ))
}

async fn notes_get(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = state.db.lock().await.get_note(user.id, id)?;
    Ok(Json(NoteResponse::new(note, &user.username)))
}

async fn notes_update(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
    Json(req): Json<NoteUpdateRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    if let Some(ref title) = req.title {
        if title.is_empty() {
            return Err(ApiError::Validation("Title cannot be empty".to_string()));
        }
        validate_title(title)?;
    }
    if let Some(ref content) = req.content {
        if content.is_empty() {
            return Err(ApiError::Validation("Content cannot be empty".to_string()));
        }
    }

    let note = state.db.lock().await.update_note(
        user.id,
        id,
        req.title.as_deref(),
        req.content.as_deref(),
    )?;

    Ok(Json(NoteResponse::new(note, &user.username)))
}

async fn notes_delete(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.lock().await.delete_note(user.id, id)?;
    if !deleted {
        return Err(ApiError::NotFound("Not found".to_string()));
    }

    info!(user = %user.username, note = %id, "note deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn test_echo_get(Extension(user): Extension<UserIdentity>) -> Json<EchoResponse> {
    Json(EchoResponse {
        response: format!(
            "Congratulation {}, your API just responded to GET request",
            user.username
        ),
    })
}

/// POST echo parses the raw body itself so malformed JSON and a missing
/// `text` field both produce the same 400.
async fn test_echo_post(
    Extension(_user): Extension<UserIdentity>,
    body: Bytes,
) -> Result<Json<EchoResponse>, ApiError> {
    let value: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::Validation("Invalid JSON data".to_string()))?;

    let text = value
        .get("text")
        .ok_or_else(|| ApiError::Validation("Invalid JSON data".to_string()))?;
    let text = text
        .as_str()
        .map(|s| s.to_string())
        .unwrap_or_else(|| text.to_string());

    Ok(Json(EchoResponse {
        response: format!("Congratulation your API just responded to POST request with text: {text}"),
    }))
}

/// Available API paths; kept for API discovery during frontend development.
const ROUTES: &[&str] = &[
    "/register",
    "/token",
    "/token/refresh",
    "/notes",
    "/notes/{id}",
    "/test",
    "/routes",
    "/health",
];

async fn routes_list() -> Json<Vec<&'static str>> {
    Json(ROUTES.to_vec())
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
