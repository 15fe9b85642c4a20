//!
//! fruitstand HTTP server
//! ----------------------
//! This module defines the Axum-based HTTP API for fruitstand.
//!
//! Responsibilities:
//! - Session cookie handling: a signed, client-held `session` cookie carries
//!   the identity claim; nothing is stored server-side.
//! - Register/login/logout endpoints backed by the `users` module.
//! - Fruit CRUD endpoints delegating to the `service` module. Reads are
//!   public; create/update/delete require a session, and update/delete
//!   additionally require ownership.
//! - Demo seed data on startup so the list endpoint is non-empty out of
//!   the box.

use std::net::SocketAddr;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::error::AppError;
use crate::fruits::FruitStore;
use crate::service::{FruitInput, FruitService};
use crate::session::SessionKeys;
use crate::users::UserStore;

const SESSION_COOKIE: &str = "session";

/// Fallback signing keys for development. Production deployments configure
/// FRUITSTAND_SESSION_KEYS instead.
const DEV_SESSION_KEYS: [&str; 2] = ["mySecretKey1", "mySuperSecretKey2"];

/// Shared server state injected into all handlers. Every field is a cheap
/// cloneable handle, so the state itself clones per-request.
#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub keys: SessionKeys,
    pub fruits: FruitService,
}

impl AppState {
    pub fn new(keys: SessionKeys) -> Self {
        Self {
            users: UserStore::new(),
            keys,
            fruits: FruitService::new(FruitStore::new()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match &self {
            AppError::Internal { message } => {
                error!("internal error: {message}");
                "Internal server error"
            }
            other => other.message(),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie").or_else(|| headers.get("Cookie"))?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name { return Some(v[1..].to_string()); }
        }
    }
    None
}

/// Resolve the session cookie to a user id. Missing, malformed, forged and
/// expired cookies all come back as `None`.
fn session_user(state: &AppState, headers: &HeaderMap) -> Option<String> {
    let token = parse_cookie(headers, SESSION_COOKIE)?;
    state.keys.resolve(&token)
}

fn set_session_cookie(token: &str) -> HeaderValue {
    // HttpOnly cookie scoped to path / with SameSite=Strict
    HeaderValue::from_str(&format!("{}={}; HttpOnly; SameSite=Strict; Path=/", SESSION_COOKIE, token)).unwrap()
}

fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_str(&format!("{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Strict; Path=/", SESSION_COOKIE)).unwrap()
}

#[derive(Debug, Default, Deserialize)]
struct CredsPayload {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn root() -> &'static str {
    "fruitstand ok"
}

async fn home() -> &'static str {
    "Homepage!"
}

async fn register(
    State(state): State<AppState>,
    payload: Option<Json<CredsPayload>>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let user = state.users.register(&payload.email, &payload.password)?;
    Ok((StatusCode::OK, Json(json!({ "message": "User registered!", "user": user }))))
}

async fn login(
    State(state): State<AppState>,
    payload: Option<Json<CredsPayload>>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let user = state.users.authenticate(&payload.email, &payload.password)?;
    let token = state.keys.issue(&user.id);
    let mut headers = HeaderMap::new();
    headers.insert("Set-Cookie", set_session_cookie(&token));
    info!(target: "auth", "login user={}", user.id);
    Ok((StatusCode::OK, headers, Json(json!({ "message": "Welcome!" }))))
}

/// Instruct the client to discard its session cookie. Idempotent: logging
/// out twice, or with no session at all, succeeds the same way.
async fn logout() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert("Set-Cookie", clear_session_cookie());
    (StatusCode::OK, headers, Json(json!({ "message": "Successfully logout!" })))
}

async fn list_fruits(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "message": "List of all fruits!", "fruits": state.fruits.list() })))
}

async fn get_fruit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let fruit = state.fruits.get(&id)?;
    Ok((StatusCode::OK, Json(json!({ "message": "Here is your fruit!", "fruit": fruit }))))
}

async fn create_fruit(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Option<Json<FruitInput>>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let fruit = state.fruits.create(session_user(&state, &headers), payload)?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Created!", "fruit": fruit }))))
}

async fn update_fruit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Option<Json<FruitInput>>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let fruit = state.fruits.update(session_user(&state, &headers), &id, payload)?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Updated!", "fruit": fruit }))))
}

async fn delete_fruit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    state.fruits.delete(session_user(&state, &headers), &id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn not_found_fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "URL Not found" })))
}

/// Mount all routes onto a router backed by the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/home", get(home))
        .route("/api/fruits", get(list_fruits).post(create_fruit))
        .route("/api/fruits/{id}", get(get_fruit).put(update_fruit).delete(delete_fruit))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .fallback(not_found_fallback)
        .with_state(state)
}

/// Seed a demo user and two fruits so a fresh server has data to list.
/// Registration failures here are startup bugs, not runtime conditions.
pub fn seed_demo_data(state: &AppState) -> anyhow::Result<()> {
    let owner = state.users.register("user@email.com", "123")?;
    for (name, color, emoji) in [("mango", "yellow", "🥭"), ("grape", "purple", "🍇")] {
        state.fruits.create(
            Some(owner.id.clone()),
            FruitInput { name: name.into(), color: color.into(), emoji: emoji.into() },
        )?;
    }
    info!(target: "startup", "seeded demo user and fruits");
    Ok(())
}

/// Read the signing key set from FRUITSTAND_SESSION_KEYS (comma-separated),
/// falling back to the built-in development keys.
pub fn session_keys_from_env() -> SessionKeys {
    let keys: Vec<String> = std::env::var("FRUITSTAND_SESSION_KEYS")
        .map(|raw| raw.split(',').map(|k| k.trim().to_string()).filter(|k| !k.is_empty()).collect())
        .unwrap_or_default();
    if keys.is_empty() {
        SessionKeys::new(DEV_SESSION_KEYS.iter().map(|k| k.to_string()).collect())
    } else {
        SessionKeys::new(keys)
    }
}

/// Start the fruitstand HTTP server bound to the given port.
pub async fn run_with_port(http_port: u16, keys: SessionKeys) -> anyhow::Result<()> {
    let state = AppState::new(keys);
    seed_demo_data(&state)?;
    let app = router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Convenience entry point using the default port (8000) and env-configured
/// signing keys.
pub async fn run() -> anyhow::Result<()> {
    let port: u16 = std::env::var("FRUITSTAND_HTTP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    run_with_port(port, session_keys_from_env()).await
}
