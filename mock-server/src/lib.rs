use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Name of the cookie carrying the login session id.
pub const SESSION_COOKIE: &str = "session";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub name: String,
}

#[derive(Default)]
pub struct AppState {
    items: RwLock<HashMap<u64, Item>>,
    sessions: RwLock<HashMap<Uuid, String>>,
    next_id: AtomicU64,
}

pub type Db = Arc<AppState>;

pub fn app() -> Router {
    let db: Db = Arc::new(AppState::default());
    Router::new()
        .route("/", get(host))
        .route("/health", get(health))
        .route("/echo", any(echo))
        .route("/login", post(login))
        .route("/whoami", get(whoami))
        .route("/items", post(create_item))
        .route("/items/{id}", get(get_item))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Echoes the `Host` header so virtual-host routing is observable.
async fn host(headers: HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn health() -> &'static str {
    "ok"
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> String {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    format!("{method} auth={auth} body={body}")
}

async fn login(State(db): State<Db>, user: String) -> Response {
    if user.is_empty() {
        return (StatusCode::BAD_REQUEST, "missing user").into_response();
    }
    let id = Uuid::new_v4();
    db.sessions.write().await.insert(id, user.clone());
    tracing::debug!(%id, %user, "session opened");
    (
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}={id}; Path=/"))],
        format!("logged in:{user}"),
    )
        .into_response()
}

async fn whoami(State(db): State<Db>, headers: HeaderMap) -> Response {
    let sessions = db.sessions.read().await;
    match session_id(&headers).and_then(|id| sessions.get(&id)) {
        Some(user) => format!("user:{user}").into_response(),
        None => (StatusCode::UNAUTHORIZED, "unauthorized").into_response(),
    }
}

/// Takes the JSON as raw text so clients need not send a content type.
async fn create_item(State(db): State<Db>, body: String) -> (StatusCode, String) {
    let input: CreateItem = match serde_json::from_str(&body) {
        Ok(input) => input,
        Err(e) => return (StatusCode::UNPROCESSABLE_ENTITY, format!("invalid item: {e}")),
    };
    let id = db.next_id.fetch_add(1, Ordering::Relaxed) + 1;
    let item = Item {
        id,
        name: input.name,
    };
    db.items.write().await.insert(id, item);
    (StatusCode::CREATED, format!("created:{id}"))
}

async fn get_item(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Item>, StatusCode> {
    let items = db.items.read().await;
    items.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Pulls the session id out of a `Cookie` header, if one parses.
fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}
