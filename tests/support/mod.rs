//! In-process mock of the alumni backend, served by axum on an ephemeral localhost port.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use alumnae_client::storage::StorageResult;
use alumnae_client::{ApiClient, ClientConfig, KeyValueStore, MemoryStore, SessionController, StorageError};

#[derive(Debug, Clone)]
pub struct MockUser {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub secret: String,
    pub token: String,
}

impl MockUser {
    fn to_json(&self) -> Value {
        json!({"id": self.id, "username": self.username, "email": self.email})
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Debug, Default)]
struct MockState {
    users: Vec<MockUser>,
    valid_tokens: HashSet<String>,
    alumni: BTreeMap<String, Value>,
    events: Vec<Value>,
    requests: Vec<Recorded>,
    searches: Vec<String>,
    fail_logout: bool,
    me_delay: Option<Duration>,
    fail_me: bool,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// alice/secret1 -> t1, dave/secret2 -> t2, three alumni across two batches.
    pub fn seeded() -> Self {
        let backend = Self::default();
        {
            let mut s = backend.inner.lock();
            s.users.push(MockUser { id: 1, username: "alice".into(), email: "alice@example.org".into(), secret: "secret1".into(), token: "t1".into() });
            s.users.push(MockUser { id: 2, username: "dave".into(), email: "dave@example.org".into(), secret: "secret2".into(), token: "t2".into() });
            for (id, first, last, year) in [("1", "Ana", "Cruz", 2009), ("2", "Bea", "Santos", 2009), ("3", "Carla", "Reyes", 2010)] {
                s.alumni.insert(id.to_string(), json!({
                    "id": id, "firstName": first, "lastName": last, "batchYear": {"year": year}, "email": null
                }));
            }
            s.events.push(json!({"id": "e1", "title": "Homecoming", "audience": "alumnae"}));
        }
        backend
    }

    /// Mark a user's token as valid without going through /auth/login.
    pub fn issue(&self, username: &str) -> String {
        let mut s = self.inner.lock();
        let token = s.users.iter().find(|u| u.username == username).map(|u| u.token.clone()).expect("known user");
        s.valid_tokens.insert(token.clone());
        token
    }

    pub fn revoke(&self, token: &str) { self.inner.lock().valid_tokens.remove(token); }

    pub fn is_valid(&self, token: &str) -> bool { self.inner.lock().valid_tokens.contains(token) }

    pub fn set_fail_logout(&self, fail: bool) { self.inner.lock().fail_logout = fail; }

    pub fn set_me_delay(&self, delay: Duration) { self.inner.lock().me_delay = Some(delay); }

    /// Answer /auth/me with a 500 regardless of the token.
    pub fn set_fail_me(&self, fail: bool) { self.inner.lock().fail_me = fail; }

    pub fn requests(&self) -> Vec<Recorded> { self.inner.lock().requests.clone() }

    pub fn last_request(&self) -> Option<Recorded> { self.inner.lock().requests.last().cloned() }

    pub fn searches(&self) -> Vec<String> { self.inner.lock().searches.clone() }

    fn authorized(&self, headers: &HeaderMap) -> Option<MockUser> {
        let token = headers.get("authorization")?.to_str().ok()?.strip_prefix("Bearer ")?.to_string();
        let s = self.inner.lock();
        if !s.valid_tokens.contains(&token) {
            return None;
        }
        s.users.iter().find(|u| u.token == token).cloned()
    }
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": message}))).into_response()
}

async fn record(State(backend): State<MockBackend>, req: Request, next: Next) -> Response {
    let rec = Recorded {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        query: req.uri().query().map(str::to_string),
        authorization: req.headers().get("authorization").and_then(|v| v.to_str().ok()).map(str::to_string),
    };
    backend.inner.lock().requests.push(rec);
    next.run(req).await
}

async fn login(State(backend): State<MockBackend>, Json(body): Json<Value>) -> Response {
    let login = body.get("login").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();
    let mut s = backend.inner.lock();
    let found = s.users.iter().find(|u| (u.username == login || u.email == login) && u.secret == password).cloned();
    match found {
        Some(user) => {
            s.valid_tokens.insert(user.token.clone());
            Json(json!({"success": true, "token": user.token, "data": user.to_json()})).into_response()
        }
        None => unauthorized("Invalid credentials"),
    }
}

async fn register(State(backend): State<MockBackend>, Json(body): Json<Value>) -> Response {
    let field = |k: &str| body.get(k).and_then(Value::as_str).unwrap_or_default().to_string();
    let (username, email, secret) = (field("username"), field("email"), field("password"));
    let mut s = backend.inner.lock();
    if s.users.iter().any(|u| u.username == username) {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "Username already taken"}))).into_response();
    }
    let user = MockUser { id: s.users.len() as u64 + 1, token: format!("reg-{}", username), username, email, secret };
    s.valid_tokens.insert(user.token.clone());
    s.users.push(user.clone());
    (StatusCode::CREATED, Json(json!({"token": user.token, "data": user.to_json()}))).into_response()
}

async fn logout(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    if backend.inner.lock().fail_logout {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "logout unavailable"}))).into_response();
    }
    let Some(user) = backend.authorized(&headers) else { return unauthorized("Not authorized"); };
    backend.revoke(&user.token);
    Json(json!({"message": "Logged out"})).into_response()
}

async fn me(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    let (delay, fail) = {
        let s = backend.inner.lock();
        (s.me_delay, s.fail_me)
    };
    if let Some(d) = delay {
        tokio::time::sleep(d).await;
    }
    if fail {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "profile service down"}))).into_response();
    }
    match backend.authorized(&headers) {
        Some(user) => Json(json!({"data": user.to_json()})).into_response(),
        None => unauthorized("Token expired"),
    }
}

async fn alumni(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    if backend.authorized(&headers).is_none() { return unauthorized("Not authorized"); }
    let list: Vec<Value> = backend.inner.lock().alumni.values().cloned().collect();
    Json(json!({"data": list})).into_response()
}

async fn alumni_grouped(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if backend.authorized(&headers).is_none() { return unauthorized("Not authorized"); }
    let mut s = backend.inner.lock();
    let needle = params.get("search").map(|q| q.to_lowercase());
    if let Some(q) = params.get("search") {
        s.searches.push(q.clone());
    }
    let mut groups: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for a in s.alumni.values() {
        let name = format!("{} {}", a["firstName"].as_str().unwrap_or(""), a["lastName"].as_str().unwrap_or("")).to_lowercase();
        if needle.as_ref().map_or(true, |n| name.contains(n.as_str())) {
            groups.entry(a["batchYear"]["year"].to_string()).or_default().push(a.clone());
        }
    }
    Json(json!({"data": groups})).into_response()
}

async fn alumnus(State(backend): State<MockBackend>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if backend.authorized(&headers).is_none() { return unauthorized("Not authorized"); }
    match backend.inner.lock().alumni.get(&id) {
        Some(a) => Json(json!({"data": a})).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Alumni not found"}))).into_response(),
    }
}

async fn update_alumnus(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Response {
    if backend.authorized(&headers).is_none() { return unauthorized("Not authorized"); }
    let mut s = backend.inner.lock();
    let Some(record) = s.alumni.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Alumni not found"}))).into_response();
    };
    if let (Some(target), Some(fields)) = (record.as_object_mut(), patch.as_object()) {
        for (k, v) in fields {
            target.insert(k.clone(), v.clone());
        }
    }
    Json(json!({"data": record.clone()})).into_response()
}

async fn events(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    if backend.authorized(&headers).is_none() { return unauthorized("Not authorized"); }
    let list = backend.inner.lock().events.clone();
    Json(json!({"data": list})).into_response()
}

async fn create_event(State(backend): State<MockBackend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if backend.authorized(&headers).is_none() { return unauthorized("Not authorized"); }
    if body.get("title").and_then(Value::as_str).map_or(true, |t| t.trim().is_empty()) {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"message": "Title is required"}))).into_response();
    }
    let mut s = backend.inner.lock();
    let mut event = body;
    event["id"] = json!(format!("e{}", s.events.len() + 1));
    s.events.push(event.clone());
    (StatusCode::CREATED, Json(json!({"data": event}))).into_response()
}

async fn event(State(backend): State<MockBackend>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if backend.authorized(&headers).is_none() { return unauthorized("Not authorized"); }
    let found = backend.inner.lock().events.iter().find(|e| e["id"].as_str() == Some(id.as_str())).cloned();
    match found {
        Some(e) => Json(json!({"data": e})).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Event not found"}))).into_response(),
    }
}

async fn batch_years() -> Response {
    Json(json!({"data": [{"year": 2009}, {"year": 2010}]})).into_response()
}

async fn slow() -> Response {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({"data": "late"})).into_response()
}

async fn boom() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "database unavailable"}))).into_response()
}

fn router(backend: MockBackend) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/alumni", get(alumni))
        .route("/alumni/grouped", get(alumni_grouped))
        .route("/alumni/{id}", get(alumnus).patch(update_alumnus))
        .route("/events", get(events).post(create_event))
        .route("/events/{id}", get(event))
        .route("/batch-years", get(batch_years))
        .route("/slow", get(slow))
        .route("/boom", get(boom));
    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend)
}

pub struct TestServer {
    pub base_url: String,
    pub backend: MockBackend,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) { self.handle.abort(); }
}

impl TestServer {
    pub async fn start() -> Self {
        let backend = MockBackend::seeded();
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.expect("bind 127.0.0.1:0");
        let addr = listener.local_addr().expect("local addr");
        let app = router(backend.clone());
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("mock backend error: {e:?}");
            }
        });
        Self { base_url: format!("http://{}/api", addr), backend, handle }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone()).with_timeout(Duration::from_secs(5))
    }

    pub fn client(&self, store: &MemoryStore) -> ApiClient {
        ApiClient::new(&self.config(), Arc::new(store.clone())).expect("client")
    }

    pub fn controller(&self, store: &MemoryStore) -> SessionController {
        SessionController::new(self.client(store))
    }

    pub fn controller_on(&self, store: Arc<dyn KeyValueStore>) -> SessionController {
        SessionController::new(ApiClient::new(&self.config(), store).expect("client"))
    }
}

/// Memory store whose writes can be switched to fail like a full disk.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn set_fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst); }

    fn check(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(io::Error::new(io::ErrorKind::Other, "no space left on device")));
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> { self.inner.get(key) }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check()?;
        self.inner.remove(key)
    }
}
