//! In-memory stand-in for the AppGrid REST API.
//!
//! Serves the endpoints the SDK calls with seeded content, enforces the
//! `appKey`/`uuid` query parameters and the `X-SESSION` header the way the
//! real service does, and records writes so tests can inspect them.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

type Params = Query<HashMap<String, String>>;
type ApiResult = Result<Response, Response>;

pub const LOGO_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nmock-logo";

/// One content entry of the seeded catalogue.
#[derive(Clone, Debug)]
pub struct Entry {
    pub id: &'static str,
    pub alias: &'static str,
    pub type_id: &'static str,
    pub title: &'static str,
}

const ENTRIES: &[Entry] = &[
    Entry {
        id: "e1",
        alias: "home",
        type_id: "page",
        title: "Home",
    },
    Entry {
        id: "e2",
        alias: "movie-one",
        type_id: "movie",
        title: "Movie One",
    },
    Entry {
        id: "e3",
        alias: "movie-two",
        type_id: "movie",
        title: "Movie Two",
    },
];

impl Entry {
    fn to_json(&self, preview: bool, at: Option<&str>) -> Value {
        json!({
            "title": self.title,
            "_meta": {
                "id": self.id,
                "alias": self.alias,
                "typeId": self.type_id,
                "preview": preview,
                "at": at,
            }
        })
    }
}

/// Everything the mock remembers between requests.
#[derive(Debug)]
pub struct MockState {
    sessions: HashSet<String>,
    sessions_created: usize,
    log_level: String,
    events: Vec<Value>,
    logs: Vec<(String, Value)>,
    /// scope -> user -> record
    user_data: HashMap<String, HashMap<String, Map<String, Value>>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            sessions: HashSet::new(),
            sessions_created: 0,
            log_level: "warn".to_string(),
            events: Vec::new(),
            logs: Vec::new(),
            user_data: HashMap::new(),
        }
    }
}

pub type Db = Arc<RwLock<MockState>>;

/// Handle on a mock instance, shared between the router and the test.
#[derive(Clone, Default)]
pub struct MockAppGrid {
    db: Db,
}

impl MockAppGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/session", get(create_session).post(create_session))
            .route("/status", get(status))
            .route("/content/entries", get(list_entries))
            .route("/content/entry/{id}", get(get_entry))
            .route("/content/entry/alias/{alias}", get(get_entry_by_alias))
            .route("/asset", get(list_assets))
            .route("/asset/{id}", get(get_asset))
            .route("/event/log", axum::routing::post(log_event))
            .route("/application/log/level", get(log_level))
            .route("/application/log/{level}", axum::routing::post(app_log))
            .route("/plugins", get(plugins))
            .route("/profile", get(profile))
            .route("/metadata", get(all_metadata))
            .route("/metadata/{keys}", get(metadata_by_keys))
            .route("/user/{user}", get(get_user_record).post(set_user_record))
            .route("/user/{user}/{key}", get(get_user_key).post(set_user_key))
            .route("/group/{user}", get(get_group_record).post(set_group_record))
            .route("/group/{user}/{key}", get(get_group_key).post(set_group_key))
            .with_state(self.db.clone())
    }

    /// Number of sessions created since start.
    pub async fn sessions_created(&self) -> usize {
        self.db.read().await.sessions_created
    }

    /// Invalidate every issued session key.
    pub async fn expire_sessions(&self) {
        self.db.write().await.sessions.clear();
    }

    pub async fn events(&self) -> Vec<Value> {
        self.db.read().await.events.clone()
    }

    /// Recorded application logs as `(level, body)`.
    pub async fn logs(&self) -> Vec<(String, Value)> {
        self.db.read().await.logs.clone()
    }

    pub async fn set_log_level(&self, level: &str) {
        self.db.write().await.log_level = level.to_string();
    }
}

/// Router over a fresh, private state.
pub fn app() -> Router {
    MockAppGrid::new().router()
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, MockAppGrid::new()).await
}

pub async fn serve(listener: TcpListener, mock: MockAppGrid) -> Result<(), std::io::Error> {
    axum::serve(listener, mock.router()).await
}

fn error(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "error": {
            "code": status.as_u16().to_string(),
            "message": message,
            "status": status.as_u16(),
        }
    });
    (status, Json(body)).into_response()
}

fn require_identity(params: &HashMap<String, String>) -> Result<(), Response> {
    let present = |k: &str| params.get(k).is_some_and(|v| !v.is_empty());
    if present("appKey") && present("uuid") {
        Ok(())
    } else {
        Err(error(StatusCode::BAD_REQUEST, "appKey and uuid are required"))
    }
}

async fn require_session(
    db: &Db,
    params: &HashMap<String, String>,
    headers: &HeaderMap,
) -> Result<(), Response> {
    require_identity(params)?;
    let key = headers
        .get("x-session")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if db.read().await.sessions.contains(key) {
        Ok(())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "Invalid or expired session"))
    }
}

fn ok_json(value: Value) -> ApiResult {
    Ok(Json(value).into_response())
}

async fn create_session(State(db): State<Db>, Query(params): Params) -> ApiResult {
    require_identity(&params)?;
    let key = Uuid::new_v4().to_string();
    let mut state = db.write().await;
    state.sessions.insert(key.clone());
    state.sessions_created += 1;
    tracing::debug!(sessions_created = state.sessions_created, "issued session");
    ok_json(json!({ "sessionKey": key }))
}

async fn status(State(db): State<Db>, Query(params): Params, headers: HeaderMap) -> ApiResult {
    require_session(&db, &params, &headers).await?;
    ok_json(json!({ "status": "ACTIVE" }))
}

fn csv(params: &HashMap<String, String>, key: &str) -> Option<Vec<String>> {
    params
        .get(key)
        .map(|v| v.split(',').map(str::to_string).collect())
}

async fn list_entries(
    State(db): State<Db>,
    Query(params): Params,
    headers: HeaderMap,
) -> ApiResult {
    require_session(&db, &params, &headers).await?;
    let ids = csv(&params, "id");
    let aliases = csv(&params, "alias");
    let preview = params.get("preview").is_some_and(|v| v == "true");
    let at = params.get("at").map(String::as_str);
    let entries: Vec<Value> = ENTRIES
        .iter()
        .filter(|e| ids.as_ref().is_none_or(|ids| ids.iter().any(|i| i == e.id)))
        .filter(|e| aliases.as_ref().is_none_or(|a| a.iter().any(|i| i == e.alias)))
        .filter(|e| params.get("typeId").is_none_or(|t| t == e.type_id))
        .map(|e| e.to_json(preview, at))
        .collect();
    ok_json(json!({ "entries": entries }))
}

async fn find_entry(
    db: &Db,
    params: &HashMap<String, String>,
    headers: &HeaderMap,
    matches: impl Fn(&Entry) -> bool,
) -> ApiResult {
    require_session(db, params, headers).await?;
    let preview = params.get("preview").is_some_and(|v| v == "true");
    let at = params.get("at").map(String::as_str);
    match ENTRIES.iter().find(|e| matches(e)) {
        Some(entry) => ok_json(entry.to_json(preview, at)),
        None => Err(error(StatusCode::NOT_FOUND, "No such entry")),
    }
}

async fn get_entry(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Params,
    headers: HeaderMap,
) -> ApiResult {
    find_entry(&db, &params, &headers, |e| e.id == id).await
}

async fn get_entry_by_alias(
    State(db): State<Db>,
    Path(alias): Path<String>,
    Query(params): Params,
    headers: HeaderMap,
) -> ApiResult {
    find_entry(&db, &params, &headers, |e| e.alias == alias).await
}

async fn list_assets(State(db): State<Db>, Query(params): Params, headers: HeaderMap) -> ApiResult {
    require_session(&db, &params, &headers).await?;
    ok_json(json!({ "logo": "/asset/logo" }))
}

async fn get_asset(Path(id): Path<String>, Query(params): Params) -> ApiResult {
    require_identity(&params)?;
    if id == "logo" {
        Ok(([("content-type", "image/png")], LOGO_BYTES).into_response())
    } else {
        Err(error(StatusCode::NOT_FOUND, "No such asset"))
    }
}

async fn log_event(
    State(db): State<Db>,
    Query(params): Params,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    require_session(&db, &params, &headers).await?;
    db.write().await.events.push(body);
    Ok(StatusCode::OK.into_response())
}

async fn log_level(State(db): State<Db>, Query(params): Params, headers: HeaderMap) -> ApiResult {
    require_session(&db, &params, &headers).await?;
    let level = db.read().await.log_level.clone();
    ok_json(json!({ "logLevel": level }))
}

async fn app_log(
    State(db): State<Db>,
    Path(level): Path<String>,
    Query(params): Params,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    require_session(&db, &params, &headers).await?;
    if !["debug", "info", "warn", "error"].contains(&level.as_str()) {
        return Err(error(StatusCode::BAD_REQUEST, "Unknown log level"));
    }
    db.write().await.logs.push((level, body));
    Ok(StatusCode::OK.into_response())
}

async fn plugins(State(db): State<Db>, Query(params): Params, headers: HeaderMap) -> ApiResult {
    require_session(&db, &params, &headers).await?;
    ok_json(json!([{ "name": "analytics", "enabled": true }]))
}

async fn profile(State(db): State<Db>, Query(params): Params, headers: HeaderMap) -> ApiResult {
    require_session(&db, &params, &headers).await?;
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok());
    ok_json(json!({
        "appKey": params.get("appKey"),
        "uuid": params.get("uuid"),
        "gid": params.get("gid"),
        "clientIp": forwarded,
    }))
}

fn metadata() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("color".to_string(), json!("blue"));
    map.insert("maxItems".to_string(), json!(12));
    map.insert("features".to_string(), json!(["search", "epg"]));
    map
}

async fn all_metadata(
    State(db): State<Db>,
    Query(params): Params,
    headers: HeaderMap,
) -> ApiResult {
    require_session(&db, &params, &headers).await?;
    ok_json(Value::Object(metadata()))
}

async fn metadata_by_keys(
    State(db): State<Db>,
    Path(keys): Path<String>,
    Query(params): Params,
    headers: HeaderMap,
) -> ApiResult {
    require_session(&db, &params, &headers).await?;
    let all = metadata();
    let picked: Map<String, Value> = keys
        .split(',')
        .filter_map(|k| all.get(k).map(|v| (k.to_string(), v.clone())))
        .collect();
    ok_json(Value::Object(picked))
}

async fn read_record(
    db: &Db,
    scope: &str,
    user: &str,
    key: Option<&str>,
    params: &HashMap<String, String>,
    headers: &HeaderMap,
) -> ApiResult {
    require_session(db, params, headers).await?;
    let state = db.read().await;
    let record = state
        .user_data
        .get(scope)
        .and_then(|users| users.get(user))
        .cloned()
        .unwrap_or_default();
    match key {
        None => ok_json(Value::Object(record)),
        Some(key) => match record.get(key) {
            Some(value) => ok_json(value.clone()),
            None => Err(error(StatusCode::NOT_FOUND, "No such key")),
        },
    }
}

async fn write_record(
    db: &Db,
    scope: &str,
    user: &str,
    key: Option<&str>,
    params: &HashMap<String, String>,
    headers: &HeaderMap,
    body: Value,
) -> ApiResult {
    require_session(db, params, headers).await?;
    let mut state = db.write().await;
    let record = state
        .user_data
        .entry(scope.to_string())
        .or_default()
        .entry(user.to_string())
        .or_default();
    match (key, body) {
        (Some(key), value) => {
            record.insert(key.to_string(), value);
        }
        (None, Value::Object(map)) => *record = map,
        (None, _) => return Err(error(StatusCode::BAD_REQUEST, "Record must be an object")),
    }
    Ok(StatusCode::OK.into_response())
}

async fn get_user_record(
    State(db): State<Db>,
    Path(user): Path<String>,
    Query(params): Params,
    headers: HeaderMap,
) -> ApiResult {
    read_record(&db, "user", &user, None, &params, &headers).await
}

async fn set_user_record(
    State(db): State<Db>,
    Path(user): Path<String>,
    Query(params): Params,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    write_record(&db, "user", &user, None, &params, &headers, body).await
}

async fn get_user_key(
    State(db): State<Db>,
    Path((user, key)): Path<(String, String)>,
    Query(params): Params,
    headers: HeaderMap,
) -> ApiResult {
    read_record(&db, "user", &user, Some(&key), &params, &headers).await
}

async fn set_user_key(
    State(db): State<Db>,
    Path((user, key)): Path<(String, String)>,
    Query(params): Params,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    write_record(&db, "user", &user, Some(&key), &params, &headers, body).await
}

async fn get_group_record(
    State(db): State<Db>,
    Path(user): Path<String>,
    Query(params): Params,
    headers: HeaderMap,
) -> ApiResult {
    read_record(&db, "group", &user, None, &params, &headers).await
}

async fn set_group_record(
    State(db): State<Db>,
    Path(user): Path<String>,
    Query(params): Params,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    write_record(&db, "group", &user, None, &params, &headers, body).await
}

async fn get_group_key(
    State(db): State<Db>,
    Path((user, key)): Path<(String, String)>,
    Query(params): Params,
    headers: HeaderMap,
) -> ApiResult {
    read_record(&db, "group", &user, Some(&key), &params, &headers).await
}

async fn set_group_key(
    State(db): State<Db>,
    Path((user, key)): Path<(String, String)>,
    Query(params): Params,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    write_record(&db, "group", &user, Some(&key), &params, &headers, body).await
}
