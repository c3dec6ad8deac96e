//! Fake servers and fixtures shared by the store tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use coaster_book::model::{Coaster, DataFile, Manufacturer, Park, Rank, MAIN_LIST};
use coaster_book::store::StoreLocation;

pub const TOKEN: &str = "test-token";

/// Repository state behind the fakes: one file and its history.
#[derive(Default)]
pub struct RepoState {
    pub text: String,
    pub generation: u64,
    pub commits: Vec<String>,
    /// Proxy only: answer reads with parsed `json` instead of `raw`
    pub serve_json: bool,
}

impl RepoState {
    pub fn sha(&self) -> String {
        format!("{:040x}", self.generation + 1)
    }
}

#[derive(Clone)]
pub struct FakeRepo {
    inner: Arc<Mutex<RepoState>>,
}

impl FakeRepo {
    pub fn new(doc: &DataFile) -> Self {
        Self::with_text(&serde_json::to_string_pretty(doc).unwrap())
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RepoState {
                text: text.to_string(),
                ..RepoState::default()
            })),
        }
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, RepoState> {
        self.inner.lock().unwrap()
    }

    pub fn sha(&self) -> String {
        self.state().sha()
    }

    pub fn document(&self) -> DataFile {
        serde_json::from_str(&self.state().text).unwrap()
    }

    pub fn commits(&self) -> Vec<String> {
        self.state().commits.clone()
    }

    /// Simulate a write made from somewhere else.
    pub fn touch(&self, message: &str) {
        let mut state = self.state();
        state.generation += 1;
        state.commits.push(message.to_string());
    }

    fn write(&self, text: String, message: &str) -> String {
        let mut state = self.state();
        state.text = text;
        state.generation += 1;
        state.commits.push(message.to_string());
        state.sha()
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn write_response(sha: String) -> Response {
    Json(json!({
        "content": { "sha": sha },
        "commit": { "sha": format!("commit-{}", sha) },
    }))
    .into_response()
}

/// GitHub wraps base64 content at 60 columns.
fn wrapped_base64(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    encoded
        .as_bytes()
        .chunks(60)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {}", TOKEN).as_str())
}

async fn get_contents(
    State(repo): State<FakeRepo>,
    Path((owner, name, path)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    if owner != "alice" || name != "coasters" || path != "data.json" {
        return error(StatusCode::NOT_FOUND, "Not Found");
    }
    if query.get("ref").map(String::as_str) != Some("main") {
        return error(StatusCode::NOT_FOUND, "No commit found for the ref");
    }
    let state = repo.state();
    Json(json!({
        "type": "file",
        "encoding": "base64",
        "path": path,
        "sha": state.sha(),
        "content": wrapped_base64(&state.text),
    }))
    .into_response()
}

async fn put_contents(
    State(repo): State<FakeRepo>,
    Path((_owner, _name, _path)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    if body["branch"] != "main" {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "branch required");
    }
    if body["sha"].as_str() != Some(repo.sha().as_str()) {
        return error(StatusCode::CONFLICT, "data.json does not match");
    }
    let content = body["content"].as_str().unwrap_or_default();
    let bytes = match base64::engine::general_purpose::STANDARD.decode(content) {
        Ok(b) => b,
        Err(_) => return error(StatusCode::UNPROCESSABLE_ENTITY, "content is not base64"),
    };
    let text = String::from_utf8(bytes).unwrap();
    let message = body["message"].as_str().unwrap_or_default();
    write_response(repo.write(text, message))
}

async fn proxy_read(
    State(repo): State<FakeRepo>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    for key in ["owner", "repo", "path", "ref"] {
        if !query.contains_key(key) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "ok": false, "error": format!("missing {}", key) })),
            )
                .into_response();
        }
    }
    let state = repo.state();
    let mut body = json!({ "ok": true, "meta": { "sha": state.sha() } });
    if state.serve_json {
        body["json"] = serde_json::from_str(&state.text).unwrap_or(Value::Null);
    } else {
        body["raw"] = Value::String(state.text.clone());
    }
    Json(body).into_response()
}

async fn proxy_save(State(repo): State<FakeRepo>, Json(body): Json<Value>) -> Response {
    if body["prevSha"].as_str() != Some(repo.sha().as_str()) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "ok": false, "error": "sha mismatch" })),
        )
            .into_response();
    }
    let text = serde_json::to_string_pretty(&body["data"]).unwrap();
    let message = body["message"].as_str().unwrap_or_default();
    write_response(repo.write(text, message))
}

/// Bind to port 0 and return the base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub async fn start_github(repo: FakeRepo) -> String {
    let app = Router::new()
        .route(
            "/repos/:owner/:repo/contents/*path",
            get(get_contents).put(put_contents),
        )
        .with_state(repo);
    serve(app).await
}

pub async fn start_proxy(repo: FakeRepo) -> String {
    let app = Router::new()
        .route("/api/github/read", get(proxy_read))
        .route("/api/github/save", post(proxy_save))
        .with_state(repo);
    serve(app).await
}

pub fn location() -> StoreLocation {
    StoreLocation {
        owner: "alice".into(),
        repo: "coasters".into(),
        branch: "main".into(),
        path: "data.json".into(),
    }
}

/// Two parks, two coasters, one ranked.
pub fn sample() -> DataFile {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    DataFile {
        parks: vec![
            Park {
                id: "cp".into(),
                name: "Cedar Point".into(),
                country: Some("USA".into()),
            },
            Park {
                id: "ki".into(),
                name: "Kings Island".into(),
                country: None,
            },
        ],
        manufacturers: vec![Manufacturer {
            id: "in".into(),
            name: "Intamin".into(),
        }],
        coasters: vec![
            Coaster {
                id: "mf".into(),
                name: "Millennium Force".into(),
                park_id: "cp".into(),
                manufacturer_id: Some("in".into()),
                notes: None,
            },
            Coaster {
                id: "ob".into(),
                name: "Orion".into(),
                park_id: "ki".into(),
                manufacturer_id: None,
                notes: Some("Front row".into()),
            },
        ],
        ranks: vec![Rank {
            list_id: MAIN_LIST.into(),
            coaster_id: "mf".into(),
            position: 1,
            updated_at: at,
        }],
        ..DataFile::default()
    }
}
