//! In-process stand-in for the hosted REST backend.
//!
//! `FakeBackend` serves the PostgREST subset the remote adapter speaks
//! (`GET`/`POST`/`PATCH`/`DELETE` on `/rest/v1/{table}` with `eq.`/`in.`
//! filters, `order` and `limit`) from an in-memory table map on a random
//! local port. Tests can seed rows, inspect them, read the request log and
//! inject failures per table and method.

mod filter;

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use filter::RowQuery;

pub use axum::http::Method;

pub const ANON_KEY: &str = "test-anon-key";
pub const ACCESS_TOKEN: &str = "test-access-token";
pub const USER_ID: &str = "user-1";

/// One request as the fake saw it, e.g. `DELETE items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub table: String,
    pub query: Vec<(String, String)>,
}

#[derive(Default)]
struct FakeState {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    failures: Mutex<HashSet<(String, Method)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Tolerates poisoning so one panicking test cannot wedge the server.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct FakeBackend {
    addr: SocketAddr,
    state: Arc<FakeState>,
    server: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());

        let app = Router::new()
            .route(
                "/rest/v1/{table}",
                get(list_rows)
                    .post(insert_rows)
                    .patch(update_rows)
                    .delete(delete_rows),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("fake backend address");

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Fake backend stopped: {}", e);
            }
        });

        debug!("Fake backend listening on {}", addr);
        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL to hand to the remote client (without `/rest/v1`).
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Replace the contents of `table`.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        lock(&self.state.tables).insert(table.to_string(), rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        lock(&self.state.tables)
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every `method` request against `table` answer 500.
    pub fn fail(&self, table: &str, method: Method) {
        lock(&self.state.failures).insert((table.to_string(), method));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }

    /// Requests as `"METHOD table"` strings, for order assertions.
    pub fn request_log(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.table))
            .collect()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// -- Handlers --

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Record the request, then check credentials and injected failures.
fn admit(
    state: &FakeState,
    method: Method,
    table: &str,
    headers: &HeaderMap,
    query: &[(String, String)],
) -> Result<RowQuery, Response> {
    lock(&state.requests).push(RecordedRequest {
        method: method.clone(),
        table: table.to_string(),
        query: query.to_vec(),
    });

    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some(ANON_KEY) {
        return Err(error(StatusCode::UNAUTHORIZED, "Invalid API key"));
    }
    let bearer = format!("Bearer {}", ACCESS_TOKEN);
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(bearer.as_str()) {
        return Err(error(StatusCode::UNAUTHORIZED, "JWT invalid"));
    }
    if lock(&state.failures).contains(&(table.to_string(), method)) {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "injected failure"));
    }

    RowQuery::parse(query).map_err(|message| error(StatusCode::BAD_REQUEST, &message))
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

async fn list_rows(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let row_query = match admit(&state, Method::GET, &table, &headers, &query) {
        Ok(q) => q,
        Err(response) => return response,
    };

    let tables = lock(&state.tables);
    let rows = tables.get(&table).map(Vec::as_slice).unwrap_or_default();
    Json(row_query.select(rows)).into_response()
}

async fn insert_rows(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Response {
    if let Err(response) = admit(&state, Method::POST, &table, &headers, &query) {
        return response;
    }

    let incoming: Vec<Value> = match serde_json::from_slice(&body) {
        Ok(Value::Array(rows)) => rows,
        Ok(row @ Value::Object(_)) => vec![row],
        _ => return error(StatusCode::BAD_REQUEST, "body must be a JSON object or array"),
    };

    let mut stored = Vec::with_capacity(incoming.len());
    {
        let mut tables = lock(&state.tables);
        let rows = tables.entry(table).or_default();
        for mut row in incoming {
            let Some(fields) = row.as_object_mut() else {
                return error(StatusCode::BAD_REQUEST, "rows must be JSON objects");
            };
            let stamp = now();
            fields
                .entry("id")
                .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
            fields
                .entry("created_at")
                .or_insert_with(|| Value::String(stamp.clone()));
            fields
                .entry("updated_at")
                .or_insert_with(|| Value::String(stamp));

            let id = fields.get("id").cloned();
            if rows.iter().any(|r| r.get("id") == id.as_ref()) {
                return error(
                    StatusCode::CONFLICT,
                    "duplicate key value violates unique constraint",
                );
            }
            rows.push(row.clone());
            stored.push(row);
        }
    }

    let wants_rows = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|p| p.contains("return=representation"));
    if wants_rows {
        (StatusCode::CREATED, Json(stored)).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

async fn update_rows(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    Json(patch): Json<Value>,
) -> Response {
    let row_query = match admit(&state, Method::PATCH, &table, &headers, &query) {
        Ok(q) => q,
        Err(response) => return response,
    };
    let Some(patch) = patch.as_object() else {
        return error(StatusCode::BAD_REQUEST, "patch must be a JSON object");
    };

    let mut tables = lock(&state.tables);
    if let Some(rows) = tables.get_mut(&table) {
        for row in rows.iter_mut().filter(|r| row_query.matches(r)) {
            if let Some(fields) = row.as_object_mut() {
                for (key, value) in patch {
                    fields.insert(key.clone(), value.clone());
                }
            }
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_rows(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let row_query = match admit(&state, Method::DELETE, &table, &headers, &query) {
        Ok(q) => q,
        Err(response) => return response,
    };
    if row_query.filters.is_empty() {
        return error(StatusCode::BAD_REQUEST, "DELETE requires a filter");
    }

    let mut tables = lock(&state.tables);
    if let Some(rows) = tables.get_mut(&table) {
        rows.retain(|r| !row_query.matches(r));
    }
    StatusCode::NO_CONTENT.into_response()
}
