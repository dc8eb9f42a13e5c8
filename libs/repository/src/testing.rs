//! In-process stand-in for the document store, served over real HTTP on an
//! ephemeral port. Collections are `{id: fields}` maps; missing paths read
//! back as `null` and POST answers `{"name": id}`.

use std::{
    collections::BTreeMap,
    net::{Ipv4Addr, SocketAddr},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex, task::JoinHandle};

type Collections = BTreeMap<String, BTreeMap<String, Value>>;

#[derive(Default)]
struct StoreState {
    collections: Mutex<Collections>,
    fail_with: Mutex<Option<StatusCode>>,
    requests: Mutex<Vec<(Method, String)>>,
    next_id: AtomicU64,
}

pub struct FakeStore {
    pub base_url: String,
    state: Arc<StoreState>,
    handle: JoinHandle<()>,
}

impl FakeStore {
    pub async fn start() -> Self {
        let state = Arc::new(StoreState::default());

        let router = Router::new()
            .route("/:file", any(collection))
            .route("/:collection/:file", any(item))
            .with_state(state.clone());

        let listener =
            TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
                .await
                .expect("bind fake store");
        let address = listener.local_addr().expect("fake store address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            base_url: format!("http://{address}"),
            state,
            handle,
        }
    }

    pub async fn insert(&self, collection: &str, id: &str, fields: Value) {
        self.state
            .collections
            .lock()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    pub async fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.state
            .collections
            .lock()
            .await
            .get(collection)
            .and_then(|records| records.get(id))
            .cloned()
    }

    /// Every later request is answered with `status`.
    pub async fn fail_with(&self, status: StatusCode) {
        *self.state.fail_with.lock().await = Some(status);
    }

    pub async fn request_count(&self) -> usize {
        self.state.requests.lock().await.len()
    }

    /// Shuts the listener down; later requests fail to connect.
    pub async fn stop(mut self) {
        self.handle.abort();
        let _ = (&mut self.handle).await;
    }
}

impl Drop for FakeStore {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn collection(
    State(state): State<Arc<StoreState>>,
    Path(file): Path<String>,
    method: Method,
    body: Bytes,
) -> Response {
    let Some(collection) = file.strip_suffix(".json") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(failure) = record_request(&state, &method, &file).await {
        return failure;
    }

    let mut collections = state.collections.lock().await;

    match method {
        Method::GET => match collections.get(collection) {
            Some(records) if !records.is_empty() => {
                Json(json!(records)).into_response()
            }
            _ => Json(Value::Null).into_response(),
        },
        Method::POST => {
            let Ok(fields) = serde_json::from_slice::<Value>(&body) else {
                return bad_request();
            };
            let sequence = state.next_id.fetch_add(1, Ordering::SeqCst);
            let id = format!("-N{sequence:08}");
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.clone(), fields);

            Json(json!({ "name": id })).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn item(
    State(state): State<Arc<StoreState>>,
    Path((collection, file)): Path<(String, String)>,
    method: Method,
    body: Bytes,
) -> Response {
    let Some(id) = file.strip_suffix(".json") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let path = format!("{collection}/{file}");
    if let Some(failure) = record_request(&state, &method, &path).await {
        return failure;
    }

    let mut collections = state.collections.lock().await;

    match method {
        Method::GET => {
            let fields = collections
                .get(&collection)
                .and_then(|records| records.get(id))
                .cloned()
                .unwrap_or(Value::Null);

            Json(fields).into_response()
        }
        Method::PUT => {
            let Ok(fields) = serde_json::from_slice::<Value>(&body) else {
                return bad_request();
            };
            collections
                .entry(collection)
                .or_default()
                .insert(id.to_string(), fields.clone());

            Json(fields).into_response()
        }
        Method::DELETE => {
            if let Some(records) = collections.get_mut(&collection) {
                records.remove(id);
            }

            Json(Value::Null).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn record_request(
    state: &StoreState,
    method: &Method,
    path: &str,
) -> Option<Response> {
    state
        .requests
        .lock()
        .await
        .push((method.clone(), path.to_string()));

    let status = (*state.fail_with.lock().await)?;

    Some((status, Json(json!({ "error": "forced failure" }))).into_response())
}

fn bad_request() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Invalid data; couldn't parse JSON object" })),
    )
        .into_response()
}
