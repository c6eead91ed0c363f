use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateItem {
    pub name: Option<String>,
}

/// JSON error body; the client reads `message` from it.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Item>>>;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", get(get_item).put(update_item).delete(delete_item))
        .route("/status/{code}", get(status))
        .route("/echo", any(echo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            message: "item not found".to_string(),
        }),
    )
}

async fn list_items(State(db): State<Db>, Query(query): Query<HashMap<String, String>>) -> Json<Vec<Item>> {
    let items = db.read().await;
    let mut found: Vec<Item> = items
        .values()
        .filter(|item| query.get("q").is_none_or(|q| item.name.contains(q.as_str())))
        .cloned()
        .collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    Json(found)
}

async fn create_item(State(db): State<Db>, Json(input): Json<CreateItem>) -> (StatusCode, Json<Item>) {
    let item = Item {
        id: Uuid::new_v4(),
        name: input.name,
    };
    db.write().await.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn get_item(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<Item>> {
    let items = db.read().await;
    items.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateItem>,
) -> ApiResult<Json<Item>> {
    let mut items = db.write().await;
    let item = items.get_mut(&id).ok_or_else(not_found)?;
    if let Some(name) = input.name {
        item.name = name;
    }
    Ok(Json(item.clone()))
}

/// Deleting answers with the removed item rather than 204 so the response
/// always carries a JSON body.
async fn delete_item(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<Item>> {
    let mut items = db.write().await;
    items.remove(&id).map(Json).ok_or_else(not_found)
}

/// Answer with the requested status. 5xx bodies are plain text, on purpose
/// not JSON; everything else carries `{"message": ...}`.
async fn status(Path(code): Path<u16>) -> Response {
    let Ok(status) = StatusCode::from_u16(code) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if status.is_server_error() {
        return (status, "upstream exploded").into_response();
    }
    (status, Json(json!({ "message": format!("status {code}"), "code": code }))).into_response()
}

/// Report what arrived: method, raw query, the headers a client sets and the
/// JSON body (or `null` when there was none).
async fn echo(method: Method, RawQuery(query): RawQuery, headers: HeaderMap, body: String) -> Json<Value> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    Json(json!({
        "method": method.as_str(),
        "query": query,
        "content_type": header("content-type"),
        "authorization": header("authorization"),
        "body": body,
    }))
}
