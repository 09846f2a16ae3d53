use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Duration,
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: u32,
    pub title: String,
    pub body: String,
}

#[derive(Deserialize)]
pub struct CreatePost {
    #[serde(default, rename = "userId")]
    pub user_id: u32,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<u32>,
}

/// JSON body of every error response.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: u16,
    pub message: String,
}

/// What the server saw, returned by the `/echo` routes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Post>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post)
                .put(update_post)
                .patch(update_post)
                .delete(delete_post),
        )
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/status/{code}", any(status))
        .route("/text", get(text))
        .route("/delay/{ms}", get(delay))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn failure(status: StatusCode, message: &str) -> Response {
    let body = ApiFailure {
        status: status.as_u16(),
        message: message.to_string(),
    };
    (status, Json(body)).into_response()
}

async fn list_posts(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Vec<Post>> {
    let posts = db.read().await;
    Json(
        posts
            .values()
            .filter(|post| query.user_id.map_or(true, |id| post.user_id == id))
            .cloned()
            .collect(),
    )
}

async fn create_post(
    State(db): State<Db>,
    Json(input): Json<CreatePost>,
) -> (StatusCode, Json<Post>) {
    let post = Post {
        id: Uuid::new_v4(),
        user_id: input.user_id,
        title: input.title,
        body: input.body,
    };
    db.write().await.insert(post.id, post.clone());
    tracing::debug!(id = %post.id, "created post");
    (StatusCode::CREATED, Json(post))
}

async fn get_post(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Post>, Response> {
    let posts = db.read().await;
    posts
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "post not found"))
}

async fn update_post(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePost>,
) -> Result<Json<Post>, Response> {
    let mut posts = db.write().await;
    let post = posts
        .get_mut(&id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "post not found"))?;
    if let Some(title) = input.title {
        post.title = title;
    }
    if let Some(body) = input.body {
        post.body = body;
    }
    Ok(Json(post.clone()))
}

async fn delete_post(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<StatusCode, Response> {
    let mut posts = db.write().await;
    posts
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "post not found"))
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => failure(status, status.canonical_reason().unwrap_or("unknown")),
        Err(_) => failure(StatusCode::BAD_REQUEST, "invalid status code"),
    }
}

async fn text() -> &'static str {
    "hello from mock-server"
}

async fn delay(Path(ms): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    "done"
}
