use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::LOCATION, HeaderMap, HeaderName, Method, StatusCode, Uri},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Story {
    pub id: Uuid,
    pub title: String,
    pub published: bool,
}

/// Body for `POST /stories` and `PUT /stories/{id}`.
#[derive(Deserialize)]
pub struct StoryInput {
    pub title: String,
    #[serde(default)]
    pub published: bool,
}

/// Body for `PATCH /stories/{id}`. Omitted fields are left unchanged.
#[derive(Deserialize)]
pub struct StoryPatch {
    pub title: Option<String>,
    pub published: Option<bool>,
}

/// Query for `GET /stories`. Without `published` every story is listed.
#[derive(Deserialize)]
pub struct StoryFilter {
    pub published: Option<bool>,
}

/// What `/echo` saw on the wire. Header names are lower-case.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<serde_json::Value>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Story>>>;

/// Users known to the server. Read-only.
pub fn seeded_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            name: "Ada".to_string(),
        },
        User {
            id: 1337,
            name: "Test".to_string(),
        },
    ]
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/users/{id}", get(get_user))
        .route("/stories", get(list_stories).post(create_story))
        .route(
            "/stories/{id}",
            get(get_story)
                .put(replace_story)
                .patch(patch_story)
                .delete(delete_story),
        )
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn get_user(Path(id): Path<u64>) -> Result<Json<User>, StatusCode> {
    seeded_users()
        .into_iter()
        .find(|user| user.id == id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn list_stories(
    State(db): State<Db>,
    Query(filter): Query<StoryFilter>,
) -> Json<Vec<Story>> {
    let mut matching: Vec<Story> = db
        .read()
        .await
        .values()
        .filter(|story| filter.published.map_or(true, |published| story.published == published))
        .cloned()
        .collect();
    matching.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
    Json(matching)
}

async fn create_story(
    State(db): State<Db>,
    Json(input): Json<StoryInput>,
) -> (StatusCode, [(HeaderName, String); 1], Json<Story>) {
    let story = Story {
        id: Uuid::new_v4(),
        title: input.title,
        published: input.published,
    };
    debug!(id = %story.id, "story created");
    db.write().await.insert(story.id, story.clone());
    let location = format!("/stories/{}", story.id);
    (StatusCode::CREATED, [(LOCATION, location)], Json(story))
}

async fn get_story(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Story>, StatusCode> {
    let story = db.read().await.get(&id).cloned();
    story.map(Json).ok_or_else(|| not_found(id))
}

async fn replace_story(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<StoryInput>,
) -> Result<Json<Story>, StatusCode> {
    let mut stories = db.write().await;
    let story = stories.get_mut(&id).ok_or_else(|| not_found(id))?;
    story.title = input.title;
    story.published = input.published;
    Ok(Json(story.clone()))
}

async fn patch_story(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<StoryPatch>,
) -> Result<Json<Story>, StatusCode> {
    let mut stories = db.write().await;
    let story = stories.get_mut(&id).ok_or_else(|| not_found(id))?;
    if let Some(title) = input.title {
        story.title = title;
    }
    if let Some(published) = input.published {
        story.published = published;
    }
    Ok(Json(story.clone()))
}

async fn delete_story(State(db): State<Db>, Path(id): Path<Uuid>) -> StatusCode {
    let removed = db.write().await.remove(&id);
    match removed {
        Some(story) => {
            debug!(id = %story.id, title = %story.title, "story deleted");
            StatusCode::NO_CONTENT
        }
        None => not_found(id),
    }
}

fn not_found(id: Uuid) -> StatusCode {
    debug!(%id, "no such story");
    StatusCode::NOT_FOUND
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = if body.is_empty() {
        None
    } else {
        Some(
            serde_json::from_slice(&body)
                .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&body).into_owned())),
        )
    };
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    })
}
