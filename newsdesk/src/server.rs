use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rocket::figment::Figment;
use rocket::fs::{relative, FileServer};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{delete, get, post, routes, Build, Rocket, State};
use serde::{Deserialize, Serialize};

use common::Config;

use crate::desk::NewsDesk;
use crate::error::{ErrorBody, StoreError};
use crate::models::{Cluster, Draft, NewsCreate, NewsItem};
use crate::ui;

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub config: Arc<Config>,
    pub desk: NewsDesk,
}

impl AppState {
    pub fn new(desk: NewsDesk, config: Arc<Config>) -> Self {
        Self {
            started_at: Utc::now(),
            config,
            desk,
        }
    }
}

type ApiResult<T> = std::result::Result<Json<T>, Custom<Json<ErrorBody>>>;

/// Map a store error to an HTTP status plus JSON body.
fn api_error(err: StoreError) -> Custom<Json<ErrorBody>> {
    let status = err.status();
    tracing::warn!(%err, status = status.code, "request rejected");
    Custom(status, Json(ErrorBody::from(&err)))
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    clusters_count: usize,
    news_count: usize,
}

#[derive(Serialize, Deserialize)]
pub struct SaveResponse {
    pub status: String,
    pub saved: usize,
}

#[derive(Serialize, Deserialize)]
pub struct DeleteResponse {
    pub status: String,
    pub deleted: u64,
}

/// Request body for `/news/generate_news`.
#[derive(Deserialize)]
struct GenerateRequest {
    cluster_id: u64,
    #[serde(default)]
    prompt: String,
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

/// Status endpoint returning simple JSON with uptime and store counts.
#[get("/api/v1/status")]
async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let uptime = (Utc::now() - state.started_at).num_seconds();
    let (clusters_count, news_count) = state.desk.counts();

    Json(StatusResponse {
        status: "ok",
        uptime_seconds: uptime,
        clusters_count,
        news_count,
    })
}

#[get("/get_cluster_list")]
async fn get_cluster_list(state: &State<AppState>) -> Json<Vec<Cluster>> {
    Json(state.desk.list_clusters())
}

/// News of one cluster, newest first. Unknown clusters yield an empty list.
#[get("/get_cluster_info?<cluster_id>")]
async fn get_cluster_info(state: &State<AppState>, cluster_id: u64) -> Json<Vec<NewsItem>> {
    Json(state.desk.list_news(Some(cluster_id)))
}

#[get("/get_all_news")]
async fn get_all_news(state: &State<AppState>) -> Json<Vec<NewsItem>> {
    Json(state.desk.list_news(None))
}

/// Title/body/source search, scoped to a cluster when `cluster_id` is given.
#[get("/find_news?<q>&<cluster_id>")]
async fn find_news(
    state: &State<AppState>,
    q: Option<&str>,
    cluster_id: Option<u64>,
) -> Json<Vec<NewsItem>> {
    Json(state.desk.search_news(cluster_id, q.unwrap_or_default()))
}

#[get("/find_news_by_content?<q>&<cluster_id>")]
async fn find_news_by_content(
    state: &State<AppState>,
    q: Option<&str>,
    cluster_id: Option<u64>,
) -> Json<Vec<NewsItem>> {
    Json(state.desk.search_content(cluster_id, q.unwrap_or_default()))
}

/// Save a batch of news records. The batch is stored atomically.
#[post("/save_news", data = "<body>")]
async fn save_news(
    state: &State<AppState>,
    body: Json<Vec<NewsCreate>>,
) -> ApiResult<SaveResponse> {
    let saved = state.desk.save_news(body.into_inner()).map_err(api_error)?;
    Ok(Json(SaveResponse {
        status: "ok".into(),
        saved,
    }))
}

/// Draft only; the result is never persisted by this call.
#[post("/generate_news", data = "<body>")]
async fn generate_news(state: &State<AppState>, body: Json<GenerateRequest>) -> ApiResult<Draft> {
    state
        .desk
        .generate_draft(body.cluster_id, &body.prompt)
        .await
        .map(Json)
        .map_err(api_error)
}

#[delete("/delete_news?<news_id>")]
async fn delete_news(state: &State<AppState>, news_id: u64) -> Json<DeleteResponse> {
    let removed = state.desk.delete_news(news_id);
    tracing::info!(news_id, removed, "delete requested");
    Json(DeleteResponse {
        status: "ok".into(),
        deleted: news_id,
    })
}

/// Build the Rocket instance with managed state and every route mounted.
/// Tests use this directly with a local client.
pub fn build_rocket(state: AppState, figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(state)
        .mount("/", routes![health, status])
        .mount(
            "/news",
            routes![
                get_cluster_list,
                get_cluster_info,
                get_all_news,
                find_news,
                find_news_by_content,
                save_news,
                generate_news,
                delete_news,
            ],
        )
        .mount("/", ui::routes())
        .mount("/static", FileServer::from(relative!("static")))
}

/// Launch the HTTP server, blocking until Rocket shuts down.
pub async fn launch_rocket(desk: NewsDesk, config: Arc<Config>) -> Result<()> {
    let figment = rocket::Config::figment()
        .merge(("address", config.server.bind.clone()))
        .merge(("port", config.server.port));

    let state = AppState::new(desk, config);

    tracing::info!("Starting Rocket HTTP server");
    build_rocket(state, figment)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
