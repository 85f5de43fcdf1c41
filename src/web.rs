use crate::{
    config::Config,
    entries::{Bookmark, DashboardStats, DomainStats, FolderStats, HistoryEntry, HistoryStats, SearchHit},
    store::{Store, StoreError},
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{path::PathBuf, sync::Arc};
use tokio::signal;

#[derive(Clone)]
pub struct SharedState {
    store: Arc<Store>,
    search_limit: usize,
    domain_limit: usize,
}

impl SharedState {
    pub fn new(store: Arc<Store>, config: &Config) -> Self {
        Self {
            store,
            search_limit: config.default_search_limit,
            domain_limit: config.default_domain_limit,
        }
    }
}

pub fn router(state: SharedState, public_dir: PathBuf) -> Router {
    Router::new()
        .route("/api/search", get(search_all))
        .route("/api/history/search", get(search_history))
        .route("/api/history/stats", get(history_stats))
        .route("/api/history/domains", get(top_domains))
        .route("/api/bookmarks/search", get(search_bookmarks))
        .route("/api/bookmarks/folders", get(bookmark_folders))
        .route("/api/bookmarks/folder", get(bookmarks_by_folder))
        .route("/api/dashboard", get(dashboard))
        .route("/api/health", get(health))
        .fallback_service(tower_http::services::ServeDir::new(public_dir))
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::compression::CompressionLayer::new())
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(Arc::new(state))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                log::error!("failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::warn!("shutting down gracefully");
}

async fn start_app(store: Arc<Store>, config: Config) -> anyhow::Result<()> {
    let addr = config.listen_addr()?;
    let app = router(
        SharedState::new(store, &config),
        config.public_dir.clone(),
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("api listening on http://{addr}/api");
    log::info!("dashboard served from {}", config.public_dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn start_daemon(store: Arc<Store>, config: Config) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(start_app(store, config))
}

#[derive(Debug)]
pub enum HttpError {
    Store(StoreError),
    BadRequest(String),
}

impl HttpError {
    fn rejected(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            HttpError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            HttpError::Store(err) if err.is_invalid_input() => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            HttpError::Store(err) => {
                log::error!("{err:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        (status, Json(json!({"error": message}))).into_response()
    }
}

impl<E> From<E> for HttpError
where
    E: Into<StoreError>,
{
    fn from(err: E) -> Self {
        Self::Store(err.into())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

impl SearchParams {
    fn term(&self) -> Result<String, HttpError> {
        self.q
            .clone()
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| HttpError::BadRequest(MISSING_QUERY.to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse<T> {
    pub results: Vec<T>,
    pub count: usize,
}

impl<T> From<Vec<T>> for SearchResponse<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

const MISSING_QUERY: &str = "Query parameter \"q\" is required";

async fn search_all(
    State(state): State<Arc<SharedState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<axum::response::Response, HttpError> {
    let Query(params) = params.map_err(HttpError::rejected)?;
    log::debug!("params: {params:?}");

    let term = params.term()?;
    let limit = params.limit.unwrap_or(state.search_limit);

    tokio::task::block_in_place(move || {
        let hits: SearchResponse<SearchHit> = state.store.search_all(&term, limit)?.into();
        Ok(Json(hits).into_response())
    })
}

async fn search_history(
    State(state): State<Arc<SharedState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<axum::response::Response, HttpError> {
    let Query(params) = params.map_err(HttpError::rejected)?;
    log::debug!("params: {params:?}");

    let term = params.term()?;
    let limit = params.limit.unwrap_or(state.search_limit);

    tokio::task::block_in_place(move || {
        let entries: SearchResponse<HistoryEntry> =
            state.store.search_history(&term, limit)?.into();
        Ok(Json(entries).into_response())
    })
}

async fn search_bookmarks(
    State(state): State<Arc<SharedState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<axum::response::Response, HttpError> {
    let Query(params) = params.map_err(HttpError::rejected)?;
    log::debug!("params: {params:?}");

    let term = params.term()?;
    let limit = params.limit.unwrap_or(state.search_limit);

    tokio::task::block_in_place(move || {
        let bmarks: SearchResponse<Bookmark> = state.store.search_bookmarks(&term, limit)?.into();
        Ok(Json(bmarks).into_response())
    })
}

async fn history_stats(
    State(state): State<Arc<SharedState>>,
) -> Result<Json<HistoryStats>, HttpError> {
    tokio::task::block_in_place(move || Ok(state.store.history_stats()?.into()))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DomainsResponse {
    pub domains: Vec<DomainStats>,
    pub count: usize,
}

async fn top_domains(
    State(state): State<Arc<SharedState>>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> Result<Json<DomainsResponse>, HttpError> {
    let Query(params) = params.map_err(HttpError::rejected)?;
    let limit = params.limit.unwrap_or(state.domain_limit);

    tokio::task::block_in_place(move || {
        let domains = state.store.top_domains(limit)?;
        Ok(DomainsResponse {
            count: domains.len(),
            domains,
        }
        .into())
    })
}

#[derive(Debug, Serialize)]
pub struct FoldersResponse {
    pub folders: Vec<FolderStats>,
    pub count: usize,
}

async fn bookmark_folders(
    State(state): State<Arc<SharedState>>,
) -> Result<Json<FoldersResponse>, HttpError> {
    tokio::task::block_in_place(move || {
        let folders = state.store.bookmark_folders()?;
        Ok(FoldersResponse {
            count: folders.len(),
            folders,
        }
        .into())
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct FolderParams {
    #[serde(default = "crate::entries::root_folder")]
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct FolderResponse {
    pub bookmarks: Vec<Bookmark>,
    pub count: usize,
    pub folder: String,
}

async fn bookmarks_by_folder(
    State(state): State<Arc<SharedState>>,
    params: Result<Query<FolderParams>, QueryRejection>,
) -> Result<Json<FolderResponse>, HttpError> {
    let Query(params) = params.map_err(HttpError::rejected)?;
    log::debug!("params: {params:?}");

    tokio::task::block_in_place(move || {
        let bookmarks = state.store.bookmarks_by_folder(&params.path)?;
        Ok(FolderResponse {
            count: bookmarks.len(),
            bookmarks,
            folder: params.path,
        }
        .into())
    })
}

async fn dashboard(
    State(state): State<Arc<SharedState>>,
) -> Result<Json<DashboardStats>, HttpError> {
    tokio::task::block_in_place(move || Ok(state.store.dashboard_stats()?.into()))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
