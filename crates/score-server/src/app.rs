use std::future::Future;
use std::sync::Arc;

use axum::{
    Json, Router,
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::routes;
use crate::store::{ScoreStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<ScoreStore>>,
}

impl AppState {
    pub fn new(store: ScoreStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` against the store on the blocking pool; SQLite calls never
    /// run on the async workers.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut ScoreStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || {
            let mut guard = store.lock();
            f(&mut *guard)
        })
        .await?;
        Ok(result?)
    }
}

/// Failure of a request after it was accepted; rendered as a 500 JSON body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("score store failure: {0}")]
    Store(#[from] StoreError),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("request failed: {self}");
        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/highscores", get(routes::list_scores))
        .route("/highscore", post(routes::submit_score))
        .route("/health", get(routes::get_health))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the routes on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
