pub mod appresult;
pub mod auth;
mod browse;
pub mod config;
pub mod db;
pub mod forms;
mod index;
mod messages;
mod profiles;
pub mod res;
mod rooms;
pub mod service;
pub mod session;

use axum::{extract::FromRef, routing::get, Router};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub use appresult::{AppError, AppResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub hasher: auth::Hasher,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index::index))
        .route("/topics", get(browse::topics))
        .route("/activity", get(browse::activity))

        .merge(auth::router())
        .merge(profiles::router())
        .nest("/room", rooms::router())
        .nest("/message", messages::router())
}

/// The whole site with sessions and request tracing.
pub fn app(state: AppState, session_inactivity: time::Duration) -> Router {
    router()
        .with_state(state)
        .layer(session::layer(session_inactivity))
        .layer(TraceLayer::new_for_http())
}
