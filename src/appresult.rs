use axum::{http::StatusCode, response::{IntoResponse, Response}};

use crate::res;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("session: {0}")]
    Session(#[from] tower_sessions::session::Error),
    #[error("password hashing: {0}")]
    Password(#[from] bcrypt::BcryptError),
    #[error("blocking task: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::NotFound(what) = self {
            tracing::debug!("{what} not found");
            return (StatusCode::NOT_FOUND, res::sorry(what)).into_response();
        }

        tracing::error!("request failed: {self}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong on our end.",
        )
            .into_response()
    }
}
