use axum::{
    extract::{FromRef, FromRequestParts, OriginalUri},
    http::request::Parts,
    response::{Html, IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use time::Duration;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, Session, SessionManagerLayer};
use uuid::Uuid;

use crate::{db::{self, User}, res, AppResult};

pub const USER_ID: &str = "user_id";
pub const FLASH: &str = "flash";

pub fn layer(inactivity: Duration) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(inactivity))
}

/// Whoever made the request, if anybody is logged in.
pub struct Viewer {
    pub user: Option<User>,
    pub session: Session,
}

/// A request that must come from a logged-in user. Anonymous requests are
/// redirected to the login page, which sends them back afterwards.
pub struct LoggedIn {
    pub user: User,
    pub session: Session,
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let db_pool = SqlitePool::from_ref(state);
        let user = current_user(&db_pool, &session)
            .await
            .map_err(IntoResponse::into_response)?;

        Ok(Viewer { user, session })
    }
}

impl<S> FromRequestParts<S> for LoggedIn
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Viewer { user, session } = Viewer::from_request_parts(parts, state).await?;

        match user {
            Some(user) => Ok(LoggedIn { user, session }),
            None => {
                // nested routers see their path with the prefix stripped
                let path = match parts.extensions.get::<OriginalUri>() {
                    Some(OriginalUri(uri)) => uri.path(),
                    None => parts.uri.path(),
                };
                tracing::debug!("anonymous request to {path} sent to login");
                Err(Redirect::to(&login_url(path)).into_response())
            }
        }
    }
}

impl Viewer {
    pub async fn render(&self, title: &str, content: &str) -> AppResult<Html<String>> {
        res::page(&self.session, self.user.as_ref(), title, content).await
    }
}

impl LoggedIn {
    pub async fn render(&self, title: &str, content: &str) -> AppResult<Html<String>> {
        res::page(&self.session, Some(&self.user), title, content).await
    }
}

async fn current_user(db_pool: &SqlitePool, session: &Session) -> AppResult<Option<User>> {
    let Some(user_id) = session.get::<Uuid>(USER_ID).await? else {
        return Ok(None);
    };
    Ok(db::users::get(db_pool, user_id).await?)
}

/// Binds the session to `user` under a fresh session id.
pub async fn log_in(session: &Session, user: &User) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_ID, user.id).await?;
    tracing::info!("@{} logged in", user.username);
    Ok(())
}

pub async fn log_out(session: &Session) -> AppResult<()> {
    session.flush().await?;
    Ok(())
}

pub async fn flash(session: &Session, notice: impl Into<String>) -> AppResult<()> {
    let mut pending: Vec<String> = session.get(FLASH).await?.unwrap_or_default();
    pending.push(notice.into());
    session.insert(FLASH, pending).await?;
    Ok(())
}

pub async fn take_flash(session: &Session) -> AppResult<Vec<String>> {
    if session.get::<Vec<String>>(FLASH).await?.is_none() {
        return Ok(Vec::new());
    }
    Ok(session.remove::<Vec<String>>(FLASH).await?.unwrap_or_default())
}

pub fn login_url(return_url: &str) -> String {
    format!("/login?return_url={}", urlencoding::encode(return_url))
}

/// Only local absolute paths are followed after login.
pub fn safe_return_url(return_url: Option<&str>) -> &str {
    match return_url {
        Some(url) if url.starts_with('/') && !url.starts_with("//") && !url.contains('\\') => url,
        _ => "/",
    }
}
