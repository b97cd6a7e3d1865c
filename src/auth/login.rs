use axum::{
    debug_handler,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    forms::LoginForm,
    include_res,
    res::{self, esc},
    session::{self, Viewer},
    AppResult,
};

use super::{authenticate, Hasher, Login};

const UNKNOWN_USER: &str = "User does not exist";
const BAD_CREDENTIALS: &str = "Username or password does not exist";

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    pub(crate) return_url: Option<String>,
}

async fn render(viewer: &Viewer, username: &str, return_url: &str, errors: &[String]) -> AppResult<Response> {
    let content = res::fill(
        include_res!(str, "/pages/auth/login.html"),
        &[
            ("errors", &res::error_list(errors)),
            ("username", &esc(username)),
            ("return_url", &esc(return_url)),
        ],
    );
    Ok(viewer.render("Login", &content).await?.into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login_page(
    viewer: Viewer,
    Query(LoginQuery { return_url }): Query<LoginQuery>,
) -> AppResult<Response> {
    if viewer.user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    render(&viewer, "", session::safe_return_url(return_url.as_deref()), &[]).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    State(hasher): State<Hasher>,
    viewer: Viewer,
    Form(LoginForm { username, password, return_url }): Form<LoginForm>,
) -> AppResult<Response> {
    if viewer.user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let return_url = session::safe_return_url(return_url.as_deref());
    let errors: &[&str] = match authenticate(&db_pool, &hasher, &username, &password).await? {
        Login::Success(user) => {
            session::log_in(&viewer.session, &user).await?;
            return Ok(Redirect::to(return_url).into_response());
        }
        Login::UnknownUser => &[UNKNOWN_USER, BAD_CREDENTIALS],
        Login::WrongPassword => &[BAD_CREDENTIALS],
    };

    tracing::info!("failed login for {username:?}: {}", errors.join("; "));
    let errors: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    render(&viewer, &username, return_url, &errors).await
}
