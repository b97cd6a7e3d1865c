use axum::{
    debug_handler,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use sqlx::SqlitePool;

use crate::{
    forms::RegisterForm,
    include_res,
    res::{self, esc},
    session::{self, Viewer},
    AppResult,
};

use super::{create_account, Hasher};

async fn render(viewer: &Viewer, username: &str, errors: &[String]) -> AppResult<Response> {
    let content = res::fill(
        include_res!(str, "/pages/auth/register.html"),
        &[("errors", &res::error_list(errors)), ("username", &esc(username))],
    );
    Ok(viewer.render("Sign up", &content).await?.into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn register_page(viewer: Viewer) -> AppResult<Response> {
    if viewer.user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    render(&viewer, "", &[]).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    State(hasher): State<Hasher>,
    viewer: Viewer,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if viewer.user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    match create_account(&db_pool, &hasher, &form).await? {
        Ok(user) => {
            session::log_in(&viewer.session, &user).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(mut problems) => {
            problems.insert(0, "Correct error below to register!".to_owned());
            render(&viewer, &form.username, &problems).await
        }
    }
}
