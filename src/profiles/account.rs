use axum::{
    debug_handler,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use sqlx::SqlitePool;

use crate::{
    db,
    forms::AccountForm,
    include_res,
    res::{self, esc},
    session::LoggedIn,
    AppResult,
};

const TAKEN: &str = "A user with that username already exists.";

async fn render(viewer: &LoggedIn, form: &AccountForm, errors: &[String]) -> AppResult<Response> {
    let content = res::fill(
        include_res!(str, "/pages/profiles/update_user.html"),
        &[
            ("id", &viewer.user.id.to_string()),
            ("errors", &res::error_list(errors)),
            ("username", &esc(&form.username)),
            ("email", &esc(form.email.as_deref().unwrap_or_default())),
        ],
    );
    Ok(viewer.render("Edit profile", &content).await?.into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn account_page(viewer: LoggedIn) -> AppResult<Response> {
    let form = AccountForm {
        username: viewer.user.username.clone(),
        email: viewer.user.email.clone(),
    };
    render(&viewer, &form, &[]).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn update_account(
    State(db_pool): State<SqlitePool>,
    viewer: LoggedIn,
    Form(form): Form<AccountForm>,
) -> AppResult<Response> {
    let user_id = viewer.user.id;

    let mut problems = form.problems();
    if problems.is_empty() && db::users::username_taken(&db_pool, &form.username, Some(user_id)).await? {
        problems.push(TAKEN.to_owned());
    }
    if !problems.is_empty() {
        return render(&viewer, &form, &problems).await;
    }

    match db::users::update_account(&db_pool, user_id, &form.username, form.email.as_deref()).await {
        Ok(()) => {}
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return render(&viewer, &form, &[TAKEN.to_owned()]).await;
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!("@{} is now @{}", viewer.user.username, form.username);
    Ok(Redirect::to(&format!("/profile/{user_id}")).into_response())
}
