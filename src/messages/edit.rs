use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db::Message,
    forms::MessageForm,
    include_res,
    res::{self, esc},
    service::{self, Gate},
    session::{self, LoggedIn},
    AppResult,
};

const NOT_ALLOWED: &str = "You are not allowed to edit this message.";

async fn render(viewer: &LoggedIn, message: &Message, body: &str, errors: &[String]) -> AppResult<Response> {
    let content = res::fill(
        include_res!(str, "/pages/messages/message_form.html"),
        &[
            ("id", &message.id.to_string()),
            ("room_id", &message.room_id.to_string()),
            ("errors", &res::error_list(errors)),
            ("body", &esc(body)),
        ],
    );
    Ok(viewer.render("Edit message", &content).await?.into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_message_page(
    State(db_pool): State<SqlitePool>,
    Path(message_id): Path<Uuid>,
    viewer: LoggedIn,
) -> AppResult<Response> {
    match service::authored_message(&db_pool, &viewer.user, message_id).await? {
        Gate::Allowed(message) => render(&viewer, &message, &message.body, &[]).await,
        Gate::Denied => Ok(NOT_ALLOWED.into_response()),
    }
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_message(
    State(db_pool): State<SqlitePool>,
    Path(message_id): Path<Uuid>,
    viewer: LoggedIn,
    Form(form): Form<MessageForm>,
) -> AppResult<Response> {
    let message = match service::authored_message(&db_pool, &viewer.user, message_id).await? {
        Gate::Allowed(message) => message,
        Gate::Denied => return Ok(NOT_ALLOWED.into_response()),
    };

    let problems = form.problems();
    if !problems.is_empty() {
        return render(&viewer, &message, &form.body, &problems).await;
    }

    match service::update_message(&db_pool, &viewer.user, message_id, &form.body).await? {
        Gate::Allowed(message) => {
            session::flash(&viewer.session, "Message updated successfully!").await?;
            Ok(Redirect::to(&format!("/room/{}", message.room_id)).into_response())
        }
        Gate::Denied => Ok(NOT_ALLOWED.into_response()),
    }
}
