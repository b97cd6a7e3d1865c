use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    res,
    service::{self, Gate},
    session::{self, LoggedIn},
    AppResult,
};

const NOT_ALLOWED: &str = "You are not allowed to delete this message.";

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_message_page(
    State(db_pool): State<SqlitePool>,
    Path(message_id): Path<Uuid>,
    viewer: LoggedIn,
) -> AppResult<Response> {
    let message = match service::authored_message(&db_pool, &viewer.user, message_id).await? {
        Gate::Allowed(message) => message,
        Gate::Denied => return Ok(NOT_ALLOWED.into_response()),
    };

    let content = res::confirm_delete(
        &format!("/message/{message_id}/delete"),
        &message.body,
        &format!("/room/{}", message.room_id),
    );
    Ok(viewer.render("Delete message", &content).await?.into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_message(
    State(db_pool): State<SqlitePool>,
    Path(message_id): Path<Uuid>,
    viewer: LoggedIn,
) -> AppResult<Response> {
    match service::delete_message(&db_pool, &viewer.user, message_id).await? {
        Gate::Allowed(()) => {
            session::flash(&viewer.session, "Message deleted successfully!").await?;
            Ok(Redirect::to("/").into_response())
        }
        Gate::Denied => Ok(NOT_ALLOWED.into_response()),
    }
}
