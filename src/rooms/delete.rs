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
    session::LoggedIn,
    AppResult,
};

const NOT_ALLOWED: &str = "You are not allowed to delete this room.";

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_room_page(
    State(db_pool): State<SqlitePool>,
    Path(room_id): Path<Uuid>,
    viewer: LoggedIn,
) -> AppResult<Response> {
    let room = match service::hosted_room(&db_pool, &viewer.user, room_id).await? {
        Gate::Allowed(room) => room,
        Gate::Denied => return Ok(NOT_ALLOWED.into_response()),
    };

    let content = res::confirm_delete(
        &format!("/room/{room_id}/delete"),
        &room.name,
        &format!("/room/{room_id}"),
    );
    Ok(viewer.render("Delete room", &content).await?.into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_room(
    State(db_pool): State<SqlitePool>,
    Path(room_id): Path<Uuid>,
    viewer: LoggedIn,
) -> AppResult<Response> {
    match service::delete_room(&db_pool, &viewer.user, room_id).await? {
        Gate::Allowed(()) => Ok(Redirect::to("/").into_response()),
        Gate::Denied => Ok(NOT_ALLOWED.into_response()),
    }
}
