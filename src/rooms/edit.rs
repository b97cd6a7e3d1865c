use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    forms::RoomForm,
    service::{self, Gate},
    session::LoggedIn,
    AppResult,
};

use super::new::{render_form, RoomFormPage};

const NOT_ALLOWED: &str = "You are not allowed to update this room.";

async fn render(db_pool: &SqlitePool, viewer: &LoggedIn, room_id: Uuid, form: &RoomForm, errors: &[String]) -> AppResult<Response> {
    let action = format!("/room/{room_id}/update");
    let back = format!("/room/{room_id}");
    let page = RoomFormPage {
        heading: "Update room",
        action: &action,
        back: &back,
        submit: "Update",
    };
    render_form(db_pool, viewer, page, form, errors).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_room_page(
    State(db_pool): State<SqlitePool>,
    Path(room_id): Path<Uuid>,
    viewer: LoggedIn,
) -> AppResult<Response> {
    let room = match service::hosted_room(&db_pool, &viewer.user, room_id).await? {
        Gate::Allowed(room) => room,
        Gate::Denied => return Ok(NOT_ALLOWED.into_response()),
    };

    let form = RoomForm {
        topic: room.topic_name,
        name: room.name,
        description: room.description,
    };
    render(&db_pool, &viewer, room_id, &form, &[]).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_room(
    State(db_pool): State<SqlitePool>,
    Path(room_id): Path<Uuid>,
    viewer: LoggedIn,
    Form(form): Form<RoomForm>,
) -> AppResult<Response> {
    if let Gate::Denied = service::hosted_room(&db_pool, &viewer.user, room_id).await? {
        return Ok(NOT_ALLOWED.into_response());
    }

    let problems = form.problems();
    if !problems.is_empty() {
        return render(&db_pool, &viewer, room_id, &form, &problems).await;
    }

    match service::update_room(&db_pool, &viewer.user, room_id, &form).await? {
        Gate::Allowed(()) => Ok(Redirect::to("/").into_response()),
        Gate::Denied => Ok(NOT_ALLOWED.into_response()),
    }
}
