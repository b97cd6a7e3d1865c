use axum::{
    debug_handler,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use sqlx::SqlitePool;

use crate::{
    db,
    forms::RoomForm,
    include_res,
    res::{self, esc},
    service,
    session::LoggedIn,
    AppResult,
};

pub(super) struct RoomFormPage<'a> {
    pub heading: &'a str,
    pub action: &'a str,
    pub back: &'a str,
    pub submit: &'a str,
}

/// The create/edit form, filled with `form` and listing known topics.
pub(super) async fn render_form(
    db_pool: &SqlitePool,
    viewer: &LoggedIn,
    page: RoomFormPage<'_>,
    form: &RoomForm,
    errors: &[String],
) -> AppResult<Response> {
    let topic_options: String = db::topics::all(db_pool)
        .await?
        .iter()
        .map(|t| format!(r#"<option value="{}">"#, esc(&t.name)))
        .collect();

    let content = res::fill(
        include_res!(str, "/pages/rooms/room_form.html"),
        &[
            ("heading", page.heading),
            ("action", page.action),
            ("back", page.back),
            ("submit", page.submit),
            ("errors", &res::error_list(errors)),
            ("topic", &esc(&form.topic)),
            ("topic_options", &topic_options),
            ("name", &esc(&form.name)),
            ("description", &esc(form.description.as_deref().unwrap_or_default())),
        ],
    );

    Ok(viewer.render(page.heading, &content).await?.into_response())
}

const CREATE: RoomFormPage<'static> = RoomFormPage {
    heading: "Create room",
    action: "/room/create",
    back: "/",
    submit: "Create",
};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn new_room_page(
    State(db_pool): State<SqlitePool>,
    viewer: LoggedIn,
) -> AppResult<Response> {
    render_form(&db_pool, &viewer, CREATE, &RoomForm::default(), &[]).await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn new_room(
    State(db_pool): State<SqlitePool>,
    viewer: LoggedIn,
    Form(form): Form<RoomForm>,
) -> AppResult<Response> {
    let problems = form.problems();
    if !problems.is_empty() {
        return render_form(&db_pool, &viewer, CREATE, &form, &problems).await;
    }

    service::create_room(&db_pool, &viewer.user, &form).await?;
    Ok(Redirect::to("/").into_response())
}
