use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    browse, include_res,
    res::{self, esc},
    rooms,
    service::{self, Profile},
    session::Viewer,
    AppResult,
};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn profile(
    Path(user_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    viewer: Viewer,
) -> AppResult<Response> {
    let Profile { user, rooms: hosted, messages, topics } = service::profile(&db_pool, user_id).await?;
    let me = viewer.user.as_ref();

    let edit = match me {
        Some(me) if me.id == user.id => r#"<a href="/account/update">Edit profile</a>"#,
        _ => "",
    };

    let content = res::fill(
        include_res!(str, "/pages/profiles/profile.html"),
        &[
            ("username", &esc(&user.username)),
            ("edit", edit),
            ("rooms", &hosted.iter().map(rooms::room_to_html).collect::<String>()),
            ("messages", &messages.iter().map(|m| rooms::feed_to_html(m, me)).collect::<String>()),
            ("topics", &topics.iter().map(browse::topic_to_html).collect::<String>()),
        ],
    );

    Ok(viewer.render(&format!("@{}", user.username), &content).await?.into_response())
}
