use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    forms::MessageForm,
    include_res,
    res::{self, esc},
    service::{self, RoomDetail},
    session::{self, LoggedIn, Viewer},
    AppResult,
};

use super::msg;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn room(
    State(db_pool): State<SqlitePool>,
    viewer: Viewer,
    Path(room_id): Path<Uuid>,
) -> AppResult<Response> {
    let RoomDetail { room, messages, participants } = service::room_detail(&db_pool, room_id).await?;
    let user = viewer.user.as_ref();
    let room_id = room.id.to_string();

    let messages: String = messages.iter().map(|m| msg::msg_to_html(m, user)).collect();
    let participant_list: String = participants
        .iter()
        .map(|p| {
            res::fill(
                include_res!(str, "/pages/rooms/participant.html"),
                &[("id", &p.id.to_string()), ("username", &esc(&p.username))],
            )
        })
        .collect();

    let host_actions = match user {
        Some(user) if user.id == room.host_id => {
            res::fill(include_res!(str, "/pages/rooms/host_actions.html"), &[("id", &room_id)])
        }
        _ => String::new(),
    };

    let compose = match user {
        Some(_) => res::fill(include_res!(str, "/pages/rooms/compose.html"), &[("id", &room_id)]),
        None => res::fill(
            include_res!(str, "/pages/rooms/compose_anon.html"),
            &[("login_url", &esc(&session::login_url(&format!("/room/{room_id}"))))],
        ),
    };

    let content = res::fill(
        include_res!(str, "/pages/rooms/room.html"),
        &[
            ("name", &esc(&room.name)),
            ("host_id", &room.host_id.to_string()),
            ("host", &esc(&room.host_username)),
            ("topic", &esc(&room.topic_name)),
            ("since", &res::since(room.created_at)),
            ("host_actions", &host_actions),
            ("description", &esc(room.description.as_deref().unwrap_or_default())),
            ("messages", &messages),
            ("compose", &compose),
            ("participant_count", &participants.len().to_string()),
            ("participants", &participant_list),
        ],
    );

    Ok(viewer.render(&room.name, &content).await?.into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn post_message(
    State(db_pool): State<SqlitePool>,
    Path(room_id): Path<Uuid>,
    LoggedIn { user, session }: LoggedIn,
    Form(form): Form<MessageForm>,
) -> AppResult<Response> {
    let problems = form.problems();
    if problems.is_empty() {
        service::post_message(&db_pool, &user, room_id, &form.body).await?;
    } else {
        for problem in problems {
            session::flash(&session, problem).await?;
        }
    }

    Ok(Redirect::to(&format!("/room/{room_id}")).into_response())
}
