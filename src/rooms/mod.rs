mod delete;
mod edit;
pub(crate) mod msg;
mod new;
mod room;

use axum::{routing::get, Router};

use crate::{db::Room, include_res, res::{self, esc}, AppState};

pub use msg::feed_to_html;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", get(new::new_room_page).post(new::new_room))
        .route("/{id}", get(room::room).post(room::post_message))
        .route("/{id}/update", get(edit::edit_room_page).post(edit::edit_room))
        .route("/{id}/delete", get(delete::delete_room_page).post(delete::delete_room))
}

pub fn room_to_html(room: &Room) -> String {
    res::fill(
        include_res!(str, "/pages/rooms/room_item.html"),
        &[
            ("id", &room.id.to_string()),
            ("name", &esc(&room.name)),
            ("host_id", &room.host_id.to_string()),
            ("host", &esc(&room.host_username)),
            ("topic", &esc(&room.topic_name)),
            ("since", &res::since(room.created_at)),
        ],
    )
}
