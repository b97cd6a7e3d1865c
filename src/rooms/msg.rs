use crate::{
    db::{Message, User},
    include_res,
    res::{self, esc},
};

fn actions(message: &Message, viewer: Option<&User>) -> String {
    match viewer {
        Some(user) if user.id == message.user_id => res::fill(
            include_res!(str, "/pages/rooms/message_actions.html"),
            &[("id", &message.id.to_string())],
        ),
        _ => String::new(),
    }
}

/// A message as shown inside its room.
pub fn msg_to_html(message: &Message, viewer: Option<&User>) -> String {
    res::fill(
        include_res!(str, "/pages/rooms/message.html"),
        &[
            ("id", &message.id.to_string()),
            ("user_id", &message.user_id.to_string()),
            ("username", &esc(&message.username)),
            ("since", &res::since(message.created_at)),
            ("actions", &actions(message, viewer)),
            ("body", &res::markdown(&message.body)),
        ],
    )
}

/// A message as shown in activity feeds, with a link to its room.
pub fn feed_to_html(message: &Message, viewer: Option<&User>) -> String {
    res::fill(
        include_res!(str, "/pages/rooms/feed_item.html"),
        &[
            ("user_id", &message.user_id.to_string()),
            ("username", &esc(&message.username)),
            ("since", &res::since(message.created_at)),
            ("actions", &actions(message, viewer)),
            ("room_id", &message.room_id.to_string()),
            ("room_name", &esc(&message.room_name)),
            ("body", &res::markdown(&message.body)),
        ],
    )
}
