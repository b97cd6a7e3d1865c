mod delete;
mod edit;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/update", get(edit::edit_message_page).post(edit::edit_message))
        .route("/{id}/delete", get(delete::delete_message_page).post(delete::delete_message))
}
