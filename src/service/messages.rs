use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db::{self, Message, User},
    AppError, AppResult,
};

use super::Gate;

/// The message, if `actor` wrote it.
pub async fn authored_message(db_pool: &SqlitePool, actor: &User, message_id: Uuid) -> AppResult<Gate<Message>> {
    let message = db::messages::get(db_pool, message_id)
        .await?
        .ok_or(AppError::NotFound("message"))?;

    if message.user_id != actor.id {
        tracing::warn!("@{} is not the author of message {message_id}", actor.username);
        return Ok(Gate::Denied);
    }
    Ok(Gate::Allowed(message))
}

/// `body` must already be validated. Hands back the message as it was, for its room.
pub async fn update_message(db_pool: &SqlitePool, actor: &User, message_id: Uuid, body: &str) -> AppResult<Gate<Message>> {
    let message = match authored_message(db_pool, actor, message_id).await? {
        Gate::Allowed(message) => message,
        Gate::Denied => return Ok(Gate::Denied),
    };

    db::messages::update_body(db_pool, message_id, body).await?;
    tracing::info!("@{} edited message {message_id}", actor.username);
    Ok(Gate::Allowed(message))
}

/// The room and the author's participation are left alone.
pub async fn delete_message(db_pool: &SqlitePool, actor: &User, message_id: Uuid) -> AppResult<Gate<()>> {
    if let Gate::Denied = authored_message(db_pool, actor, message_id).await? {
        return Ok(Gate::Denied);
    }

    db::messages::delete(db_pool, message_id).await?;
    tracing::info!("@{} deleted message {message_id}", actor.username);
    Ok(Gate::Allowed(()))
}
