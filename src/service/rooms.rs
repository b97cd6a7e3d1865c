use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db::{self, Message, Participant, Room, User},
    forms::RoomForm,
    AppError, AppResult,
};

use super::Gate;

pub struct RoomDetail {
    pub room: Room,
    pub messages: Vec<Message>,
    pub participants: Vec<Participant>,
}

pub async fn room_detail(db_pool: &SqlitePool, room_id: Uuid) -> AppResult<RoomDetail> {
    let room = db::rooms::get(db_pool, room_id)
        .await?
        .ok_or(AppError::NotFound("room"))?;

    Ok(RoomDetail {
        messages: db::messages::in_room(db_pool, room.id).await?,
        participants: db::rooms::participants(db_pool, room.id).await?,
        room,
    })
}

/// Posts `body` into the room and makes the author a participant.
pub async fn post_message(db_pool: &SqlitePool, author: &User, room_id: Uuid, body: &str) -> AppResult<Uuid> {
    if db::rooms::get(db_pool, room_id).await?.is_none() {
        return Err(AppError::NotFound("room"));
    }

    let mut tx = db_pool.begin().await?;
    let id = db::messages::insert(&mut tx, author.id, room_id, body).await?;
    db::rooms::add_participant(&mut tx, room_id, author.id).await?;
    tx.commit().await?;

    tracing::debug!("@{} posted {id} in room {room_id}", author.username);
    Ok(id)
}

/// The form must already be valid. The topic is reused by exact name or created.
pub async fn create_room(db_pool: &SqlitePool, host: &User, form: &RoomForm) -> AppResult<Uuid> {
    let mut tx = db_pool.begin().await?;
    let (topic, created) = db::topics::get_or_create(&mut tx, &form.topic).await?;
    let id = db::rooms::insert(&mut tx, host.id, topic.id, &form.name, form.description.as_deref()).await?;
    tx.commit().await?;

    if created {
        tracing::info!("new topic {:?}", topic.name);
    }
    tracing::info!("@{} created room {id} {:?}", host.username, form.name);
    Ok(id)
}

/// The room, if `actor` hosts it.
pub async fn hosted_room(db_pool: &SqlitePool, actor: &User, room_id: Uuid) -> AppResult<Gate<Room>> {
    let room = db::rooms::get(db_pool, room_id)
        .await?
        .ok_or(AppError::NotFound("room"))?;

    if room.host_id != actor.id {
        tracing::warn!("@{} is not the host of room {room_id}", actor.username);
        return Ok(Gate::Denied);
    }
    Ok(Gate::Allowed(room))
}

pub async fn update_room(db_pool: &SqlitePool, actor: &User, room_id: Uuid, form: &RoomForm) -> AppResult<Gate<()>> {
    if let Gate::Denied = hosted_room(db_pool, actor, room_id).await? {
        return Ok(Gate::Denied);
    }

    let mut tx = db_pool.begin().await?;
    let (topic, _) = db::topics::get_or_create(&mut tx, &form.topic).await?;
    db::rooms::update(&mut tx, room_id, topic.id, &form.name, form.description.as_deref()).await?;
    tx.commit().await?;

    tracing::info!("@{} updated room {room_id}", actor.username);
    Ok(Gate::Allowed(()))
}

pub async fn delete_room(db_pool: &SqlitePool, actor: &User, room_id: Uuid) -> AppResult<Gate<()>> {
    if let Gate::Denied = hosted_room(db_pool, actor, room_id).await? {
        return Ok(Gate::Denied);
    }

    db::rooms::delete(db_pool, room_id).await?;
    tracing::info!("@{} deleted room {room_id}", actor.username);
    Ok(Gate::Allowed(()))
}
