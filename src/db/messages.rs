use sqlx::{FromRow, SqliteConnection, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::contains_pattern;

/// A message joined with its author's name and its room's name.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub username: String,
    pub room_id: Uuid,
    pub room_name: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const MESSAGE_SELECT: &str = "SELECT m.id, m.body, m.user_id, u.username, m.room_id, r.name AS room_name,
        m.created_at, m.updated_at
    FROM messages m
    JOIN users u ON u.id = m.user_id
    JOIN rooms r ON r.id = m.room_id";

pub async fn get(db_pool: &SqlitePool, id: Uuid) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!("{MESSAGE_SELECT} WHERE m.id=?"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn all(db_pool: &SqlitePool) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!("{MESSAGE_SELECT} ORDER BY m.rowid"))
        .fetch_all(db_pool)
        .await
}

pub async fn in_room(db_pool: &SqlitePool, room_id: Uuid) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!("{MESSAGE_SELECT} WHERE m.room_id=? ORDER BY m.rowid"))
        .bind(room_id)
        .fetch_all(db_pool)
        .await
}

pub async fn by_user(db_pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!("{MESSAGE_SELECT} WHERE m.user_id=? ORDER BY m.rowid"))
        .bind(user_id)
        .fetch_all(db_pool)
        .await
}

/// Messages posted in rooms whose topic name contains `q`, ignoring case.
pub async fn in_topics_matching(db_pool: &SqlitePool, q: &str) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!(
        "{MESSAGE_SELECT}
        JOIN topics t ON t.id = r.topic_id
        WHERE t.name_folded LIKE ? ESCAPE '\\'
        ORDER BY m.rowid"
    ))
    .bind(contains_pattern(q))
    .fetch_all(db_pool)
    .await
}

pub async fn insert(conn: &mut SqliteConnection, user_id: Uuid, room_id: Uuid, body: &str) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::now_v7();
    let now = OffsetDateTime::now_utc();
    sqlx::query("INSERT INTO messages (id,user_id,room_id,body,created_at,updated_at) VALUES (?,?,?,?,?,?)")
        .bind(id)
        .bind(user_id)
        .bind(room_id)
        .bind(body)
        .bind(now)
        .bind(now)
        .execute(conn)
        .await?;
    Ok(id)
}

pub async fn update_body(db_pool: &SqlitePool, id: Uuid, body: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE messages SET body=?, updated_at=? WHERE id=?")
        .bind(body)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(())
}

pub async fn delete(db_pool: &SqlitePool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM messages WHERE id=?")
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(())
}
