use sqlx::{FromRow, SqliteConnection, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{contains_pattern, fold};

/// A room joined with its host's name and its topic's name.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub host_id: Uuid,
    pub host_username: String,
    pub topic_id: Uuid,
    pub topic_name: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct Participant {
    pub id: Uuid,
    pub username: String,
}

const ROOM_SELECT: &str = "SELECT r.id, r.name, r.description, r.host_id, u.username AS host_username,
        r.topic_id, t.name AS topic_name, r.created_at, r.updated_at
    FROM rooms r
    JOIN users u ON u.id = r.host_id
    JOIN topics t ON t.id = r.topic_id";

pub async fn get(db_pool: &SqlitePool, id: Uuid) -> Result<Option<Room>, sqlx::Error> {
    sqlx::query_as::<_, Room>(&format!("{ROOM_SELECT} WHERE r.id=?"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

/// Rooms whose topic name, name or description contains `q`, ignoring case.
pub async fn search(db_pool: &SqlitePool, q: &str) -> Result<Vec<Room>, sqlx::Error> {
    let pattern = contains_pattern(q);
    sqlx::query_as::<_, Room>(&format!(
        "{ROOM_SELECT}
        WHERE t.name_folded LIKE ? ESCAPE '\\'
            OR r.name_folded LIKE ? ESCAPE '\\'
            OR r.description_folded LIKE ? ESCAPE '\\'
        ORDER BY r.rowid"
    ))
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .fetch_all(db_pool)
    .await
}

pub async fn hosted_by(db_pool: &SqlitePool, host_id: Uuid) -> Result<Vec<Room>, sqlx::Error> {
    sqlx::query_as::<_, Room>(&format!("{ROOM_SELECT} WHERE r.host_id=? ORDER BY r.rowid"))
        .bind(host_id)
        .fetch_all(db_pool)
        .await
}

pub async fn insert(
    conn: &mut SqliteConnection,
    host_id: Uuid,
    topic_id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::now_v7();
    let now = OffsetDateTime::now_utc();
    sqlx::query(
        "INSERT INTO rooms (id,host_id,topic_id,name,description,name_folded,description_folded,created_at,updated_at)
         VALUES (?,?,?,?,?,?,?,?,?)"
    )
    .bind(id)
    .bind(host_id)
    .bind(topic_id)
    .bind(name)
    .bind(description)
    .bind(fold(name))
    .bind(description.map(fold))
    .bind(now)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(id)
}

pub async fn update(
    conn: &mut SqliteConnection,
    id: Uuid,
    topic_id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE rooms SET topic_id=?, name=?, description=?, name_folded=?, description_folded=?, updated_at=?
         WHERE id=?"
    )
    .bind(topic_id)
    .bind(name)
    .bind(description)
    .bind(fold(name))
    .bind(description.map(fold))
    .bind(OffsetDateTime::now_utc())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Messages and participant rows go with the room.
pub async fn delete(db_pool: &SqlitePool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM rooms WHERE id=?")
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(())
}

pub async fn participants(db_pool: &SqlitePool, room_id: Uuid) -> Result<Vec<Participant>, sqlx::Error> {
    sqlx::query_as::<_, Participant>(
        "SELECT u.id, u.username FROM room_participants p
         JOIN users u ON u.id = p.user_id
         WHERE p.room_id=?
         ORDER BY p.rowid"
    )
    .bind(room_id)
    .fetch_all(db_pool)
    .await
}

/// Re-adding an existing participant is a no-op.
pub async fn add_participant(conn: &mut SqliteConnection, room_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO room_participants (room_id,user_id) VALUES (?,?)")
        .bind(room_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}
