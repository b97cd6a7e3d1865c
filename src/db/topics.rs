use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{contains_pattern, fold};

#[derive(Debug, Clone, FromRow)]
pub struct Topic {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct TopicSummary {
    pub id: Uuid,
    pub name: String,
    pub room_count: i64,
}

const SUMMARY_SELECT: &str = "SELECT t.id, t.name, COUNT(r.id) AS room_count
    FROM topics t LEFT JOIN rooms r ON r.topic_id = t.id";

/// Looks the topic up by its exact name and inserts it when absent. Run it
/// inside a transaction; the returned flag says whether a row was created.
pub async fn get_or_create(conn: &mut SqliteConnection, name: &str) -> Result<(Topic, bool), sqlx::Error> {
    let existing = sqlx::query_as::<_, Topic>("SELECT id,name FROM topics WHERE name=?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some(topic) = existing {
        return Ok((topic, false));
    }

    let created = sqlx::query("INSERT INTO topics (id,name,name_folded) VALUES (?,?,?) ON CONFLICT(name) DO NOTHING")
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(fold(name))
        .execute(&mut *conn)
        .await?
        .rows_affected() == 1;

    let topic = sqlx::query_as::<_, Topic>("SELECT id,name FROM topics WHERE name=?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    Ok((topic, created))
}

pub async fn all(db_pool: &SqlitePool) -> Result<Vec<TopicSummary>, sqlx::Error> {
    sqlx::query_as::<_, TopicSummary>(&format!("{SUMMARY_SELECT} GROUP BY t.id ORDER BY t.rowid"))
        .fetch_all(db_pool)
        .await
}

pub async fn first(db_pool: &SqlitePool, limit: i64) -> Result<Vec<TopicSummary>, sqlx::Error> {
    sqlx::query_as::<_, TopicSummary>(&format!("{SUMMARY_SELECT} GROUP BY t.id ORDER BY t.rowid LIMIT ?"))
        .bind(limit)
        .fetch_all(db_pool)
        .await
}

pub async fn search(db_pool: &SqlitePool, q: &str) -> Result<Vec<TopicSummary>, sqlx::Error> {
    sqlx::query_as::<_, TopicSummary>(&format!(
        "{SUMMARY_SELECT} WHERE t.name_folded LIKE ? ESCAPE '\\' GROUP BY t.id ORDER BY t.rowid"
    ))
    .bind(contains_pattern(q))
    .fetch_all(db_pool)
    .await
}
