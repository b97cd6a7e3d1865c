use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

pub async fn get(db_pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id,username,email,password_hash,created_at FROM users WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn get_by_username(db_pool: &SqlitePool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id,username,email,password_hash,created_at FROM users WHERE username=?")
        .bind(username)
        .fetch_optional(db_pool)
        .await
}

/// Whether `username` belongs to anybody other than `except`.
pub async fn username_taken(
    db_pool: &SqlitePool,
    username: &str,
    except: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    let owner: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE username=?")
        .bind(username)
        .fetch_optional(db_pool)
        .await?;

    Ok(matches!(owner, Some((id,)) if Some(id) != except))
}

pub async fn create(db_pool: &SqlitePool, username: &str, password_hash: &str) -> Result<User, sqlx::Error> {
    let user = User {
        id: Uuid::now_v7(),
        username: username.to_owned(),
        email: None,
        password_hash: password_hash.to_owned(),
        created_at: OffsetDateTime::now_utc(),
    };

    sqlx::query("INSERT INTO users (id,username,email,password_hash,created_at) VALUES (?,?,?,?,?)")
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(db_pool)
        .await?;

    Ok(user)
}

pub async fn update_account(
    db_pool: &SqlitePool,
    id: Uuid,
    username: &str,
    email: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET username=?, email=? WHERE id=?")
        .bind(username)
        .bind(email)
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(())
}
