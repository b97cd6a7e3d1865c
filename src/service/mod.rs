//! Room and message queries and the ownership rules around them.
//!
//! Every operation takes the acting user explicitly; nothing here reads the
//! session. Refusals on ownership come back as [`Gate::Denied`], missing rows
//! as [`AppError::NotFound`](crate::AppError::NotFound).

pub mod messages;
pub mod rooms;

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db::{self, Message, Room, TopicSummary, User},
    AppError, AppResult,
};

pub use messages::*;
pub use rooms::*;

/// How many topics the home page lists.
pub const HOME_TOPICS: i64 = 5;

/// Outcome of an owner-only operation.
#[derive(Debug, PartialEq)]
pub enum Gate<T> {
    Allowed(T),
    Denied,
}

pub struct Home {
    pub rooms: Vec<Room>,
    pub room_count: usize,
    pub topics: Vec<TopicSummary>,
    pub messages: Vec<Message>,
}

/// Rooms matching `q` on topic, name or description, a few topics, and the
/// messages posted under topics matching `q`. An empty `q` matches everything.
pub async fn home(db_pool: &SqlitePool, q: &str) -> AppResult<Home> {
    let rooms = db::rooms::search(db_pool, q).await?;
    let topics = db::topics::first(db_pool, HOME_TOPICS).await?;
    let messages = db::messages::in_topics_matching(db_pool, q).await?;

    Ok(Home {
        room_count: rooms.len(),
        rooms,
        topics,
        messages,
    })
}

pub struct Profile {
    pub user: User,
    pub rooms: Vec<Room>,
    pub messages: Vec<Message>,
    pub topics: Vec<TopicSummary>,
}

/// Topics are the global list, not just the ones this user touched.
pub async fn profile(db_pool: &SqlitePool, user_id: Uuid) -> AppResult<Profile> {
    let user = db::users::get(db_pool, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    Ok(Profile {
        rooms: db::rooms::hosted_by(db_pool, user.id).await?,
        messages: db::messages::by_user(db_pool, user.id).await?,
        topics: db::topics::all(db_pool).await?,
        user,
    })
}

pub async fn activity(db_pool: &SqlitePool) -> AppResult<Vec<Message>> {
    Ok(db::messages::all(db_pool).await?)
}

pub async fn topics(db_pool: &SqlitePool, q: &str) -> AppResult<Vec<TopicSummary>> {
    Ok(db::topics::search(db_pool, q).await?)
}
