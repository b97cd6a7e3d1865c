pub mod messages;
pub mod rooms;
pub mod topics;
pub mod users;

use std::time::Duration;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub use messages::Message;
pub use rooms::{Participant, Room};
pub use topics::{Topic, TopicSummary};
pub use users::User;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
}

/// The form of a searchable column stored in its `*_folded` twin.
pub(crate) fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Turns free text into a `LIKE` pattern matching a folded column anywhere,
/// with the wildcard characters taken literally. Pair with `ESCAPE '\'`.
pub(crate) fn contains_pattern(q: &str) -> String {
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for c in fold(q).chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    // a single connection, otherwise every connection gets its own in-memory database
    let pool = create_pool("sqlite::memory:", 1).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}
