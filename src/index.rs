use axum::{
    debug_handler,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    browse, include_res,
    res,
    rooms, service,
    session::Viewer,
    AppResult,
};

/// `?q=`; absent means the empty query, which matches everything.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    pub(crate) q: Option<String>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn index(
    State(db_pool): State<SqlitePool>,
    viewer: Viewer,
    Query(SearchQuery { q }): Query<SearchQuery>,
) -> AppResult<Response> {
    let q = q.unwrap_or_default();
    let home = service::home(&db_pool, &q).await?;
    let user = viewer.user.as_ref();

    let content = res::fill(
        include_res!(str, "/pages/home.html"),
        &[
            ("topics", &home.topics.iter().map(browse::topic_to_html).collect::<String>()),
            ("room_count", &home.room_count.to_string()),
            ("rooms", &home.rooms.iter().map(rooms::room_to_html).collect::<String>()),
            ("messages", &home.messages.iter().map(|m| rooms::feed_to_html(m, user)).collect::<String>()),
        ],
    );

    let title = if q.is_empty() { "Home".to_owned() } else { format!("Search: {q}") };
    Ok(viewer.render(&title, &content).await?.into_response())
}
