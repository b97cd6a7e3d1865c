use axum::{
    debug_handler,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use sqlx::SqlitePool;

use crate::{
    db::TopicSummary,
    include_res,
    index::SearchQuery,
    res::{self, esc},
    rooms, service,
    session::Viewer,
    AppResult,
};

pub fn topic_to_html(topic: &TopicSummary) -> String {
    res::fill(
        include_res!(str, "/pages/topic_item.html"),
        &[
            ("q", &esc(&urlencoding::encode(&topic.name))),
            ("name", &esc(&topic.name)),
            ("room_count", &topic.room_count.to_string()),
        ],
    )
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn topics(
    State(db_pool): State<SqlitePool>,
    viewer: Viewer,
    Query(SearchQuery { q }): Query<SearchQuery>,
) -> AppResult<Response> {
    let q = q.unwrap_or_default();
    let topics: String = service::topics(&db_pool, &q).await?.iter().map(topic_to_html).collect();

    let content = res::fill(
        include_res!(str, "/pages/topics.html"),
        &[("q", &esc(&q)), ("topics", &topics)],
    );
    Ok(viewer.render("Topics", &content).await?.into_response())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn activity(
    State(db_pool): State<SqlitePool>,
    viewer: Viewer,
) -> AppResult<Response> {
    let messages: String = service::activity(&db_pool)
        .await?
        .iter()
        .map(|m| rooms::feed_to_html(m, viewer.user.as_ref()))
        .collect();

    let content = res::fill(include_res!(str, "/pages/activity.html"), &[("messages", &messages)]);
    Ok(viewer.render("Activity", &content).await?.into_response())
}
