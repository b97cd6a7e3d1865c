use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use roomhub::{auth::Hasher, db, AppState};
use sqlx::SqlitePool;
use tower::ServiceExt;
use uuid::Uuid;

struct Page {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

/// One browser: remembers the session cookie between requests.
struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    fn new(app: &Router) -> Self {
        Browser { app: app.clone(), cookie: None }
    }

    async fn send(&mut self, request: axum::http::request::Builder, body: Body) -> Page {
        let request = match &self.cookie {
            Some(cookie) => request.header(header::COOKIE, cookie),
            None => request,
        };
        let response = self.app.clone().oneshot(request.body(body).unwrap()).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_owned();
            self.cookie = Some(pair);
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|l| l.to_str().unwrap().to_owned());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        Page { status, location, body: String::from_utf8(bytes.to_vec()).unwrap() }
    }

    async fn get(&mut self, uri: &str) -> Page {
        self.send(Request::get(uri), Body::empty()).await
    }

    async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> Page {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(request, Body::from(body)).await
    }

    async fn register(&mut self, username: &str) -> Page {
        self.post(
            "/register",
            &[("username", username), ("password1", "correct horse"), ("password2", "correct horse")],
        )
        .await
    }
}

async fn site() -> (Router, SqlitePool) {
    let db_pool = db::create_pool("sqlite::memory:", 1).await.unwrap();
    db::run_migrations(&db_pool).await.unwrap();

    let state = AppState { db_pool: db_pool.clone(), hasher: Hasher::new(4) };
    (roomhub::app(state, time::Duration::minutes(5)), db_pool)
}

async fn only_room(db_pool: &SqlitePool) -> Uuid {
    let (id,): (Uuid,) = sqlx::query_as("SELECT id FROM rooms").fetch_one(db_pool).await.unwrap();
    id
}

async fn user_id(db_pool: &SqlitePool, username: &str) -> Uuid {
    let (id,): (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(db_pool)
        .await
        .unwrap();
    id
}

async fn count(db_pool: &SqlitePool, table: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db_pool)
        .await
        .unwrap();
    n
}

async fn alice_with_room(app: &Router, db_pool: &SqlitePool) -> (Browser, Uuid) {
    let mut alice = Browser::new(app);
    alice.register("alice").await;
    let page = alice
        .post("/room/create", &[("topic", "Rust"), ("name", "Lifetimes"), ("description", "")])
        .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    let room_id = only_room(db_pool).await;
    (alice, room_id)
}

#[tokio::test]
async fn anonymous_update_is_sent_to_login() {
    let (app, db_pool) = site().await;
    let (_alice, room_id) = alice_with_room(&app, &db_pool).await;

    let mut anon = Browser::new(&app);
    let page = anon.get(&format!("/room/{room_id}/update")).await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(
        page.location.as_deref(),
        Some(format!("/login?return_url=%2Froom%2F{room_id}%2Fupdate").as_str())
    );

    let page = anon
        .post(&format!("/room/{room_id}/update"), &[("topic", "Go"), ("name", "Hijacked")])
        .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);

    let (name,): (String,) = sqlx::query_as("SELECT name FROM rooms").fetch_one(&db_pool).await.unwrap();
    assert_eq!(name, "Lifetimes");
}

/// Sends `browser` to `uri` while logged out, logs in through the offered
/// link and returns where the login sent it.
async fn login_round_trip(browser: &mut Browser, uri: &str) -> Option<String> {
    let page = browser.get(uri).await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    let location = page.location.unwrap();
    let return_url = location.strip_prefix("/login?return_url=").unwrap();
    let return_url = urlencoding::decode(return_url).unwrap();
    assert_eq!(return_url, uri);

    let page = browser
        .post("/login", &[("username", "alice"), ("password", "correct horse"), ("return_url", &return_url)])
        .await;
    page.location
}

#[tokio::test]
async fn login_returns_to_the_nested_page_asked_for() {
    let (app, db_pool) = site().await;
    let (mut alice, room_id) = alice_with_room(&app, &db_pool).await;
    alice.post(&format!("/room/{room_id}"), &[("body", "hello")]).await;
    let (message_id,): (Uuid,) = sqlx::query_as("SELECT id FROM messages").fetch_one(&db_pool).await.unwrap();

    for uri in [
        format!("/room/{room_id}/update"),
        "/room/create".to_owned(),
        format!("/message/{message_id}/update"),
        "/account/update".to_owned(),
    ] {
        alice.get("/logout").await;
        assert_eq!(login_round_trip(&mut alice, &uri).await, Some(uri.clone()));
        let page = alice.get(&uri).await;
        assert_eq!(page.status, StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn only_the_host_may_delete_a_room() {
    let (app, db_pool) = site().await;
    let (mut alice, room_id) = alice_with_room(&app, &db_pool).await;

    let mut bob = Browser::new(&app);
    bob.register("bob").await;

    let page = bob.get(&format!("/room/{room_id}/delete")).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body, "You are not allowed to delete this room.");

    let page = bob.post(&format!("/room/{room_id}/delete"), &[]).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body, "You are not allowed to delete this room.");
    assert_eq!(count(&db_pool, "rooms").await, 1);

    let page = alice.get(&format!("/room/{room_id}/delete")).await;
    assert!(page.body.contains(r#"Are you sure you want to delete "Lifetimes"?"#));
    assert_eq!(count(&db_pool, "rooms").await, 1);

    let page = alice.post(&format!("/room/{room_id}/delete"), &[]).await;
    assert_eq!(page.location.as_deref(), Some("/"));
    assert_eq!(count(&db_pool, "rooms").await, 0);
}

#[tokio::test]
async fn posting_joins_the_room() {
    let (app, db_pool) = site().await;
    let (_alice, room_id) = alice_with_room(&app, &db_pool).await;

    let mut bob = Browser::new(&app);
    bob.register("bob").await;
    let bob_id = user_id(&db_pool, "bob").await;

    let page = bob.post(&format!("/room/{room_id}"), &[("body", "hello")]).await;
    assert_eq!(page.location, Some(format!("/room/{room_id}")));

    let bodies: Vec<(String, Uuid)> = sqlx::query_as("SELECT body, user_id FROM messages")
        .fetch_all(&db_pool)
        .await
        .unwrap();
    assert_eq!(bodies, vec![("hello".to_owned(), bob_id)]);

    bob.post(&format!("/room/{room_id}"), &[("body", "again")]).await;
    assert_eq!(count(&db_pool, "room_participants").await, 1);

    let page = bob.get(&format!("/room/{room_id}")).await;
    assert!(page.body.contains("hello"));
    assert!(page.body.contains(&format!("/profile/{bob_id}")));
}

#[tokio::test]
async fn empty_message_posts_nothing() {
    let (app, db_pool) = site().await;
    let (mut alice, room_id) = alice_with_room(&app, &db_pool).await;

    let page = alice.post(&format!("/room/{room_id}"), &[("body", "   ")]).await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(count(&db_pool, "messages").await, 0);

    let page = alice.get(&format!("/room/{room_id}")).await;
    assert!(page.body.contains("Message body is required."));
}

#[tokio::test]
async fn anonymous_post_is_sent_to_login() {
    let (app, db_pool) = site().await;
    let (_alice, room_id) = alice_with_room(&app, &db_pool).await;

    let page = Browser::new(&app).post(&format!("/room/{room_id}"), &[("body", "hello")]).await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert!(page.location.unwrap().starts_with("/login?return_url="));
    assert_eq!(count(&db_pool, "messages").await, 0);
}

#[tokio::test]
async fn empty_search_lists_every_room() {
    let (app, db_pool) = site().await;
    let (mut alice, _) = alice_with_room(&app, &db_pool).await;
    alice
        .post("/room/create", &[("topic", "Python"), ("name", "Decorators"), ("description", "")])
        .await;

    let page = alice.get("/?q=").await;
    assert!(page.body.contains("2 rooms available"));
    assert!(page.body.contains("Lifetimes"));
    assert!(page.body.contains("Decorators"));

    let page = alice.get("/?q=pyth").await;
    assert!(page.body.contains("1 rooms available"));
    assert!(!page.body.contains("Lifetimes"));
}

#[tokio::test]
async fn invalid_room_form_is_shown_again() {
    let (app, db_pool) = site().await;
    let mut alice = Browser::new(&app);
    alice.register("alice").await;

    let page = alice.post("/room/create", &[("topic", "Rust"), ("name", "")]).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Name is required"));
    assert_eq!(count(&db_pool, "rooms").await, 0);
    assert_eq!(count(&db_pool, "topics").await, 0);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (app, _db_pool) = site().await;
    let mut anon = Browser::new(&app);

    let page = anon.get(&format!("/room/{}", Uuid::now_v7())).await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert!(page.body.contains("That room doesn't exist."));

    let page = anon.get(&format!("/profile/{}", Uuid::now_v7())).await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert!(page.body.contains("That user doesn't exist."));
}

#[tokio::test]
async fn login_reports_what_went_wrong() {
    let (app, _db_pool) = site().await;
    let mut alice = Browser::new(&app);
    alice.register("Alice").await;
    alice.get("/logout").await;

    let page = alice.post("/login", &[("username", "nobody"), ("password", "whatever")]).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("User does not exist"));
    assert!(page.body.contains("Username or password does not exist"));

    let page = alice.post("/login", &[("username", "alice"), ("password", "wrong horse")]).await;
    assert!(page.body.contains("Username or password does not exist"));
    assert!(!page.body.contains("User does not exist"));

    let page = alice
        .post(
            "/login",
            &[("username", "ALICE"), ("password", "correct horse"), ("return_url", "/room/create")],
        )
        .await;
    assert_eq!(page.location.as_deref(), Some("/room/create"));

    let page = alice.get("/room/create").await;
    assert_eq!(page.status, StatusCode::OK);
}

#[tokio::test]
async fn login_ignores_foreign_return_urls() {
    let (app, _db_pool) = site().await;
    let mut alice = Browser::new(&app);
    alice.register("alice").await;
    alice.get("/logout").await;

    let page = alice
        .post(
            "/login",
            &[("username", "alice"), ("password", "correct horse"), ("return_url", "//evil.example")],
        )
        .await;
    assert_eq!(page.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let (app, _db_pool) = site().await;
    let mut alice = Browser::new(&app);
    let page = alice.register("alice").await;
    assert_eq!(page.location.as_deref(), Some("/"));

    assert_eq!(alice.get("/room/create").await.status, StatusCode::OK);

    alice.get("/logout").await;
    let page = alice.get("/room/create").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn duplicate_registration_is_refused() {
    let (app, db_pool) = site().await;
    Browser::new(&app).register("alice").await;

    let page = Browser::new(&app).register("ALICE").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Correct error below to register!"));
    assert_eq!(count(&db_pool, "users").await, 1);
}

#[tokio::test]
async fn authors_edit_and_delete_their_messages() {
    let (app, db_pool) = site().await;
    let (mut alice, room_id) = alice_with_room(&app, &db_pool).await;
    alice.post(&format!("/room/{room_id}"), &[("body", "frist")]).await;
    let (message_id,): (Uuid,) = sqlx::query_as("SELECT id FROM messages").fetch_one(&db_pool).await.unwrap();

    let mut bob = Browser::new(&app);
    bob.register("bob").await;
    let page = bob.get(&format!("/message/{message_id}/update")).await;
    assert_eq!(page.body, "You are not allowed to edit this message.");
    let page = bob.post(&format!("/message/{message_id}/delete"), &[]).await;
    assert_eq!(page.body, "You are not allowed to delete this message.");
    assert_eq!(count(&db_pool, "messages").await, 1);

    let page = alice.post(&format!("/message/{message_id}/update"), &[("body", "first")]).await;
    assert_eq!(page.location, Some(format!("/room/{room_id}")));
    let page = alice.get(&format!("/room/{room_id}")).await;
    assert!(page.body.contains("Message updated successfully!"));
    assert!(page.body.contains("first"));

    let page = alice.post(&format!("/message/{message_id}/delete"), &[]).await;
    assert_eq!(page.location.as_deref(), Some("/"));
    assert_eq!(count(&db_pool, "messages").await, 0);
    assert_eq!(count(&db_pool, "rooms").await, 1);
}

#[tokio::test]
async fn account_update_renames_the_user() {
    let (app, db_pool) = site().await;
    let mut alice = Browser::new(&app);
    alice.register("alice").await;
    Browser::new(&app).register("bob").await;
    let alice_id = user_id(&db_pool, "alice").await;

    let page = alice.post("/account/update", &[("username", "bob"), ("email", "")]).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(user_id(&db_pool, "alice").await, alice_id);

    let page = alice
        .post("/account/update", &[("username", "Alicia"), ("email", "alicia@example.com")])
        .await;
    assert_eq!(page.location, Some(format!("/profile/{alice_id}")));
    assert_eq!(user_id(&db_pool, "alicia").await, alice_id);
}

#[tokio::test]
async fn topics_and_activity_pages() {
    let (app, db_pool) = site().await;
    let (mut alice, room_id) = alice_with_room(&app, &db_pool).await;
    alice.post(&format!("/room/{room_id}"), &[("body", "borrowck is my friend")]).await;

    let page = alice.get("/topics?q=ru").await;
    assert!(page.body.contains("Rust"));
    let page = alice.get("/topics?q=python").await;
    assert!(!page.body.contains("Rust"));

    let page = Browser::new(&app).get("/activity").await;
    assert!(page.body.contains("borrowck is my friend"));
}
