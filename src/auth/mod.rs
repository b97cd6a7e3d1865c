mod login;
mod logout;
mod password;
mod register;

use axum::{routing::get, Router};
use sqlx::SqlitePool;

use crate::{db::{self, User}, forms::RegisterForm, AppResult, AppState};

pub use password::Hasher;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login::login_page).post(login::login))
        .route("/logout", get(logout::logout))
        .route("/register", get(register::register_page).post(register::register))
}

#[derive(Debug)]
pub enum Login {
    Success(User),
    UnknownUser,
    WrongPassword,
}

/// `username` is expected lowercase already.
pub async fn authenticate(
    db_pool: &SqlitePool,
    hasher: &Hasher,
    username: &str,
    password: &str,
) -> AppResult<Login> {
    let Some(user) = db::users::get_by_username(db_pool, username).await? else {
        return Ok(Login::UnknownUser);
    };

    if hasher.verify(password, &user.password_hash).await? {
        Ok(Login::Success(user))
    } else {
        Ok(Login::WrongPassword)
    }
}

/// Creates the account, or says what is wrong with the submission.
pub async fn create_account(
    db_pool: &SqlitePool,
    hasher: &Hasher,
    form: &RegisterForm,
) -> AppResult<Result<User, Vec<String>>> {
    const TAKEN: &str = "A user with that username already exists.";

    let mut problems = form.problems();
    if problems.is_empty() && db::users::username_taken(db_pool, &form.username, None).await? {
        problems.push(TAKEN.to_owned());
    }
    if !problems.is_empty() {
        return Ok(Err(problems));
    }

    let password_hash = hasher.hash(&form.password1).await?;
    match db::users::create(db_pool, &form.username, &password_hash).await {
        Ok(user) => {
            tracing::info!("registered @{}", user.username);
            Ok(Ok(user))
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(Err(vec![TAKEN.to_owned()])),
        Err(e) => Err(e.into()),
    }
}
