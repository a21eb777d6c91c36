use askama::Template;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::IdentityError;
use crate::error::AppResult;
use crate::extractors::{CurrentUser, IncomingFlash, MaybeUser};
use crate::flash::{self, Flash};
use crate::routes::home::page;
use crate::state::AppState;

// -- Templates --

#[derive(Template)]
#[template(path = "pages/signup.html")]
pub struct SignupTemplate {
    pub user_email: Option<String>,
    pub flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub next: Option<String>,
    pub user_email: Option<String>,
    pub flash: Option<Flash>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct NextParams {
    pub next: Option<String>,
}

// -- Cookie helpers --

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

/// Only resume to a local path; anything else falls back to the listing.
fn resume_target(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

// -- Signup --

pub async fn signup_page(
    MaybeUser(user): MaybeUser,
    IncomingFlash(flash): IncomingFlash,
) -> Response {
    if user.is_some() {
        return flash::redirect("/", "info", "You are already logged in.");
    }
    let had_flash = flash.is_some();
    page(
        SignupTemplate {
            user_email: None,
            flash,
        },
        had_flash,
    )
}

pub async fn signup_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<SignupForm>,
) -> Response {
    if user.is_some() {
        return flash::redirect("/", "info", "You are already logged in.");
    }

    let redisplay = |message: String| {
        page(
            SignupTemplate {
                user_email: None,
                flash: Some(Flash::new("danger", message)),
            },
            false,
        )
    };

    if form.email.is_empty() || form.password.is_empty() {
        return redisplay("Email and password cannot be empty.".to_string());
    }
    if form.password.chars().count() < 6 {
        return redisplay("Password must be at least 6 characters long.".to_string());
    }

    match state.identity.create_account(&form.email, &form.password) {
        Ok(_) => flash::redirect(
            "/login",
            "success",
            "Account created successfully. Please log in.",
        ),
        Err(IdentityError::EmailExists) => redisplay(
            "This email is already registered. Try logging in or use a different email."
                .to_string(),
        ),
        Err(IdentityError::InvalidEmail) => {
            redisplay("The email address is not valid.".to_string())
        }
        Err(e) => {
            tracing::error!("Error creating account: {}", e);
            redisplay(format!("Error creating account: {}", e))
        }
    }
}

// -- Login --

pub async fn login_page(
    MaybeUser(user): MaybeUser,
    Query(params): Query<NextParams>,
    IncomingFlash(flash): IncomingFlash,
) -> Response {
    if user.is_some() {
        return flash::redirect("/", "info", "You are already logged in.");
    }
    let had_flash = flash.is_some();
    page(
        LoginTemplate {
            next: params.next.filter(|n| !n.is_empty()),
            user_email: None,
            flash,
        },
        had_flash,
    )
}

pub async fn login_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(flash::redirect("/", "info", "You are already logged in."));
    }

    let redisplay = |message: String| {
        page(
            LoginTemplate {
                next: form.next.clone().filter(|n| !n.is_empty()),
                user_email: None,
                flash: Some(Flash::new("danger", message)),
            },
            false,
        )
    };

    if form.email.is_empty() || form.password.is_empty() {
        return Ok(redisplay("Email and password cannot be empty.".to_string()));
    }

    match state.identity.authenticate(&form.email, &form.password) {
        Ok(identity) => {
            let token = state
                .sessions
                .create(&identity.id, state.config.auth.session_hours)?;
            let to = resume_target(form.next.as_deref()).to_string();
            Ok((
                AppendHeaders([
                    (
                        header::SET_COOKIE,
                        session_cookie(
                            &state.config.auth.cookie_name,
                            &token,
                            state.config.auth.session_hours,
                        ),
                    ),
                    (
                        header::SET_COOKIE,
                        flash::set_cookie(&Flash::new(
                            "success",
                            "Logged in successfully. Welcome back.",
                        )),
                    ),
                ]),
                Redirect::to(&to),
            )
                .into_response())
        }
        // One message for all credential failures so account existence
        // is not leaked
        Err(
            IdentityError::NotFound | IdentityError::InvalidEmail | IdentityError::BadCredentials,
        ) => Ok(redisplay("Invalid email or password.".to_string())),
        Err(e) => {
            tracing::error!("Login error: {}", e);
            Ok(redisplay(format!(
                "An unexpected error occurred during login: {}",
                e
            )))
        }
    }
}

// -- Logout --

pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    state.sessions.delete(&user.session_token)?;
    Ok((
        AppendHeaders([
            (
                header::SET_COOKIE,
                clear_session_cookie(&state.config.auth.cookie_name),
            ),
            (
                header::SET_COOKIE,
                flash::set_cookie(&Flash::new("info", "You have been logged out.")),
            ),
        ]),
        Redirect::to("/"),
    )
        .into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", get(signup_page).post(signup_submit))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_target_accepts_local_paths_only() {
        assert_eq!(resume_target(Some("/new_post")), "/new_post");
        assert_eq!(resume_target(Some("/edit_post/abc")), "/edit_post/abc");
        assert_eq!(resume_target(Some("https://evil.example")), "/");
        assert_eq!(resume_target(Some("//evil.example")), "/");
        assert_eq!(resume_target(Some("")), "/");
        assert_eq!(resume_target(None), "/");
    }

    #[test]
    fn session_cookie_carries_max_age_in_seconds() {
        let cookie = session_cookie("quill_session", "tok", 2);
        assert_eq!(
            cookie,
            "quill_session=tok; HttpOnly; SameSite=Strict; Path=/; Max-Age=7200"
        );
    }

    #[test]
    fn clear_session_cookie_expires_immediately() {
        let cookie = clear_session_cookie("quill_session");
        assert!(cookie.contains("Max-Age=0"));
    }
}
