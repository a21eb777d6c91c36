use askama::Template;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extractors::{CurrentUser, IncomingFlash, MaybeUser};
use crate::flash::{self, Flash};
use crate::markup;
use crate::routes::home::page;
use crate::state::AppState;
use crate::store::{NewPost, PostPatch};

// -- Templates --

#[derive(Template)]
#[template(path = "pages/new_post.html")]
pub struct NewPostTemplate {
    pub title: String,
    pub content: String,
    pub user_email: Option<String>,
    pub flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "pages/edit_post.html")]
pub struct EditPostTemplate {
    pub id: String,
    pub title: String,
    pub content: String,
    pub user_email: Option<String>,
    pub flash: Option<Flash>,
}

pub struct PostView {
    pub id: String,
    pub title: String,
    pub content_html: String,
    pub author: String,
    pub created: String,
    pub updated: Option<String>,
    pub is_author: bool,
}

#[derive(Template)]
#[template(path = "pages/view_post.html")]
pub struct ViewPostTemplate {
    pub post: PostView,
    pub user_email: Option<String>,
    pub flash: Option<Flash>,
}

#[derive(Deserialize)]
pub struct PostForm {
    pub title: String,
    pub content: String,
}

// -- Create --

pub async fn new_post_page(user: CurrentUser, IncomingFlash(flash): IncomingFlash) -> Response {
    let had_flash = flash.is_some();
    page(
        NewPostTemplate {
            title: String::new(),
            content: String::new(),
            user_email: Some(user.email),
            flash,
        },
        had_flash,
    )
}

pub async fn new_post_submit(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    if form.title.is_empty() || form.content.is_empty() {
        return Ok(page(
            NewPostTemplate {
                title: form.title,
                content: form.content,
                user_email: Some(user.email),
                flash: Some(Flash::new("warning", "Title and content cannot be empty.")),
            },
            false,
        ));
    }

    state.posts.create(NewPost {
        title: form.title,
        content: form.content,
        author: user.email,
    })?;

    Ok(flash::redirect(
        "/",
        "success",
        "Your post has been published.",
    ))
}

// -- View --

pub async fn view_post(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
    IncomingFlash(flash): IncomingFlash,
) -> AppResult<Response> {
    let Some(post) = state.posts.get(&id)? else {
        return Ok(flash::redirect("/", "danger", "Post not found."));
    };

    let viewer = user.as_ref().map(|u| u.email.as_str());
    let content_html = markup::render(&post.content);
    let view = PostView {
        is_author: viewer == Some(post.author.as_str()),
        created: post.created_display(),
        updated: post.updated_display(),
        id: post.id,
        title: post.title,
        content_html,
        author: post.author,
    };

    let had_flash = flash.is_some();
    Ok(page(
        ViewPostTemplate {
            post: view,
            user_email: user.map(|u| u.email),
            flash,
        },
        had_flash,
    ))
}

// -- Edit --

pub async fn edit_post_page(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    IncomingFlash(flash): IncomingFlash,
) -> AppResult<Response> {
    let Some(post) = state.posts.get(&id)? else {
        return Ok(flash::redirect("/", "danger", "Post not found."));
    };

    if post.author != user.email {
        return Ok(flash::redirect(
            &format!("/post/{}", id),
            "danger",
            "You can only edit your own posts.",
        ));
    }

    let had_flash = flash.is_some();
    Ok(page(
        EditPostTemplate {
            id: post.id,
            title: post.title,
            content: post.content,
            user_email: Some(user.email),
            flash,
        },
        had_flash,
    ))
}

pub async fn edit_post_submit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let Some(post) = state.posts.get(&id)? else {
        return Ok(flash::redirect("/", "danger", "Post not found."));
    };

    if post.author != user.email {
        return Ok(flash::redirect(
            &format!("/post/{}", id),
            "danger",
            "You can only edit your own posts.",
        ));
    }

    if form.title.is_empty() || form.content.is_empty() {
        return Ok(page(
            EditPostTemplate {
                id: post.id,
                title: form.title,
                content: form.content,
                user_email: Some(user.email),
                flash: Some(Flash::new("warning", "Title and content cannot be empty.")),
            },
            false,
        ));
    }

    state.posts.update(
        &id,
        PostPatch {
            title: form.title,
            content: form.content,
        },
    )?;

    Ok(flash::redirect(
        &format!("/post/{}", id),
        "success",
        "Post updated successfully.",
    ))
}

// -- Delete --

/// POST-only: deleting via GET is rejected by the router's method
/// constraint.
pub async fn delete_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Some(post) = state.posts.get(&id)? else {
        return Ok(flash::redirect("/", "danger", "Post not found."));
    };

    if post.author != user.email {
        return Ok(flash::redirect(
            &format!("/post/{}", id),
            "danger",
            "You can only delete your own posts.",
        ));
    }

    state.posts.delete(&id)?;

    Ok(flash::redirect("/", "info", "Post deleted successfully."))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new_post", get(new_post_page).post(new_post_submit))
        .route("/post/{id}", get(view_post))
        .route("/edit_post/{id}", get(edit_post_page).post(edit_post_submit))
        .route("/delete_post/{id}", post(delete_post))
}
