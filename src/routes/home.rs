use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extractors::{IncomingFlash, MaybeUser};
use crate::flash::{self, Flash};
use crate::state::AppState;

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// Render a page, clearing the one-shot notice cookie when this render
/// consumed one.
pub fn page<T: Template>(template: T, clear_flash: bool) -> Response {
    if clear_flash {
        (
            AppendHeaders([(header::SET_COOKIE, flash::clear_cookie())]),
            Html(template),
        )
            .into_response()
    } else {
        Html(template).into_response()
    }
}

pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub snippet: String,
    pub author: String,
    pub timestamp: String,
    pub is_author: bool,
}

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub posts: Vec<PostSummary>,
    pub search_query: Option<String>,
    pub user_email: Option<String>,
    pub flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate {
    pub user_email: Option<String>,
    pub flash: Option<Flash>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// The public homepage: all posts newest first, optionally filtered by a
/// free-text search over title and content.
pub async fn index(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<SearchParams>,
    IncomingFlash(incoming): IncomingFlash,
) -> AppResult<Response> {
    let query = params.q.as_deref().filter(|q| !q.is_empty());
    let posts = state.posts.list_all()?;
    let viewer = user.as_ref().map(|u| u.email.as_str());

    let mut summaries = Vec::new();
    for post in &posts {
        if let Some(q) = query {
            if !matches_query(&post.title, &post.content, q) {
                continue;
            }
        }
        summaries.push(PostSummary {
            id: post.id.clone(),
            title: post.title.clone(),
            snippet: snippet(&post.content),
            author: post.author.clone(),
            timestamp: post.created_display(),
            is_author: viewer == Some(post.author.as_str()),
        });
    }

    let had_incoming = incoming.is_some();
    let flash = match query {
        Some(q) if summaries.is_empty() => Some(Flash::new(
            "info",
            format!("No posts found matching '{}'.", q),
        )),
        Some(q) => Some(Flash::new("info", format!("Showing results for: '{}'", q))),
        None => incoming,
    };

    let template = IndexTemplate {
        posts: summaries,
        search_query: query.map(str::to_string),
        user_email: user.map(|u| u.email),
        flash,
    };
    Ok(page(template, had_incoming))
}

/// Fallback for unmatched routes. Distinct from the post-not-found flow,
/// which redirects to the listing instead.
pub async fn not_found(
    MaybeUser(user): MaybeUser,
    IncomingFlash(incoming): IncomingFlash,
) -> Response {
    let had_incoming = incoming.is_some();
    let template = NotFoundTemplate {
        user_email: user.map(|u| u.email),
        flash: incoming,
    };
    let mut response = page(template, had_incoming);
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

/// First 150 characters of the content, ellipsis-truncated when longer.
fn snippet(content: &str) -> String {
    let mut chars = content.char_indices();
    match chars.nth(150) {
        None => content.to_string(),
        Some((byte_offset, _)) => format!("{}...", &content[..byte_offset]),
    }
}

fn matches_query(title: &str, content: &str, query: &str) -> bool {
    let q = query.to_lowercase();
    title.to_lowercase().contains(&q) || content.to_lowercase().contains(&q)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_verbatim() {
        assert_eq!(snippet("hello"), "hello");
        let exactly_150: String = "x".repeat(150);
        assert_eq!(snippet(&exactly_150), exactly_150);
    }

    #[test]
    fn long_content_is_truncated_with_ellipsis() {
        let long: String = "x".repeat(151);
        let s = snippet(&long);
        assert_eq!(s.chars().count(), 153);
        assert!(s.ends_with("..."));
        assert!(s.starts_with("xxx"));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let long: String = "é".repeat(200);
        let s = snippet(&long);
        assert_eq!(s.chars().count(), 153);
        assert!(s.ends_with("..."));
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_content() {
        assert!(matches_query("Hello World", "body", "hello"));
        assert!(matches_query("title", "Some BODY text", "body"));
        assert!(matches_query("title", "body", "OD"));
        assert!(!matches_query("title", "body", "absent"));
    }
}
