//! One-shot notice cookies.
//!
//! A notice set alongside a redirect survives exactly one render: the page
//! that displays it also sends the clearing Set-Cookie. The cookie value is
//! `category:message`, percent-encoded to stay within RFC 6265.

use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};

pub const FLASH_COOKIE: &str = "quill_flash";

#[derive(Debug, Clone)]
pub struct Flash {
    pub category: String,
    pub message: String,
}

impl Flash {
    pub fn new(category: &str, message: impl Into<String>) -> Self {
        Self {
            category: category.to_string(),
            message: message.into(),
        }
    }
}

/// Set-Cookie value carrying a notice across a redirect.
pub fn set_cookie(flash: &Flash) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age=60",
        FLASH_COOKIE,
        urlencoding::encode(&format!("{}:{}", flash.category, flash.message))
    )
}

pub fn clear_cookie() -> String {
    format!(
        "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0",
        FLASH_COOKIE
    )
}

/// Decode a flash cookie value written by [`set_cookie`].
pub fn parse(value: &str) -> Option<Flash> {
    let decoded = urlencoding::decode(value).ok()?;
    let (category, message) = decoded.split_once(':')?;
    if category.is_empty() {
        return None;
    }
    Some(Flash::new(category, message))
}

/// Redirect with a notice attached.
pub fn redirect(to: &str, category: &str, message: &str) -> Response {
    (
        [(header::SET_COOKIE, set_cookie(&Flash::new(category, message)))],
        Redirect::to(to),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn cookie_value_round_trips() {
        let flash = Flash::new("info", "Showing results for: 'hello world'");
        let cookie = set_cookie(&flash);
        let value = cookie
            .strip_prefix("quill_flash=")
            .unwrap()
            .split(';')
            .next()
            .unwrap();
        let parsed = parse(value).unwrap();
        assert_eq!(parsed.category, "info");
        assert_eq!(parsed.message, "Showing results for: 'hello world'");
    }

    #[test]
    fn message_may_contain_colons() {
        let flash = Flash::new("danger", "Error: something: nested");
        let cookie = set_cookie(&flash);
        let value = cookie
            .strip_prefix("quill_flash=")
            .unwrap()
            .split(';')
            .next()
            .unwrap();
        let parsed = parse(value).unwrap();
        assert_eq!(parsed.message, "Error: something: nested");
    }

    #[test]
    fn garbage_does_not_parse() {
        assert!(parse("no-separator").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn redirect_sets_cookie_and_303() {
        let response = redirect("/login", "success", "Account created");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/login");
        let cookie = response.headers().get("set-cookie").unwrap();
        assert!(cookie.to_str().unwrap().starts_with("quill_flash="));
    }
}
