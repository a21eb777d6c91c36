use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::state::AppState;

/// Represents the currently authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub uid: String,
    pub email: String,
    pub session_token: String,
}

/// Extractor that requires authentication.
///
/// When no valid session is found the request is redirected to the login
/// page with a warning notice, carrying the original path so login can send
/// the user back afterwards.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let next = parts.uri.path().to_string();

        let token = match cookie_value(parts, &state.config.auth.cookie_name) {
            Some(token) => token.to_string(),
            None => return Err(AppError::AuthRequired(next)),
        };

        let uid = match state.sessions.get(&token)? {
            Some(uid) => uid,
            None => return Err(AppError::AuthRequired(next)),
        };

        // The account may have been deleted since the session was created
        let identity = match state.identity.get_by_uid(&uid) {
            Ok(identity) => identity,
            Err(_) => return Err(AppError::AuthRequired(next)),
        };

        Ok(CurrentUser {
            uid: identity.id,
            email: identity.email,
            session_token: token,
        })
    }
}

/// Optional user extractor — returns None instead of redirecting when not
/// authenticated. Used by public pages that adapt their rendering to the
/// viewer (navigation, `is_author` flags).
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(_) => Ok(MaybeUser(None)),
        }
    }
}

/// The pending one-shot notice, if a redirect left one behind.
pub struct IncomingFlash(pub Option<Flash>);

impl<S: Send + Sync> FromRequestParts<S> for IncomingFlash {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Infallible> {
        let flash = cookie_value(parts, flash::FLASH_COOKIE).and_then(flash::parse);
        Ok(IncomingFlash(flash))
    }
}

pub(crate) fn cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_cookie(cookie: &str) -> Parts {
        let (parts, _) = Request::builder()
            .uri("/")
            .header(header::COOKIE, cookie)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn cookie_value_finds_named_cookie() {
        let parts = parts_with_cookie("a=1; quill_session=tok123; b=2");
        assert_eq!(cookie_value(&parts, "quill_session"), Some("tok123"));
    }

    #[test]
    fn cookie_value_missing_is_none() {
        let parts = parts_with_cookie("a=1; b=2");
        assert_eq!(cookie_value(&parts, "quill_session"), None);
    }

    #[test]
    fn incoming_flash_decodes_pending_notice() {
        let flash = Flash::new("info", "You have been logged out.");
        let set = flash::set_cookie(&flash);
        let pair = set.split(';').next().unwrap();
        let mut parts = parts_with_cookie(pair);

        let IncomingFlash(got) =
            tokio_test::block_on(IncomingFlash::from_request_parts(&mut parts, &())).unwrap();
        let got = got.unwrap();
        assert_eq!(got.category, "info");
        assert_eq!(got.message, "You have been logged out.");
    }

    #[test]
    fn incoming_flash_absent_is_none() {
        let mut parts = parts_with_cookie("a=1");
        let IncomingFlash(got) =
            tokio_test::block_on(IncomingFlash::from_request_parts(&mut parts, &())).unwrap();
        assert!(got.is_none());
    }
}
