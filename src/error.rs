use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

use crate::flash::{self, Flash};
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
#[allow(dead_code)]
pub enum AppError {
    /// A route that requires a login was hit without one. Carries the
    /// original path so login can send the user back afterwards.
    #[error("authentication required")]
    AuthRequired(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::AuthRequired(next) => {
                let to = format!("/login?next={}", urlencoding::encode(&next));
                (
                    [(
                        header::SET_COOKIE,
                        flash::set_cookie(&Flash::new(
                            "warning",
                            "Please log in to access this page.",
                        )),
                    )],
                    Redirect::to(&to),
                )
                    .into_response()
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_string(),
                )
                    .into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_string(),
                )
                    .into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn store_error_returns_500_with_generic_body() {
        let err = AppError::Store(StoreError::Database(
            rusqlite::Error::InvalidQuery,
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_returns_500() {
        let response = AppError::Internal("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_required_redirects_to_login_with_next() {
        let response = AppError::AuthRequired("/new_post".into()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/login?next=%2Fnew_post"
        );
        let cookie = response.headers().get("set-cookie").unwrap();
        assert!(cookie.to_str().unwrap().starts_with("quill_flash="));
    }
}
