use axum::{
    extract::rejection::FormRejection,
    response::{IntoResponse, Response},
};
use granthika_core::error::{DomainError, ErrorKind};
use granthika_shared::types::FlashMessage;
use thiserror::Error;

use crate::flash;
use crate::routes::paths;

#[derive(Error, Debug)]
pub enum ApiError {
    /// No usable session; answered with a redirect to sign-in.
    #[error("Unauthorized")]
    Unauthorized,

    /// A message for the user, shown on the page at `location`.
    #[error("Flash to {location}: {message:?}")]
    Flash {
        location: &'static str,
        message: FlashMessage,
    },
}

impl ApiError {
    pub fn flash(location: &'static str, message: FlashMessage) -> Self {
        ApiError::Flash { location, message }
    }

    /// Maps a service failure onto the page the user came from. Missing
    /// records send the user back to sign-in, and internal failures never
    /// show their details.
    pub fn from_domain(err: DomainError, back_to: &'static str) -> Self {
        match err.kind() {
            ErrorKind::Validation | ErrorKind::Duplicate | ErrorKind::Unauthorized => {
                tracing::warn!("Request rejected: {}", err);
                ApiError::flash(back_to, FlashMessage::error(err.user_message()))
            }
            ErrorKind::NotFound => {
                tracing::warn!("Record missing: {}", err);
                ApiError::flash(paths::SIGN_IN, FlashMessage::error(err.user_message()))
            }
            ErrorKind::Internal => {
                tracing::error!("Request failed: {}", err);
                ApiError::flash(back_to, FlashMessage::error(err.user_message()))
            }
        }
    }

    /// A form body that could not be decoded goes back to its page.
    pub fn from_form_rejection(rejection: FormRejection, back_to: &'static str) -> Self {
        tracing::warn!("Unreadable form for {}: {}", back_to, rejection.body_text());
        ApiError::flash(
            back_to,
            FlashMessage::error("The form could not be read. Please try again."),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => flash::redirect_one(
                paths::SIGN_IN,
                FlashMessage::warning("Please sign in to continue."),
            )
            .into_response(),
            ApiError::Flash { location, message } => {
                flash::redirect_one(location, message).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};

    fn location(err: ApiError) -> String {
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        response.headers()[header::LOCATION].to_str().unwrap().to_string()
    }

    #[test]
    fn test_duplicate_returns_to_form() {
        let err = ApiError::from_domain(
            DomainError::EmailAlreadyExists("a@b.in".into()),
            paths::SIGN_UP,
        );
        assert_eq!(
            location(err),
            "/accounts/sign_up?level=error&message=Email+already+exists."
        );
    }

    #[test]
    fn test_not_found_goes_to_sign_in() {
        let err = ApiError::from_domain(DomainError::LibraryNotFound, paths::SETTINGS);
        assert!(location(err).starts_with("/accounts/sign_in?level=error"));
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = ApiError::from_domain(
            DomainError::DatabaseError("connection refused".into()),
            paths::SIGN_UP,
        );
        let target = location(err);
        assert!(target.ends_with("message=Something+went+wrong."));
        assert!(!target.contains("connection"));
    }

    #[test]
    fn test_unauthorized_redirects_to_sign_in() {
        assert!(location(ApiError::Unauthorized).starts_with("/accounts/sign_in?level=warning"));
    }
}
