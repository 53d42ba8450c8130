// ============================================================================
// Granthika API - Account Handlers
// File: crates/granthika-api/src/handlers/auth.rs
// ============================================================================
//! Sign in, sign up, logout and forgotten passwords.
//!
//! Form posts answer with a 303 redirect carrying flash messages; the GET
//! routes return the flash messages for the page to render.

use axum::{
    extract::{rejection::FormRejection, RawQuery, State},
    http::header,
    response::{IntoResponse, Response},
    Form, Json,
};
use granthika_core::domain::decode_toggle;
use granthika_shared::types::FlashMessage;
use granthika_shared::utils::mask_email;
use tracing::{error, info, warn};

use crate::dto::{ForgetPasswordForm, SignInForm, SignUpForm};
use crate::error::ApiError;
use crate::flash;
use crate::middleware::{clear_session_cookie, session_cookie};
use crate::response::ApiResponse;
use crate::routes::paths;
use crate::state::AppState;

const UNNAMED_LIBRARY: &str = "Library";

/// GET on any of the account form pages.
pub async fn form_page(RawQuery(query): RawQuery) -> Json<ApiResponse<()>> {
    Json(ApiResponse::success(()).with_messages(flash::messages_from_query(query.as_deref())))
}

/// POST /accounts/sign_in
pub async fn sign_in(
    State(state): State<AppState>,
    form: Result<Form<SignInForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::from_form_rejection(e, paths::SIGN_IN))?;
    let remember = decode_toggle(form.remember_me.as_deref());
    let result = state
        .auth
        .sign_in(&form.username, &form.password, remember)
        .await
        .map_err(|e| ApiError::from_domain(e, paths::SIGN_IN))?;

    if result.first_login {
        // The welcome mail must not hold up the redirect.
        let identity = result.identity.clone();
        let registration = state.registration.clone();
        let notifications = state.notifications.clone();
        tokio::spawn(async move {
            let library_name = match registration.find_by_identity(&identity.id).await {
                Ok(library) => library.library_name,
                Err(_) => UNNAMED_LIBRARY.to_string(),
            };
            notifications.send_welcome(&identity, &library_name).await;
        });
    }

    let cookie = session_cookie(&result.token, result.max_age, state.secure_cookies);
    let redirect = flash::redirect_one(
        paths::DASHBOARD,
        FlashMessage::success(format!("Welcome, {}.", result.identity.display_name())),
    );
    Ok(([(header::SET_COOKIE, cookie)], redirect).into_response())
}

/// POST /accounts/logout
pub async fn logout(State(state): State<AppState>) -> Response {
    let redirect = flash::redirect_one(paths::SIGN_IN, FlashMessage::success("Logged out successfully."));
    ([(header::SET_COOKIE, clear_session_cookie(state.secure_cookies))], redirect).into_response()
}

/// POST /accounts/sign_up
pub async fn sign_up(
    State(state): State<AppState>,
    form: Result<Form<SignUpForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::from_form_rejection(e, paths::SIGN_UP))?;
    let password = form.admin_password.clone();
    let request = form.into_request().ok_or_else(|| {
        ApiError::flash(paths::SIGN_UP, FlashMessage::error("Select a valid institute type."))
    })?;

    let registration = state
        .registration
        .register(request)
        .await
        .map_err(|e| ApiError::from_domain(e, paths::SIGN_UP))?;

    let username = &registration.identity.username;
    let sent = state
        .notifications
        .send_credentials(&registration.identity, &registration.library, &password)
        .await;

    let message = if sent {
        FlashMessage::success(format!(
            "Library registered. Your username is {}. Credentials have been sent to {}.",
            username, registration.identity.email
        ))
    } else {
        warn!(
            "Credentials email for {} not delivered",
            mask_email(&registration.identity.email)
        );
        FlashMessage::warning(format!(
            "Library registered. Your username is {}, but the credentials email could not be sent.",
            username
        ))
    };

    info!(
        "Sign-up complete for library {} ({})",
        registration.library.library_code, username
    );
    Ok(flash::redirect_one(paths::SIGN_IN, message).into_response())
}

/// POST /accounts/forget_password
///
/// Answers the same way whether or not the address is known.
pub async fn forget_password(
    State(state): State<AppState>,
    form: Result<Form<ForgetPasswordForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::from_form_rejection(e, paths::FORGET_PASSWORD))?;
    let email = form.email.trim();
    if email.is_empty() {
        return Err(ApiError::flash(
            paths::FORGET_PASSWORD,
            FlashMessage::error("Please enter your email address."),
        ));
    }

    match state.auth.reset_password(email).await {
        Ok(Some(reset)) => {
            state
                .notifications
                .send_password_reset(&reset.identity, &reset.new_password, &reset.library_name)
                .await;
        }
        Ok(None) => {}
        Err(e) => error!("Password reset for {} failed: {}", mask_email(email), e),
    }

    Ok(flash::redirect_one(paths::SIGN_IN, FlashMessage::info("If this email exists, password sent.")).into_response())
}
