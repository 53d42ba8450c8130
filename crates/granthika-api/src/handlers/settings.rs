// ============================================================================
// Granthika API - Settings Handlers
// File: crates/granthika-api/src/handlers/settings.rs
// ============================================================================

use std::collections::HashMap;

use axum::{
    extract::{rejection::FormRejection, RawQuery, State},
    response::Redirect,
    Form, Json,
};
use granthika_core::domain::{SectionForm, SettingsPage};

use crate::error::ApiError;
use crate::flash;
use crate::middleware::CurrentAdmin;
use crate::response::ApiResponse;
use crate::routes::paths;
use crate::state::AppState;

/// GET /accounts/settings
pub async fn settings_page(
    State(state): State<AppState>,
    CurrentAdmin(identity): CurrentAdmin,
    RawQuery(query): RawQuery,
) -> Result<Json<ApiResponse<SettingsPage>>, ApiError> {
    let library = state
        .registration
        .find_by_identity(&identity.id)
        .await
        .map_err(|e| ApiError::from_domain(e, paths::SIGN_IN))?;
    let page = state
        .settings
        .page(library)
        .await
        .map_err(|e| ApiError::from_domain(e, paths::DASHBOARD))?;

    Ok(Json(
        ApiResponse::success(page).with_messages(flash::messages_from_query(query.as_deref())),
    ))
}

/// POST /accounts/settings
///
/// `form_type` picks the section; every outcome goes back to the settings
/// page as flash messages.
pub async fn update_settings(
    State(state): State<AppState>,
    CurrentAdmin(identity): CurrentAdmin,
    fields: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Redirect, ApiError> {
    let Form(fields) = fields.map_err(|e| ApiError::from_form_rejection(e, paths::SETTINGS))?;
    let form = SectionForm::from(fields);
    let library = state
        .registration
        .find_by_identity(&identity.id)
        .await
        .map_err(|e| ApiError::from_domain(e, paths::SIGN_IN))?;

    let outcome = state
        .settings
        .apply_section(&identity, &library, form.section_name(), &form)
        .await
        .map_err(|e| ApiError::from_domain(e, paths::SETTINGS))?;

    Ok(flash::redirect(paths::SETTINGS, &outcome.messages))
}
