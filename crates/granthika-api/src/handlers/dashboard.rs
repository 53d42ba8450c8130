use axum::{
    extract::{RawQuery, State},
    Json,
};
use chrono::Utc;
use granthika_core::domain::Subscription;

use crate::dto::{DashboardView, SubscriptionStatus};
use crate::error::ApiError;
use crate::flash;
use crate::middleware::CurrentAdmin;
use crate::response::ApiResponse;
use crate::routes::paths;
use crate::state::AppState;

/// GET /accounts/admin_dashboard
pub async fn admin_dashboard(
    State(state): State<AppState>,
    CurrentAdmin(identity): CurrentAdmin,
    RawQuery(query): RawQuery,
) -> Result<Json<ApiResponse<DashboardView>>, ApiError> {
    let library = state
        .registration
        .find_by_identity(&identity.id)
        .await
        .map_err(|e| ApiError::from_domain(e, paths::SIGN_IN))?;
    let subscription: Subscription = state
        .settings
        .ensure_typed(&library.id)
        .await
        .map_err(|e| ApiError::from_domain(e, paths::SIGN_IN))?;

    let status = SubscriptionStatus::at(&subscription, Utc::now().date_naive());
    let view = DashboardView::new(&identity, library, status);
    Ok(Json(
        ApiResponse::success(view).with_messages(flash::messages_from_query(query.as_deref())),
    ))
}
