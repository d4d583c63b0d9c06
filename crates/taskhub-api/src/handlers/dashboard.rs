//! Dashboard handler.

use axum::extract::State;
use axum::Json;

use taskhub_service::dashboard::service::DashboardSummary;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/dashboard
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<DashboardSummary>>, ApiError> {
    let summary = state.dashboard_service.summary(&auth).await?;
    Ok(Json(ApiResponse::ok(summary)))
}
