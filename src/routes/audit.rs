//! Audit trail lookup.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireAdmin;
use crate::models::audit::AuditLog;
use crate::services::audit as audit_service;
use crate::AppState;

/// GET /api/v1/audit/{model}/{record_id} (admin)
pub async fn history(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path((model, record_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Vec<AuditLog>>>, AppError> {
    let entries = audit_service::history(&state.db, &model, &record_id).await?;
    Ok(ApiResponse::success(entries))
}
