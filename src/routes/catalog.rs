//! Clinic services catalog routes.

use axum::{extract::State, Json};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireAdmin;
use crate::models::catalog::{ClinicService, CreateClinicService};
use crate::services::catalog as catalog_service;
use crate::AppState;

/// GET /api/v1/services
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<ClinicService>>>, AppError> {
    let services = catalog_service::list(&state.db).await?;
    Ok(ApiResponse::success(services))
}

/// POST /api/v1/services (admin)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<CreateClinicService>,
) -> Result<Json<ApiResponse<ClinicService>>, AppError> {
    let service = catalog_service::create(&state.db, &body, admin.id).await?;
    Ok(ApiResponse::success(service))
}
