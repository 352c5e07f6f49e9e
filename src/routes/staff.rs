//! Staff routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::{RequireAdmin, RequireClinician};
use crate::models::pagination::{PagedResult, Pagination, SearchQuery};
use crate::models::staff::{CreateStaff, Staff};
use crate::services::staff as staff_service;
use crate::AppState;

/// GET /api/v1/staff (doctor or admin)
pub async fn list(
    State(state): State<AppState>,
    RequireClinician(_user): RequireClinician,
    Query(pagination): Query<Pagination>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<ApiResponse<PagedResult<Staff>>>, AppError> {
    let pattern = search.pattern();
    let result = staff_service::list(&state.db, pattern.as_deref(), &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/staff (admin)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<CreateStaff>,
) -> Result<Json<ApiResponse<Staff>>, AppError> {
    let staff = staff_service::create(&state.db, &body, admin.id).await?;
    Ok(ApiResponse::success(staff))
}

/// DELETE /api/v1/staff/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    staff_service::delete(&state.db, id, admin.id).await?;
    Ok(ApiResponse::success("Staff member deleted"))
}
