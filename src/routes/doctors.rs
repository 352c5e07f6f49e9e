//! Doctor routes: registry, schedules, availability and ratings.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Datelike;
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireAdmin;
use crate::models::doctor::{
    CreateDoctor, CreateRating, Doctor, DoctorDetail, DoctorHeader, Rating, RatingSummary,
};
use crate::models::pagination::{PagedResult, Pagination, SearchQuery};
use crate::models::user::UserRole;
use crate::services::doctor as doctor_service;
use crate::AppState;

/// Doctors returned by the "available now" widget.
const AVAILABLE_LIMIT: i64 = 3;

/// GET /api/v1/doctors
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(pagination): Query<Pagination>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<ApiResponse<PagedResult<Doctor>>>, AppError> {
    let pattern = search.pattern();
    let result = doctor_service::list(&state.db, pattern.as_deref(), &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/doctors: create doctor with working schedule (admin).
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<CreateDoctor>,
) -> Result<Json<ApiResponse<Doctor>>, AppError> {
    let doctor = doctor_service::create(&state.db, &body, admin.id).await?;
    Ok(ApiResponse::success(doctor))
}

/// GET /api/v1/doctors/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DoctorDetail>>, AppError> {
    let detail = doctor_service::get_detail(&state.db, id).await?;
    Ok(ApiResponse::success(detail))
}

/// GET /api/v1/doctors/available: available doctors scheduled today.
pub async fn available(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<DoctorHeader>>>, AppError> {
    let today = state.config.clinic_now().weekday();
    let doctors = doctor_service::working_on(&state.db, today, true, AVAILABLE_LIMIT).await?;
    Ok(ApiResponse::success(doctors))
}

/// DELETE /api/v1/doctors/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    doctor_service::delete(&state.db, id, admin.id).await?;
    Ok(ApiResponse::success("Doctor deleted"))
}

/// POST /api/v1/ratings: patients rate the doctor or staff who saw them.
pub async fn create_rating(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateRating>,
) -> Result<Json<ApiResponse<Rating>>, AppError> {
    if current_user.role == UserRole::Patient && body.patient_id != current_user.id {
        return Err(AppError::Forbidden(
            "Patients can only submit their own ratings".to_string(),
        ));
    }
    let rating = doctor_service::create_rating(&state.db, &body, current_user.id).await?;
    Ok(ApiResponse::success(rating))
}

/// GET /api/v1/ratings/{staff_id}
pub async fn rating_summary(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(staff_id): Path<Uuid>,
) -> Result<Json<ApiResponse<RatingSummary>>, AppError> {
    let summary = doctor_service::rating_summary(&state.db, staff_id).await?;
    Ok(ApiResponse::success(summary))
}
