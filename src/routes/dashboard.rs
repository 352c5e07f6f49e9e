//! Dashboard routes for admins, doctors and patients.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::{resolve_subject, RequireAdmin};
use crate::models::user::UserRole;
use crate::services::dashboard::{self, AdminDashboard, DoctorDashboard, PatientDashboard};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SubjectQuery {
    pub id: Option<Uuid>,
}

/// GET /api/v1/dashboard/admin
pub async fn admin(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<AdminDashboard>>, AppError> {
    let stats = dashboard::admin(&state.db, &state.config.clinic_now()).await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/v1/dashboard/doctor: own dashboard, or `?id=` for clinic staff.
pub async fn doctor(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SubjectQuery>,
) -> Result<Json<ApiResponse<DoctorDashboard>>, AppError> {
    let doctor_id = resolve_subject(&current_user, UserRole::Doctor, query.id)?;
    let stats = dashboard::doctor(&state.db, doctor_id, &state.config.clinic_now()).await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/v1/dashboard/patient: own dashboard, or `?id=` for clinic staff.
pub async fn patient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SubjectQuery>,
) -> Result<Json<ApiResponse<PatientDashboard>>, AppError> {
    let patient_id = resolve_subject(&current_user, UserRole::Patient, query.id)?;
    let stats = dashboard::patient(&state.db, patient_id, &state.config.clinic_now()).await?;
    Ok(ApiResponse::success(stats))
}
