//! Patient routes: registration, profile, listing and vital signs summary.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::{resolve_subject, RequireAdmin, RequireStaff};
use crate::models::pagination::{PagedResult, Pagination, SearchQuery};
use crate::models::patient::{Patient, PatientInput, PatientProfile, RegisterPatient};
use crate::models::user::UserRole;
use crate::services::medical as medical_service;
use crate::services::patient::{self as patient_service, PatientKey};
use crate::services::vitals::VitalSummary;
use crate::AppState;

/// GET /api/v1/patients: paginated list with search (staff+).
pub async fn list(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Query(pagination): Query<Pagination>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<ApiResponse<PagedResult<Patient>>>, AppError> {
    let pattern = search.pattern();
    let result = patient_service::list(&state.db, pattern.as_deref(), &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/patients: register a patient with a new account (staff+).
pub async fn register(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(body): Json<RegisterPatient>,
) -> Result<Json<ApiResponse<Patient>>, AppError> {
    let patient = patient_service::register(&state.db, &body, staff.id).await?;
    Ok(ApiResponse::success(patient))
}

/// POST /api/v1/patients/me: a patient completes its own registration.
pub async fn complete_registration(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<PatientInput>,
) -> Result<Json<ApiResponse<Patient>>, AppError> {
    if current_user.role != UserRole::Patient {
        return Err(AppError::Forbidden(
            "Only patient accounts can self-register".to_string(),
        ));
    }
    let patient =
        patient_service::complete_own_registration(&state.db, current_user.id, &body).await?;
    Ok(ApiResponse::success(patient))
}

/// GET /api/v1/patients/{id}: patient record.
pub async fn get_by_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Patient>>, AppError> {
    let id = resolve_subject(&current_user, UserRole::Patient, Some(id))?;
    let patient = patient_service::get(&state.db, id).await?;
    Ok(ApiResponse::success(patient))
}

/// PUT /api/v1/patients/{id}: update profile (the patient or staff+).
pub async fn update(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PatientInput>,
) -> Result<Json<ApiResponse<Patient>>, AppError> {
    let id = resolve_subject(&current_user, UserRole::Patient, Some(id))?;
    let patient = patient_service::update(&state.db, id, &body, current_user.id).await?;
    Ok(ApiResponse::success(patient))
}

/// GET /api/v1/patients/profile/{key}: full profile by id or email.
pub async fn full_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<PatientProfile>>, AppError> {
    let key = PatientKey::parse(&key);
    let profile = patient_service::full_profile(&state.db, &key).await?;
    resolve_subject(&current_user, UserRole::Patient, Some(profile.patient.id))?;
    Ok(ApiResponse::success(profile))
}

/// GET /api/v1/patients/{id}/vitals: vital signs since midnight seven days ago.
pub async fn vital_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VitalSummary>>, AppError> {
    let id = resolve_subject(&current_user, UserRole::Patient, Some(id))?;
    let summary = medical_service::vital_summary(&state.db, id, &state.config.clinic_now()).await?;
    Ok(ApiResponse::success(summary))
}

/// DELETE /api/v1/patients/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    patient_service::delete(&state.db, id, admin.id).await?;
    Ok(ApiResponse::success("Patient deleted"))
}
