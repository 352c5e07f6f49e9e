//! Medical record routes: diagnoses, vital signs and listing.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::{RequireClinician, RequireStaff};
use crate::models::medical::{CreateDiagnosis, CreateVitalSigns, Diagnosis, MedicalRecordListItem, VitalSigns};
use crate::models::pagination::{PagedResult, Pagination, SearchQuery};
use crate::services::medical as medical_service;
use crate::AppState;

/// GET /api/v1/medical-records (staff+)
pub async fn list(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Query(pagination): Query<Pagination>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<ApiResponse<PagedResult<MedicalRecordListItem>>>, AppError> {
    let pattern = search.pattern();
    let result = medical_service::list(&state.db, pattern.as_deref(), &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/medical-records/diagnoses (doctor or admin)
pub async fn add_diagnosis(
    State(state): State<AppState>,
    RequireClinician(clinician): RequireClinician,
    Json(body): Json<CreateDiagnosis>,
) -> Result<Json<ApiResponse<Diagnosis>>, AppError> {
    let diagnosis = medical_service::add_diagnosis(&state.db, &body, clinician.id).await?;
    Ok(ApiResponse::success(diagnosis))
}

/// POST /api/v1/medical-records/vital-signs (staff+)
pub async fn add_vital_signs(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Json(body): Json<CreateVitalSigns>,
) -> Result<Json<ApiResponse<VitalSigns>>, AppError> {
    let vitals = medical_service::add_vital_signs(&state.db, &body, staff.id).await?;
    Ok(ApiResponse::success(vitals))
}
