//! Appointment routes: booking, lookup, listing and status changes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::{resolve_subject, RequireStaff};
use crate::models::appointment::{
    Appointment, AppointmentListItem, CreateAppointment, UpdateAppointmentStatus,
};
use crate::models::pagination::{PagedResult, Pagination, SearchQuery};
use crate::models::user::UserRole;
use crate::services::appointment::{self as appointment_service, AppointmentWithRecords};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentFilter {
    /// Patient or doctor whose appointments to list.
    pub id: Option<Uuid>,
}

/// Patients may only touch their own appointments.
fn ensure_participant(user: &CurrentUser, patient_id: Uuid) -> Result<(), AppError> {
    if user.role == UserRole::Patient && user.id != patient_id {
        return Err(AppError::Forbidden(
            "Access to other patients' appointments is not allowed".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/v1/appointments: paginated list, `?id=` restricts to a patient or doctor.
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<AppointmentFilter>,
    Query(pagination): Query<Pagination>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<ApiResponse<PagedResult<AppointmentListItem>>>, AppError> {
    let participant_id = if current_user.role == UserRole::Patient {
        Some(resolve_subject(&current_user, UserRole::Patient, filter.id)?)
    } else {
        filter.id
    };

    let pattern = search.pattern();
    let result =
        appointment_service::list(&state.db, participant_id, pattern.as_deref(), &pagination)
            .await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/appointments: book an appointment (starts PENDING).
pub async fn create(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateAppointment>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    ensure_participant(&current_user, body.patient_id)?;
    let appointment = appointment_service::create(&state.db, &body, current_user.id).await?;
    Ok(ApiResponse::success(appointment))
}

/// GET /api/v1/appointments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AppointmentListItem>>, AppError> {
    let appointment = appointment_service::get_with_participants(&state.db, id).await?;
    ensure_participant(&current_user, appointment.patient_id)?;
    Ok(ApiResponse::success(appointment))
}

/// GET /api/v1/appointments/{id}/records: with medical records and bill.
pub async fn get_with_records(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AppointmentWithRecords>>, AppError> {
    let details = appointment_service::get_with_records(&state.db, id).await?;
    ensure_participant(&current_user, details.appointment.patient_id)?;
    Ok(ApiResponse::success(details))
}

/// PATCH /api/v1/appointments/{id}/status (staff+)
pub async fn update_status(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<i64>,
    Json(body): Json<UpdateAppointmentStatus>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    let appointment = appointment_service::update_status(&state.db, id, &body, staff.id).await?;
    Ok(ApiResponse::success(appointment))
}
