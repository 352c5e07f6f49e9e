//! Appointment booking, lookup, listing and status changes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::appointment::{
    Appointment, AppointmentListItem, AppointmentStatus, AppointmentSummary, CreateAppointment,
    UpdateAppointmentStatus,
};
use crate::models::audit::CreateAuditLog;
use crate::models::medical::MedicalRecordDetail;
use crate::models::pagination::{search_condition, PagedResult, Pagination};
use crate::models::payment::PaymentDetail;
use crate::services::{audit, medical, payment};

const SEARCH_COLUMNS: &[&str] = &["p.first_name", "p.last_name", "d.name"];

const LIST_COLUMNS: &str = r#"
    a.id, a.patient_id, a.doctor_id, a.type, a.appointment_date, a.time, a.status,
    p.first_name AS patient_first_name, p.last_name AS patient_last_name,
    p.phone AS patient_phone, p.gender AS patient_gender, p.img AS patient_img,
    p.date_of_birth AS patient_date_of_birth, p.color_code AS patient_color_code,
    d.name AS doctor_name, d.specialization AS doctor_specialization,
    d.img AS doctor_img, d.color_code AS doctor_color_code
"#;

const LIST_FROM: &str = r#"
    FROM appointments a
    JOIN patients p ON p.id = a.patient_id
    JOIN doctors d ON d.id = a.doctor_id
"#;

/// Which appointments feed a statistics summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentScope {
    All,
    /// A doctor's appointments dated up to `until`.
    Doctor { doctor_id: Uuid, until: DateTime<Utc> },
    Patient(Uuid),
}

/// Load the minimal date/status pairs for the given scope.
pub async fn fetch_summaries(
    pool: &PgPool,
    scope: AppointmentScope,
) -> Result<Vec<AppointmentSummary>, AppError> {
    let filter = match scope {
        AppointmentScope::All => "TRUE",
        AppointmentScope::Doctor { .. } => "doctor_id = $1 AND appointment_date <= $2",
        AppointmentScope::Patient(_) => "patient_id = $1",
    };
    let sql = format!(
        "SELECT appointment_date, status::text AS status FROM appointments WHERE {filter}"
    );

    let query = sqlx::query_as::<_, AppointmentSummary>(&sql);
    let query = match scope {
        AppointmentScope::All => query,
        AppointmentScope::Doctor { doctor_id, until } => query.bind(doctor_id).bind(until),
        AppointmentScope::Patient(patient_id) => query.bind(patient_id),
    };

    Ok(query.fetch_all(pool).await?)
}

/// Most recent appointments in a scope, with patient and doctor headers.
pub async fn recent(
    pool: &PgPool,
    scope: AppointmentScope,
    limit: i64,
) -> Result<Vec<AppointmentListItem>, AppError> {
    let filter = match scope {
        AppointmentScope::All => "TRUE",
        AppointmentScope::Doctor { .. } => "a.doctor_id = $2 AND a.appointment_date <= $3",
        AppointmentScope::Patient(_) => "a.patient_id = $2",
    };
    let sql = format!(
        "SELECT {LIST_COLUMNS} {LIST_FROM} WHERE {filter} \
         ORDER BY a.appointment_date DESC LIMIT $1"
    );

    let query = sqlx::query_as::<_, AppointmentListItem>(&sql).bind(limit);
    let query = match scope {
        AppointmentScope::All => query,
        AppointmentScope::Doctor { doctor_id, until } => query.bind(doctor_id).bind(until),
        AppointmentScope::Patient(patient_id) => query.bind(patient_id),
    };

    Ok(query.fetch_all(pool).await?)
}

/// Paginated appointment list, optionally restricted to one patient or doctor
/// (`participant_id`) and filtered by an `ILIKE` pattern over patient and doctor names.
pub async fn list(
    pool: &PgPool,
    participant_id: Option<Uuid>,
    search: Option<&str>,
    pagination: &Pagination,
) -> Result<PagedResult<AppointmentListItem>, AppError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if participant_id.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(a.patient_id = ${param_index} OR a.doctor_id = ${param_index})"
        ));
    }
    if search.is_some() {
        param_index += 1;
        conditions.push(search_condition(SEARCH_COLUMNS, param_index));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) {LIST_FROM} {where_clause}");
    let data_sql = format!(
        "SELECT {LIST_COLUMNS} {LIST_FROM} {where_clause} \
         ORDER BY a.appointment_date DESC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, AppointmentListItem>(&data_sql);

    macro_rules! bind_both {
        ($val:expr) => {
            count_query = count_query.bind($val);
            data_query = data_query.bind($val);
        };
    }

    if let Some(id) = participant_id {
        bind_both!(id);
    }
    if let Some(pattern) = search {
        bind_both!(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Appointment by id with patient and doctor headers.
pub async fn get_with_participants(pool: &PgPool, id: i64) -> Result<AppointmentListItem, AppError> {
    sqlx::query_as::<_, AppointmentListItem>(&format!(
        "SELECT {LIST_COLUMNS} {LIST_FROM} WHERE a.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))
}

/// Appointment together with its clinical records and bill.
#[derive(Debug, Serialize)]
pub struct AppointmentWithRecords {
    #[serde(flatten)]
    pub appointment: AppointmentListItem,
    pub medical_records: Vec<MedicalRecordDetail>,
    pub bill: Option<PaymentDetail>,
}

pub async fn get_with_records(pool: &PgPool, id: i64) -> Result<AppointmentWithRecords, AppError> {
    let appointment = get_with_participants(pool, id).await?;
    let (medical_records, bill) = tokio::try_join!(
        medical::records_for_appointment(pool, id),
        payment::for_appointment(pool, id),
    )?;

    Ok(AppointmentWithRecords {
        appointment,
        medical_records,
        bill,
    })
}

/// Book an appointment. New appointments start as PENDING.
pub async fn create(
    pool: &PgPool,
    input: &CreateAppointment,
    actor_id: Uuid,
) -> Result<Appointment, AppError> {
    input.validate()?;

    let mut tx = pool.begin().await?;
    let appointment = sqlx::query_as::<_, Appointment>(
        r#"
        INSERT INTO appointments (patient_id, doctor_id, service_id, appointment_date, time, status, type, note)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(input.patient_id)
    .bind(input.doctor_id)
    .bind(input.service_id)
    .bind(input.appointment_date)
    .bind(&input.time)
    .bind(AppointmentStatus::Pending)
    .bind(&input.appointment_type)
    .bind(&input.note)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::Validation("Unknown patient, doctor or service".to_string())
        }
        _ => AppError::Database(e),
    })?;

    audit::record(
        &mut tx,
        &CreateAuditLog::new(actor_id, appointment.id, "CREATE", "Appointment"),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(appointment_id = appointment.id, "Appointment booked");
    Ok(appointment)
}

/// Change an appointment's status, recording the reason.
pub async fn update_status(
    pool: &PgPool,
    id: i64,
    input: &UpdateAppointmentStatus,
    actor_id: Uuid,
) -> Result<Appointment, AppError> {
    let mut tx = pool.begin().await?;

    let previous = sqlx::query_scalar::<_, AppointmentStatus>(
        "SELECT status FROM appointments WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    let appointment = sqlx::query_as::<_, Appointment>(
        r#"
        UPDATE appointments SET status = $2, reason = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.status)
    .bind(&input.reason)
    .fetch_one(&mut *tx)
    .await?;

    audit::record(
        &mut tx,
        &CreateAuditLog::new(actor_id, id, "UPDATE_STATUS", "Appointment").with_details(json!({
            "previous_status": previous.as_str(),
            "new_status": input.status.as_str(),
            "reason": input.reason,
        })),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        appointment_id = id,
        from = previous.as_str(),
        to = input.status.as_str(),
        "Appointment status changed"
    );
    Ok(appointment)
}
