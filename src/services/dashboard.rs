//! Role dashboards: headline counts, appointment statistics and widgets.

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::appointment::AppointmentListItem;
use crate::models::doctor::DoctorHeader;
use crate::models::patient::PatientHeader;
use crate::services::appointment::{self, AppointmentScope};
use crate::services::appointment_stats::{self, MonthlyBucket, StatusCounts};
use crate::services::doctor;

/// Latest appointments shown on every dashboard.
const LAST_RECORDS: i64 = 5;

/// Chart payload shared by all dashboards.
#[derive(Debug, Serialize)]
pub struct AppointmentCharts {
    pub total_appointments: usize,
    pub appointment_counts: StatusCounts,
    pub monthly_data: Vec<MonthlyBucket>,
    pub last_records: Vec<AppointmentListItem>,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub total_patients: i64,
    pub total_doctors: i64,
    #[serde(flatten)]
    pub charts: AppointmentCharts,
    pub available_doctors: Vec<DoctorHeader>,
}

#[derive(Debug, Serialize)]
pub struct DoctorDashboard {
    pub total_patients: i64,
    pub total_nurses: i64,
    #[serde(flatten)]
    pub charts: AppointmentCharts,
    pub available_doctors: Vec<DoctorHeader>,
}

#[derive(Debug, Serialize)]
pub struct PatientDashboard {
    pub patient: PatientHeader,
    #[serde(flatten)]
    pub charts: AppointmentCharts,
    pub available_doctors: Vec<DoctorHeader>,
}

async fn charts(
    pool: &PgPool,
    scope: AppointmentScope,
    now: &DateTime<FixedOffset>,
) -> Result<AppointmentCharts, AppError> {
    let (summaries, last_records) = tokio::try_join!(
        appointment::fetch_summaries(pool, scope),
        appointment::recent(pool, scope, LAST_RECORDS),
    )?;

    let stats = appointment_stats::summarize(&summaries, now);

    Ok(AppointmentCharts {
        total_appointments: summaries.len(),
        appointment_counts: stats.appointment_counts,
        monthly_data: stats.monthly_data,
        last_records,
    })
}

async fn count(pool: &PgPool, sql: &str) -> Result<i64, AppError> {
    Ok(sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await?)
}

/// Clinic-wide dashboard for administrators.
pub async fn admin(pool: &PgPool, now: &DateTime<FixedOffset>) -> Result<AdminDashboard, AppError> {
    let (total_patients, total_doctors, charts, available_doctors) = tokio::try_join!(
        count(pool, "SELECT COUNT(*) FROM patients"),
        count(pool, "SELECT COUNT(*) FROM doctors"),
        charts(pool, AppointmentScope::All, now),
        doctor::working_on(pool, now.weekday(), false, 5),
    )?;

    Ok(AdminDashboard {
        total_patients,
        total_doctors,
        charts,
        available_doctors,
    })
}

/// Dashboard for one doctor; only appointments dated up to `now` are counted.
pub async fn doctor(
    pool: &PgPool,
    doctor_id: Uuid,
    now: &DateTime<FixedOffset>,
) -> Result<DoctorDashboard, AppError> {
    let scope = AppointmentScope::Doctor {
        doctor_id,
        until: now.with_timezone(&Utc),
    };

    let (total_patients, total_nurses, charts, available_doctors) = tokio::try_join!(
        count(pool, "SELECT COUNT(*) FROM patients"),
        count(pool, "SELECT COUNT(*) FROM staff WHERE role = 'STAFF'"),
        charts(pool, scope, now),
        doctor::working_on(pool, now.weekday(), false, 5),
    )?;

    Ok(DoctorDashboard {
        total_patients,
        total_nurses,
        charts,
        available_doctors,
    })
}

/// Dashboard for one patient.
pub async fn patient(
    pool: &PgPool,
    patient_id: Uuid,
    now: &DateTime<FixedOffset>,
) -> Result<PatientDashboard, AppError> {
    let header = async {
        sqlx::query_as::<_, PatientHeader>(
            "SELECT id, first_name, last_name, gender, phone, img, date_of_birth, color_code \
             FROM patients WHERE id = $1",
        )
        .bind(patient_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))
    };

    let (patient, charts, available_doctors) = tokio::try_join!(
        header,
        charts(pool, AppointmentScope::Patient(patient_id), now),
        doctor::working_on(pool, now.weekday(), false, 4),
    )?;

    Ok(PatientDashboard {
        patient,
        charts,
        available_doctors,
    })
}
