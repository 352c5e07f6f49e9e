//! Medical records: diagnoses, vital signs and record listings.

use chrono::{DateTime, FixedOffset};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::audit::CreateAuditLog;
use crate::models::medical::{
    CreateDiagnosis, CreateVitalSigns, Diagnosis, LabTest, MedicalRecord, MedicalRecordDetail,
    MedicalRecordListItem, VitalSigns,
};
use crate::models::pagination::{search_condition, PagedResult, Pagination};
use crate::services::audit;
use crate::services::vitals::{self, VitalSummary};

const SEARCH_COLUMNS: &[&str] = &["p.first_name", "p.last_name", "m.patient_id::text"];

/// Reuse `medical_id` when given, otherwise open a record for the appointment.
async fn resolve_record(
    conn: &mut PgConnection,
    medical_id: Option<i64>,
    patient_id: Uuid,
    doctor_id: Uuid,
    appointment_id: i64,
) -> Result<i64, AppError> {
    if let Some(id) = medical_id {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM medical_records WHERE id = $1 AND patient_id = $2)",
        )
        .bind(id)
        .bind(patient_id)
        .fetch_one(&mut *conn)
        .await?;
        if !exists {
            return Err(AppError::NotFound("Medical record not found".to_string()));
        }
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO medical_records (patient_id, doctor_id, appointment_id)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(patient_id)
    .bind(doctor_id)
    .bind(appointment_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::Validation("Unknown patient, doctor or appointment".to_string())
        }
        _ => AppError::Database(e),
    })?;

    Ok(id)
}

/// Add a diagnosis, opening a medical record for the appointment if needed.
pub async fn add_diagnosis(
    pool: &PgPool,
    input: &CreateDiagnosis,
    actor_id: Uuid,
) -> Result<Diagnosis, AppError> {
    input.validate()?;

    let mut tx = pool.begin().await?;
    let medical_id = resolve_record(
        &mut tx,
        input.medical_id,
        input.patient_id,
        input.doctor_id,
        input.appointment_id,
    )
    .await?;

    let diagnosis = sqlx::query_as::<_, Diagnosis>(
        r#"
        INSERT INTO diagnoses (
            patient_id, medical_id, doctor_id, symptoms, diagnosis, notes,
            prescribed_medications, follow_up_plan
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, patient_id, medical_id, doctor_id, symptoms, diagnosis, notes,
                  prescribed_medications, follow_up_plan, created_at
        "#,
    )
    .bind(input.patient_id)
    .bind(medical_id)
    .bind(input.doctor_id)
    .bind(&input.symptoms)
    .bind(&input.diagnosis)
    .bind(&input.notes)
    .bind(&input.prescribed_medications)
    .bind(&input.follow_up_plan)
    .fetch_one(&mut *tx)
    .await?;

    audit::record(
        &mut tx,
        &CreateAuditLog::new(actor_id, diagnosis.id, "CREATE", "Diagnosis"),
    )
    .await?;
    tx.commit().await?;

    Ok(diagnosis)
}

/// Add vital signs, opening a medical record for the appointment if needed.
pub async fn add_vital_signs(
    pool: &PgPool,
    input: &CreateVitalSigns,
    actor_id: Uuid,
) -> Result<VitalSigns, AppError> {
    input.validate()?;

    let mut tx = pool.begin().await?;
    let medical_id = resolve_record(
        &mut tx,
        input.medical_id,
        input.patient_id,
        input.doctor_id,
        input.appointment_id,
    )
    .await?;

    let vitals = sqlx::query_as::<_, VitalSigns>(
        r#"
        INSERT INTO vital_signs (
            patient_id, medical_id, body_temperature, systolic, diastolic, heart_rate,
            respiratory_rate, oxygen_saturation, weight, height
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, patient_id, medical_id, body_temperature, systolic, diastolic,
                  heart_rate, respiratory_rate, oxygen_saturation, weight, height, created_at
        "#,
    )
    .bind(input.patient_id)
    .bind(medical_id)
    .bind(input.body_temperature)
    .bind(input.systolic)
    .bind(input.diastolic)
    .bind(input.heart_rate.trim())
    .bind(input.respiratory_rate)
    .bind(input.oxygen_saturation)
    .bind(input.weight)
    .bind(input.height)
    .fetch_one(&mut *tx)
    .await?;

    audit::record(
        &mut tx,
        &CreateAuditLog::new(actor_id, vitals.id, "CREATE", "VitalSigns"),
    )
    .await?;
    tx.commit().await?;

    Ok(vitals)
}

/// Medical records of an appointment with their diagnoses, lab tests and vitals.
pub async fn records_for_appointment(
    pool: &PgPool,
    appointment_id: i64,
) -> Result<Vec<MedicalRecordDetail>, AppError> {
    let records = sqlx::query_as::<_, MedicalRecord>(
        "SELECT * FROM medical_records WHERE appointment_id = $1 ORDER BY created_at ASC",
    )
    .bind(appointment_id)
    .fetch_all(pool)
    .await?;

    let ids: Vec<i64> = records.iter().map(|r| r.id).collect();

    let diagnoses = sqlx::query_as::<_, Diagnosis>(
        "SELECT id, patient_id, medical_id, doctor_id, symptoms, diagnosis, notes, \
         prescribed_medications, follow_up_plan, created_at \
         FROM diagnoses WHERE medical_id = ANY($1) ORDER BY created_at ASC",
    )
    .bind(&ids)
    .fetch_all(pool);

    let lab_tests = sqlx::query_as::<_, LabTest>(
        "SELECT id, record_id, service_id, test_date, result, status, notes \
         FROM lab_tests WHERE record_id = ANY($1) ORDER BY test_date ASC",
    )
    .bind(&ids)
    .fetch_all(pool);

    let vital_signs = sqlx::query_as::<_, VitalSigns>(
        "SELECT id, patient_id, medical_id, body_temperature, systolic, diastolic, heart_rate, \
         respiratory_rate, oxygen_saturation, weight, height, created_at \
         FROM vital_signs WHERE medical_id = ANY($1) ORDER BY created_at ASC",
    )
    .bind(&ids)
    .fetch_all(pool);

    let (diagnoses, lab_tests, vital_signs) = tokio::try_join!(diagnoses, lab_tests, vital_signs)?;

    Ok(records
        .into_iter()
        .map(|record| MedicalRecordDetail {
            diagnoses: diagnoses
                .iter()
                .filter(|d| d.medical_id == record.id)
                .cloned()
                .collect(),
            lab_tests: lab_tests
                .iter()
                .filter(|t| t.record_id == record.id)
                .cloned()
                .collect(),
            vital_signs: vital_signs
                .iter()
                .filter(|v| v.medical_id == record.id)
                .cloned()
                .collect(),
            record,
        })
        .collect())
}

/// Paginated medical records. `search` is an `ILIKE` pattern over patient name and id.
pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    pagination: &Pagination,
) -> Result<PagedResult<MedicalRecordListItem>, AppError> {
    let where_clause = if search.is_some() {
        format!("WHERE {}", search_condition(SEARCH_COLUMNS, 1))
    } else {
        String::new()
    };

    let from = "FROM medical_records m JOIN patients p ON p.id = m.patient_id";
    let count_sql = format!("SELECT COUNT(*) {from} {where_clause}");
    let data_sql = format!(
        r#"
        SELECT m.id, m.patient_id, m.appointment_id, m.doctor_id, m.treatment_plan,
               m.prescriptions, m.notes, m.created_at,
               p.first_name AS patient_first_name, p.last_name AS patient_last_name,
               p.img AS patient_img, p.color_code AS patient_color_code,
               (SELECT COUNT(*) FROM diagnoses dg WHERE dg.medical_id = m.id) AS diagnosis_count,
               (SELECT COUNT(*) FROM lab_tests lt WHERE lt.record_id = m.id) AS lab_test_count
        {from} {where_clause}
        ORDER BY m.created_at DESC LIMIT {} OFFSET {}
        "#,
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, MedicalRecordListItem>(&data_sql);

    if let Some(pattern) = search {
        count_query = count_query.bind(pattern);
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Vital signs summary for a patient since local midnight seven days before `now`.
pub async fn vital_summary(
    pool: &PgPool,
    patient_id: Uuid,
    now: &DateTime<FixedOffset>,
) -> Result<VitalSummary, AppError> {
    let since = vitals::window_start(now);

    let readings = sqlx::query_as::<_, VitalSigns>(
        "SELECT id, patient_id, medical_id, body_temperature, systolic, diastolic, heart_rate, \
         respiratory_rate, oxygen_saturation, weight, height, created_at \
         FROM vital_signs WHERE patient_id = $1 AND created_at >= $2 ORDER BY created_at ASC",
    )
    .bind(patient_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(vitals::summarize_vitals(&readings))
}
