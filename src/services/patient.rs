//! Patient registry: registration, profile updates, lookups and listing.

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::audit::CreateAuditLog;
use crate::models::pagination::{search_condition, PagedResult, Pagination};
use crate::models::patient::{Patient, PatientInput, PatientProfile, RegisterPatient};
use crate::models::user::UserRole;
use crate::services::{audit, auth};

const SEARCH_COLUMNS: &[&str] = &["first_name", "last_name", "phone", "email"];

/// Initial password for staff-registered patients submitted without one.
const DEFAULT_PATIENT_PASSWORD: &str = "ChangeMe123";

async fn insert_profile(
    conn: &mut PgConnection,
    id: Uuid,
    input: &PatientInput,
) -> Result<Patient, AppError> {
    let patient = sqlx::query_as::<_, Patient>(
        r#"
        INSERT INTO patients (
            id, first_name, last_name, date_of_birth, gender, phone, email, address,
            marital_status, nutritional_status, emergency_contact_name,
            emergency_contact_number, relation, blood_group, allergies,
            medical_conditions, medical_history, insurance_provider, insurance_number,
            privacy_consent, service_consent, medical_consent, img, color_code
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, $24)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(input.date_of_birth)
    .bind(input.gender)
    .bind(&input.phone)
    .bind(input.email.trim().to_lowercase())
    .bind(&input.address)
    .bind(&input.marital_status)
    .bind(&input.nutritional_status)
    .bind(&input.emergency_contact_name)
    .bind(&input.emergency_contact_number)
    .bind(&input.relation)
    .bind(&input.blood_group)
    .bind(&input.allergies)
    .bind(&input.medical_conditions)
    .bind(&input.medical_history)
    .bind(&input.insurance_provider)
    .bind(&input.insurance_number)
    .bind(input.privacy_consent)
    .bind(input.service_consent)
    .bind(input.medical_consent)
    .bind(&input.img)
    .bind(auth::generate_color_code())
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Patient already exists".to_string())
        }
        _ => AppError::Database(e),
    })?;

    Ok(patient)
}

/// Register a new patient together with a login account.
pub async fn register(
    pool: &PgPool,
    input: &RegisterPatient,
    actor_id: Uuid,
) -> Result<Patient, AppError> {
    input.validate()?;
    let profile = &input.profile;
    let name = format!("{} {}", profile.first_name, profile.last_name);
    let password = input.password.as_deref().unwrap_or(DEFAULT_PATIENT_PASSWORD);

    let mut tx = pool.begin().await?;
    let user = auth::insert_user(&mut tx, &profile.email, &name, password, UserRole::Patient).await?;
    let patient = insert_profile(&mut tx, user.id, profile).await?;
    audit::record(
        &mut tx,
        &CreateAuditLog::new(actor_id, patient.id, "CREATE", "Patient"),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(patient_id = %patient.id, "Patient registered");
    Ok(patient)
}

/// Complete the profile of an already-existing patient account.
pub async fn complete_own_registration(
    pool: &PgPool,
    user_id: Uuid,
    input: &PatientInput,
) -> Result<Patient, AppError> {
    input.validate()?;

    let mut tx = pool.begin().await?;
    let patient = insert_profile(&mut tx, user_id, input).await?;
    audit::record(
        &mut tx,
        &CreateAuditLog::new(user_id, patient.id, "CREATE", "Patient"),
    )
    .await?;
    tx.commit().await?;

    Ok(patient)
}

/// Replace a patient's profile fields.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: &PatientInput,
    actor_id: Uuid,
) -> Result<Patient, AppError> {
    input.validate()?;

    let mut tx = pool.begin().await?;
    let patient = sqlx::query_as::<_, Patient>(
        r#"
        UPDATE patients SET
            first_name = $2, last_name = $3, date_of_birth = $4, gender = $5, phone = $6,
            email = $7, address = $8, marital_status = $9, nutritional_status = $10,
            emergency_contact_name = $11, emergency_contact_number = $12, relation = $13,
            blood_group = $14, allergies = $15, medical_conditions = $16,
            medical_history = $17, insurance_provider = $18, insurance_number = $19,
            privacy_consent = $20, service_consent = $21, medical_consent = $22,
            img = COALESCE($23, img), updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(input.date_of_birth)
    .bind(input.gender)
    .bind(&input.phone)
    .bind(input.email.trim().to_lowercase())
    .bind(&input.address)
    .bind(&input.marital_status)
    .bind(&input.nutritional_status)
    .bind(&input.emergency_contact_name)
    .bind(&input.emergency_contact_number)
    .bind(&input.relation)
    .bind(&input.blood_group)
    .bind(&input.allergies)
    .bind(&input.medical_conditions)
    .bind(&input.medical_history)
    .bind(&input.insurance_provider)
    .bind(&input.insurance_number)
    .bind(input.privacy_consent)
    .bind(input.service_consent)
    .bind(input.medical_consent)
    .bind(&input.img)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))?;

    audit::record(
        &mut tx,
        &CreateAuditLog::new(actor_id, patient.id, "UPDATE", "Patient"),
    )
    .await?;
    tx.commit().await?;

    Ok(patient)
}

/// Fetch a patient by id.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<Patient, AppError> {
    sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))
}

/// Lookup key for the full profile: a patient id or an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientKey {
    Id(Uuid),
    Email(String),
}

impl PatientKey {
    /// Interpret a path segment as an id when it parses as one, else as an email.
    pub fn parse(value: &str) -> Self {
        match value.parse::<Uuid>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Email(value.trim().to_lowercase()),
        }
    }
}

/// Full patient profile with total appointments and most recent visit.
pub async fn full_profile(pool: &PgPool, key: &PatientKey) -> Result<PatientProfile, AppError> {
    let query = match key {
        PatientKey::Id(id) => sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = $1")
            .bind(*id),
        PatientKey::Email(email) => {
            sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE email = $1").bind(email.clone())
        }
    };

    let patient = query
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))?;

    let (total_appointments, last_visit): (i64, Option<DateTime<Utc>>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(appointment_date) FROM appointments WHERE patient_id = $1",
    )
    .bind(patient.id)
    .fetch_one(pool)
    .await?;

    Ok(PatientProfile {
        patient,
        total_appointments,
        last_visit,
    })
}

/// Paginated patient list. `search` is an `ILIKE` pattern over name, phone and email.
pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    pagination: &Pagination,
) -> Result<PagedResult<Patient>, AppError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if search.is_some() {
        param_index += 1;
        conditions.push(search_condition(SEARCH_COLUMNS, param_index));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM patients {where_clause}");
    let data_sql = format!(
        "SELECT * FROM patients {where_clause} ORDER BY first_name ASC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, Patient>(&data_sql);

    if let Some(pattern) = search {
        count_query = count_query.bind(pattern);
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Delete a patient and the linked login account.
pub async fn delete(pool: &PgPool, id: Uuid, actor_id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM users WHERE id = $1 AND role = 'PATIENT'")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Patient not found".to_string()));
    }

    audit::record(
        &mut tx,
        &CreateAuditLog::new(actor_id, id, "DELETE", "Patient")
            .with_details(json!({ "cascade": ["appointments", "medical_records", "payments"] })),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(patient_id = %id, "Patient deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_key_parses_uuid_or_email() {
        let id = Uuid::new_v4();
        assert_eq!(PatientKey::parse(&id.to_string()), PatientKey::Id(id));
        assert_eq!(
            PatientKey::parse(" Ada@Clinic.test "),
            PatientKey::Email("ada@clinic.test".to_string())
        );
    }

    #[test]
    fn search_covers_name_phone_and_email() {
        let sql = search_condition(SEARCH_COLUMNS, 1);
        for column in ["first_name", "last_name", "phone", "email"] {
            assert!(sql.contains(&format!("{column} ILIKE $1")));
        }
    }
}
