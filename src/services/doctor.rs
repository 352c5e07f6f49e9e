//! Doctor management, weekly schedules and ratings.

use chrono::Weekday;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::appointment::Appointment;
use crate::models::audit::CreateAuditLog;
use crate::models::doctor::{
    CreateDoctor, CreateRating, Doctor, DoctorDetail, DoctorHeader, Rating, RatingSummary,
    WorkingDay,
};
use crate::models::pagination::{search_condition, PagedResult, Pagination};
use crate::models::user::UserRole;
use crate::services::{audit, auth};

const SEARCH_COLUMNS: &[&str] = &["name", "specialization", "email"];

/// Number of recent appointments shown on the doctor detail view.
const RECENT_APPOINTMENTS: i64 = 10;

/// Lowercase English weekday name as stored in `working_days.day`.
pub fn working_day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Create a doctor account, profile and working schedule in one transaction.
pub async fn create(pool: &PgPool, input: &CreateDoctor, actor_id: Uuid) -> Result<Doctor, AppError> {
    input.validate()?;

    let mut tx = pool.begin().await?;
    let user = auth::insert_user(
        &mut tx,
        &input.email,
        &input.name,
        &input.password,
        UserRole::Doctor,
    )
    .await?;

    let doctor = sqlx::query_as::<_, Doctor>(
        r#"
        INSERT INTO doctors (
            id, email, name, specialization, license_number, phone, address,
            department, img, color_code, availability_status, job_type
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'available', $11)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&input.name)
    .bind(&input.specialization)
    .bind(&input.license_number)
    .bind(&input.phone)
    .bind(&input.address)
    .bind(&input.department)
    .bind(&input.img)
    .bind(auth::generate_color_code())
    .bind(input.job_type)
    .fetch_one(&mut *tx)
    .await?;

    for slot in &input.work_schedule {
        sqlx::query(
            "INSERT INTO working_days (doctor_id, day, start_time, close_time) VALUES ($1, $2, $3, $4)",
        )
        .bind(doctor.id)
        .bind(slot.day.trim().to_lowercase())
        .bind(&slot.start_time)
        .bind(&slot.close_time)
        .execute(&mut *tx)
        .await?;
    }

    audit::record(
        &mut tx,
        &CreateAuditLog::new(actor_id, doctor.id, "CREATE", "Doctor")
            .with_details(serde_json::json!({ "working_days": input.work_schedule.len() })),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(doctor_id = %doctor.id, "Doctor created");
    Ok(doctor)
}

/// Doctor with working days, latest appointments and total appointment count.
pub async fn get_detail(pool: &PgPool, id: Uuid) -> Result<DoctorDetail, AppError> {
    let doctor = sqlx::query_as::<_, Doctor>("SELECT * FROM doctors WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;

    let working_days = sqlx::query_as::<_, WorkingDay>(
        "SELECT id, doctor_id, day, start_time, close_time FROM working_days WHERE doctor_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool);

    let appointments = sqlx::query_as::<_, Appointment>(
        "SELECT * FROM appointments WHERE doctor_id = $1 ORDER BY appointment_date DESC LIMIT $2",
    )
    .bind(id)
    .bind(RECENT_APPOINTMENTS)
    .fetch_all(pool);

    let total_appointments =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments WHERE doctor_id = $1")
            .bind(id)
            .fetch_one(pool);

    let (working_days, appointments, total_appointments) =
        tokio::try_join!(working_days, appointments, total_appointments)?;

    Ok(DoctorDetail {
        doctor,
        working_days,
        appointments,
        total_appointments,
    })
}

/// Paginated doctor list. `search` is an `ILIKE` pattern over name, specialization and email.
pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    pagination: &Pagination,
) -> Result<PagedResult<Doctor>, AppError> {
    let where_clause = if search.is_some() {
        format!("WHERE {}", search_condition(SEARCH_COLUMNS, 1))
    } else {
        String::new()
    };

    let count_sql = format!("SELECT COUNT(*) FROM doctors {where_clause}");
    let data_sql = format!(
        "SELECT * FROM doctors {where_clause} ORDER BY name ASC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, Doctor>(&data_sql);

    if let Some(pattern) = search {
        count_query = count_query.bind(pattern);
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Doctors scheduled on the given weekday, optionally only those marked available.
pub async fn working_on(
    pool: &PgPool,
    day: Weekday,
    available_only: bool,
    limit: i64,
) -> Result<Vec<DoctorHeader>, AppError> {
    let doctors = sqlx::query_as::<_, DoctorHeader>(
        r#"
        SELECT DISTINCT d.id, d.name, d.specialization, d.img, d.color_code, d.availability_status
        FROM doctors d
        JOIN working_days w ON w.doctor_id = d.id
        WHERE LOWER(w.day) = $1
          AND ($2 = false OR d.availability_status = 'available')
        ORDER BY d.name ASC
        LIMIT $3
        "#,
    )
    .bind(working_day_name(day))
    .bind(available_only)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(doctors)
}

/// Delete a doctor and the linked account.
pub async fn delete(pool: &PgPool, id: Uuid, actor_id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM users WHERE id = $1 AND role = 'DOCTOR'")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Doctor not found".to_string()));
    }

    audit::record(&mut tx, &CreateAuditLog::new(actor_id, id, "DELETE", "Doctor")).await?;
    tx.commit().await?;

    tracing::info!(doctor_id = %id, "Doctor deleted");
    Ok(())
}

/// Record a patient's rating of a doctor or staff member.
pub async fn create_rating(
    pool: &PgPool,
    input: &CreateRating,
    actor_id: Uuid,
) -> Result<Rating, AppError> {
    input.validate()?;

    let mut tx = pool.begin().await?;
    let rating = sqlx::query_as::<_, Rating>(
        r#"
        INSERT INTO ratings (staff_id, patient_id, rating, comment)
        VALUES ($1, $2, $3, $4)
        RETURNING id, staff_id, patient_id, rating, comment, created_at
        "#,
    )
    .bind(input.staff_id)
    .bind(input.patient_id)
    .bind(input.rating)
    .bind(&input.comment)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::NotFound("Rated member or patient not found".to_string())
        }
        _ => AppError::Database(e),
    })?;

    audit::record(&mut tx, &CreateAuditLog::new(actor_id, rating.id, "CREATE", "Rating")).await?;
    tx.commit().await?;

    Ok(rating)
}

/// Ratings received by a doctor or staff member with their rounded average.
pub async fn rating_summary(pool: &PgPool, staff_id: Uuid) -> Result<RatingSummary, AppError> {
    let ratings = sqlx::query_as::<_, Rating>(
        "SELECT id, staff_id, patient_id, rating, comment, created_at FROM ratings \
         WHERE staff_id = $1 ORDER BY created_at DESC",
    )
    .bind(staff_id)
    .fetch_all(pool)
    .await?;

    Ok(RatingSummary::from_ratings(ratings))
}
