//! Staff management.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::audit::CreateAuditLog;
use crate::models::pagination::{search_condition, PagedResult, Pagination};
use crate::models::staff::{CreateStaff, Staff};
use crate::services::{audit, auth};

const SEARCH_COLUMNS: &[&str] = &["name", "phone", "email"];

/// Create a staff account and profile.
pub async fn create(pool: &PgPool, input: &CreateStaff, actor_id: Uuid) -> Result<Staff, AppError> {
    input.validate()?;
    let role = input.role();

    let mut tx = pool.begin().await?;
    let user = auth::insert_user(&mut tx, &input.email, &input.name, &input.password, role).await?;

    let staff = sqlx::query_as::<_, Staff>(
        r#"
        INSERT INTO staff (
            id, email, name, phone, address, department, img, license_number,
            color_code, hire_date, salary, role
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&input.name)
    .bind(&input.phone)
    .bind(&input.address)
    .bind(&input.department)
    .bind(&input.img)
    .bind(&input.license_number)
    .bind(auth::generate_color_code())
    .bind(input.hire_date)
    .bind(input.salary)
    .bind(role)
    .fetch_one(&mut *tx)
    .await?;

    audit::record(&mut tx, &CreateAuditLog::new(actor_id, staff.id, "CREATE", "Staff")).await?;
    tx.commit().await?;

    tracing::info!(staff_id = %staff.id, role = role.as_str(), "Staff member created");
    Ok(staff)
}

/// Paginated staff list. `search` is an `ILIKE` pattern over name, phone and email.
pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    pagination: &Pagination,
) -> Result<PagedResult<Staff>, AppError> {
    let where_clause = if search.is_some() {
        format!("WHERE {}", search_condition(SEARCH_COLUMNS, 1))
    } else {
        String::new()
    };

    let count_sql = format!("SELECT COUNT(*) FROM staff {where_clause}");
    let data_sql = format!(
        "SELECT * FROM staff {where_clause} ORDER BY name ASC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, Staff>(&data_sql);

    if let Some(pattern) = search {
        count_query = count_query.bind(pattern);
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Delete a staff member and the linked account.
pub async fn delete(pool: &PgPool, id: Uuid, actor_id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let profile_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM staff WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

    if !profile_exists {
        return Err(AppError::NotFound("Staff member not found".to_string()));
    }

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    audit::record(&mut tx, &CreateAuditLog::new(actor_id, id, "DELETE", "Staff")).await?;
    tx.commit().await?;

    tracing::info!(staff_id = %id, "Staff member deleted");
    Ok(())
}
