//! Catalog of billable clinic services.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::audit::CreateAuditLog;
use crate::models::catalog::{ClinicService, CreateClinicService, ServiceCategory};
use crate::services::audit;

/// All services ordered by name.
pub async fn list(pool: &PgPool) -> Result<Vec<ClinicService>, AppError> {
    let services =
        sqlx::query_as::<_, ClinicService>("SELECT * FROM services ORDER BY service_name ASC")
            .fetch_all(pool)
            .await?;
    Ok(services)
}

/// Add a service to the catalog.
pub async fn create(
    pool: &PgPool,
    input: &CreateClinicService,
    actor_id: Uuid,
) -> Result<ClinicService, AppError> {
    input.validate()?;

    let mut tx = pool.begin().await?;
    let service = sqlx::query_as::<_, ClinicService>(
        r#"
        INSERT INTO services (service_name, description, price, category, duration)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(input.service_name.trim())
    .bind(&input.description)
    .bind(input.price)
    .bind(input.category.unwrap_or(ServiceCategory::Other))
    .bind(input.duration)
    .fetch_one(&mut *tx)
    .await?;

    audit::record(&mut tx, &CreateAuditLog::new(actor_id, service.id, "CREATE", "Service")).await?;
    tx.commit().await?;

    Ok(service)
}
