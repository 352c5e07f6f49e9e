//! Audit trail writes and reads.

use sqlx::{PgConnection, PgPool};

use crate::errors::AppError;
use crate::models::audit::{AuditLog, CreateAuditLog};

/// Write an audit entry on the caller's connection, usually inside the
/// transaction that performs the audited change.
pub async fn record(conn: &mut PgConnection, entry: &CreateAuditLog) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO audit_log (user_id, record_id, action, model, details)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(entry.user_id)
    .bind(&entry.record_id)
    .bind(entry.action)
    .bind(entry.model)
    .bind(&entry.details)
    .execute(conn)
    .await?;
    Ok(())
}

/// Audit history of one record, newest first.
pub async fn history(
    pool: &PgPool,
    model: &str,
    record_id: &str,
) -> Result<Vec<AuditLog>, AppError> {
    let entries = sqlx::query_as::<_, AuditLog>(
        "SELECT * FROM audit_log WHERE model = $1 AND record_id = $2 ORDER BY created_at DESC, id DESC",
    )
    .bind(model)
    .bind(record_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}
