//! Billing: bill lines, bill generation and payment listings.

use serde_json::json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::appointment::AppointmentStatus;
use crate::models::audit::CreateAuditLog;
use crate::models::pagination::{search_condition, PagedResult, Pagination};
use crate::models::payment::{
    AddBill, GenerateBill, PatientBill, Payment, PaymentDetail, PaymentListItem,
};
use crate::services::audit;

const SEARCH_COLUMNS: &[&str] = &["p.first_name", "p.last_name", "pm.patient_id::text"];

/// The appointment's payment, created with zero amounts when absent.
async fn payment_for_appointment(
    conn: &mut PgConnection,
    appointment_id: i64,
) -> Result<i64, AppError> {
    let existing =
        sqlx::query_scalar::<_, i64>("SELECT id FROM payments WHERE appointment_id = $1")
            .bind(appointment_id)
            .fetch_optional(&mut *conn)
            .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let patient_id =
        sqlx::query_scalar::<_, Uuid>("SELECT patient_id FROM appointments WHERE id = $1")
            .bind(appointment_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO payments (patient_id, appointment_id, bill_date, payment_date,
                              discount, total_amount, amount_paid)
        VALUES ($1, $2, NOW(), NOW(), 0, 0, 0)
        RETURNING id
        "#,
    )
    .bind(patient_id)
    .bind(appointment_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// Add a service line to a bill.
pub async fn add_bill(pool: &PgPool, input: &AddBill, actor_id: Uuid) -> Result<PatientBill, AppError> {
    input.validate()?;

    let mut tx = pool.begin().await?;
    let bill_id = match input.bill_id {
        Some(id) => id,
        None => payment_for_appointment(&mut tx, input.appointment_id).await?,
    };

    let line = sqlx::query_as::<_, PatientBill>(
        r#"
        INSERT INTO patient_bills (bill_id, service_id, service_date, quantity, unit_cost, total_cost)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, bill_id, service_id, service_date, quantity, unit_cost, total_cost
        "#,
    )
    .bind(bill_id)
    .bind(input.service_id)
    .bind(input.service_date)
    .bind(input.quantity)
    .bind(input.unit_cost)
    .bind(input.total_cost)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::NotFound("Bill or service not found".to_string())
        }
        _ => AppError::Database(e),
    })?;

    audit::record(
        &mut tx,
        &CreateAuditLog::new(actor_id, line.id, "CREATE", "PatientBill")
            .with_details(json!({ "bill_id": bill_id })),
    )
    .await?;
    tx.commit().await?;

    Ok(line)
}

/// Finalize an appointment's bill and mark the appointment completed.
pub async fn generate_bill(
    pool: &PgPool,
    input: &GenerateBill,
    actor_id: Uuid,
) -> Result<Payment, AppError> {
    input.validate()?;

    let mut tx = pool.begin().await?;
    let payment_id = payment_for_appointment(&mut tx, input.appointment_id).await?;

    let payment = sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments SET bill_date = $2, discount = $3, total_amount = $4, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(payment_id)
    .bind(input.bill_date)
    .bind(input.discount_amount())
    .bind(input.total_amount)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE appointments SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(input.appointment_id)
        .bind(AppointmentStatus::Completed)
        .execute(&mut *tx)
        .await?;

    audit::record(
        &mut tx,
        &CreateAuditLog::new(actor_id, payment.id, "GENERATE_BILL", "Payment").with_details(json!({
            "appointment_id": input.appointment_id,
            "discount_percent": input.discount,
            "total_amount": input.total_amount,
        })),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(payment_id = payment.id, appointment_id = input.appointment_id, "Bill generated");
    Ok(payment)
}

/// The appointment's payment with its lines, if one exists.
pub async fn for_appointment(
    pool: &PgPool,
    appointment_id: i64,
) -> Result<Option<PaymentDetail>, AppError> {
    let Some(payment) =
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE appointment_id = $1")
            .bind(appointment_id)
            .fetch_optional(pool)
            .await?
    else {
        return Ok(None);
    };

    let bills = sqlx::query_as::<_, PatientBill>(
        "SELECT id, bill_id, service_id, service_date, quantity, unit_cost, total_cost \
         FROM patient_bills WHERE bill_id = $1 ORDER BY service_date ASC",
    )
    .bind(payment.id)
    .fetch_all(pool)
    .await?;

    Ok(Some(PaymentDetail { payment, bills }))
}

/// Paginated payments. `search` is an `ILIKE` pattern over patient name and id.
pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    pagination: &Pagination,
) -> Result<PagedResult<PaymentListItem>, AppError> {
    let where_clause = if search.is_some() {
        format!("WHERE {}", search_condition(SEARCH_COLUMNS, 1))
    } else {
        String::new()
    };

    let from = "FROM payments pm JOIN patients p ON p.id = pm.patient_id";
    let count_sql = format!("SELECT COUNT(*) {from} {where_clause}");
    let data_sql = format!(
        r#"
        SELECT pm.id, pm.patient_id, pm.appointment_id, pm.bill_date, pm.discount,
               pm.total_amount, pm.amount_paid, pm.status, pm.receipt_number, pm.created_at,
               p.first_name AS patient_first_name, p.last_name AS patient_last_name,
               p.img AS patient_img, p.color_code AS patient_color_code
        {from} {where_clause}
        ORDER BY pm.created_at DESC LIMIT {} OFFSET {}
        "#,
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, PaymentListItem>(&data_sql);

    if let Some(pattern) = search {
        count_query = count_query.bind(pattern);
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Delete a payment and its lines.
pub async fn delete(pool: &PgPool, id: i64, actor_id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM payments WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Payment not found".to_string()));
    }

    audit::record(&mut tx, &CreateAuditLog::new(actor_id, id, "DELETE", "Payment")).await?;
    tx.commit().await?;

    Ok(())
}
