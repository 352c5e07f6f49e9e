//! Billing routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::{RequireAdmin, RequireClinician};
use crate::models::pagination::{PagedResult, Pagination, SearchQuery};
use crate::models::payment::{AddBill, GenerateBill, PatientBill, Payment, PaymentListItem};
use crate::services::payment as payment_service;
use crate::AppState;

/// GET /api/v1/payments (doctor or admin)
pub async fn list(
    State(state): State<AppState>,
    RequireClinician(_user): RequireClinician,
    Query(pagination): Query<Pagination>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<ApiResponse<PagedResult<PaymentListItem>>>, AppError> {
    let pattern = search.pattern();
    let result = payment_service::list(&state.db, pattern.as_deref(), &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/payments/bills: add a service line (doctor or admin).
pub async fn add_bill(
    State(state): State<AppState>,
    RequireClinician(clinician): RequireClinician,
    Json(body): Json<AddBill>,
) -> Result<Json<ApiResponse<PatientBill>>, AppError> {
    let line = payment_service::add_bill(&state.db, &body, clinician.id).await?;
    Ok(ApiResponse::success(line))
}

/// POST /api/v1/payments/generate: finalize the bill (doctor or admin).
pub async fn generate_bill(
    State(state): State<AppState>,
    RequireClinician(clinician): RequireClinician,
    Json(body): Json<GenerateBill>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let payment = payment_service::generate_bill(&state.db, &body, clinician.id).await?;
    Ok(ApiResponse::success(payment))
}

/// DELETE /api/v1/payments/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    payment_service::delete(&state.db, id, admin.id).await?;
    Ok(ApiResponse::success("Payment deleted"))
}
