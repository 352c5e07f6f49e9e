//! Route definitions for the SmartClinic API.

pub mod appointments;
pub mod audit;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod doctors;
pub mod health;
pub mod medical_records;
pub mod patients;
pub mod payments;
pub mod staff;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Maximum accepted request body.
const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let origin = match frontend_url.parse::<HeaderValue>() {
        Ok(value) => AllowOrigin::exact(value),
        Err(e) => {
            tracing::warn!(error = %e, frontend_url, "Invalid FRONTEND_URL, CORS will reject browser origins");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/users", post(auth::create_user))
        .route("/auth/me", get(auth::me))
        .route("/dashboard/admin", get(dashboard::admin))
        .route("/dashboard/doctor", get(dashboard::doctor))
        .route("/dashboard/patient", get(dashboard::patient))
        .route("/patients", get(patients::list).post(patients::register))
        .route("/patients/me", post(patients::complete_registration))
        .route("/patients/profile/{key}", get(patients::full_profile))
        .route(
            "/patients/{id}",
            get(patients::get_by_id)
                .put(patients::update)
                .delete(patients::delete),
        )
        .route("/patients/{id}/vitals", get(patients::vital_summary))
        .route("/doctors", get(doctors::list).post(doctors::create))
        .route("/doctors/available", get(doctors::available))
        .route(
            "/doctors/{id}",
            get(doctors::get_by_id).delete(doctors::delete),
        )
        .route("/ratings", post(doctors::create_rating))
        .route("/ratings/{staff_id}", get(doctors::rating_summary))
        .route("/staff", get(staff::list).post(staff::create))
        .route("/staff/{id}", axum::routing::delete(staff::delete))
        .route("/services", get(catalog::list).post(catalog::create))
        .route(
            "/appointments",
            get(appointments::list).post(appointments::create),
        )
        .route("/appointments/{id}", get(appointments::get_by_id))
        .route(
            "/appointments/{id}/records",
            get(appointments::get_with_records),
        )
        .route(
            "/appointments/{id}/status",
            patch(appointments::update_status),
        )
        .route("/medical-records", get(medical_records::list))
        .route(
            "/medical-records/diagnoses",
            post(medical_records::add_diagnosis),
        )
        .route(
            "/medical-records/vital-signs",
            post(medical_records::add_vital_signs),
        )
        .route("/payments", get(payments::list))
        .route("/payments/bills", post(payments::add_bill))
        .route("/payments/generate", post(payments::generate_bill))
        .route("/payments/{id}", axum::routing::delete(payments::delete))
        .route("/audit/{model}/{record_id}", get(audit::history))
}

/// Full application router with middleware layers applied.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.frontend_url);

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use crate::config::AppConfig;

    fn test_state() -> AppState {
        let config = AppConfig {
            database_url: "postgres://localhost/smartclinic_unused".to_string(),
            database_max_connections: 1,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "router-test-secret".to_string(),
            jwt_access_token_expiry_secs: 900,
            jwt_refresh_token_expiry_secs: 604800,
            frontend_url: "http://localhost:3001".to_string(),
            clinic_utc_offset_minutes: 0,
            tls_cert_path: None,
            tls_key_path: None,
        };
        AppState {
            db: sqlx::postgres::PgPoolOptions::new()
                .connect_lazy(&config.database_url)
                .unwrap(),
            redis: redis::Client::open(config.redis_url.as_str()).unwrap(),
            config,
        }
    }

    #[tokio::test]
    async fn liveness_through_full_layer_stack() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .header(header::ACCEPT_ENCODING, "gzip")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn oversized_json_body_rejected() {
        let app = build_router(test_state());
        let padding = "a".repeat(BODY_LIMIT_BYTES + 1);
        let body = format!(r#"{{"email":"a@b.test","password":"{padding}"}}"#);
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
