//! Appointment model, status enum, and the summary shape used by dashboards.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "appointment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Pending,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        Self::Scheduled,
        Self::Pending,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Exact match against the four stored status names.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

/// Full appointment row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub service_id: Option<i64>,
    pub appointment_date: DateTime<Utc>,
    pub time: String,
    pub status: AppointmentStatus,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub appointment_type: String,
    pub note: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal record fed to the statistics aggregator.
///
/// The status is kept as the raw stored string so values outside the
/// four known statuses can still be observed and reported.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AppointmentSummary {
    pub appointment_date: Option<DateTime<Utc>>,
    pub status: String,
}

impl AppointmentSummary {
    pub fn new(appointment_date: DateTime<Utc>, status: AppointmentStatus) -> Self {
        Self {
            appointment_date: Some(appointment_date),
            status: status.as_str().to_string(),
        }
    }
}

/// Appointment list row joined with patient and doctor headers.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AppointmentListItem {
    pub id: i64,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub appointment_type: String,
    pub appointment_date: DateTime<Utc>,
    pub time: String,
    pub status: AppointmentStatus,
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub patient_phone: String,
    pub patient_gender: crate::models::patient::Gender,
    pub patient_img: Option<String>,
    pub patient_date_of_birth: NaiveDate,
    pub patient_color_code: Option<String>,
    pub doctor_name: String,
    pub doctor_specialization: String,
    pub doctor_img: Option<String>,
    pub doctor_color_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub service_id: Option<i64>,
    pub appointment_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "Time is required"))]
    pub time: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Appointment type is required"))]
    pub appointment_type: String,
    #[validate(length(max = 500, message = "Note must be at most 500 characters"))]
    pub note: Option<String>,
}

/// Request body for changing an appointment's status.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAppointmentStatus {
    pub status: AppointmentStatus,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_exact() {
        assert_eq!(
            AppointmentStatus::parse("COMPLETED"),
            Some(AppointmentStatus::Completed)
        );
        assert_eq!(AppointmentStatus::parse("completed"), None);
        assert_eq!(AppointmentStatus::parse("NO_SHOW"), None);
    }

    #[test]
    fn status_round_trips_through_as_str() {
        for status in AppointmentStatus::ALL {
            assert_eq!(AppointmentStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn status_serializes_screaming_case() {
        let json = serde_json::to_string(&AppointmentStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }

    #[test]
    fn create_appointment_reads_type_field() {
        let input: CreateAppointment = serde_json::from_value(serde_json::json!({
            "patient_id": Uuid::nil(),
            "doctor_id": Uuid::nil(),
            "appointment_date": "2024-03-01T09:00:00Z",
            "time": "09:00",
            "type": "Consultation"
        }))
        .unwrap();
        assert_eq!(input.appointment_type, "Consultation");
        assert!(input.validate().is_ok());
    }
}
