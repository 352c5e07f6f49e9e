//! Medical records with their diagnoses, lab tests and vital signs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MedicalRecord {
    pub id: i64,
    pub patient_id: Uuid,
    pub appointment_id: i64,
    pub doctor_id: Uuid,
    pub treatment_plan: Option<String>,
    pub prescriptions: Option<String>,
    pub lab_request: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Medical record row for paginated listings, joined with the patient name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MedicalRecordListItem {
    pub id: i64,
    pub patient_id: Uuid,
    pub appointment_id: i64,
    pub doctor_id: Uuid,
    pub treatment_plan: Option<String>,
    pub prescriptions: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub patient_img: Option<String>,
    pub patient_color_code: Option<String>,
    pub diagnosis_count: i64,
    pub lab_test_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Diagnosis {
    pub id: i64,
    pub patient_id: Uuid,
    pub medical_id: i64,
    pub doctor_id: Uuid,
    pub symptoms: String,
    pub diagnosis: String,
    pub notes: Option<String>,
    pub prescribed_medications: Option<String>,
    pub follow_up_plan: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VitalSigns {
    pub id: i64,
    pub patient_id: Uuid,
    pub medical_id: i64,
    pub body_temperature: f64,
    pub systolic: i32,
    pub diastolic: i32,
    /// Range as recorded, e.g. `"72-80"`.
    pub heart_rate: String,
    pub respiratory_rate: Option<i32>,
    pub oxygen_saturation: Option<i32>,
    pub weight: f64,
    pub height: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LabTest {
    pub id: i64,
    pub record_id: i64,
    pub service_id: i64,
    pub test_date: DateTime<Utc>,
    pub result: String,
    pub status: String,
    pub notes: Option<String>,
}

/// Medical record bundled with its clinical detail.
#[derive(Debug, Clone, Serialize)]
pub struct MedicalRecordDetail {
    #[serde(flatten)]
    pub record: MedicalRecord,
    pub diagnoses: Vec<Diagnosis>,
    pub lab_tests: Vec<LabTest>,
    pub vital_signs: Vec<VitalSigns>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDiagnosis {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_id: i64,
    /// Existing record to attach to; a new one is opened when absent.
    pub medical_id: Option<i64>,
    #[validate(length(min = 1, message = "Symptoms are required"))]
    pub symptoms: String,
    #[validate(length(min = 1, message = "Diagnosis is required"))]
    pub diagnosis: String,
    pub notes: Option<String>,
    pub prescribed_medications: Option<String>,
    pub follow_up_plan: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVitalSigns {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_id: i64,
    pub medical_id: Option<i64>,
    #[validate(range(min = 25.0, max = 45.0, message = "Body temperature out of range"))]
    pub body_temperature: f64,
    #[validate(range(min = 1, message = "Systolic must be positive"))]
    pub systolic: i32,
    #[validate(range(min = 1, message = "Diastolic must be positive"))]
    pub diastolic: i32,
    #[validate(length(min = 1, message = "Heart rate is required"))]
    pub heart_rate: String,
    pub respiratory_rate: Option<i32>,
    pub oxygen_saturation: Option<i32>,
    #[validate(range(min = 0.0, message = "Weight cannot be negative"))]
    pub weight: f64,
    #[validate(range(min = 0.0, message = "Height cannot be negative"))]
    pub height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vital_signs_reject_implausible_temperature() {
        let input = CreateVitalSigns {
            patient_id: Uuid::nil(),
            doctor_id: Uuid::nil(),
            appointment_id: 1,
            medical_id: None,
            body_temperature: 99.0,
            systolic: 120,
            diastolic: 80,
            heart_rate: "70-80".to_string(),
            respiratory_rate: None,
            oxygen_saturation: None,
            weight: 70.0,
            height: 175.0,
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("body_temperature"));
    }

    #[test]
    fn diagnosis_requires_text() {
        let input = CreateDiagnosis {
            patient_id: Uuid::nil(),
            doctor_id: Uuid::nil(),
            appointment_id: 1,
            medical_id: None,
            symptoms: String::new(),
            diagnosis: "Malaria".to_string(),
            notes: None,
            prescribed_medications: None,
            follow_up_plan: None,
        };
        assert!(input.validate().is_err());
    }
}
