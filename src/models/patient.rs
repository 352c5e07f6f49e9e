//! Patient profile model and registration DTOs.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Ten-digit phone number.
pub static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{10}$").unwrap_or_else(|e| panic!("invalid phone pattern: {e}"))
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "gender", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub marital_status: Option<String>,
    pub nutritional_status: Option<String>,
    pub emergency_contact_name: String,
    pub emergency_contact_number: Option<String>,
    pub relation: Option<String>,
    pub blood_group: Option<String>,
    pub allergies: Option<String>,
    pub medical_conditions: Option<String>,
    pub medical_history: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_number: Option<String>,
    pub privacy_consent: bool,
    pub service_consent: bool,
    pub medical_consent: bool,
    pub img: Option<String>,
    pub color_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact patient header embedded in dashboards and appointment views.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PatientHeader {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub phone: String,
    pub img: Option<String>,
    pub date_of_birth: NaiveDate,
    pub color_code: Option<String>,
}

/// Full profile with appointment activity.
#[derive(Debug, Clone, Serialize)]
pub struct PatientProfile {
    #[serde(flatten)]
    pub patient: Patient,
    pub total_appointments: i64,
    pub last_visit: Option<DateTime<Utc>>,
}

/// Registration and update payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PatientInput {
    #[validate(length(min = 2, max = 30, message = "First name must be 2 to 30 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 30, message = "Last name must be 2 to 30 characters"))]
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[validate(regex(path = *PHONE_REGEX, message = "Contact number must be 10 digits"))]
    pub phone: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 5, max = 500, message = "Address must be 5 to 500 characters"))]
    pub address: String,
    pub marital_status: Option<String>,
    pub nutritional_status: Option<String>,
    #[validate(length(
        min = 2,
        max = 50,
        message = "Emergency contact name must be 2 to 50 characters"
    ))]
    pub emergency_contact_name: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Emergency contact number must be 10 digits"))]
    pub emergency_contact_number: Option<String>,
    pub relation: Option<String>,
    pub blood_group: Option<String>,
    pub allergies: Option<String>,
    pub medical_conditions: Option<String>,
    pub medical_history: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_number: Option<String>,
    #[serde(default)]
    pub privacy_consent: bool,
    #[serde(default)]
    pub service_consent: bool,
    #[serde(default)]
    pub medical_consent: bool,
    pub img: Option<String>,
}

/// Staff-side registration: creates the login account alongside the profile.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterPatient {
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: PatientInput,
    #[validate(length(min = 6, message = "Password should be at least 6 characters long"))]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> PatientInput {
        PatientInput {
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            gender: Gender::Female,
            phone: "0801234567".to_string(),
            email: "ada@clinic.test".to_string(),
            address: "12 Marina Road".to_string(),
            marital_status: None,
            nutritional_status: None,
            emergency_contact_name: "Chidi Obi".to_string(),
            emergency_contact_number: Some("0807654321".to_string()),
            relation: Some("Brother".to_string()),
            blood_group: None,
            allergies: None,
            medical_conditions: None,
            medical_history: None,
            insurance_provider: None,
            insurance_number: None,
            privacy_consent: true,
            service_consent: true,
            medical_consent: true,
            img: None,
        }
    }

    #[test]
    fn valid_patient_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn phone_must_be_ten_digits() {
        let mut input = valid_input();
        input.phone = "08012".to_string();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));

        input.phone = "080123456a".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn short_names_rejected() {
        let mut input = valid_input();
        input.first_name = "A".to_string();
        input.emergency_contact_name = "B".to_string();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("emergency_contact_name"));
    }

    #[test]
    fn missing_emergency_number_is_allowed() {
        let mut input = valid_input();
        input.emergency_contact_number = None;
        assert!(input.validate().is_ok());
    }

    #[test]
    fn gender_serialization() {
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"MALE\"");
    }
}
