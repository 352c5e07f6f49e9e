//! Billable clinic services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "service_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceCategory {
    Consultation,
    LabTest,
    Vaccination,
    Procedure,
    Pharmacy,
    Diagnosis,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClinicService {
    pub id: i64,
    pub service_name: String,
    pub description: String,
    pub price: f64,
    pub category: ServiceCategory,
    pub duration: Option<i32>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClinicService {
    #[validate(length(min = 1, message = "Service name is required"))]
    pub service_name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    pub category: Option<ServiceCategory>,
    #[validate(range(min = 1, message = "Duration must be positive"))]
    pub duration: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serialization() {
        let json = serde_json::to_string(&ServiceCategory::LabTest).unwrap();
        assert_eq!(json, "\"LAB_TEST\"");
    }

    #[test]
    fn negative_price_rejected() {
        let input = CreateClinicService {
            service_name: "Malaria test".to_string(),
            description: "Rapid diagnostic test".to_string(),
            price: -5.0,
            category: Some(ServiceCategory::LabTest),
            duration: None,
        };
        assert!(input.validate().is_err());
    }
}
