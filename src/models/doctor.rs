//! Doctor profiles, weekly working schedule and ratings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::patient::PHONE_REGEX;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "job_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    Full,
    Part,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Doctor {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub specialization: String,
    pub license_number: String,
    pub phone: String,
    pub address: String,
    pub department: Option<String>,
    pub img: Option<String>,
    pub color_code: Option<String>,
    pub availability_status: Option<String>,
    pub job_type: JobType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Doctor card shown in "working today" widgets.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DoctorHeader {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    pub img: Option<String>,
    pub color_code: Option<String>,
    pub availability_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkingDay {
    pub id: i64,
    pub doctor_id: Uuid,
    pub day: String,
    pub start_time: String,
    pub close_time: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WorkScheduleInput {
    #[validate(length(min = 1, message = "Day is required"))]
    pub day: String,
    #[validate(length(min = 1, message = "Start time is required"))]
    pub start_time: String,
    #[validate(length(min = 1, message = "Close time is required"))]
    pub close_time: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDoctor {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password should be at least 6 characters long"))]
    pub password: String,
    #[validate(length(min = 2, message = "Specialization is required"))]
    pub specialization: String,
    #[validate(length(min = 2, message = "License number is required"))]
    pub license_number: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Contact must be 10 digits"))]
    pub phone: String,
    #[validate(length(min = 5, max = 500, message = "Address must be 5 to 500 characters"))]
    pub address: String,
    pub department: Option<String>,
    pub img: Option<String>,
    pub job_type: JobType,
    #[validate(nested)]
    #[serde(default)]
    pub work_schedule: Vec<WorkScheduleInput>,
}

/// Doctor detail with schedule and recent activity.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorDetail {
    pub doctor: Doctor,
    pub working_days: Vec<WorkingDay>,
    pub appointments: Vec<crate::models::appointment::Appointment>,
    pub total_appointments: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rating {
    pub id: i64,
    pub staff_id: Uuid,
    pub patient_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRating {
    pub staff_id: Uuid,
    pub patient_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(min = 1, max = 500, message = "Comment must be 1 to 500 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingSummary {
    pub total_ratings: usize,
    pub average_rating: f64,
    pub ratings: Vec<Rating>,
}

impl RatingSummary {
    pub fn from_ratings(ratings: Vec<Rating>) -> Self {
        let total_ratings = ratings.len();
        let average_rating = if total_ratings == 0 {
            0.0
        } else {
            let sum: i64 = ratings.iter().map(|r| i64::from(r.rating)).sum();
            (sum as f64 / total_ratings as f64 * 10.0).round() / 10.0
        };
        Self {
            total_ratings,
            average_rating,
            ratings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(stars: i32) -> Rating {
        Rating {
            id: 1,
            staff_id: Uuid::nil(),
            patient_id: Uuid::nil(),
            rating: stars,
            comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rating_average_rounds_to_one_decimal() {
        let summary = RatingSummary::from_ratings(vec![rating(5), rating(4), rating(4)]);
        assert_eq!(summary.total_ratings, 3);
        assert_eq!(summary.average_rating, 4.3);
    }

    #[test]
    fn empty_ratings_average_zero() {
        let summary = RatingSummary::from_ratings(vec![]);
        assert_eq!(summary.total_ratings, 0);
        assert_eq!(summary.average_rating, 0.0);
    }

    #[test]
    fn rating_out_of_range_rejected() {
        let input = CreateRating {
            staff_id: Uuid::nil(),
            patient_id: Uuid::nil(),
            rating: 6,
            comment: Some("Great".to_string()),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn create_doctor_validates_schedule() {
        let input: CreateDoctor = serde_json::from_value(serde_json::json!({
            "name": "Dr. Bola Ade",
            "email": "bola@clinic.test",
            "password": "secret1",
            "specialization": "Cardiology",
            "license_number": "LIC-001",
            "phone": "0801234567",
            "address": "4 Hospital Way",
            "job_type": "FULL",
            "work_schedule": [{ "day": "", "start_time": "08:00", "close_time": "17:00" }]
        }))
        .unwrap();
        assert!(input.validate().is_err());
    }
}
