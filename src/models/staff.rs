//! Staff member model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::patient::PHONE_REGEX;
use crate::models::user::UserRole;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "staff_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffStatus {
    Active,
    Inactive,
    Dormant,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Staff {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub department: Option<String>,
    pub img: Option<String>,
    pub license_number: Option<String>,
    pub color_code: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub salary: Option<f64>,
    pub role: UserRole,
    pub status: StaffStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStaff {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password should be at least 6 characters long"))]
    pub password: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Contact must be 10 digits"))]
    pub phone: String,
    #[validate(length(min = 5, max = 500, message = "Address must be 5 to 500 characters"))]
    pub address: String,
    pub department: Option<String>,
    pub img: Option<String>,
    pub license_number: Option<String>,
    pub hire_date: Option<NaiveDate>,
    #[validate(range(min = 0.0, message = "Salary cannot be negative"))]
    pub salary: Option<f64>,
    /// Defaults to STAFF; only STAFF and DOCTOR accounts are created here.
    pub role: Option<UserRole>,
}

impl CreateStaff {
    pub fn role(&self) -> UserRole {
        match self.role {
            Some(UserRole::Doctor) => UserRole::Doctor,
            _ => UserRole::Staff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(role: Option<UserRole>) -> CreateStaff {
        CreateStaff {
            name: "Nkem Nurse".to_string(),
            email: "nkem@clinic.test".to_string(),
            password: "secret1".to_string(),
            phone: "0801112222".to_string(),
            address: "7 Ward Street".to_string(),
            department: Some("Ward B".to_string()),
            img: None,
            license_number: None,
            hire_date: None,
            salary: Some(1500.0),
            role,
        }
    }

    #[test]
    fn staff_role_defaults_to_staff() {
        assert_eq!(input(None).role(), UserRole::Staff);
        assert_eq!(input(Some(UserRole::Admin)).role(), UserRole::Staff);
        assert_eq!(input(Some(UserRole::Doctor)).role(), UserRole::Doctor);
    }

    #[test]
    fn negative_salary_rejected() {
        let mut staff = input(None);
        staff.salary = Some(-1.0);
        assert!(staff.validate().is_err());
    }
}
