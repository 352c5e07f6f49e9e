//! Payments (one bill per appointment) and their line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Mobile,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Part,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub patient_id: Uuid,
    pub appointment_id: i64,
    pub bill_date: DateTime<Utc>,
    pub payment_date: DateTime<Utc>,
    pub discount: f64,
    pub total_amount: f64,
    pub amount_paid: f64,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub receipt_number: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payment row for listings, joined with the patient name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PaymentListItem {
    pub id: i64,
    pub patient_id: Uuid,
    pub appointment_id: i64,
    pub bill_date: DateTime<Utc>,
    pub discount: f64,
    pub total_amount: f64,
    pub amount_paid: f64,
    pub status: PaymentStatus,
    pub receipt_number: i64,
    pub created_at: DateTime<Utc>,
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub patient_img: Option<String>,
    pub patient_color_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PatientBill {
    pub id: i64,
    pub bill_id: i64,
    pub service_id: i64,
    pub service_date: DateTime<Utc>,
    pub quantity: i32,
    pub unit_cost: f64,
    pub total_cost: f64,
}

/// Payment with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentDetail {
    #[serde(flatten)]
    pub payment: Payment,
    pub bills: Vec<PatientBill>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddBill {
    pub appointment_id: i64,
    /// Target payment; the appointment's own payment is used when absent.
    pub bill_id: Option<i64>,
    pub service_id: i64,
    pub service_date: DateTime<Utc>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(range(min = 0.0, message = "Unit cost cannot be negative"))]
    pub unit_cost: f64,
    #[validate(range(min = 0.0, message = "Total cost cannot be negative"))]
    pub total_cost: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateBill {
    pub appointment_id: i64,
    pub bill_date: DateTime<Utc>,
    /// Percentage of the total amount.
    #[validate(range(min = 0.0, max = 100.0, message = "Discount must be between 0 and 100"))]
    pub discount: f64,
    #[validate(range(min = 0.0, message = "Total amount cannot be negative"))]
    pub total_amount: f64,
}

impl GenerateBill {
    /// Discount amount derived from the percentage.
    pub fn discount_amount(&self) -> f64 {
        self.discount / 100.0 * self.total_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bill(discount: f64, total_amount: f64) -> GenerateBill {
        GenerateBill {
            appointment_id: 1,
            bill_date: Utc::now(),
            discount,
            total_amount,
        }
    }

    #[test]
    fn discount_percentage_becomes_amount() {
        assert_eq!(bill(10.0, 250.0).discount_amount(), 25.0);
        assert_eq!(bill(0.0, 250.0).discount_amount(), 0.0);
    }

    #[test]
    fn discount_over_hundred_rejected() {
        assert!(bill(120.0, 10.0).validate().is_err());
    }

    #[test]
    fn add_bill_requires_quantity() {
        let input = AddBill {
            appointment_id: 1,
            bill_id: None,
            service_id: 2,
            service_date: Utc::now(),
            quantity: 0,
            unit_cost: 10.0,
            total_cost: 0.0,
        };
        assert!(input.validate().is_err());
    }
}
