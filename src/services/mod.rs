//! Business logic services.

pub mod appointment;
pub mod appointment_stats;
pub mod audit;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod doctor;
pub mod medical;
pub mod patient;
pub mod payment;
pub mod session;
pub mod staff;
pub mod vitals;
