//! Database models and DTOs for all clinic entities.

pub mod appointment;
pub mod audit;
pub mod catalog;
pub mod doctor;
pub mod medical;
pub mod pagination;
pub mod patient;
pub mod payment;
pub mod staff;
pub mod user;
