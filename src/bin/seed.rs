//! Seed script for development. Populates a fresh database with sample clinic data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env).

use anyhow::Context;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use smartclinic::models::appointment::{
    AppointmentStatus, CreateAppointment, UpdateAppointmentStatus,
};
use smartclinic::models::catalog::{CreateClinicService, ServiceCategory};
use smartclinic::models::doctor::{CreateDoctor, JobType, WorkScheduleInput};
use smartclinic::models::patient::{Gender, PatientInput, RegisterPatient};
use smartclinic::models::staff::CreateStaff;
use smartclinic::models::user::{CreateUser, UserRole};
use smartclinic::services::{appointment, auth, catalog, doctor, patient, staff};
use sqlx::PgPool;
use uuid::Uuid;

const ADMIN_EMAIL: &str = "admin@smartclinic.local";
const ADMIN_PASSWORD: &str = "Admin123!";
const DEMO_PASSWORD: &str = "Demo123!";

const DOCTORS: &[(&str, &str, &str)] = &[
    ("Dr. Amara Nwosu", "amara.nwosu", "Cardiology"),
    ("Dr. Tunde Bello", "tunde.bello", "Pediatrics"),
    ("Dr. Leila Haddad", "leila.haddad", "General Practice"),
];

const PATIENTS: &[(&str, &str, Gender)] = &[
    ("Ada", "Obi", Gender::Female),
    ("Kofi", "Mensah", Gender::Male),
    ("Zainab", "Yusuf", Gender::Female),
    ("Emeka", "Eze", Gender::Male),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = smartclinic::db::create_pool(&db_url, 5).await?;
    smartclinic::db::run_migrations(&pool).await?;

    println!("=== SmartClinic Seed Script ===");

    let admin_id = seed_admin(&pool).await?;
    let patient_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patients")
        .fetch_one(&pool)
        .await?;
    if patient_count > 0 {
        println!("[skip] Clinic data already present ({patient_count} patients)");
        return Ok(());
    }

    let service_ids = seed_services(&pool, admin_id).await?;
    let doctor_ids = seed_doctors(&pool, admin_id).await?;
    seed_staff(&pool, admin_id).await?;
    let patient_ids = seed_patients(&pool, admin_id).await?;
    seed_appointments(&pool, admin_id, &patient_ids, &doctor_ids, &service_ids).await?;

    println!("\n=== Seed complete! ===");
    println!("Admin login: {ADMIN_EMAIL} / {ADMIN_PASSWORD}");
    println!("Doctor/staff/patient logins use password {DEMO_PASSWORD}");

    Ok(())
}

async fn seed_admin(pool: &PgPool) -> anyhow::Result<Uuid> {
    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(ADMIN_EMAIL)
        .fetch_optional(pool)
        .await?;

    if let Some(id) = existing {
        let hash = auth::hash_password(ADMIN_PASSWORD)?;
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(&hash)
            .bind(id)
            .execute(pool)
            .await?;
        println!("[done] Updated admin password");
        return Ok(id);
    }

    let admin = auth::create_user(
        pool,
        &CreateUser {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            name: "Clinic Administrator".to_string(),
            role: UserRole::Admin,
        },
    )
    .await?;
    println!("[done] Created admin user");
    Ok(admin.id)
}

async fn seed_services(pool: &PgPool, admin_id: Uuid) -> anyhow::Result<Vec<i64>> {
    let entries = [
        ("General Consultation", "Outpatient consultation", 50.0, ServiceCategory::Consultation),
        ("Full Blood Count", "Complete blood panel", 30.0, ServiceCategory::LabTest),
        ("Malaria Rapid Test", "Rapid diagnostic test", 15.0, ServiceCategory::LabTest),
        ("Tetanus Vaccine", "Tetanus toxoid injection", 20.0, ServiceCategory::Vaccination),
    ];

    let mut ids = Vec::with_capacity(entries.len());
    for (name, description, price, category) in entries {
        let service = catalog::create(
            pool,
            &CreateClinicService {
                service_name: name.to_string(),
                description: description.to_string(),
                price,
                category: Some(category),
                duration: Some(30),
            },
            admin_id,
        )
        .await?;
        ids.push(service.id);
    }
    println!("[done] Created {} services", ids.len());
    Ok(ids)
}

fn weekday_schedule() -> Vec<WorkScheduleInput> {
    ["monday", "tuesday", "wednesday", "thursday", "friday"]
        .into_iter()
        .map(|day| WorkScheduleInput {
            day: day.to_string(),
            start_time: "08:00".to_string(),
            close_time: "17:00".to_string(),
        })
        .collect()
}

async fn seed_doctors(pool: &PgPool, admin_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(DOCTORS.len());
    for (i, (name, handle, specialization)) in DOCTORS.iter().enumerate() {
        let doctor = doctor::create(
            pool,
            &CreateDoctor {
                name: name.to_string(),
                email: format!("{handle}@smartclinic.local"),
                password: DEMO_PASSWORD.to_string(),
                specialization: specialization.to_string(),
                license_number: format!("MDC-{:04}", i + 1),
                phone: format!("080000000{i}"),
                address: "1 Clinic Avenue".to_string(),
                department: Some(specialization.to_string()),
                img: None,
                job_type: JobType::Full,
                work_schedule: weekday_schedule(),
            },
            admin_id,
        )
        .await?;
        ids.push(doctor.id);
    }
    println!("[done] Created {} doctors", ids.len());
    Ok(ids)
}

async fn seed_staff(pool: &PgPool, admin_id: Uuid) -> anyhow::Result<()> {
    staff::create(
        pool,
        &CreateStaff {
            name: "Grace Nurse".to_string(),
            email: "grace.nurse@smartclinic.local".to_string(),
            password: DEMO_PASSWORD.to_string(),
            phone: "0801111111".to_string(),
            address: "2 Ward Road".to_string(),
            department: Some("Outpatients".to_string()),
            img: None,
            license_number: Some("RN-0001".to_string()),
            hire_date: NaiveDate::from_ymd_opt(2022, 1, 10),
            salary: Some(1800.0),
            role: Some(UserRole::Staff),
        },
        admin_id,
    )
    .await?;
    println!("[done] Created staff member");
    Ok(())
}

async fn seed_patients(pool: &PgPool, admin_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(PATIENTS.len());
    for (i, (first, last, gender)) in PATIENTS.iter().enumerate() {
        let profile = PatientInput {
            first_name: first.to_string(),
            last_name: last.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1980 + i as i32 * 5, 3, 14)
                .context("invalid seed birth date")?,
            gender: *gender,
            phone: format!("081000000{i}"),
            email: format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
            address: format!("{} Market Street", 10 + i),
            marital_status: None,
            nutritional_status: None,
            emergency_contact_name: "Next Of Kin".to_string(),
            emergency_contact_number: Some("0809999999".to_string()),
            relation: Some("Sibling".to_string()),
            blood_group: Some("O+".to_string()),
            allergies: None,
            medical_conditions: None,
            medical_history: None,
            insurance_provider: None,
            insurance_number: None,
            privacy_consent: true,
            service_consent: true,
            medical_consent: true,
            img: None,
        };
        let created = patient::register(
            pool,
            &RegisterPatient {
                profile,
                password: Some(DEMO_PASSWORD.to_string()),
            },
            admin_id,
        )
        .await?;
        ids.push(created.id);
    }
    println!("[done] Created {} patients", ids.len());
    Ok(ids)
}

/// Spread appointments over the current year so the dashboard charts have data.
async fn seed_appointments(
    pool: &PgPool,
    admin_id: Uuid,
    patient_ids: &[Uuid],
    doctor_ids: &[Uuid],
    service_ids: &[i64],
) -> anyhow::Result<()> {
    let now = Utc::now();
    let days_into_year = i64::from(now.ordinal0());
    let statuses = AppointmentStatus::ALL;
    let mut created = 0usize;

    for i in 0..24usize {
        let offset = (i as i64 * 13) % (days_into_year + 30);
        let date = now - Duration::days(days_into_year) + Duration::days(offset);

        let booked = appointment::create(
            pool,
            &CreateAppointment {
                patient_id: patient_ids[i % patient_ids.len()],
                doctor_id: doctor_ids[i % doctor_ids.len()],
                service_id: service_ids.get(i % service_ids.len()).copied(),
                appointment_date: date,
                time: format!("{:02}:00", 8 + i % 8),
                appointment_type: "Consultation".to_string(),
                note: None,
            },
            admin_id,
        )
        .await?;

        let status = statuses[i % statuses.len()];
        if status != AppointmentStatus::Pending {
            appointment::update_status(
                pool,
                booked.id,
                &UpdateAppointmentStatus {
                    status,
                    reason: Some("Seeded".to_string()),
                },
                admin_id,
            )
            .await?;
        }
        created += 1;
    }

    println!("[done] Created {created} appointments");
    Ok(())
}
