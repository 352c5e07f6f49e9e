//! Appointment statistics for dashboard charts.
//!
//! Folds a list of appointment summaries into per-status totals and a
//! month-by-month breakdown (January through the current month) of total and
//! completed appointments. The reference instant is supplied by the caller,
//! so the result depends only on the inputs.

use chrono::{DateTime, Datelike, Month, NaiveDate, TimeZone};
use serde::Serialize;

use crate::models::appointment::{AppointmentStatus, AppointmentSummary};

/// Appointment totals for each of the four statuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StatusCounts {
    pub scheduled: u64,
    pub pending: u64,
    pub completed: u64,
    pub cancelled: u64,
}

impl StatusCounts {
    pub fn get(&self, status: AppointmentStatus) -> u64 {
        match status {
            AppointmentStatus::Scheduled => self.scheduled,
            AppointmentStatus::Pending => self.pending,
            AppointmentStatus::Completed => self.completed,
            AppointmentStatus::Cancelled => self.cancelled,
        }
    }

    fn increment(&mut self, status: AppointmentStatus) {
        let slot = match status {
            AppointmentStatus::Scheduled => &mut self.scheduled,
            AppointmentStatus::Pending => &mut self.pending,
            AppointmentStatus::Completed => &mut self.completed,
            AppointmentStatus::Cancelled => &mut self.cancelled,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u64 {
        self.scheduled + self.pending + self.completed + self.cancelled
    }
}

/// One month of the chart series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    pub name: &'static str,
    pub appointment: u64,
    pub completed: u64,
}

/// Output of [`summarize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentStats {
    pub appointment_counts: StatusCounts,
    pub monthly_data: Vec<MonthlyBucket>,
    /// Records whose status is none of the four known values.
    pub unrecognized_statuses: u64,
}

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Three-letter abbreviation of a calendar month.
pub fn month_abbreviation(month: Month) -> &'static str {
    MONTH_ABBREVIATIONS[month.number_from_month() as usize - 1]
}

/// Summarize appointments relative to `reference_now`.
///
/// Every recognized status is counted regardless of date. Only appointments
/// dated from the start of the reference year through the end of the
/// reference month land in `monthly_data`; dates are read in the reference
/// instant's time zone.
pub fn summarize<Tz: TimeZone>(
    appointments: &[AppointmentSummary],
    reference_now: &DateTime<Tz>,
) -> AppointmentStats {
    let tz = reference_now.timezone();
    let year = reference_now.year();
    let current_month0 = reference_now.month0() as usize;

    let mut monthly_data: Vec<MonthlyBucket> = MONTH_ABBREVIATIONS[..=current_month0]
        .iter()
        .map(|name| MonthlyBucket {
            name,
            appointment: 0,
            completed: 0,
        })
        .collect();

    let window_end = end_of_month(year, reference_now.month());

    let mut appointment_counts = StatusCounts::default();
    let mut unrecognized_statuses = 0u64;

    for appointment in appointments {
        let status = AppointmentStatus::parse(&appointment.status);

        if let Some(date) = appointment.appointment_date {
            let local = date.with_timezone(&tz).naive_local();
            let in_window = local.year() == year && window_end.is_some_and(|end| local <= end);
            if in_window {
                if let Some(bucket) = monthly_data.get_mut(local.month0() as usize) {
                    bucket.appointment += 1;
                    if status == Some(AppointmentStatus::Completed) {
                        bucket.completed += 1;
                    }
                }
            }
        }

        match status {
            Some(status) => appointment_counts.increment(status),
            None => unrecognized_statuses += 1,
        }
    }

    if unrecognized_statuses > 0 {
        tracing::warn!(
            count = unrecognized_statuses,
            "Appointments with unrecognized status excluded from status counts"
        );
    }

    AppointmentStats {
        appointment_counts,
        monthly_data,
        unrecognized_statuses,
    }
}

/// Last representable instant of the given month, as local wall-clock time.
fn end_of_month(year: i32, month: u32) -> Option<chrono::NaiveDateTime> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    let last_day = first_of_next.pred_opt()?;
    last_day.and_hms_nano_opt(23, 59, 59, 999_999_999)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn record(y: i32, m: u32, d: u32, status: AppointmentStatus) -> AppointmentSummary {
        AppointmentSummary::new(at(y, m, d), status)
    }

    fn bucket(name: &'static str, appointment: u64, completed: u64) -> MonthlyBucket {
        MonthlyBucket {
            name,
            appointment,
            completed,
        }
    }

    #[test]
    fn empty_input_yields_zeroed_buckets_through_current_month() {
        let stats = summarize(&[], &at(2024, 3, 15));
        assert_eq!(stats.appointment_counts, StatusCounts::default());
        assert_eq!(
            stats.monthly_data,
            vec![bucket("Jan", 0, 0), bucket("Feb", 0, 0), bucket("Mar", 0, 0)]
        );
        assert_eq!(stats.unrecognized_statuses, 0);
    }

    #[test]
    fn december_reference_allocates_full_year() {
        let stats = summarize(&[], &at(2024, 12, 31));
        assert_eq!(stats.monthly_data.len(), 12);
        assert_eq!(stats.monthly_data[11].name, "Dec");
    }

    #[test]
    fn concrete_scenario() {
        let records = vec![
            record(2024, 1, 5, AppointmentStatus::Completed),
            record(2024, 1, 20, AppointmentStatus::Cancelled),
            record(2024, 3, 1, AppointmentStatus::Completed),
            record(2023, 12, 25, AppointmentStatus::Pending),
        ];
        let stats = summarize(&records, &at(2024, 3, 10));

        assert_eq!(
            stats.appointment_counts,
            StatusCounts {
                scheduled: 0,
                pending: 1,
                completed: 2,
                cancelled: 1,
            }
        );
        assert_eq!(
            stats.monthly_data,
            vec![bucket("Jan", 2, 1), bucket("Feb", 0, 0), bucket("Mar", 1, 1)]
        );
    }

    #[test]
    fn status_counts_ignore_order() {
        let mut records = vec![
            record(2024, 2, 1, AppointmentStatus::Scheduled),
            record(2024, 2, 2, AppointmentStatus::Pending),
            record(2022, 6, 3, AppointmentStatus::Completed),
            record(2025, 1, 4, AppointmentStatus::Cancelled),
            record(2024, 3, 5, AppointmentStatus::Completed),
        ];
        let now = at(2024, 3, 10);
        let forward = summarize(&records, &now);
        records.reverse();
        let backward = summarize(&records, &now);

        assert_eq!(forward.appointment_counts, backward.appointment_counts);
        assert_eq!(forward.appointment_counts.total(), 5);
    }

    #[test]
    fn future_month_and_prior_year_only_count_by_status() {
        let records = vec![
            record(2024, 4, 2, AppointmentStatus::Scheduled),
            record(2023, 3, 2, AppointmentStatus::Completed),
        ];
        let stats = summarize(&records, &at(2024, 3, 10));

        assert_eq!(stats.appointment_counts.scheduled, 1);
        assert_eq!(stats.appointment_counts.completed, 1);
        assert!(stats
            .monthly_data
            .iter()
            .all(|b| b.appointment == 0 && b.completed == 0));
    }

    #[test]
    fn later_days_of_current_month_are_included() {
        let records = vec![record(2024, 3, 31, AppointmentStatus::Pending)];
        let stats = summarize(&records, &at(2024, 3, 10));
        assert_eq!(stats.monthly_data[2].appointment, 1);
    }

    #[test]
    fn window_edges_are_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc
            .with_ymd_and_hms(2024, 2, 29, 23, 59, 59)
            .unwrap()
            + chrono::Duration::nanoseconds(999_999_999);
        let after = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let records = vec![
            AppointmentSummary::new(start, AppointmentStatus::Completed),
            AppointmentSummary::new(end, AppointmentStatus::Completed),
            AppointmentSummary::new(after, AppointmentStatus::Completed),
        ];
        let stats = summarize(&records, &at(2024, 2, 10));

        assert_eq!(stats.monthly_data, vec![bucket("Jan", 1, 1), bucket("Feb", 1, 1)]);
        assert_eq!(stats.appointment_counts.completed, 3);
    }

    #[test]
    fn unrecognized_status_fills_month_but_not_counts() {
        let records = vec![
            AppointmentSummary {
                appointment_date: Some(at(2024, 2, 14)),
                status: "NO_SHOW".to_string(),
            },
            record(2024, 2, 15, AppointmentStatus::Pending),
        ];
        let stats = summarize(&records, &at(2024, 3, 10));

        assert_eq!(stats.appointment_counts.total(), 1);
        assert_eq!(stats.unrecognized_statuses, 1);
        assert_eq!(stats.monthly_data[1], bucket("Feb", 2, 0));
    }

    #[test]
    fn missing_date_still_counts_status() {
        let records = vec![AppointmentSummary {
            appointment_date: None,
            status: "COMPLETED".to_string(),
        }];
        let stats = summarize(&records, &at(2024, 3, 10));

        assert_eq!(stats.appointment_counts.completed, 1);
        assert!(stats.monthly_data.iter().all(|b| b.appointment == 0));
    }

    #[test]
    fn completed_never_exceeds_total_per_bucket() {
        let statuses = AppointmentStatus::ALL;
        let records: Vec<AppointmentSummary> = (0..48)
            .map(|i| record(2024, (i % 6) + 1, (i % 27) + 1, statuses[i as usize % 4]))
            .collect();
        let stats = summarize(&records, &at(2024, 6, 30));

        for b in &stats.monthly_data {
            assert!(b.completed <= b.appointment, "{b:?}");
        }
        let monthly_total: u64 = stats.monthly_data.iter().map(|b| b.appointment).sum();
        assert_eq!(monthly_total, 48);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let records = vec![
            record(2024, 1, 5, AppointmentStatus::Completed),
            record(2024, 2, 5, AppointmentStatus::Scheduled),
        ];
        let now = at(2024, 2, 20);
        assert_eq!(summarize(&records, &now), summarize(&records, &now));
    }

    #[test]
    fn dates_are_bucketed_in_reference_time_zone() {
        // 2024-01-31 23:30 UTC is already February at UTC+02:00.
        let late_january_utc = Utc.with_ymd_and_hms(2024, 1, 31, 23, 30, 0).unwrap();
        let records = vec![AppointmentSummary::new(
            late_january_utc,
            AppointmentStatus::Scheduled,
        )];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = plus_two.with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap();

        let stats = summarize(&records, &now);
        assert_eq!(stats.monthly_data, vec![bucket("Jan", 0, 0), bucket("Feb", 1, 0)]);
    }

    #[test]
    fn status_counts_serialize_with_status_names() {
        let json = serde_json::to_value(StatusCounts {
            scheduled: 1,
            pending: 2,
            completed: 3,
            cancelled: 4,
        })
        .unwrap();
        assert_eq!(json["SCHEDULED"], 1);
        assert_eq!(json["PENDING"], 2);
        assert_eq!(json["COMPLETED"], 3);
        assert_eq!(json["CANCELLED"], 4);
    }

    #[test]
    fn month_abbreviations() {
        assert_eq!(month_abbreviation(Month::January), "Jan");
        assert_eq!(month_abbreviation(Month::September), "Sep");
    }
}
