//! Seven-day vital signs summary for the patient chart widgets.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::models::medical::VitalSigns;
use crate::services::appointment_stats::month_abbreviation;

/// Days of history covered by the summary.
pub const SUMMARY_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BloodPressurePoint {
    pub label: String,
    pub systolic: i32,
    pub diastolic: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartRatePoint {
    pub label: String,
    pub value1: f64,
    pub value2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VitalSummary {
    pub blood_pressure: Vec<BloodPressurePoint>,
    pub heart_rate: Vec<HeartRatePoint>,
    /// `"S.SS/D.DD mg/dL"`
    pub average_blood_pressure: String,
    /// `"A.AA-B.BB bpm"`
    pub average_heart_rate: String,
}

/// Start of the summary window: local midnight `SUMMARY_WINDOW_DAYS` days before `now`.
pub fn window_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let midnight = (now.date_naive() - Duration::days(SUMMARY_WINDOW_DAYS)).and_time(NaiveTime::MIN);
    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| now.with_timezone(&Utc) - Duration::days(SUMMARY_WINDOW_DAYS))
}

/// Chart label such as `"Mar 7"`.
pub fn day_label(at: DateTime<Utc>) -> String {
    let month = chrono::Month::try_from(at.month() as u8).unwrap_or(chrono::Month::January);
    format!("{} {}", month_abbreviation(month), at.day())
}

/// Split a `"low-high"` heart-rate range. Unparsable parts read as zero.
pub fn parse_heart_rate(range: &str) -> (f64, f64) {
    let mut parts = range.splitn(2, '-').map(|p| p.trim().parse::<f64>().unwrap_or(0.0));
    let low = parts.next().unwrap_or(0.0);
    let high = parts.next().unwrap_or(0.0);
    (low, high)
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Build chart series and averages from readings ordered oldest first.
pub fn summarize_vitals(readings: &[VitalSigns]) -> VitalSummary {
    let blood_pressure: Vec<BloodPressurePoint> = readings
        .iter()
        .map(|r| BloodPressurePoint {
            label: day_label(r.created_at),
            systolic: r.systolic,
            diastolic: r.diastolic,
        })
        .collect();

    let heart_rate: Vec<HeartRatePoint> = readings
        .iter()
        .map(|r| {
            let (value1, value2) = parse_heart_rate(&r.heart_rate);
            HeartRatePoint {
                label: day_label(r.created_at),
                value1,
                value2,
            }
        })
        .collect();

    let count = readings.len();
    let systolic = mean(blood_pressure.iter().map(|p| f64::from(p.systolic)).sum(), count);
    let diastolic = mean(blood_pressure.iter().map(|p| f64::from(p.diastolic)).sum(), count);
    let low = mean(heart_rate.iter().map(|p| p.value1).sum(), count);
    let high = mean(heart_rate.iter().map(|p| p.value2).sum(), count);

    VitalSummary {
        blood_pressure,
        heart_rate,
        average_blood_pressure: format!("{systolic:.2}/{diastolic:.2} mg/dL"),
        average_heart_rate: format!("{low:.2}-{high:.2} bpm"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use uuid::Uuid;

    #[test]
    fn window_starts_at_local_midnight_seven_days_back() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap();
        let start = window_start(&now);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 2, 22, 0, 0).unwrap());

        // A reading early on the first day of the window is kept.
        let early_reading = offset.with_ymd_and_hms(2024, 3, 3, 8, 0, 0).unwrap();
        assert!(early_reading.with_timezone(&Utc) >= start);
        let day_before = offset.with_ymd_and_hms(2024, 3, 2, 23, 59, 0).unwrap();
        assert!(day_before.with_timezone(&Utc) < start);
    }

    #[test]
    fn window_start_in_utc() {
        let now = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 1).unwrap();
        assert_eq!(
            window_start(&now),
            Utc.with_ymd_and_hms(2023, 12, 29, 0, 0, 0).unwrap()
        );
    }

    fn reading(day: u32, systolic: i32, diastolic: i32, heart_rate: &str) -> VitalSigns {
        VitalSigns {
            id: i64::from(day),
            patient_id: Uuid::nil(),
            medical_id: 1,
            body_temperature: 36.6,
            systolic,
            diastolic,
            heart_rate: heart_rate.to_string(),
            respiratory_rate: None,
            oxygen_saturation: None,
            weight: 70.0,
            height: 170.0,
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn no_readings_gives_zero_averages() {
        let summary = summarize_vitals(&[]);
        assert!(summary.blood_pressure.is_empty());
        assert_eq!(summary.average_blood_pressure, "0.00/0.00 mg/dL");
        assert_eq!(summary.average_heart_rate, "0.00-0.00 bpm");
    }

    #[test]
    fn averages_and_labels() {
        let summary = summarize_vitals(&[
            reading(5, 120, 80, "70-80"),
            reading(7, 130, 85, "75-90"),
        ]);
        assert_eq!(summary.blood_pressure[0].label, "Mar 5");
        assert_eq!(summary.heart_rate[1].label, "Mar 7");
        assert_eq!(summary.average_blood_pressure, "125.00/82.50 mg/dL");
        assert_eq!(summary.average_heart_rate, "72.50-85.00 bpm");
    }

    #[test]
    fn unparsable_heart_rate_reads_as_zero() {
        assert_eq!(parse_heart_rate("72-80"), (72.0, 80.0));
        assert_eq!(parse_heart_rate("abc-80"), (0.0, 80.0));
        assert_eq!(parse_heart_rate("72"), (72.0, 0.0));
        assert_eq!(parse_heart_rate(""), (0.0, 0.0));

        let summary = summarize_vitals(&[reading(1, 110, 70, "n/a")]);
        assert_eq!(summary.heart_rate[0].value1, 0.0);
        assert_eq!(summary.average_heart_rate, "0.00-0.00 bpm");
    }
}
