use chrono::DateTime;

use crate::models::{
    CompletedFastRecord, DayActivity, FastSession, FastingSummary, SessionStatus,
};
use crate::stats::streaks::{day_index, MS_PER_DAY};

/// Completed sessions as streak-engine input. Active and cancelled
/// sessions never reach the engine.
pub fn completed_records(sessions: &[FastSession]) -> Vec<CompletedFastRecord> {
    sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .filter_map(|s| s.ended_at.map(CompletedFastRecord::new))
        .collect()
}

pub fn fasting_summary(sessions: &[FastSession]) -> FastingSummary {
    let durations: Vec<f64> = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .filter_map(|s| s.duration_hours())
        .collect();

    if durations.is_empty() {
        return FastingSummary::default();
    }

    let total_hours: f64 = durations.iter().sum();
    let longest_hours = durations.iter().cloned().fold(0.0, f64::max);

    FastingSummary {
        total_hours,
        average_hours: total_hours / durations.len() as f64,
        longest_hours,
    }
}

/// The last 7 UTC days ending today, oldest first.
pub fn weekly_grid(records: &[CompletedFastRecord], now: i64) -> Vec<DayActivity> {
    let today = day_index(now);
    (today - 6..=today)
        .map(|day| {
            let completed = records
                .iter()
                .filter(|r| day_index(r.completed_at_utc_millis) == day)
                .count() as u32;
            DayActivity {
                date: day_label(day),
                completed,
            }
        })
        .collect()
}

fn day_label(day: i64) -> String {
    DateTime::from_timestamp_millis(day * MS_PER_DAY)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
