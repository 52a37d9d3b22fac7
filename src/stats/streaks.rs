//! Streak engine.
//!
//! Turns completed-fast timestamps into UTC activity days and derives the
//! current streak, the longest streak, the total count and the trailing
//! 30-day completion rate. Pure: the caller supplies both the records and
//! "now", nothing here reads a clock or touches storage.

use std::collections::BTreeSet;

use crate::models::{CompletedFastRecord, StreakResult};

pub const MS_PER_DAY: i64 = 86_400_000;

/// Days in the completion-rate window, today included.
pub const COMPLETION_WINDOW_DAYS: i64 = 30;

/// Days since the Unix epoch of the UTC calendar date containing `millis`.
pub fn day_index(millis: i64) -> i64 {
    millis.div_euclid(MS_PER_DAY)
}

pub fn calculate_streaks(records: &[CompletedFastRecord], now: i64) -> StreakResult {
    // Sorted and deduplicated: several fasts on one day are one activity day
    let days: BTreeSet<i64> = records
        .iter()
        .map(|r| day_index(r.completed_at_utc_millis))
        .collect();

    let today = day_index(now);

    StreakResult {
        current_streak: current_streak(&days, today),
        longest_streak: longest_streak(&days),
        total_completed: records.len() as u32,
        completion_rate: completion_rate(&days, today),
    }
}

fn longest_streak(days: &BTreeSet<i64>) -> u32 {
    let mut best = 0u32;
    let mut run = 0u32;
    let mut prev: Option<i64> = None;

    for &day in days {
        run = match prev {
            Some(p) if day - p == 1 => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(day);
    }
    best
}

/// Run ending at the most recent activity day, provided that day is today
/// or yesterday. A missing today does not break the streak until the day is over.
fn current_streak(days: &BTreeSet<i64>, today: i64) -> u32 {
    let Some(&most_recent) = days.last() else {
        return 0;
    };
    if most_recent < today - 1 {
        return 0;
    }

    let mut count = 0u32;
    let mut expected = most_recent;
    for &day in days.iter().rev() {
        if day != expected {
            break;
        }
        count += 1;
        expected -= 1;
    }
    count
}

fn completion_rate(days: &BTreeSet<i64>, today: i64) -> u8 {
    let window_start = today - (COMPLETION_WINDOW_DAYS - 1);
    let hits = days.range(window_start..=today).count();
    let rate = (hits as f64 / COMPLETION_WINDOW_DAYS as f64 * 100.0).round();
    rate.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn at(date: &str, time: &str) -> i64 {
        let d = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let t = NaiveTime::parse_from_str(time, "%H:%M").unwrap();
        d.and_time(t).and_utc().timestamp_millis()
    }

    fn records(dates: &[&str]) -> Vec<CompletedFastRecord> {
        dates
            .iter()
            .map(|d| CompletedFastRecord::new(at(d, "08:30")))
            .collect()
    }

    fn now() -> i64 {
        at("2026-02-25", "12:00")
    }

    #[test]
    fn empty_history_is_all_zero() {
        assert_eq!(calculate_streaks(&[], now()), StreakResult::default());
        assert_eq!(calculate_streaks(&[], 0), StreakResult::default());
    }

    #[test]
    fn single_fast_today() {
        let result = calculate_streaks(&records(&["2026-02-25"]), now());
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.longest_streak, 1);
        assert_eq!(result.total_completed, 1);
    }

    #[test]
    fn three_consecutive_days_ending_today() {
        let result = calculate_streaks(
            &records(&["2026-02-25", "2026-02-24", "2026-02-23"]),
            now(),
        );
        assert_eq!(result.current_streak, 3);
        assert_eq!(result.longest_streak, 3);
    }

    #[test]
    fn stale_history_has_no_current_streak() {
        let result = calculate_streaks(&records(&["2026-02-22", "2026-02-21"]), now());
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 2);
    }

    #[test]
    fn one_missing_day_splits_runs() {
        let result = calculate_streaks(
            &records(&[
                "2026-02-25",
                "2026-02-24",
                "2026-02-22",
                "2026-02-21",
                "2026-02-20",
                "2026-02-19",
            ]),
            now(),
        );
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 4);
    }

    #[test]
    fn yesterday_keeps_streak_alive() {
        let result = calculate_streaks(&records(&["2026-02-24"]), now());
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.longest_streak, 1);
        assert!(result.is_alive());
    }

    #[test]
    fn every_other_day_is_half_the_window() {
        // Day 30 of the window is today; days 2, 4, ..., 30 have a fast
        let today = day_index(now());
        let recs: Vec<CompletedFastRecord> = (0..15)
            .map(|i| CompletedFastRecord::new((today - 2 * i) * MS_PER_DAY + 3_600_000))
            .collect();
        let result = calculate_streaks(&recs, now());
        assert_eq!(result.completion_rate, 50);
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.longest_streak, 1);
    }

    #[test]
    fn same_day_fasts_count_once_for_streaks() {
        let recs = vec![
            CompletedFastRecord::new(at("2026-02-25", "01:00")),
            CompletedFastRecord::new(at("2026-02-25", "23:59")),
            CompletedFastRecord::new(at("2026-02-24", "10:00")),
        ];
        let result = calculate_streaks(&recs, now());
        assert_eq!(result.total_completed, 3);
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 2);
        // Two distinct days out of 30
        assert_eq!(result.completion_rate, 7);
    }

    #[test]
    fn day_boundaries_are_utc_midnight() {
        let just_before = at("2026-02-24", "23:59") + 59_999;
        let midnight = at("2026-02-25", "00:00");
        assert_eq!(day_index(midnight) - day_index(just_before), 1);
    }

    #[test]
    fn pre_epoch_times_floor_to_previous_day() {
        assert_eq!(day_index(-1), -1);
        assert_eq!(day_index(-MS_PER_DAY), -1);
        assert_eq!(day_index(-MS_PER_DAY - 1), -2);
    }

    #[test]
    fn window_excludes_day_thirty_one() {
        let today = day_index(now());
        let recs = vec![
            CompletedFastRecord::new((today - 29) * MS_PER_DAY),
            CompletedFastRecord::new((today - 30) * MS_PER_DAY),
        ];
        // 1 of 30 days: 3.33% rounds to 3
        assert_eq!(calculate_streaks(&recs, now()).completion_rate, 3);
    }

    #[test]
    fn full_window_is_one_hundred_percent() {
        let today = day_index(now());
        let recs: Vec<CompletedFastRecord> = (0..45)
            .map(|i| CompletedFastRecord::new((today - i) * MS_PER_DAY))
            .collect();
        let result = calculate_streaks(&recs, now());
        assert_eq!(result.completion_rate, 100);
        assert_eq!(result.current_streak, 45);
        assert_eq!(result.longest_streak, 45);
    }

    #[test]
    fn order_does_not_matter() {
        let mut recs = records(&[
            "2026-02-19",
            "2026-02-25",
            "2026-02-21",
            "2026-02-24",
            "2026-02-20",
            "2026-02-22",
            "2026-02-22",
        ]);
        let expected = calculate_streaks(&recs, now());
        recs.reverse();
        assert_eq!(calculate_streaks(&recs, now()), expected);
        recs.rotate_left(3);
        assert_eq!(calculate_streaks(&recs, now()), expected);
        // Same input twice, same output
        assert_eq!(calculate_streaks(&recs, now()), expected);
    }

    #[test]
    fn invariants_hold_over_generated_histories() {
        let today = day_index(now());
        // Deterministic pseudo-random histories (LCG)
        let mut seed: u64 = 0x5eed;
        for _ in 0..200 {
            let len = (seed % 40) as usize;
            let mut recs = Vec::with_capacity(len);
            for _ in 0..len {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let offset = ((seed >> 33) % 90) as i64;
                let ms_in_day = ((seed >> 13) % MS_PER_DAY as u64) as i64;
                recs.push(CompletedFastRecord::new((today - offset) * MS_PER_DAY + ms_in_day));
            }
            seed = seed.wrapping_add(7);

            let result = calculate_streaks(&recs, now());
            assert!(result.completion_rate <= 100);
            assert!(result.current_streak <= result.longest_streak);
            assert_eq!(result.total_completed as usize, recs.len());
        }
    }
}
