use chrono::{DateTime, Local};

/// Format a duration in seconds to "Xh Ym" or "Ym" string
pub fn format_duration_secs(secs: i64) -> String {
    if secs <= 0 {
        return "0m".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Countdown style "HH:MM:SS", hours may exceed 24
pub fn format_clock(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Hours with one decimal, trailing ".0" dropped
pub fn format_hours(hours: f64) -> String {
    let rounded = (hours * 10.0).round() / 10.0;
    if rounded == rounded.floor() {
        format!("{}h", rounded as i64)
    } else {
        format!("{:.1}h", rounded)
    }
}

/// Epoch milliseconds as a local "Mon Feb 23 20:15"
pub fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|utc| utc.with_timezone(&Local).format("%a %b %d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Create a simple ASCII progress bar from a 0.0..=1.0 ratio
pub fn progress_bar(ratio: f64, width: usize) -> String {
    let ratio = ratio.clamp(0.0, 1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(format_duration_secs(0), "0m");
        assert_eq!(format_duration_secs(59 * 60), "59m");
        assert_eq!(format_duration_secs(16 * 3600 + 5 * 60), "16h 5m");
    }

    #[test]
    fn clock_allows_long_fasts() {
        assert_eq!(format_clock(3_661), "01:01:01");
        assert_eq!(format_clock(36 * 3600), "36:00:00");
        assert_eq!(format_clock(-5), "00:00:00");
    }

    #[test]
    fn hours_trim_zero_decimal() {
        assert_eq!(format_hours(16.0), "16h");
        assert_eq!(format_hours(16.46), "16.5h");
    }

    #[test]
    fn bar_is_clamped() {
        assert_eq!(progress_bar(0.5, 4), "██░░");
        assert_eq!(progress_bar(2.0, 3), "███");
        assert_eq!(progress_bar(-1.0, 2), "░░");
    }
}
