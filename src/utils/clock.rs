use chrono::{Local, Utc};

/// Current instant as epoch milliseconds. The only place the app reads the clock.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Local calendar date, used to key mood check-ins.
pub fn today_local() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Local date `days` before today.
pub fn local_days_ago(days: i64) -> String {
    (Local::now().date_naive() - chrono::Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}
