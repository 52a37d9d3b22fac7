use crate::models::FastSession;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSnapshot {
    pub elapsed_secs: i64,
    pub target_secs: i64,
    pub remaining_secs: i64,
    pub overtime_secs: i64,
    /// 0.0..=100.0
    pub progress_percent: f64,
    pub is_goal_reached: bool,
    /// Epoch ms at which the target is reached
    pub ends_at: i64,
}

impl TimerSnapshot {
    pub fn at(started_at: i64, target_hours: f64, now: i64) -> Self {
        let elapsed_secs = (now - started_at).max(0) / 1000;
        let target_secs = (target_hours.max(0.0) * 3600.0).round() as i64;

        let progress_percent = if target_secs > 0 {
            (elapsed_secs as f64 / target_secs as f64 * 100.0).min(100.0)
        } else {
            0.0
        };

        Self {
            elapsed_secs,
            target_secs,
            remaining_secs: (target_secs - elapsed_secs).max(0),
            overtime_secs: (elapsed_secs - target_secs).max(0),
            progress_percent,
            is_goal_reached: elapsed_secs >= target_secs,
            ends_at: started_at + target_secs * 1000,
        }
    }

    pub fn for_session(session: &FastSession, now: i64) -> Self {
        Self::at(session.started_at, session.target_hours, now)
    }

    pub fn progress_ratio(&self) -> f64 {
        self.progress_percent / 100.0
    }
}
