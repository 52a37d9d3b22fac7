use serde::{Deserialize, Serialize};

/// A successfully completed fast, reduced to the instant it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedFastRecord {
    pub completed_at_utc_millis: i64,
}

impl CompletedFastRecord {
    pub fn new(completed_at_utc_millis: i64) -> Self {
        Self {
            completed_at_utc_millis,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completed: u32,
    /// Percentage of the trailing 30 days with activity, 0..=100
    pub completion_rate: u8,
}

impl StreakResult {
    pub fn is_alive(&self) -> bool {
        self.current_streak > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayActivity {
    pub date: String,
    pub completed: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FastingSummary {
    pub total_hours: f64,
    pub average_hours: f64,
    pub longest_hours: f64,
}

/// Everything the stats views show, computed in one pass over storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsOverview {
    pub streak: StreakResult,
    pub summary: FastingSummary,
    pub week: Vec<DayActivity>,
}
