use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::Protocol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SessionStatus::Active => "Active",
            SessionStatus::Completed => "Completed",
            SessionStatus::Cancelled => "Cancelled",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Unknown session status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastSession {
    pub id: i64,
    pub protocol: Protocol,
    /// Epoch milliseconds, UTC
    pub started_at: i64,
    pub target_hours: f64,
    /// Set once the session leaves `Active`
    pub ended_at: Option<i64>,
    pub status: SessionStatus,
    pub note: Option<String>,
}

impl FastSession {
    /// Wall-clock length of a finished session in hours.
    pub fn duration_hours(&self) -> Option<f64> {
        self.ended_at
            .map(|end| (end - self.started_at).max(0) as f64 / 3_600_000.0)
    }
}
