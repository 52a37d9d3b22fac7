use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Great,
    Good,
    Okay,
    Low,
    Bad,
}

impl Mood {
    pub fn all() -> Vec<Mood> {
        vec![Mood::Great, Mood::Good, Mood::Okay, Mood::Low, Mood::Bad]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Great => "great",
            Mood::Good => "good",
            Mood::Okay => "okay",
            Mood::Low => "low",
            Mood::Bad => "bad",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Mood::Great => "Great",
            Mood::Good => "Good",
            Mood::Okay => "Okay",
            Mood::Low => "Low",
            Mood::Bad => "Bad",
        }
    }

    /// 5 for `Great` down to 1 for `Bad`.
    pub fn score(&self) -> u8 {
        match self {
            Mood::Great => 5,
            Mood::Good => 4,
            Mood::Okay => 3,
            Mood::Low => 2,
            Mood::Bad => 1,
        }
    }

    pub fn from_score(score: u8) -> Option<Mood> {
        Self::all().into_iter().find(|m| m.score() == score)
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Mood {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "great" | "5" => Ok(Mood::Great),
            "good" | "4" => Ok(Mood::Good),
            "okay" | "ok" | "3" => Ok(Mood::Okay),
            "low" | "2" => Ok(Mood::Low),
            "bad" | "1" => Ok(Mood::Bad),
            _ => Err(anyhow::anyhow!("Unknown mood: {}", s)),
        }
    }
}

pub const MIN_ENERGY: u8 = 1;
pub const MAX_ENERGY: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodCheckIn {
    /// Local calendar date, `YYYY-MM-DD`
    pub date: String,
    pub mood: Mood,
    pub energy: u8,
    pub note: Option<String>,
}

impl MoodCheckIn {
    pub fn new(date: String, mood: Mood, energy: u8, note: Option<String>) -> anyhow::Result<Self> {
        if !(MIN_ENERGY..=MAX_ENERGY).contains(&energy) {
            return Err(anyhow::anyhow!(
                "Energy must be between {} and {}, got {}",
                MIN_ENERGY,
                MAX_ENERGY,
                energy
            ));
        }
        Ok(Self {
            date,
            mood,
            energy,
            note,
        })
    }
}
