use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Longest fast accepted as a custom protocol.
pub const MAX_CUSTOM_HOURS: u32 = 72;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Protocol {
    #[default]
    SixteenEight,
    EighteenSix,
    TwentyFour,
    Omad,
    ThirtySix,
    Custom(u32),
}

impl Protocol {
    /// Named protocols in the order they are offered for selection.
    pub fn all() -> Vec<Protocol> {
        vec![
            Protocol::SixteenEight,
            Protocol::EighteenSix,
            Protocol::TwentyFour,
            Protocol::Omad,
            Protocol::ThirtySix,
        ]
    }

    pub fn fast_hours(&self) -> u32 {
        match self {
            Protocol::SixteenEight => 16,
            Protocol::EighteenSix => 18,
            Protocol::TwentyFour => 20,
            Protocol::Omad => 23,
            Protocol::ThirtySix => 36,
            Protocol::Custom(hours) => *hours,
        }
    }

    pub fn eating_hours(&self) -> u32 {
        24u32.saturating_sub(self.fast_hours())
    }

    /// Storage key, also accepted back by `FromStr`.
    pub fn key(&self) -> String {
        match self {
            Protocol::SixteenEight => "16:8".to_string(),
            Protocol::EighteenSix => "18:6".to_string(),
            Protocol::TwentyFour => "20:4".to_string(),
            Protocol::Omad => "omad".to_string(),
            Protocol::ThirtySix => "36h".to_string(),
            Protocol::Custom(hours) => format!("custom:{}", hours),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Protocol::SixteenEight => "16:8".to_string(),
            Protocol::EighteenSix => "18:6".to_string(),
            Protocol::TwentyFour => "20:4".to_string(),
            Protocol::Omad => "OMAD".to_string(),
            Protocol::ThirtySix => "36 Hour".to_string(),
            Protocol::Custom(hours) => format!("Custom {}h", hours),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Protocol::SixteenEight => "Fast 16 hours, eat within an 8 hour window",
            Protocol::EighteenSix => "Fast 18 hours, eat within a 6 hour window",
            Protocol::TwentyFour => "Fast 20 hours, eat within a 4 hour window",
            Protocol::Omad => "One meal a day, a 1 hour eating window",
            Protocol::ThirtySix => "Extended fast spanning a full day and two nights",
            Protocol::Custom(_) => "User-defined fasting window",
        }
    }

    /// Next named protocol, wrapping around. Custom protocols restart the cycle.
    pub fn next(&self) -> Protocol {
        let all = Self::all();
        match all.iter().position(|p| p == self) {
            Some(idx) => all[(idx + 1) % all.len()],
            None => all[0],
        }
    }

    pub fn from_hours(hours: u32) -> anyhow::Result<Protocol> {
        if hours == 0 || hours > MAX_CUSTOM_HOURS {
            return Err(anyhow::anyhow!(
                "Fasting window must be between 1 and {} hours, got {}",
                MAX_CUSTOM_HOURS,
                hours
            ));
        }
        Ok(Self::all()
            .into_iter()
            .find(|p| p.fast_hours() == hours)
            .unwrap_or(Protocol::Custom(hours)))
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Protocol {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "16:8" | "16-8" | "16/8" => return Ok(Protocol::SixteenEight),
            "18:6" | "18-6" | "18/6" => return Ok(Protocol::EighteenSix),
            "20:4" | "20-4" | "20/4" => return Ok(Protocol::TwentyFour),
            "omad" | "23:1" | "23-1" | "23/1" => return Ok(Protocol::Omad),
            _ => {}
        }

        let hours_str = normalized
            .strip_prefix("custom:")
            .unwrap_or(&normalized)
            .trim_end_matches('h');
        let hours: u32 = hours_str
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown protocol: {}", s))?;
        Self::from_hours(hours)
    }
}

impl From<Protocol> for String {
    fn from(p: Protocol) -> Self {
        p.key()
    }
}

impl TryFrom<String> for Protocol {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Protocol::from_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_protocols() {
        assert_eq!("16:8".parse::<Protocol>().unwrap(), Protocol::SixteenEight);
        assert_eq!("18-6".parse::<Protocol>().unwrap(), Protocol::EighteenSix);
        assert_eq!("20/4".parse::<Protocol>().unwrap(), Protocol::TwentyFour);
        assert_eq!("OMAD".parse::<Protocol>().unwrap(), Protocol::Omad);
        assert_eq!("23:1".parse::<Protocol>().unwrap(), Protocol::Omad);
        assert_eq!("36h".parse::<Protocol>().unwrap(), Protocol::ThirtySix);
    }

    #[test]
    fn bare_hours_map_onto_named_protocols() {
        assert_eq!("16".parse::<Protocol>().unwrap(), Protocol::SixteenEight);
        assert_eq!("14h".parse::<Protocol>().unwrap(), Protocol::Custom(14));
        assert_eq!("custom:48".parse::<Protocol>().unwrap(), Protocol::Custom(48));
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!("0".parse::<Protocol>().is_err());
        assert!("73".parse::<Protocol>().is_err());
        assert!("warrior".parse::<Protocol>().is_err());
    }

    #[test]
    fn key_parses_back() {
        for p in Protocol::all().into_iter().chain([Protocol::Custom(13)]) {
            assert_eq!(p.key().parse::<Protocol>().unwrap(), p);
        }
    }

    #[test]
    fn eating_window_complements_fast() {
        assert_eq!(Protocol::SixteenEight.eating_hours(), 8);
        assert_eq!(Protocol::Omad.eating_hours(), 1);
        assert_eq!(Protocol::ThirtySix.eating_hours(), 0);
    }

    #[test]
    fn next_cycles_through_named_protocols() {
        assert_eq!(Protocol::SixteenEight.next(), Protocol::EighteenSix);
        assert_eq!(Protocol::ThirtySix.next(), Protocol::SixteenEight);
        assert_eq!(Protocol::Custom(10).next(), Protocol::SixteenEight);
    }
}
