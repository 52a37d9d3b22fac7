pub mod checkin;
pub mod protocol;
pub mod session;
pub mod stats;

pub use checkin::{Mood, MoodCheckIn};
pub use protocol::Protocol;
pub use session::{FastSession, SessionStatus};
pub use stats::{CompletedFastRecord, DayActivity, FastingSummary, StatsOverview, StreakResult};
