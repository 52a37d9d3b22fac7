pub mod streaks;
pub mod summary;

pub use streaks::{calculate_streaks, day_index};
pub use summary::{completed_records, fasting_summary, weekly_grid};
