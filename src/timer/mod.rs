pub mod progress;

pub use progress::TimerSnapshot;
