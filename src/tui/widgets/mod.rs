pub mod checkin;
pub mod header;
pub mod history;
pub mod statusbar;
pub mod streak;
pub mod timer;
