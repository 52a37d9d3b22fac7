use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{debug, warn};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;
use std::str::FromStr;
use std::time::Duration;

use crate::config::AppConfig;
use crate::db::repository::{CheckInRepo, MetaRepo, SessionRepo, StatsRepo};
use crate::models::{FastSession, Mood, MoodCheckIn, Protocol, StatsOverview};
use crate::session::SessionManager;
use crate::stats::day_index;
use crate::timer::TimerSnapshot;
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{checkin, header, history, statusbar, streak, timer};
use crate::utils::clock::{local_days_ago, now_millis, today_local};
use crate::utils::format::{format_hours, progress_bar};

const NEXT_PROTOCOL_KEY: &str = "next_protocol";
const RECENT_LIMIT: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Stats,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    CheckInMood,
    CheckInEnergy(Mood),
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub should_quit: bool,
    pub input_mode: InputMode,
    /// Shown in the status bar until the next key press
    pub message: Option<String>,
    pub next_protocol: Protocol,

    // Cached state (refreshed on load/action)
    pub active: Option<(FastSession, TimerSnapshot)>,
    pub overview: StatsOverview,
    pub today_checkin: Option<MoodCheckIn>,
    pub recent: Vec<FastSession>,
    pub mood_avg_7d: Option<f64>,
    loaded_day: i64,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let next_protocol = config.fasting.default_protocol;
        App {
            view: View::Dashboard,
            config,
            should_quit: false,
            input_mode: InputMode::Normal,
            message: None,
            next_protocol,
            active: None,
            overview: StatsOverview::default(),
            today_checkin: None,
            recent: Vec::new(),
            mood_avg_7d: None,
            loaded_day: 0,
        }
    }

    pub fn load(&mut self, conn: &Connection, now: i64) -> Result<()> {
        if let Some(key) = MetaRepo::get(conn, NEXT_PROTOCOL_KEY)? {
            match Protocol::from_str(&key) {
                Ok(p) => self.next_protocol = p,
                Err(e) => warn!("ignoring stored protocol '{}': {}", key, e),
            }
        }

        self.active = SessionManager::active(conn)?
            .map(|s| {
                let snap = TimerSnapshot::for_session(&s, now);
                (s, snap)
            });
        self.overview = StatsRepo::overview(conn, now)?;
        self.today_checkin = CheckInRepo::get_for_date(conn, &today_local())?;
        self.recent = SessionRepo::list_recent(conn, RECENT_LIMIT)?;
        self.mood_avg_7d = CheckInRepo::average_mood(conn, &local_days_ago(6), &today_local())?;
        self.loaded_day = day_index(now);
        Ok(())
    }

    pub fn tick(&mut self, conn: &Connection, now: i64) {
        // Streak "today" moves at UTC midnight
        if day_index(now) != self.loaded_day {
            debug!("day rolled over, reloading");
            if let Err(e) = self.load(conn, now) {
                self.message = Some(format!("Reload failed: {}", e));
            }
            return;
        }
        if let Some((session, snap)) = &mut self.active {
            *snap = TimerSnapshot::for_session(session, now);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection, now: i64) {
        // Some terminals also report release/repeat events
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.message = None;
        match self.input_mode.clone() {
            InputMode::CheckInMood => self.handle_mood_input(key),
            InputMode::CheckInEnergy(mood) => self.handle_energy_input(key, mood, conn, now),
            InputMode::Normal => match self.view {
                View::Dashboard => self.handle_dashboard_key(key, conn, now),
                View::Stats => self.handle_stats_key(key),
                View::Help => self.handle_help_key(key),
            },
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, conn: &Connection, now: i64) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.view = View::Help,
            KeyCode::Char('s') => self.view = View::Stats,
            KeyCode::Char('f') => self.start_fast(conn, now),
            KeyCode::Char('e') => self.end_fast(conn, now),
            KeyCode::Char('x') => self.cancel_fast(conn, now),
            KeyCode::Char('p') => self.cycle_protocol(conn),
            KeyCode::Char('c') => self.input_mode = InputMode::CheckInMood,
            _ => {}
        }
    }

    fn handle_stats_key(&mut self, key: KeyEvent) {
        if let KeyCode::Esc | KeyCode::Char('s') = key.code {
            self.view = View::Dashboard;
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if let KeyCode::Esc | KeyCode::Char('?') = key.code {
            self.view = View::Dashboard;
        }
    }

    fn handle_mood_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Char(c) => {
                let mood = c
                    .to_digit(10)
                    .and_then(|d| Mood::from_score(d as u8));
                match mood {
                    Some(mood) => self.input_mode = InputMode::CheckInEnergy(mood),
                    None => self.message = Some("Pick a mood from 1 to 5".to_string()),
                }
            }
            _ => {}
        }
    }

    fn handle_energy_input(&mut self, key: KeyEvent, mood: Mood, conn: &Connection, now: i64) {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Char(c) => {
                let Some(energy) = c.to_digit(10) else {
                    return;
                };
                match MoodCheckIn::new(today_local(), mood, energy as u8, None) {
                    Ok(checkin) => {
                        if let Err(e) = CheckInRepo::upsert(conn, &checkin) {
                            self.message = Some(format!("Check-in failed: {}", e));
                        }
                        self.input_mode = InputMode::Normal;
                        self.reload(conn, now);
                    }
                    Err(e) => self.message = Some(e.to_string()),
                }
            }
            _ => {}
        }
    }

    fn start_fast(&mut self, conn: &Connection, now: i64) {
        match SessionManager::start(conn, self.next_protocol, now) {
            Ok(s) => self.message = Some(format!("Started a {} fast", s.protocol.display_name())),
            Err(e) => self.message = Some(capitalize(&e.to_string())),
        }
        self.reload(conn, now);
    }

    fn end_fast(&mut self, conn: &Connection, now: i64) {
        match SessionManager::complete(conn, now) {
            Ok(_) => {
                self.reload(conn, now);
                if self.config.fasting.prompt_checkin && self.today_checkin.is_none() {
                    self.input_mode = InputMode::CheckInMood;
                }
            }
            Err(e) => self.message = Some(capitalize(&e.to_string())),
        }
    }

    fn cancel_fast(&mut self, conn: &Connection, now: i64) {
        match SessionManager::cancel(conn, now) {
            Ok(_) => self.message = Some("Fast cancelled".to_string()),
            Err(e) => self.message = Some(capitalize(&e.to_string())),
        }
        self.reload(conn, now);
    }

    fn cycle_protocol(&mut self, conn: &Connection) {
        if self.active.is_some() {
            self.message = Some("Protocol can change once this fast ends".to_string());
            return;
        }
        self.next_protocol = self.next_protocol.next();
        if let Err(e) = MetaRepo::set(conn, NEXT_PROTOCOL_KEY, &self.next_protocol.key()) {
            self.message = Some(format!("Could not save protocol: {}", e));
        }
    }

    fn reload(&mut self, conn: &Connection, now: i64) {
        if let Err(e) = self.load(conn, now) {
            self.message = Some(format!("Reload failed: {}", e));
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Stats => self.draw_stats(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }

        if self.input_mode != InputMode::Normal {
            self.draw_checkin_popup(frame);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();

        // Clear background
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(frame, outer_chunks[0], self.config.profile.name.as_deref());
        statusbar::render(frame, outer_chunks[2], self.message.as_deref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer_chunks[1]);

        // Left column: Timer + Recent
        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(11), Constraint::Min(0)])
            .split(columns[0]);

        timer::render(frame, left_chunks[0], self.active.as_ref(), self.next_protocol);
        history::render(frame, left_chunks[1], &self.recent);

        // Right column: Streak + Check-in
        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(columns[1]);

        streak::render(frame, right_chunks[0], &self.overview);
        checkin::render(frame, right_chunks[1], self.today_checkin.as_ref());
    }

    fn draw_stats(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Stats  ", theme::accent().add_modifier(Modifier::BOLD)),
            Span::styled("  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        let streak = &self.overview.streak;
        let summary = &self.overview.summary;
        let row = |label: &'static str, value: String, style| {
            Line::from(vec![
                Span::styled(label, theme::dim()),
                Span::styled(value, style),
            ])
        };

        let mood = match self.mood_avg_7d {
            Some(avg) => format!("{:.1} / 5", avg),
            None => "no check-ins".to_string(),
        };

        let mut lines = vec![
            Line::from(""),
            row(
                "  Streak (current):  ",
                format!("{} days", streak.current_streak),
                theme::green().add_modifier(Modifier::BOLD),
            ),
            row(
                "  Streak (longest):  ",
                format!("{} days", streak.longest_streak),
                theme::green(),
            ),
            row(
                "  Completed fasts:   ",
                streak.total_completed.to_string(),
                theme::bold(),
            ),
            row(
                "  Last 30 days:      ",
                format!(
                    "{}  {}%",
                    progress_bar(streak.completion_rate as f64 / 100.0, 20),
                    streak.completion_rate
                ),
                theme::accent(),
            ),
            Line::from(""),
            row(
                "  Hours fasted:      ",
                format_hours(summary.total_hours),
                theme::amber(),
            ),
            row(
                "  Average fast:      ",
                format_hours(summary.average_hours),
                theme::amber(),
            ),
            row(
                "  Longest fast:      ",
                format_hours(summary.longest_hours),
                theme::amber(),
            ),
            Line::from(""),
            row("  Mood (7 days):     ", mood, theme::amber()),
            Line::from(""),
            Line::from(Span::styled("  Last 7 Days", theme::accent())),
            Line::from(""),
        ];

        for day in &self.overview.week {
            let bar = match day.completed {
                0 => Span::styled("  ░░░░░░░░░░░░  ", theme::dim()),
                1 => Span::styled("  ████████████  ", theme::green()),
                _ => Span::styled("  ████████████  ", theme::green().add_modifier(Modifier::BOLD)),
            };
            lines.push(Line::from(vec![
                bar,
                Span::styled(format!("{}  {}", day.date, day.completed), theme::dim()),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        // Center a help box
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: area.height / 2,
        };

        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("  [f]    ", "Start a fast"),
            ("  [e]    ", "End the fast (counts toward streak)"),
            ("  [x]    ", "Cancel the fast"),
            ("  [p]    ", "Cycle protocol for the next fast"),
            ("  [c]    ", "Mood check-in"),
            ("  [s]    ", "Stats view"),
            ("  [?]    ", "Toggle help"),
            ("  [Esc]  ", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::accent().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(key, theme::accent()),
                Span::styled(label, theme::dim()),
            ]));
        }
        help_text.push(Line::from(""));
        help_text.push(Line::from(Span::styled(
            "  Streak days roll over at UTC midnight",
            theme::dim(),
        )));

        let block = Block::default()
            .title(Span::styled(" Help ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::accent())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }

    fn draw_checkin_popup(&self, frame: &mut Frame) {
        let area = frame.area();
        let height = if self.message.is_some() { 11 } else { 9 };

        let popup_area = Rect {
            x: area.width / 4,
            y: (area.height / 2).saturating_sub(5),
            width: area.width / 2,
            height: height.min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let mut text = vec![Line::from("")];
        match &self.input_mode {
            InputMode::CheckInEnergy(mood) => {
                text.push(Line::from(vec![
                    Span::styled("  Mood: ", theme::dim()),
                    Span::styled(mood.display_name(), checkin::mood_style(*mood)),
                ]));
                text.push(Line::from(""));
                text.push(Line::from(Span::styled(
                    "  Energy level? [1] drained … [5] wired",
                    theme::bold(),
                )));
            }
            _ => {
                text.push(Line::from(Span::styled("  How are you feeling?", theme::bold())));
                text.push(Line::from(""));
                let mut spans = vec![Span::styled("  ", theme::dim())];
                for mood in Mood::all() {
                    spans.push(Span::styled(format!("[{}] ", mood.score()), theme::accent()));
                    spans.push(Span::styled(
                        format!("{}  ", mood.display_name()),
                        checkin::mood_style(mood),
                    ));
                }
                text.push(Line::from(spans));
            }
        }
        text.push(Line::from(""));
        text.push(Line::from(Span::styled("  [Esc] cancel", theme::dim())));

        if let Some(err) = &self.message {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let block = Block::default()
            .title(Span::styled(" Check-in ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::amber())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let tick_rate = Duration::from_millis(config.display.tick_ms.max(100));
    let mut app = App::new(config);
    app.load(&conn, now_millis())?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(tick_rate);

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| app.draw(frame)) {
            break Err(e.into());
        }

        match events.next() {
            Ok(Event::Key(key)) => {
                app.handle_key(key, &conn, now_millis());
                if app.should_quit {
                    break Ok(());
                }
            }
            Ok(Event::Resize) => {}
            Ok(Event::Tick) => app.tick(&conn, now_millis()),
            Err(e) => break Err(e.into()),
        }
    };

    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::SessionStatus;
    use crossterm::event::KeyModifiers;

    const HOUR: i64 = 3_600_000;

    fn setup() -> (Connection, App) {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let mut app = App::new(AppConfig::default());
        app.load(&conn, 0).unwrap();
        (conn, app)
    }

    fn press(app: &mut App, conn: &Connection, c: char, now: i64) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE), conn, now);
    }

    #[test]
    fn start_and_end_updates_streak_and_prompts_checkin() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, 'f', 0);
        assert!(app.active.is_some());

        app.tick(&conn, 8 * HOUR);
        let (_, snap) = app.active.as_ref().unwrap();
        assert_eq!(snap.progress_percent, 50.0);

        press(&mut app, &conn, 'e', 16 * HOUR);
        assert!(app.active.is_none());
        assert_eq!(app.overview.streak.current_streak, 1);
        assert_eq!(app.input_mode, InputMode::CheckInMood);
        assert_eq!(app.recent[0].status, SessionStatus::Completed);
    }

    #[test]
    fn checkin_popup_records_mood_and_energy() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, 'c', 0);
        press(&mut app, &conn, '9', 0);
        assert_eq!(app.input_mode, InputMode::CheckInMood);
        assert!(app.message.is_some());

        press(&mut app, &conn, '4', 0);
        assert_eq!(app.input_mode, InputMode::CheckInEnergy(Mood::Good));
        press(&mut app, &conn, '2', 0);
        assert_eq!(app.input_mode, InputMode::Normal);

        let stored = app.today_checkin.as_ref().unwrap();
        assert_eq!(stored.mood, Mood::Good);
        assert_eq!(stored.energy, 2);
    }

    #[test]
    fn protocol_cycles_only_while_idle_and_persists() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, 'p', 0);
        assert_eq!(app.next_protocol, Protocol::EighteenSix);

        let mut reopened = App::new(AppConfig::default());
        reopened.load(&conn, 0).unwrap();
        assert_eq!(reopened.next_protocol, Protocol::EighteenSix);

        press(&mut app, &conn, 'f', 0);
        press(&mut app, &conn, 'p', 0);
        assert_eq!(app.next_protocol, Protocol::EighteenSix);
        assert!(app.message.is_some());
        assert_eq!(app.active.as_ref().unwrap().0.target_hours, 18.0);
    }

    #[test]
    fn ending_without_a_fast_shows_message() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, 'e', 0);
        assert_eq!(app.message.as_deref(), Some("No fast is in progress"));
    }

    #[test]
    fn esc_quits_from_dashboard() {
        let (conn, mut app) = setup();
        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), &conn, 0);
        assert!(app.should_quit);
    }
}
