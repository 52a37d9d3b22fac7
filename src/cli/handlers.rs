use anyhow::{anyhow, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::str::FromStr;

use crate::config::AppConfig;
use crate::db::repository::{CheckInRepo, SessionRepo, StatsRepo};
use crate::models::{
    FastSession, Mood, MoodCheckIn, Protocol, SessionStatus, StatsOverview,
};
use crate::session::{SessionError, SessionManager};
use crate::timer::TimerSnapshot;
use crate::utils::clock::{local_days_ago, now_millis, today_local};
use crate::utils::format::{
    format_clock, format_duration_secs, format_hours, format_timestamp, progress_bar,
};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const TEAL: &str = "\x1b[38;2;72;176;160m";

fn parse_protocol(s: &str) -> Result<Protocol> {
    Protocol::from_str(s)
        .map_err(|e| anyhow!("{}. Use: 16:8, 18:6, 20:4, omad, 36h, or hours (1-72)", e))
}

// ─── Start / end / cancel ────────────────────────────────────────────────────

pub fn handle_start(conn: &Connection, config: &AppConfig, protocol: Option<&str>) -> Result<()> {
    let protocol = match protocol {
        Some(p) => parse_protocol(p)?,
        None => config.fasting.default_protocol,
    };
    let now = now_millis();

    match SessionManager::start(conn, protocol, now) {
        Ok(session) => {
            let snap = TimerSnapshot::for_session(&session, now);
            println_colored!(GREEN, "  ✓ Started a {} fast", protocol.display_name());
            println_colored!(DIM, "  Goal reached at {}", format_timestamp(snap.ends_at));
            Ok(())
        }
        Err(SessionError::AlreadyActive(_)) => {
            println_colored!(AMBER, "  A fast is already in progress. Use `unfed status`.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn handle_end(conn: &Connection, note: Option<&str>) -> Result<()> {
    let now = now_millis();
    match SessionManager::complete(conn, now) {
        Ok(session) => {
            if let Some(note) = note {
                SessionRepo::set_note(conn, session.id, note)?;
            }
            let snap = TimerSnapshot::for_session(&session, now);
            if snap.is_goal_reached {
                println_colored!(
                    GREEN,
                    "  ✓ Fast complete: {} ({} goal)",
                    format_duration_secs(snap.elapsed_secs),
                    session.protocol.display_name()
                );
            } else {
                println_colored!(
                    AMBER,
                    "  ✓ Fast ended early: {} of {}",
                    format_duration_secs(snap.elapsed_secs),
                    format_duration_secs(snap.target_secs)
                );
            }
            let overview = StatsRepo::overview(conn, now)?;
            println_colored!(BOLD, "  Streak: {} days", overview.streak.current_streak);
            Ok(())
        }
        Err(SessionError::NoActiveSession) => {
            println_colored!(DIM, "  No fast in progress. Start one with `unfed start`.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn handle_cancel(conn: &Connection) -> Result<()> {
    match SessionManager::cancel(conn, now_millis()) {
        Ok(session) => {
            println_colored!(
                RED,
                "  ✗ {} fast cancelled. It won't count toward your streak",
                session.protocol.display_name()
            );
            Ok(())
        }
        Err(SessionError::NoActiveSession) => {
            println_colored!(DIM, "  No fast in progress.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn handle_status(conn: &Connection) -> Result<()> {
    let Some(session) = SessionManager::active(conn)? else {
        println!();
        println_colored!(DIM, "  Not fasting. Start with `unfed start`.");
        println!();
        return Ok(());
    };

    let snap = TimerSnapshot::for_session(&session, now_millis());

    println!();
    println_colored!(TEAL, "  {} fast", session.protocol.display_name());
    println!();
    println_colored!(BOLD, "  Elapsed    {}", format_clock(snap.elapsed_secs));
    if snap.is_goal_reached {
        println_colored!(GREEN, "  Overtime   +{}", format_clock(snap.overtime_secs));
    } else {
        println_colored!(AMBER, "  Remaining  {}", format_clock(snap.remaining_secs));
    }
    println!(
        "  {}  {:.0}%",
        progress_bar(snap.progress_ratio(), 24),
        snap.progress_percent
    );
    println!();
    println_colored!(DIM, "  Started    {}", format_timestamp(session.started_at));
    println_colored!(DIM, "  Goal       {}", format_timestamp(snap.ends_at));
    println!();
    Ok(())
}

// ─── History ─────────────────────────────────────────────────────────────────

pub fn handle_history(conn: &Connection, config: &AppConfig, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(config.display.history_limit);
    let sessions = SessionRepo::list_recent(conn, limit)?;

    println!();
    if sessions.is_empty() {
        println_colored!(DIM, "  No fasts recorded yet");
        println!();
        return Ok(());
    }

    println_colored!(TEAL, "  Recent fasts");
    println!();
    for s in &sessions {
        let line = history_line(s);
        match s.status {
            SessionStatus::Completed => println_colored!(GREEN, "{}", line),
            SessionStatus::Cancelled => println_colored!(DIM, "{}", line),
            SessionStatus::Active => println_colored!(AMBER, "{}", line),
        }
    }
    println!();
    Ok(())
}

fn history_line(s: &FastSession) -> String {
    let duration = s
        .duration_hours()
        .map(format_hours)
        .unwrap_or_else(|| "…".to_string());
    format!(
        "  {}  {:<10} {:<10} {:>6}",
        format_timestamp(s.started_at),
        s.protocol.display_name(),
        s.status.display_name(),
        duration
    )
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(conn: &Connection, week: bool) -> Result<()> {
    let overview = StatsRepo::overview(conn, now_millis())?;
    let streak = &overview.streak;
    let avg_mood = CheckInRepo::average_mood(conn, &local_days_ago(6), &today_local())?;

    println!();
    println_colored!(TEAL, "  Statistics");
    println!();
    println_colored!(
        BOLD,
        "  Streak:      {} days current  |  {} days longest",
        streak.current_streak,
        streak.longest_streak
    );
    println!("  Completed:   {} fasts", streak.total_completed);
    println!(
        "  30 days:     {}%  {}",
        streak.completion_rate,
        progress_bar(streak.completion_rate as f64 / 100.0, 20)
    );
    println!(
        "  Hours:       {} total  ·  {} avg  ·  {} longest",
        format_hours(overview.summary.total_hours),
        format_hours(overview.summary.average_hours),
        format_hours(overview.summary.longest_hours)
    );
    match avg_mood.and_then(|m| Mood::from_score(m.round() as u8)) {
        Some(mood) => println!("  Mood (7d):   {} ({:.1})", mood, avg_mood.unwrap_or(0.0)),
        None => println_colored!(DIM, "  Mood (7d):   no check-ins"),
    }

    if week {
        println!();
        println_colored!(DIM, "  Last 7 days  (● = fast completed, ○ = none)");
        println!();
        print!("  ");
        for day in &overview.week {
            if day.completed > 0 {
                print!("{}●\x1b[0m ", GREEN);
            } else {
                print!("{}○\x1b[0m ", DIM);
            }
        }
        println!();
    }

    println!();
    Ok(())
}

// ─── Check-in ────────────────────────────────────────────────────────────────

pub fn handle_checkin(
    conn: &Connection,
    mood: &str,
    energy: u8,
    note: Option<&str>,
) -> Result<()> {
    let mood = Mood::from_str(mood)
        .map_err(|_| anyhow!("Unknown mood '{}'. Use: great, good, okay, low, bad", mood))?;
    let checkin = MoodCheckIn::new(today_local(), mood, energy, note.map(str::to_string))?;
    CheckInRepo::upsert(conn, &checkin)?;
    println_colored!(
        GREEN,
        "  ✓ Checked in: {} · energy {}/5",
        checkin.mood,
        checkin.energy
    );
    Ok(())
}

// ─── Protocols ───────────────────────────────────────────────────────────────

pub fn handle_protocols(config: &AppConfig) -> Result<()> {
    println!();
    println_colored!(TEAL, "  Protocols");
    println!();
    for p in Protocol::all() {
        let marker = if p == config.fasting.default_protocol { "●" } else { " " };
        println!(
            "  {} {:<8} {:>3}h fast  {:>2}h eat   {}",
            marker,
            p.display_name(),
            p.fast_hours(),
            p.eating_hours(),
            p.description()
        );
    }
    println!();
    println_colored!(DIM, "  Any number of hours from 1 to 72 works as a custom protocol");
    println!();
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(
    config: &mut AppConfig,
    protocol: Option<&str>,
    timezone: Option<&str>,
) -> Result<()> {
    let mut changed = false;
    if let Some(p) = protocol {
        config.fasting.default_protocol = parse_protocol(p)?;
        changed = true;
    }
    if let Some(tz) = timezone {
        config.profile.timezone = tz.to_string();
        changed = true;
    }
    if changed {
        config.save()?;
        println_colored!(GREEN, "  ✓ Configuration saved");
    }

    println!();
    println!("  Config:    {}", AppConfig::config_path()?.display());
    println!("  Protocol:  {}", config.fasting.default_protocol.display_name());
    println!("  Timezone:  {}", config.profile.timezone);
    println_colored!(DIM, "  Streak days are counted in UTC");
    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ExportDoc {
    generated_at: i64,
    default_protocol: Protocol,
    overview: StatsOverview,
    recent_fasts: Vec<FastSession>,
    recent_checkins: Vec<MoodCheckIn>,
}

pub fn handle_export(conn: &Connection, config: &AppConfig, json: bool) -> Result<()> {
    let now = now_millis();
    let doc = ExportDoc {
        generated_at: now,
        default_protocol: config.fasting.default_protocol,
        overview: StatsRepo::overview(conn, now)?,
        recent_fasts: SessionRepo::list_recent(conn, 7)?,
        recent_checkins: CheckInRepo::list_recent(conn, 7)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let streak = &doc.overview.streak;
    println!("# unfed: Weekly Summary");
    println!("# {}", today_local());
    println!();
    println!("Protocol: {}", doc.default_protocol.display_name());
    println!();
    println!("## Fasts (last 7 days)");
    for day in &doc.overview.week {
        let bar = if day.completed > 0 { "█" } else { "░" };
        println!("  {}  {}  {}", day.date, bar, day.completed);
    }
    println!();
    println!("## Check-ins");
    if doc.recent_checkins.is_empty() {
        println!("  none");
    }
    for c in &doc.recent_checkins {
        println!("  {}  {:<6} energy {}/5", c.date, c.mood.display_name(), c.energy);
    }
    println!();
    println!("## Summary");
    println!(
        "  Streak:      {} days (longest: {})",
        streak.current_streak, streak.longest_streak
    );
    println!("  Completed:   {}", streak.total_completed);
    println!("  30-day rate: {}%", streak.completion_rate);
    println!("  Total time:  {}", format_hours(doc.overview.summary.total_hours));
    Ok(())
}
