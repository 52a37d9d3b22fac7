use anyhow::Result;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;

use crate::models::{FastSession, Mood, MoodCheckIn, Protocol, SessionStatus, StatsOverview};
use crate::stats::{calculate_streaks, completed_records, fasting_summary, weekly_grid};

fn conversion_err(idx: usize, e: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
}

// ─── Session repo ────────────────────────────────────────────────────────────

const SESSION_COLUMNS: &str =
    "id, protocol, started_at, target_hours, ended_at, status, note";

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<FastSession> {
    let protocol: String = row.get(1)?;
    let status: String = row.get(5)?;
    Ok(FastSession {
        id: row.get(0)?,
        protocol: Protocol::from_str(&protocol).map_err(|e| conversion_err(1, e))?,
        started_at: row.get(2)?,
        target_hours: row.get(3)?,
        ended_at: row.get(4)?,
        status: SessionStatus::from_str(&status).map_err(|e| conversion_err(5, e))?,
        note: row.get(6)?,
    })
}

pub struct SessionRepo;

impl SessionRepo {
    pub fn insert_active(
        conn: &Connection,
        protocol: Protocol,
        started_at: i64,
        target_hours: f64,
    ) -> rusqlite::Result<i64> {
        conn.execute(
            "INSERT INTO fast_sessions (protocol, started_at, target_hours, status)
             VALUES (?1, ?2, ?3, 'active')",
            params![protocol.key(), started_at, target_hours],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_active(conn: &Connection) -> rusqlite::Result<Option<FastSession>> {
        conn.query_row(
            &format!(
                "SELECT {} FROM fast_sessions WHERE status = 'active' LIMIT 1",
                SESSION_COLUMNS
            ),
            [],
            session_from_row,
        )
        .optional()
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<FastSession>> {
        conn.query_row(
            &format!("SELECT {} FROM fast_sessions WHERE id = ?1", SESSION_COLUMNS),
            params![id],
            session_from_row,
        )
        .optional()
    }

    /// Move an active session to a terminal status. Returns false when the
    /// row was no longer active.
    pub fn finish(
        conn: &Connection,
        id: i64,
        status: SessionStatus,
        ended_at: i64,
    ) -> rusqlite::Result<bool> {
        let updated = conn.execute(
            "UPDATE fast_sessions SET status = ?1, ended_at = ?2
             WHERE id = ?3 AND status = 'active'",
            params![status.as_str(), ended_at, id],
        )?;
        Ok(updated == 1)
    }

    pub fn set_note(conn: &Connection, id: i64, note: &str) -> rusqlite::Result<()> {
        conn.execute(
            "UPDATE fast_sessions SET note = ?1 WHERE id = ?2",
            params![note, id],
        )?;
        Ok(())
    }

    /// Most recently started first.
    pub fn list_recent(conn: &Connection, limit: usize) -> rusqlite::Result<Vec<FastSession>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM fast_sessions ORDER BY started_at DESC, id DESC LIMIT ?1",
            SESSION_COLUMNS
        ))?;
        let rows = stmt.query_map(params![limit as i64], session_from_row)?;
        rows.collect()
    }

    /// Every completed session, oldest first.
    pub fn list_completed(conn: &Connection) -> rusqlite::Result<Vec<FastSession>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM fast_sessions
             WHERE status = 'completed' AND ended_at IS NOT NULL
             ORDER BY ended_at",
            SESSION_COLUMNS
        ))?;
        let rows = stmt.query_map([], session_from_row)?;
        rows.collect()
    }
}

// ─── Check-in repo ───────────────────────────────────────────────────────────

fn checkin_from_row(row: &Row<'_>) -> rusqlite::Result<MoodCheckIn> {
    let mood: String = row.get(1)?;
    Ok(MoodCheckIn {
        date: row.get(0)?,
        mood: Mood::from_str(&mood).map_err(|e| conversion_err(1, e))?,
        energy: row.get(2)?,
        note: row.get(3)?,
    })
}

pub struct CheckInRepo;

impl CheckInRepo {
    pub fn upsert(conn: &Connection, checkin: &MoodCheckIn) -> Result<()> {
        conn.execute(
            "INSERT INTO mood_checkins (date, mood, energy, note) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(date) DO UPDATE SET mood = ?2, energy = ?3, note = ?4",
            params![
                checkin.date,
                checkin.mood.as_str(),
                checkin.energy,
                checkin.note
            ],
        )?;
        Ok(())
    }

    pub fn get_for_date(conn: &Connection, date: &str) -> Result<Option<MoodCheckIn>> {
        conn.query_row(
            "SELECT date, mood, energy, note FROM mood_checkins WHERE date = ?1",
            params![date],
            checkin_from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    /// Newest first.
    pub fn list_recent(conn: &Connection, limit: usize) -> Result<Vec<MoodCheckIn>> {
        let mut stmt = conn.prepare(
            "SELECT date, mood, energy, note FROM mood_checkins ORDER BY date DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], checkin_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn average_mood(conn: &Connection, start: &str, end: &str) -> Result<Option<f64>> {
        let checkins: Vec<MoodCheckIn> = {
            let mut stmt = conn.prepare(
                "SELECT date, mood, energy, note FROM mood_checkins
                 WHERE date >= ?1 AND date <= ?2",
            )?;
            let rows = stmt.query_map(params![start, end], checkin_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        if checkins.is_empty() {
            return Ok(None);
        }
        let total: u32 = checkins.iter().map(|c| c.mood.score() as u32).sum();
        Ok(Some(total as f64 / checkins.len() as f64))
    }
}

// ─── Stats repo ──────────────────────────────────────────────────────────────

pub struct StatsRepo;

impl StatsRepo {
    /// Streaks, summary and the 7-day grid from the full completed history.
    pub fn overview(conn: &Connection, now: i64) -> Result<StatsOverview> {
        let sessions = SessionRepo::list_completed(conn)?;
        let records = completed_records(&sessions);
        Ok(StatsOverview {
            streak: calculate_streaks(&records, now),
            summary: fasting_summary(&sessions),
            week: weekly_grid(&records, now),
        })
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn session_round_trip() {
        let conn = conn();
        let id = SessionRepo::insert_active(&conn, Protocol::Omad, 1_000, 23.0).unwrap();

        let active = SessionRepo::get_active(&conn).unwrap().unwrap();
        assert_eq!(active.id, id);
        assert_eq!(active.protocol, Protocol::Omad);
        assert_eq!(active.status, SessionStatus::Active);
        assert_eq!(active.ended_at, None);

        assert!(SessionRepo::finish(&conn, id, SessionStatus::Completed, 5_000).unwrap());
        assert!(SessionRepo::get_active(&conn).unwrap().is_none());

        let done = SessionRepo::get_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(done.status, SessionStatus::Completed);
        assert_eq!(done.ended_at, Some(5_000));
    }

    #[test]
    fn finish_is_a_no_op_on_terminal_sessions() {
        let conn = conn();
        let id = SessionRepo::insert_active(&conn, Protocol::SixteenEight, 0, 16.0).unwrap();
        assert!(SessionRepo::finish(&conn, id, SessionStatus::Cancelled, 10).unwrap());
        assert!(!SessionRepo::finish(&conn, id, SessionStatus::Completed, 20).unwrap());
        let s = SessionRepo::get_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(s.status, SessionStatus::Cancelled);
        assert_eq!(s.ended_at, Some(10));
    }

    #[test]
    fn list_completed_skips_other_statuses() {
        let conn = conn();
        let a = SessionRepo::insert_active(&conn, Protocol::SixteenEight, 0, 16.0).unwrap();
        SessionRepo::finish(&conn, a, SessionStatus::Completed, 100).unwrap();
        let b = SessionRepo::insert_active(&conn, Protocol::SixteenEight, 200, 16.0).unwrap();
        SessionRepo::finish(&conn, b, SessionStatus::Cancelled, 300).unwrap();
        SessionRepo::insert_active(&conn, Protocol::Custom(14), 400, 14.0).unwrap();

        let completed = SessionRepo::list_completed(&conn).unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, a);

        let recent = SessionRepo::list_recent(&conn, 10).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].protocol, Protocol::Custom(14));
    }

    #[test]
    fn checkin_upsert_replaces_same_day() {
        let conn = conn();
        let first = MoodCheckIn::new("2026-02-25".into(), Mood::Low, 2, None).unwrap();
        CheckInRepo::upsert(&conn, &first).unwrap();
        let second =
            MoodCheckIn::new("2026-02-25".into(), Mood::Great, 5, Some("light".into())).unwrap();
        CheckInRepo::upsert(&conn, &second).unwrap();

        let stored = CheckInRepo::get_for_date(&conn, "2026-02-25").unwrap().unwrap();
        assert_eq!(stored, second);
        assert_eq!(CheckInRepo::list_recent(&conn, 10).unwrap().len(), 1);
    }

    #[test]
    fn average_mood_over_range() {
        let conn = conn();
        for (date, mood) in [
            ("2026-02-23", Mood::Bad),
            ("2026-02-24", Mood::Okay),
            ("2026-02-25", Mood::Great),
        ] {
            let c = MoodCheckIn::new(date.into(), mood, 3, None).unwrap();
            CheckInRepo::upsert(&conn, &c).unwrap();
        }
        let avg = CheckInRepo::average_mood(&conn, "2026-02-24", "2026-02-25").unwrap();
        assert_eq!(avg, Some(4.0));
        assert_eq!(
            CheckInRepo::average_mood(&conn, "2026-01-01", "2026-01-31").unwrap(),
            None
        );
    }

    #[test]
    fn overview_reflects_completed_history() {
        let conn = conn();
        let day = 86_400_000;
        let hour = 3_600_000;
        // Two consecutive completed days plus one cancelled fast today
        for d in 0..2 {
            let id = SessionRepo::insert_active(&conn, Protocol::SixteenEight, d * day, 16.0)
                .unwrap();
            SessionRepo::finish(&conn, id, SessionStatus::Completed, d * day + 16 * hour)
                .unwrap();
        }
        let id = SessionRepo::insert_active(&conn, Protocol::SixteenEight, 2 * day, 16.0).unwrap();
        SessionRepo::finish(&conn, id, SessionStatus::Cancelled, 2 * day + hour).unwrap();

        let overview = StatsRepo::overview(&conn, 2 * day + 2 * hour).unwrap();
        assert_eq!(overview.streak.current_streak, 2);
        assert_eq!(overview.streak.total_completed, 2);
        assert_eq!(overview.summary.total_hours, 32.0);
        assert_eq!(overview.week.len(), 7);
        assert_eq!(overview.week[6].completed, 0);
        assert_eq!(overview.week[5].completed, 1);
    }

    #[test]
    fn meta_set_overwrites() {
        let conn = conn();
        MetaRepo::set(&conn, "next_protocol", "18:6").unwrap();
        MetaRepo::set(&conn, "next_protocol", "omad").unwrap();
        assert_eq!(
            MetaRepo::get(&conn, "next_protocol").unwrap().as_deref(),
            Some("omad")
        );
        assert_eq!(MetaRepo::get(&conn, "missing").unwrap(), None);
    }
}
