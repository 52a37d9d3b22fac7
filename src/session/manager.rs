//! Fasting session lifecycle: `active` → `completed` | `cancelled`.
//!
//! At most one session is active at a time. Finished sessions are never
//! reopened.

use log::{debug, info, warn};
use rusqlite::Connection;
use thiserror::Error;

use crate::db::repository::SessionRepo;
use crate::models::{FastSession, Protocol, SessionStatus};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a fast is already in progress (session #{0})")]
    AlreadyActive(i64),
    #[error("no fast is in progress")]
    NoActiveSession,
    #[error("session #{0} is no longer active")]
    NotActive(i64),
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

pub struct SessionManager;

impl SessionManager {
    pub fn active(conn: &Connection) -> SessionResult<Option<FastSession>> {
        Ok(SessionRepo::get_active(conn)?)
    }

    pub fn start(conn: &Connection, protocol: Protocol, now: i64) -> SessionResult<FastSession> {
        if let Some(existing) = SessionRepo::get_active(conn)? {
            warn!("start rejected: session {} already active", existing.id);
            return Err(SessionError::AlreadyActive(existing.id));
        }

        let target_hours = protocol.fast_hours() as f64;
        let id = SessionRepo::insert_active(conn, protocol, now, target_hours)?;
        info!("started session {} protocol={} target={}h", id, protocol.key(), target_hours);

        Ok(FastSession {
            id,
            protocol,
            started_at: now,
            target_hours,
            ended_at: None,
            status: SessionStatus::Active,
            note: None,
        })
    }

    pub fn complete(conn: &Connection, now: i64) -> SessionResult<FastSession> {
        Self::finish(conn, SessionStatus::Completed, now)
    }

    pub fn cancel(conn: &Connection, now: i64) -> SessionResult<FastSession> {
        Self::finish(conn, SessionStatus::Cancelled, now)
    }

    fn finish(conn: &Connection, status: SessionStatus, now: i64) -> SessionResult<FastSession> {
        let mut session = SessionRepo::get_active(conn)?.ok_or(SessionError::NoActiveSession)?;

        if !SessionRepo::finish(conn, session.id, status, now)? {
            warn!("session {} changed state before it could be {}", session.id, status.as_str());
            return Err(SessionError::NotActive(session.id));
        }

        session.status = status;
        session.ended_at = Some(now);
        info!("session {} {}", session.id, status.as_str());
        debug!("session {} duration={:?}h", session.id, session.duration_hours());
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::stats::{calculate_streaks, completed_records};

    const HOUR: i64 = 3_600_000;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn start_then_complete() {
        let conn = conn();
        let started = SessionManager::start(&conn, Protocol::EighteenSix, 0).unwrap();
        assert_eq!(started.target_hours, 18.0);
        assert_eq!(started.status, SessionStatus::Active);

        let done = SessionManager::complete(&conn, 18 * HOUR).unwrap();
        assert_eq!(done.id, started.id);
        assert_eq!(done.status, SessionStatus::Completed);
        assert_eq!(done.ended_at, Some(18 * HOUR));
        assert!(SessionManager::active(&conn).unwrap().is_none());
    }

    #[test]
    fn second_start_is_rejected() {
        let conn = conn();
        let first = SessionManager::start(&conn, Protocol::SixteenEight, 0).unwrap();
        match SessionManager::start(&conn, Protocol::Omad, HOUR) {
            Err(SessionError::AlreadyActive(id)) => assert_eq!(id, first.id),
            other => panic!("expected AlreadyActive, got {:?}", other),
        }
    }

    #[test]
    fn finishing_without_active_session_fails() {
        let conn = conn();
        assert!(matches!(
            SessionManager::complete(&conn, 0),
            Err(SessionError::NoActiveSession)
        ));
        assert!(matches!(
            SessionManager::cancel(&conn, 0),
            Err(SessionError::NoActiveSession)
        ));
    }

    #[test]
    fn cancelled_session_frees_the_slot() {
        let conn = conn();
        SessionManager::start(&conn, Protocol::SixteenEight, 0).unwrap();
        let cancelled = SessionManager::cancel(&conn, HOUR).unwrap();
        assert_eq!(cancelled.status, SessionStatus::Cancelled);
        assert!(SessionManager::start(&conn, Protocol::SixteenEight, 2 * HOUR).is_ok());
    }

    #[test]
    fn cancelled_fasts_do_not_count_toward_streaks() {
        let conn = conn();
        let day = 86_400_000;
        SessionManager::start(&conn, Protocol::SixteenEight, 0).unwrap();
        SessionManager::complete(&conn, 16 * HOUR).unwrap();
        SessionManager::start(&conn, Protocol::SixteenEight, day).unwrap();
        SessionManager::cancel(&conn, day + 2 * HOUR).unwrap();

        let sessions = SessionRepo::list_completed(&conn).unwrap();
        let result = calculate_streaks(&completed_records(&sessions), day + 3 * HOUR);
        assert_eq!(result.total_completed, 1);
        assert_eq!(result.current_streak, 1);
    }
}
