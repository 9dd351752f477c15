use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Transaction};

use dwell_core::{
    PauseEntry, Session, SessionId, SessionRepository, SessionRepositoryError, SessionStatus,
};

pub struct SqliteSessionRepository {
    connection: Mutex<Connection>,
}

impl SqliteSessionRepository {
    pub fn new(path: &Path) -> Result<Self, SessionRepositoryError> {
        let connection =
            Connection::open(path).map_err(|error| SessionRepositoryError::Storage {
                message: error.to_string(),
            })?;

        let repository = Self {
            connection: Mutex::new(connection),
        };
        repository.initialize_schema()?;

        Ok(repository)
    }

    pub fn in_memory() -> Result<Self, SessionRepositoryError> {
        let connection =
            Connection::open_in_memory().map_err(|error| SessionRepositoryError::Storage {
                message: error.to_string(),
            })?;

        let repository = Self {
            connection: Mutex::new(connection),
        };
        repository.initialize_schema()?;

        Ok(repository)
    }

    fn initialize_schema(&self) -> Result<(), SessionRepositoryError> {
        let connection = self.connection.lock().unwrap();
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS sessions (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    goal TEXT NOT NULL,
                    scheduled_minutes INTEGER NOT NULL,
                    status TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    start_time TEXT,
                    ended_at TEXT,
                    active_elapsed_seconds INTEGER NOT NULL DEFAULT 0,
                    focus_score INTEGER NOT NULL DEFAULT 0
                );
                CREATE TABLE IF NOT EXISTS pause_log (
                    id INTEGER PRIMARY KEY,
                    session_id INTEGER NOT NULL REFERENCES sessions(id),
                    reason TEXT NOT NULL,
                    paused_at TEXT NOT NULL,
                    resumed_at TEXT
                );",
            )
            .map_err(|error| SessionRepositoryError::Storage {
                message: error.to_string(),
            })
    }

    fn find_where(&self, condition: &str) -> Result<Vec<Session>, SessionRepositoryError> {
        let connection = self.connection.lock().unwrap();

        let query = format!(
            "SELECT id, title, goal, scheduled_minutes, status, created_at,
                    start_time, ended_at, active_elapsed_seconds, focus_score
             FROM sessions {condition}"
        );

        let mut statement = connection
            .prepare(&query)
            .map_err(|error| SessionRepositoryError::Storage {
                message: error.to_string(),
            })?;

        let mut sessions = statement
            .query_map([], row_to_session)
            .map_err(|error| SessionRepositoryError::Storage {
                message: error.to_string(),
            })?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| SessionRepositoryError::Storage {
                message: error.to_string(),
            })?;

        for session in &mut sessions {
            session.pause_log = load_pause_log(&connection, session.id.unwrap_or_default())?;
        }

        Ok(sessions)
    }
}

impl SessionRepository for SqliteSessionRepository {
    fn save(&self, session: &mut Session) -> Result<SessionId, SessionRepositoryError> {
        let mut connection = self.connection.lock().unwrap();
        let transaction = connection
            .transaction()
            .map_err(|error| SessionRepositoryError::Storage {
                message: error.to_string(),
            })?;

        transaction
            .execute(
                "INSERT INTO sessions (title, goal, scheduled_minutes, status, created_at,
                                       start_time, ended_at, active_elapsed_seconds, focus_score)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    session.title,
                    session.goal,
                    session.scheduled_minutes,
                    session.status.as_str(),
                    session.created_at.to_rfc3339(),
                    session.start_time.map(|dt| dt.to_rfc3339()),
                    session.ended_at.map(|dt| dt.to_rfc3339()),
                    session.active_elapsed_seconds,
                    session.focus_score,
                ],
            )
            .map_err(|error| SessionRepositoryError::Storage {
                message: error.to_string(),
            })?;

        let id = transaction.last_insert_rowid();
        store_pause_log(&transaction, id, &session.pause_log)?;

        transaction
            .commit()
            .map_err(|error| SessionRepositoryError::Storage {
                message: error.to_string(),
            })?;

        session.id = Some(id);
        Ok(id)
    }

    fn update(&self, session: &Session) -> Result<(), SessionRepositoryError> {
        let id = session.id.ok_or_else(|| SessionRepositoryError::Storage {
            message: "cannot update session without id".to_string(),
        })?;

        let mut connection = self.connection.lock().unwrap();
        let transaction = connection
            .transaction()
            .map_err(|error| SessionRepositoryError::Storage {
                message: error.to_string(),
            })?;

        let rows_affected = transaction
            .execute(
                "UPDATE sessions SET status = ?1, start_time = ?2, ended_at = ?3,
                                     active_elapsed_seconds = ?4, focus_score = ?5
                 WHERE id = ?6",
                params![
                    session.status.as_str(),
                    session.start_time.map(|dt| dt.to_rfc3339()),
                    session.ended_at.map(|dt| dt.to_rfc3339()),
                    session.active_elapsed_seconds,
                    session.focus_score,
                    id,
                ],
            )
            .map_err(|error| SessionRepositoryError::Storage {
                message: error.to_string(),
            })?;

        if rows_affected == 0 {
            return Err(SessionRepositoryError::NotFound { id });
        }

        // the pause log is append-only in the domain, so replacing the rows
        // wholesale cannot lose history
        transaction
            .execute("DELETE FROM pause_log WHERE session_id = ?1", params![id])
            .map_err(|error| SessionRepositoryError::Storage {
                message: error.to_string(),
            })?;
        store_pause_log(&transaction, id, &session.pause_log)?;

        transaction
            .commit()
            .map_err(|error| SessionRepositoryError::Storage {
                message: error.to_string(),
            })
    }

    fn find_by_id(&self, id: SessionId) -> Result<Session, SessionRepositoryError> {
        let connection = self.connection.lock().unwrap();

        let mut session = connection
            .query_row(
                "SELECT id, title, goal, scheduled_minutes, status, created_at,
                        start_time, ended_at, active_elapsed_seconds, focus_score
                 FROM sessions WHERE id = ?1",
                params![id],
                row_to_session,
            )
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => SessionRepositoryError::NotFound { id },
                _ => SessionRepositoryError::Storage {
                    message: error.to_string(),
                },
            })?;

        session.pause_log = load_pause_log(&connection, id)?;
        Ok(session)
    }

    fn find_all(&self) -> Result<Vec<Session>, SessionRepositoryError> {
        self.find_where("ORDER BY created_at DESC, id DESC")
    }

    fn find_running(&self) -> Result<Vec<Session>, SessionRepositoryError> {
        self.find_where("WHERE status IN ('active', 'paused') ORDER BY created_at DESC, id DESC")
    }

    fn find_terminal(&self) -> Result<Vec<Session>, SessionRepositoryError> {
        self.find_where(
            "WHERE status IN ('completed', 'overdue', 'interrupted')
             ORDER BY created_at DESC, id DESC",
        )
    }
}

fn store_pause_log(
    transaction: &Transaction,
    session_id: SessionId,
    entries: &[PauseEntry],
) -> Result<(), SessionRepositoryError> {
    for entry in entries {
        transaction
            .execute(
                "INSERT INTO pause_log (session_id, reason, paused_at, resumed_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    session_id,
                    entry.reason,
                    entry.paused_at.to_rfc3339(),
                    entry.resumed_at.map(|dt| dt.to_rfc3339()),
                ],
            )
            .map_err(|error| SessionRepositoryError::Storage {
                message: error.to_string(),
            })?;
    }
    Ok(())
}

fn load_pause_log(
    connection: &Connection,
    session_id: SessionId,
) -> Result<Vec<PauseEntry>, SessionRepositoryError> {
    let mut statement = connection
        .prepare(
            "SELECT reason, paused_at, resumed_at FROM pause_log
             WHERE session_id = ?1 ORDER BY id ASC",
        )
        .map_err(|error| SessionRepositoryError::Storage {
            message: error.to_string(),
        })?;

    let result = statement
        .query_map(params![session_id], |row| {
            let reason: String = row.get(0)?;
            let paused_at: String = row.get(1)?;
            let resumed_at: Option<String> = row.get(2)?;

            Ok(PauseEntry {
                reason,
                paused_at: parse_timestamp(&paused_at, 1)?,
                resumed_at: match resumed_at {
                    Some(value) => Some(parse_timestamp(&value, 2)?),
                    None => None,
                },
            })
        })
        .map_err(|error| SessionRepositoryError::Storage {
            message: error.to_string(),
        })?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| SessionRepositoryError::Storage {
            message: error.to_string(),
        });
    result
}

fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<Session> {
    let id: i64 = row.get(0)?;
    let title: String = row.get(1)?;
    let goal: String = row.get(2)?;
    let scheduled_minutes: i64 = row.get(3)?;
    let status_str: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    let start_time: Option<String> = row.get(6)?;
    let ended_at: Option<String> = row.get(7)?;
    let active_elapsed_seconds: i64 = row.get(8)?;
    let focus_score: u8 = row.get(9)?;

    let status = SessionStatus::from_stored(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::other(format!(
                "unknown session status: {status_str}"
            ))),
        )
    })?;

    Ok(Session {
        id: Some(id),
        title,
        goal,
        scheduled_minutes,
        status,
        created_at: parse_timestamp(&created_at, 5)?,
        start_time: match start_time {
            Some(value) => Some(parse_timestamp(&value, 6)?),
            None => None,
        },
        ended_at: match ended_at {
            Some(value) => Some(parse_timestamp(&value, 7)?),
            None => None,
        },
        active_elapsed_seconds,
        pause_log: Vec::new(),
        focus_score,
    })
}

fn parse_timestamp(value: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(error),
            )
        })
}
