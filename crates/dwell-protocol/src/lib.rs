//! Dwell protocol definitions for CLI-daemon communication
//!
//! This crate defines the IPC protocol between the dwell CLI and daemon.
//! All types are serializable with bincode for efficient binary communication.

use serde::{Deserialize, Serialize};

pub use dwell_core::{CommandError, Session, SessionId, SessionStatus, WeeklyBucket};

/// Requests sent from CLI to daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// Schedule a new session
    Create {
        title: String,
        goal: String,
        /// Duration in minutes (None = use default from config)
        duration_minutes: Option<i64>,
    },
    /// Begin the scheduled session's active window
    Start {
        id: SessionId,
        /// Status the caller believes the session is in; a mismatch is
        /// rejected with `StaleState` instead of silently overwriting
        expected: Option<SessionStatus>,
    },
    /// Pause the active session, recording why
    Pause {
        id: SessionId,
        reason: String,
        expected: Option<SessionStatus>,
    },
    /// Resume a paused session
    Resume {
        id: SessionId,
        expected: Option<SessionStatus>,
    },
    /// Complete a running session
    Complete {
        id: SessionId,
        expected: Option<SessionStatus>,
    },
    /// Abort a session that has not yet terminated
    Interrupt {
        id: SessionId,
        expected: Option<SessionStatus>,
    },
    /// Fetch one session
    GetSession { id: SessionId },
    /// Fetch all sessions, most recently created first
    GetHistory,
    /// Fetch terminal-session counts per ISO week
    GetWeeklyReport,
    /// Render all sessions as CSV
    ExportCsv,
    /// Ping the daemon to check if it's alive
    Ping,
}

/// Responses sent from daemon to CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// The session after a command or lookup
    Session(Session),
    /// Session history, most recently created first
    History(Vec<Session>),
    /// Weekly terminal-session counts
    WeeklyReport(Vec<WeeklyBucket>),
    /// CSV rendering of all sessions
    Csv(String),
    /// Error response with machine-readable kind
    Error { kind: ErrorKind, message: String },
    /// Pong response to ping
    Pong,
}

/// Wire-level mirror of the core error taxonomy, so clients can branch
/// without matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    InvalidTransition,
    NotFound,
    StaleState,
    Storage,
    /// Daemon-side failure outside the command taxonomy
    Internal,
}

impl From<&CommandError> for ErrorKind {
    fn from(error: &CommandError) -> Self {
        match error {
            CommandError::Validation { .. } => ErrorKind::Validation,
            CommandError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            CommandError::NotFound { .. } => ErrorKind::NotFound,
            CommandError::StaleState { .. } => ErrorKind::StaleState,
            CommandError::Storage { .. } => ErrorKind::Storage,
        }
    }
}

impl Response {
    pub fn command_error(error: &CommandError) -> Self {
        Response::Error {
            kind: ErrorKind::from(error),
            message: error.to_string(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Response::Error {
            kind: ErrorKind::Internal,
            message: message.into(),
        }
    }
}
