use thiserror::Error;

use crate::domain::{Session, SessionId};

#[derive(Error, Debug)]
pub enum SessionRepositoryError {
    #[error("session not found: {id}")]
    NotFound { id: SessionId },

    #[error("persistence error: {message}")]
    Storage { message: String },
}

pub trait SessionRepository: Send + Sync {
    /// Persists a new session and assigns its id.
    fn save(&self, session: &mut Session) -> Result<SessionId, SessionRepositoryError>;

    fn update(&self, session: &Session) -> Result<(), SessionRepositoryError>;

    fn find_by_id(&self, id: SessionId) -> Result<Session, SessionRepositoryError>;

    /// All sessions, most recently created first.
    fn find_all(&self) -> Result<Vec<Session>, SessionRepositoryError>;

    /// Sessions currently in `active` or `paused`, for the overdue sweep.
    fn find_running(&self) -> Result<Vec<Session>, SessionRepositoryError>;

    /// Sessions that reached a terminal state, for weekly reporting.
    fn find_terminal(&self) -> Result<Vec<Session>, SessionRepositoryError>;
}
