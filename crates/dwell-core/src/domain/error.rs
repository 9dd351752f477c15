use thiserror::Error;

use super::{Command, SessionId, SessionStatus};

/// Failure taxonomy for session commands.
///
/// Clock skew is not represented here: the accumulator clamps the negative
/// delta and logs a warning instead of failing the command.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("cannot {command} a {status} session")]
    InvalidTransition {
        status: SessionStatus,
        command: Command,
    },

    #[error("session not found: {id}")]
    NotFound { id: SessionId },

    #[error("session {id} is {actual}, expected {expected}")]
    StaleState {
        id: SessionId,
        expected: SessionStatus,
        actual: SessionStatus,
    },

    #[error("persistence error: {message}")]
    Storage { message: String },
}

impl CommandError {
    pub fn validation(message: impl Into<String>) -> Self {
        CommandError::Validation {
            message: message.into(),
        }
    }
}
