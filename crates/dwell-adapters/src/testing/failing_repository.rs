use dwell_core::{Session, SessionId, SessionRepository, SessionRepositoryError};

/// Repository double whose every call fails, for exercising storage error
/// paths in the service layer.
pub struct FailingSessionRepository {
    message: String,
}

impl FailingSessionRepository {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    fn storage_error(&self) -> SessionRepositoryError {
        SessionRepositoryError::Storage {
            message: self.message.clone(),
        }
    }
}

impl SessionRepository for FailingSessionRepository {
    fn save(&self, _session: &mut Session) -> Result<SessionId, SessionRepositoryError> {
        Err(self.storage_error())
    }

    fn update(&self, _session: &Session) -> Result<(), SessionRepositoryError> {
        Err(self.storage_error())
    }

    fn find_by_id(&self, _id: SessionId) -> Result<Session, SessionRepositoryError> {
        Err(self.storage_error())
    }

    fn find_all(&self) -> Result<Vec<Session>, SessionRepositoryError> {
        Err(self.storage_error())
    }

    fn find_running(&self) -> Result<Vec<Session>, SessionRepositoryError> {
        Err(self.storage_error())
    }

    fn find_terminal(&self) -> Result<Vec<Session>, SessionRepositoryError> {
        Err(self.storage_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dwell_core::{CommandError, NewSession, SessionService, SystemClock};
    use std::sync::Arc;

    #[test]
    fn every_call_fails_with_storage_error() {
        let repository = FailingSessionRepository::new("disk full");

        let result = repository.find_all();

        assert!(matches!(
            result,
            Err(SessionRepositoryError::Storage { .. })
        ));
    }

    #[test]
    fn service_surfaces_storage_errors() {
        let service = SessionService::new(
            Arc::new(FailingSessionRepository::new("disk full")),
            Arc::new(SystemClock),
        );

        let result = service.create(NewSession {
            title: "title".to_string(),
            goal: "goal".to_string(),
            scheduled_minutes: 30,
        });

        match result {
            Err(CommandError::Storage { message }) => assert_eq!(message, "disk full"),
            other => panic!("expected Storage error, got {other:?}"),
        }
    }

    #[test]
    fn saving_does_not_assign_an_id() {
        let repository = FailingSessionRepository::new("disk full");
        let mut session = Session::schedule("title", "goal", 30, Utc::now()).unwrap();

        let result = repository.save(&mut session);

        assert!(result.is_err());
        assert!(session.id.is_none());
    }
}
