use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::domain::{
    aggregate_by_week, CommandError, Session, SessionId, SessionStatus, WeeklyBucket,
};
use crate::export::sessions_to_csv;
use crate::ports::{SessionRepository, SessionRepositoryError};

impl From<SessionRepositoryError> for CommandError {
    fn from(error: SessionRepositoryError) -> Self {
        match error {
            SessionRepositoryError::NotFound { id } => CommandError::NotFound { id },
            SessionRepositoryError::Storage { message } => CommandError::Storage { message },
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub title: String,
    pub goal: String,
    pub scheduled_minutes: i64,
}

/// Command orchestration over the session store.
///
/// Callers may pass the status they believe the session is in; a mismatch is
/// rejected with `StaleState` before any mutation, which resolves concurrent
/// commands racing for the same session. The caller (one actor per store in
/// the daemon) is responsible for serializing commands per session.
pub struct SessionService {
    repository: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
}

impl SessionService {
    pub fn new(repository: Arc<dyn SessionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub fn create(&self, draft: NewSession) -> Result<Session, CommandError> {
        let mut session = Session::schedule(
            &draft.title,
            &draft.goal,
            draft.scheduled_minutes,
            self.clock.now(),
        )?;
        self.repository.save(&mut session)?;

        info!(id = ?session.id, title = %session.title, "session scheduled");
        Ok(session)
    }

    pub fn start(
        &self,
        id: SessionId,
        expected: Option<SessionStatus>,
    ) -> Result<Session, CommandError> {
        self.apply(id, expected, |session, now| session.start(now))
    }

    pub fn pause(
        &self,
        id: SessionId,
        reason: &str,
        expected: Option<SessionStatus>,
    ) -> Result<Session, CommandError> {
        self.apply(id, expected, |session, now| session.pause(reason, now))
    }

    pub fn resume(
        &self,
        id: SessionId,
        expected: Option<SessionStatus>,
    ) -> Result<Session, CommandError> {
        self.apply(id, expected, |session, now| session.resume(now))
    }

    pub fn complete(
        &self,
        id: SessionId,
        expected: Option<SessionStatus>,
    ) -> Result<Session, CommandError> {
        self.apply(id, expected, |session, now| session.complete(now))
    }

    pub fn interrupt(
        &self,
        id: SessionId,
        expected: Option<SessionStatus>,
    ) -> Result<Session, CommandError> {
        self.apply(id, expected, |session, now| session.interrupt(now))
    }

    /// Background scan: terminates every running session whose scheduled
    /// window has lapsed beyond the grace margin.
    pub fn sweep_overdue(&self, grace: Duration) -> Result<Vec<Session>, CommandError> {
        let now = self.clock.now();
        let mut marked = Vec::new();

        for mut session in self.repository.find_running()? {
            if !session.is_overdue_at(now, grace) {
                continue;
            }
            session.mark_overdue(now)?;
            self.repository.update(&session)?;
            info!(id = ?session.id, title = %session.title, "session marked overdue");
            marked.push(session);
        }

        if !marked.is_empty() {
            debug!(count = marked.len(), "overdue sweep finished");
        }

        Ok(marked)
    }

    pub fn session(&self, id: SessionId) -> Result<Session, CommandError> {
        Ok(self.repository.find_by_id(id)?)
    }

    pub fn history(&self) -> Result<Vec<Session>, CommandError> {
        Ok(self.repository.find_all()?)
    }

    pub fn weekly_report(&self) -> Result<Vec<WeeklyBucket>, CommandError> {
        let sessions = self.repository.find_terminal()?;
        Ok(aggregate_by_week(&sessions))
    }

    pub fn export_csv(&self) -> Result<String, CommandError> {
        let sessions = self.repository.find_all()?;
        Ok(sessions_to_csv(&sessions))
    }

    fn apply<F>(
        &self,
        id: SessionId,
        expected: Option<SessionStatus>,
        mutate: F,
    ) -> Result<Session, CommandError>
    where
        F: FnOnce(&mut Session, DateTime<Utc>) -> Result<(), CommandError>,
    {
        let mut session = self.repository.find_by_id(id)?;

        if let Some(expected) = expected {
            if session.status != expected {
                return Err(CommandError::StaleState {
                    id,
                    expected,
                    actual: session.status,
                });
            }
        }

        mutate(&mut session, self.clock.now())?;
        self.repository.update(&session)?;

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct InMemoryRepository {
        sessions: Mutex<Vec<Session>>,
    }

    impl InMemoryRepository {
        fn new() -> Self {
            Self {
                sessions: Mutex::new(Vec::new()),
            }
        }
    }

    impl SessionRepository for InMemoryRepository {
        fn save(&self, session: &mut Session) -> Result<SessionId, SessionRepositoryError> {
            let mut sessions = self.sessions.lock().unwrap();
            let id = sessions.len() as SessionId + 1;
            session.id = Some(id);
            sessions.push(session.clone());
            Ok(id)
        }

        fn update(&self, session: &Session) -> Result<(), SessionRepositoryError> {
            let id = session.id.expect("updated session must have an id");
            let mut sessions = self.sessions.lock().unwrap();
            match sessions.iter_mut().find(|stored| stored.id == Some(id)) {
                Some(stored) => {
                    *stored = session.clone();
                    Ok(())
                }
                None => Err(SessionRepositoryError::NotFound { id }),
            }
        }

        fn find_by_id(&self, id: SessionId) -> Result<Session, SessionRepositoryError> {
            let sessions = self.sessions.lock().unwrap();
            sessions
                .iter()
                .find(|stored| stored.id == Some(id))
                .cloned()
                .ok_or(SessionRepositoryError::NotFound { id })
        }

        fn find_all(&self) -> Result<Vec<Session>, SessionRepositoryError> {
            let mut sessions = self.sessions.lock().unwrap().clone();
            sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(sessions)
        }

        fn find_running(&self) -> Result<Vec<Session>, SessionRepositoryError> {
            let sessions = self.sessions.lock().unwrap();
            Ok(sessions
                .iter()
                .filter(|stored| stored.status.is_running())
                .cloned()
                .collect())
        }

        fn find_terminal(&self) -> Result<Vec<Session>, SessionRepositoryError> {
            let sessions = self.sessions.lock().unwrap();
            Ok(sessions
                .iter()
                .filter(|stored| stored.status.is_terminal())
                .cloned()
                .collect())
        }
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap()
    }

    fn service_with_clock() -> (SessionService, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(base_time()));
        let service = SessionService::new(Arc::new(InMemoryRepository::new()), clock.clone());
        (service, clock)
    }

    fn draft() -> NewSession {
        NewSession {
            title: "Write parser".to_string(),
            goal: "finish the lexer".to_string(),
            scheduled_minutes: 30,
        }
    }

    #[test]
    fn create_assigns_id_and_persists() {
        let (service, _clock) = service_with_clock();

        let session = service.create(draft()).unwrap();

        let id = session.id.unwrap();
        assert_eq!(session.status, SessionStatus::Scheduled);

        let stored = service.session(id).unwrap();
        assert_eq!(stored, session);
    }

    #[test]
    fn create_rejects_invalid_input() {
        let (service, _clock) = service_with_clock();

        let result = service.create(NewSession {
            title: String::new(),
            goal: "goal".to_string(),
            scheduled_minutes: 30,
        });

        assert!(matches!(result, Err(CommandError::Validation { .. })));
    }

    #[test]
    fn full_lifecycle_accounts_elapsed_time() {
        let (service, clock) = service_with_clock();
        let id = service.create(draft()).unwrap().id.unwrap();

        service.start(id, None).unwrap();
        clock.advance(Duration::seconds(600));
        service.pause(id, "standup", None).unwrap();
        clock.advance(Duration::seconds(300));
        service.resume(id, None).unwrap();
        clock.advance(Duration::seconds(600));
        let session = service.complete(id, None).unwrap();

        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.active_elapsed_seconds, 1200);
        assert_eq!(session.focus_score, 80);
        assert_eq!(session.pause_count(), 1);
    }

    #[test]
    fn unknown_id_fails_with_not_found() {
        let (service, _clock) = service_with_clock();

        let result = service.start(42, None);

        assert_eq!(result, Err(CommandError::NotFound { id: 42 }));
    }

    #[test]
    fn stale_expected_status_is_rejected_before_mutation() {
        let (service, clock) = service_with_clock();
        let id = service.create(draft()).unwrap().id.unwrap();
        service.start(id, None).unwrap();
        clock.advance(Duration::seconds(60));

        // two callers race with the same expectation; pause lands first
        service.pause(id, "phone", Some(SessionStatus::Active)).unwrap();
        let result = service.complete(id, Some(SessionStatus::Active));

        assert_eq!(
            result,
            Err(CommandError::StaleState {
                id,
                expected: SessionStatus::Active,
                actual: SessionStatus::Paused,
            })
        );

        // the losing command changed nothing
        let stored = service.session(id).unwrap();
        assert_eq!(stored.status, SessionStatus::Paused);
        assert_eq!(stored.active_elapsed_seconds, 60);
    }

    #[test]
    fn rejected_command_leaves_session_unchanged() {
        let (service, _clock) = service_with_clock();
        let id = service.create(draft()).unwrap().id.unwrap();
        let before = service.session(id).unwrap();

        let result = service.pause(id, "too early", None);

        assert!(matches!(
            result,
            Err(CommandError::InvalidTransition { .. })
        ));
        assert_eq!(service.session(id).unwrap(), before);
    }

    #[test]
    fn sweep_marks_only_expired_sessions() {
        let (service, clock) = service_with_clock();

        let expired = service.create(draft()).unwrap().id.unwrap();
        service.start(expired, None).unwrap();

        clock.advance(Duration::minutes(20));
        let fresh = service.create(draft()).unwrap().id.unwrap();
        service.start(fresh, None).unwrap();

        // 31 minutes after the first start, 11 after the second
        clock.advance(Duration::minutes(11));
        let marked = service.sweep_overdue(Duration::seconds(30)).unwrap();

        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].id, Some(expired));
        assert_eq!(service.session(expired).unwrap().status, SessionStatus::Overdue);
        assert_eq!(service.session(fresh).unwrap().status, SessionStatus::Active);
    }

    #[test]
    fn sweep_catches_paused_sessions() {
        let (service, clock) = service_with_clock();
        let id = service.create(draft()).unwrap().id.unwrap();
        service.start(id, None).unwrap();
        clock.advance(Duration::minutes(5));
        service.pause(id, "lunch", None).unwrap();

        clock.advance(Duration::minutes(40));
        let marked = service.sweep_overdue(Duration::seconds(30)).unwrap();

        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].status, SessionStatus::Overdue);
        assert_eq!(marked[0].active_elapsed_seconds, 300);
    }

    #[test]
    fn history_is_ordered_most_recent_first() {
        let (service, clock) = service_with_clock();
        let first = service.create(draft()).unwrap().id.unwrap();
        clock.advance(Duration::seconds(60));
        let second = service.create(draft()).unwrap().id.unwrap();

        let history = service.history().unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, Some(second));
        assert_eq!(history[1].id, Some(first));
    }

    #[test]
    fn weekly_report_excludes_running_sessions() {
        let (service, clock) = service_with_clock();

        let completed = service.create(draft()).unwrap().id.unwrap();
        service.start(completed, None).unwrap();
        clock.advance(Duration::minutes(10));
        service.complete(completed, None).unwrap();

        let interrupted = service.create(draft()).unwrap().id.unwrap();
        service.interrupt(interrupted, None).unwrap();

        let overdue = service.create(draft()).unwrap().id.unwrap();
        service.start(overdue, None).unwrap();
        clock.advance(Duration::minutes(31));
        service.sweep_overdue(Duration::seconds(30)).unwrap();

        let running = service.create(draft()).unwrap().id.unwrap();
        service.start(running, None).unwrap();

        let report = service.weekly_report().unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].total_sessions, 3);
        assert_eq!(report[0].completed_sessions, 1);
        assert_eq!(report[0].overdue_sessions, 1);
        assert_eq!(report[0].interrupted_sessions, 1);
    }

    #[test]
    fn export_csv_covers_all_sessions() {
        let (service, clock) = service_with_clock();
        let id = service.create(draft()).unwrap().id.unwrap();
        service.start(id, None).unwrap();
        clock.advance(Duration::minutes(10));
        service.complete(id, None).unwrap();
        service.create(draft()).unwrap();

        let csv = service.export_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,title,goal,status"));
        assert!(csv.contains("completed"));
        assert!(csv.contains("scheduled"));
    }
}
