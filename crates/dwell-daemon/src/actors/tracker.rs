use chrono::Duration as ChronoDuration;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use dwell_core::{
    CommandError, Config, NewSession, Session, SessionId, SessionService, SessionStatus,
    WeeklyBucket,
};

pub enum TrackerMessage {
    Create {
        title: String,
        goal: String,
        duration_minutes: Option<i64>,
        reply: oneshot::Sender<Result<Session, CommandError>>,
    },
    Start {
        id: SessionId,
        expected: Option<SessionStatus>,
        reply: oneshot::Sender<Result<Session, CommandError>>,
    },
    Pause {
        id: SessionId,
        reason: String,
        expected: Option<SessionStatus>,
        reply: oneshot::Sender<Result<Session, CommandError>>,
    },
    Resume {
        id: SessionId,
        expected: Option<SessionStatus>,
        reply: oneshot::Sender<Result<Session, CommandError>>,
    },
    Complete {
        id: SessionId,
        expected: Option<SessionStatus>,
        reply: oneshot::Sender<Result<Session, CommandError>>,
    },
    Interrupt {
        id: SessionId,
        expected: Option<SessionStatus>,
        reply: oneshot::Sender<Result<Session, CommandError>>,
    },
    GetSession {
        id: SessionId,
        reply: oneshot::Sender<Result<Session, CommandError>>,
    },
    GetHistory {
        reply: oneshot::Sender<Result<Vec<Session>, CommandError>>,
    },
    GetWeeklyReport {
        reply: oneshot::Sender<Result<Vec<WeeklyBucket>, CommandError>>,
    },
    ExportCsv {
        reply: oneshot::Sender<Result<String, CommandError>>,
    },
}

/// Owns the session service. Lifecycle commands and the periodic overdue
/// sweep all pass through this actor's mailbox, which serializes them: a
/// session cannot be marked overdue while a complete command is mid-flight.
pub struct TrackerActor {
    receiver: mpsc::Receiver<TrackerMessage>,
    service: SessionService,
    config: Config,
}

#[derive(Clone)]
pub struct TrackerHandle {
    sender: mpsc::Sender<TrackerMessage>,
}

impl TrackerHandle {
    pub async fn create(
        &self,
        title: String,
        goal: String,
        duration_minutes: Option<i64>,
    ) -> Option<Result<Session, CommandError>> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TrackerMessage::Create {
                title,
                goal,
                duration_minutes,
                reply,
            })
            .await
            .ok()?;
        receiver.await.ok()
    }

    pub async fn start(
        &self,
        id: SessionId,
        expected: Option<SessionStatus>,
    ) -> Option<Result<Session, CommandError>> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TrackerMessage::Start { id, expected, reply })
            .await
            .ok()?;
        receiver.await.ok()
    }

    pub async fn pause(
        &self,
        id: SessionId,
        reason: String,
        expected: Option<SessionStatus>,
    ) -> Option<Result<Session, CommandError>> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TrackerMessage::Pause {
                id,
                reason,
                expected,
                reply,
            })
            .await
            .ok()?;
        receiver.await.ok()
    }

    pub async fn resume(
        &self,
        id: SessionId,
        expected: Option<SessionStatus>,
    ) -> Option<Result<Session, CommandError>> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TrackerMessage::Resume { id, expected, reply })
            .await
            .ok()?;
        receiver.await.ok()
    }

    pub async fn complete(
        &self,
        id: SessionId,
        expected: Option<SessionStatus>,
    ) -> Option<Result<Session, CommandError>> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TrackerMessage::Complete { id, expected, reply })
            .await
            .ok()?;
        receiver.await.ok()
    }

    pub async fn interrupt(
        &self,
        id: SessionId,
        expected: Option<SessionStatus>,
    ) -> Option<Result<Session, CommandError>> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TrackerMessage::Interrupt { id, expected, reply })
            .await
            .ok()?;
        receiver.await.ok()
    }

    pub async fn get_session(&self, id: SessionId) -> Option<Result<Session, CommandError>> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TrackerMessage::GetSession { id, reply })
            .await
            .ok()?;
        receiver.await.ok()
    }

    pub async fn get_history(&self) -> Option<Result<Vec<Session>, CommandError>> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TrackerMessage::GetHistory { reply })
            .await
            .ok()?;
        receiver.await.ok()
    }

    pub async fn get_weekly_report(&self) -> Option<Result<Vec<WeeklyBucket>, CommandError>> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TrackerMessage::GetWeeklyReport { reply })
            .await
            .ok()?;
        receiver.await.ok()
    }

    pub async fn export_csv(&self) -> Option<Result<String, CommandError>> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TrackerMessage::ExportCsv { reply })
            .await
            .ok()?;
        receiver.await.ok()
    }
}

impl TrackerActor {
    pub fn new(service: SessionService, config: Config) -> (Self, TrackerHandle) {
        let (sender, receiver) = mpsc::channel(32);

        let actor = Self {
            receiver,
            service,
            config,
        };

        let handle = TrackerHandle { sender };

        (actor, handle)
    }

    pub async fn run(mut self) {
        let mut sweep_interval = tokio::time::interval(Duration::from_secs(
            self.config.overdue.sweep_interval_seconds.max(1),
        ));

        loop {
            tokio::select! {
                Some(message) = self.receiver.recv() => {
                    self.handle_message(message);
                }
                _ = sweep_interval.tick() => {
                    self.sweep();
                }
                else => break,
            }
        }

        debug!("tracker actor stopped");
    }

    fn handle_message(&self, message: TrackerMessage) {
        match message {
            TrackerMessage::Create {
                title,
                goal,
                duration_minutes,
                reply,
            } => {
                let scheduled_minutes =
                    duration_minutes.unwrap_or(self.config.session.default_duration_minutes);
                let result = self.service.create(NewSession {
                    title,
                    goal,
                    scheduled_minutes,
                });
                let _ = reply.send(result);
            }
            TrackerMessage::Start { id, expected, reply } => {
                let _ = reply.send(self.service.start(id, expected));
            }
            TrackerMessage::Pause {
                id,
                reason,
                expected,
                reply,
            } => {
                let _ = reply.send(self.service.pause(id, &reason, expected));
            }
            TrackerMessage::Resume { id, expected, reply } => {
                let _ = reply.send(self.service.resume(id, expected));
            }
            TrackerMessage::Complete { id, expected, reply } => {
                let _ = reply.send(self.service.complete(id, expected));
            }
            TrackerMessage::Interrupt { id, expected, reply } => {
                let result = if self.config.interrupt.user_triggered {
                    self.service.interrupt(id, expected)
                } else {
                    Err(CommandError::Validation {
                        message: "interrupt is not enabled for clients on this daemon".to_string(),
                    })
                };
                let _ = reply.send(result);
            }
            TrackerMessage::GetSession { id, reply } => {
                let _ = reply.send(self.service.session(id));
            }
            TrackerMessage::GetHistory { reply } => {
                let _ = reply.send(self.service.history());
            }
            TrackerMessage::GetWeeklyReport { reply } => {
                let _ = reply.send(self.service.weekly_report());
            }
            TrackerMessage::ExportCsv { reply } => {
                let _ = reply.send(self.service.export_csv());
            }
        }
    }

    fn sweep(&self) {
        let grace = ChronoDuration::seconds(self.config.overdue.grace_seconds);
        match self.service.sweep_overdue(grace) {
            Ok(marked) if !marked.is_empty() => {
                info!(count = marked.len(), "overdue sweep terminated sessions");
            }
            Ok(_) => {}
            Err(error) => {
                error!(%error, "overdue sweep failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dwell_adapters::SqliteSessionRepository;
    use dwell_core::FixedClock;
    use std::sync::Arc;

    fn spawn_actor(config: Config) -> (TrackerHandle, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap(),
        ));
        let repository = Arc::new(SqliteSessionRepository::in_memory().unwrap());
        let service = SessionService::new(repository, clock.clone());
        let (actor, handle) = TrackerActor::new(service, config);
        tokio::spawn(actor.run());
        (handle, clock)
    }

    #[tokio::test]
    async fn create_uses_default_duration_from_config() {
        let (handle, _clock) = spawn_actor(Config::default());

        let session = handle
            .create("Write parser".to_string(), "lexer".to_string(), None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(session.scheduled_minutes, 25);
        assert_eq!(session.status, SessionStatus::Scheduled);
    }

    #[tokio::test]
    async fn lifecycle_commands_flow_through_mailbox() {
        let (handle, clock) = spawn_actor(Config::default());

        let id = handle
            .create("Write parser".to_string(), "lexer".to_string(), Some(30))
            .await
            .unwrap()
            .unwrap()
            .id
            .unwrap();

        handle.start(id, None).await.unwrap().unwrap();
        clock.advance(ChronoDuration::seconds(600));
        handle
            .pause(id, "standup".to_string(), None)
            .await
            .unwrap()
            .unwrap();
        clock.advance(ChronoDuration::seconds(300));
        handle.resume(id, None).await.unwrap().unwrap();
        clock.advance(ChronoDuration::seconds(600));
        let session = handle.complete(id, None).await.unwrap().unwrap();

        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.active_elapsed_seconds, 1200);
        assert_eq!(session.focus_score, 80);
    }

    #[tokio::test]
    async fn stale_expectation_is_rejected() {
        let (handle, _clock) = spawn_actor(Config::default());

        let id = handle
            .create("Write parser".to_string(), "lexer".to_string(), Some(30))
            .await
            .unwrap()
            .unwrap()
            .id
            .unwrap();
        handle.start(id, None).await.unwrap().unwrap();
        handle
            .pause(id, "phone".to_string(), Some(SessionStatus::Active))
            .await
            .unwrap()
            .unwrap();

        let result = handle
            .complete(id, Some(SessionStatus::Active))
            .await
            .unwrap();

        assert!(matches!(result, Err(CommandError::StaleState { .. })));
    }

    #[tokio::test]
    async fn interrupt_can_be_disabled_by_config() {
        let mut config = Config::default();
        config.interrupt.user_triggered = false;
        let (handle, _clock) = spawn_actor(config);

        let id = handle
            .create("Write parser".to_string(), "lexer".to_string(), Some(30))
            .await
            .unwrap()
            .unwrap()
            .id
            .unwrap();

        let result = handle.interrupt(id, None).await.unwrap();

        assert!(matches!(result, Err(CommandError::Validation { .. })));
    }

    #[tokio::test]
    async fn sweep_marks_expired_session_overdue() {
        let mut config = Config::default();
        config.overdue.sweep_interval_seconds = 1;
        let (handle, clock) = spawn_actor(config);

        let id = handle
            .create("Write parser".to_string(), "lexer".to_string(), Some(30))
            .await
            .unwrap()
            .unwrap()
            .id
            .unwrap();
        handle.start(id, None).await.unwrap().unwrap();

        clock.advance(ChronoDuration::minutes(31));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let session = handle.get_session(id).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Overdue);
    }

    #[tokio::test]
    async fn history_and_report_flow_through_mailbox() {
        let (handle, clock) = spawn_actor(Config::default());

        let id = handle
            .create("Write parser".to_string(), "lexer".to_string(), Some(30))
            .await
            .unwrap()
            .unwrap()
            .id
            .unwrap();
        handle.start(id, None).await.unwrap().unwrap();
        clock.advance(ChronoDuration::minutes(10));
        handle.complete(id, None).await.unwrap().unwrap();
        handle
            .create("Review PRs".to_string(), "clear the queue".to_string(), None)
            .await
            .unwrap()
            .unwrap();

        let history = handle.get_history().await.unwrap().unwrap();
        assert_eq!(history.len(), 2);

        let report = handle.get_weekly_report().await.unwrap().unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].total_sessions, 1);
        assert_eq!(report[0].completed_sessions, 1);

        let csv = handle.export_csv().await.unwrap().unwrap();
        assert_eq!(csv.lines().count(), 3);
    }
}
