use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Command, CommandError, PauseEntry, SessionStatus};

pub type SessionId = i64;

/// One tracked deep-work session.
///
/// All mutation goes through the lifecycle methods below, which enforce the
/// transition table. `active_elapsed_seconds` only grows while the session is
/// active and is frozen once a terminal state is reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Option<SessionId>,
    pub title: String,
    pub goal: String,
    pub scheduled_minutes: i64,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub active_elapsed_seconds: i64,
    pub pause_log: Vec<PauseEntry>,
    pub focus_score: u8,
}

impl Session {
    pub fn schedule(
        title: &str,
        goal: &str,
        scheduled_minutes: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CommandError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CommandError::validation("title must not be empty"));
        }

        let goal = goal.trim();
        if goal.is_empty() {
            return Err(CommandError::validation("goal must not be empty"));
        }

        if scheduled_minutes <= 0 {
            return Err(CommandError::validation(
                "scheduled duration must be a positive number of minutes",
            ));
        }

        Ok(Self {
            id: None,
            title: title.to_string(),
            goal: goal.to_string(),
            scheduled_minutes,
            status: SessionStatus::Scheduled,
            created_at,
            start_time: None,
            ended_at: None,
            active_elapsed_seconds: 0,
            pause_log: Vec::new(),
            focus_score: 0,
        })
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), CommandError> {
        self.require(SessionStatus::Scheduled, Command::Start)?;

        self.start_time = Some(now);
        self.status = SessionStatus::Active;
        self.refresh_focus_score(now);

        Ok(())
    }

    pub fn pause(&mut self, reason: &str, now: DateTime<Utc>) -> Result<(), CommandError> {
        self.require(SessionStatus::Active, Command::Pause)?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CommandError::validation("pause reason must not be empty"));
        }

        self.credit_active_interval(now);
        self.pause_log.push(PauseEntry::open(reason.to_string(), now));
        self.status = SessionStatus::Paused;
        self.refresh_focus_score(now);

        Ok(())
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), CommandError> {
        self.require(SessionStatus::Paused, Command::Resume)?;

        match self.pause_log.last_mut() {
            Some(entry) if entry.is_open() => entry.resumed_at = Some(now),
            _ => {
                return Err(CommandError::InvalidTransition {
                    status: self.status,
                    command: Command::Resume,
                })
            }
        }

        self.status = SessionStatus::Active;
        self.refresh_focus_score(now);

        Ok(())
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), CommandError> {
        if !self.status.is_running() {
            return Err(CommandError::InvalidTransition {
                status: self.status,
                command: Command::Complete,
            });
        }

        self.finalize(now, SessionStatus::Completed);
        Ok(())
    }

    pub fn interrupt(&mut self, now: DateTime<Utc>) -> Result<(), CommandError> {
        if self.status.is_terminal() {
            return Err(CommandError::InvalidTransition {
                status: self.status,
                command: Command::Interrupt,
            });
        }

        self.finalize(now, SessionStatus::Interrupted);
        Ok(())
    }

    /// Terminal transition taken by the background overdue sweep.
    pub fn mark_overdue(&mut self, now: DateTime<Utc>) -> Result<(), CommandError> {
        if !self.status.is_running() {
            return Err(CommandError::InvalidTransition {
                status: self.status,
                command: Command::OverdueCheck,
            });
        }

        self.finalize(now, SessionStatus::Overdue);
        Ok(())
    }

    /// Overdue means the scheduled wall-clock window expired, regardless of
    /// how much of it was spent paused.
    pub fn is_overdue_at(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        if !self.status.is_running() {
            return false;
        }

        match self.start_time {
            Some(start) => now > start + Duration::minutes(self.scheduled_minutes) + grace,
            None => false,
        }
    }

    pub fn wall_clock_seconds(&self, now: DateTime<Utc>) -> i64 {
        let Some(start) = self.start_time else {
            return 0;
        };
        let end = self.ended_at.unwrap_or(now);
        end.signed_duration_since(start).num_seconds().max(0)
    }

    /// Advisory remaining time in the scheduled window. Display only; the
    /// overdue sweep is the authority on expiry.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.scheduled_minutes * 60 - self.wall_clock_seconds(now)).max(0)
    }

    pub fn pause_count(&self) -> usize {
        self.pause_log.len()
    }

    pub fn actual_minutes(&self) -> Option<f64> {
        let start = self.start_time?;
        let end = self.ended_at?;
        let minutes = end.signed_duration_since(start).num_seconds() as f64 / 60.0;
        Some(round_two(minutes))
    }

    pub fn completion_ratio(&self) -> Option<f64> {
        let actual = self.actual_minutes()?;
        Some(round_two(actual / self.scheduled_minutes as f64))
    }

    fn require(&self, expected: SessionStatus, command: Command) -> Result<(), CommandError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(CommandError::InvalidTransition {
                status: self.status,
                command,
            })
        }
    }

    fn finalize(&mut self, now: DateTime<Utc>, terminal: SessionStatus) {
        if self.status == SessionStatus::Active {
            self.credit_active_interval(now);
        }

        // A terminal transition out of `paused` ends the open pause, so stored
        // history never carries a dangling entry.
        if let Some(entry) = self.pause_log.last_mut() {
            if entry.is_open() {
                entry.resumed_at = Some(now);
            }
        }

        self.status = terminal;
        self.ended_at = Some(now);
        self.refresh_focus_score(now);
    }

    /// Start of the interval currently accruing active time: the latest
    /// resume, or the session start when it has never been paused.
    fn current_interval_start(&self) -> Option<DateTime<Utc>> {
        if self.status != SessionStatus::Active {
            return None;
        }
        self.pause_log
            .last()
            .and_then(|entry| entry.resumed_at)
            .or(self.start_time)
    }

    fn credit_active_interval(&mut self, now: DateTime<Utc>) {
        let Some(interval_start) = self.current_interval_start() else {
            return;
        };

        let delta = now.signed_duration_since(interval_start).num_seconds();
        if delta < 0 {
            warn!(
                session = ?self.id,
                delta,
                "clock skew detected, clamping active interval to zero"
            );
            return;
        }

        self.active_elapsed_seconds += delta;
    }

    fn refresh_focus_score(&mut self, now: DateTime<Utc>) {
        if self.start_time.is_none() {
            self.focus_score = 0;
            return;
        }

        let wall = self.wall_clock_seconds(now).max(1);
        let score = (100.0 * self.active_elapsed_seconds as f64 / wall as f64).round();
        self.focus_score = score.clamp(0.0, 100.0) as u8;
    }
}

fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
