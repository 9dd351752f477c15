//! Dwell core library
//!
//! Contains the session lifecycle domain, port definitions (traits) and the
//! command service for the Dwell application. This crate has no knowledge of
//! infrastructure concerns.

pub mod clock;
pub mod config;
pub mod domain;
pub mod export;
pub mod ports;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, ConfigError, InterruptConfig, OverdueConfig, SessionConfig};
pub use domain::{
    aggregate_by_week, Command, CommandError, PauseEntry, Session, SessionId, SessionStatus,
    WeeklyBucket,
};
pub use export::sessions_to_csv;
pub use ports::{SessionRepository, SessionRepositoryError};
pub use service::{NewSession, SessionService};
