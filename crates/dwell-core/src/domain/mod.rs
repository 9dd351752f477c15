mod error;
mod pause_log;
mod session;
mod status;
mod weekly;

pub use error::CommandError;
pub use pause_log::PauseEntry;
pub use session::{Session, SessionId};
pub use status::{Command, SessionStatus};
pub use weekly::{aggregate_by_week, WeeklyBucket};
