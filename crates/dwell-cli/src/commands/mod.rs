mod complete;
mod create;
mod export;
mod history;
mod interrupt;
mod pause;
mod report;
mod resume;
mod start;
mod status;

pub use complete::execute as complete;
pub use create::execute as create;
pub use export::execute as export;
pub use history::execute as history;
pub use interrupt::execute as interrupt;
pub use pause::execute as pause;
pub use report::execute as report;
pub use resume::execute as resume;
pub use start::execute as start;
pub use status::execute as status;

use crate::client::{ClientError, DaemonClient};
use anyhow::{bail, Result};
use dwell_protocol::{Request, Response, Session, SessionStatus};

/// Sends one request, handling transport failures the same way everywhere.
pub(crate) async fn send_request(request: Request) -> Result<Response> {
    let client = DaemonClient::new();

    match client.send(request).await {
        Ok(response) => Ok(response),
        Err(ClientError::DaemonNotRunning) => {
            eprintln!("⚫ The daemon is not running");
            eprintln!("   Start it first: dwell-daemon");
            std::process::exit(1);
        }
        Err(ClientError::Timeout) => {
            bail!("connection to the daemon timed out");
        }
        Err(error) => {
            bail!("{error}");
        }
    }
}

pub(crate) fn parse_expected(value: Option<&str>) -> Result<Option<SessionStatus>> {
    match value {
        None => Ok(None),
        Some(raw) => match SessionStatus::from_stored(raw) {
            Some(status) => Ok(Some(status)),
            None => bail!("unknown session status: {raw}"),
        },
    }
}

pub(crate) fn describe(session: &Session) -> String {
    let id = session.id.unwrap_or_default();
    let mut line = format!(
        "#{} {} [{}] {} min scheduled",
        id, session.title, session.status, session.scheduled_minutes
    );

    if session.status.is_terminal() {
        if let Some(actual) = session.actual_minutes() {
            line.push_str(&format!(", {:.1} min actual", actual));
        }
        line.push_str(&format!(", focus {}", session.focus_score));
    }

    if session.pause_count() > 0 {
        line.push_str(&format!(
            ", {} pause{}",
            session.pause_count(),
            if session.pause_count() > 1 { "s" } else { "" }
        ));
    }

    line
}
