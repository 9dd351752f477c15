use super::{parse_expected, send_request};
use anyhow::{bail, Result};
use dwell_protocol::{Request, Response, SessionId};

pub async fn execute(id: SessionId, expect: Option<String>) -> Result<()> {
    let expected = parse_expected(expect.as_deref())?;

    match send_request(Request::Start { id, expected }).await? {
        Response::Session(session) => {
            println!("🚀 Session #{} started", id);
            println!("   {} — {}", session.title, session.goal);
            println!("   {} min on the clock", session.scheduled_minutes);
        }
        Response::Error { message, .. } => {
            bail!("{message}");
        }
        _ => {
            bail!("unexpected response from the daemon");
        }
    }

    Ok(())
}
