use super::{parse_expected, send_request};
use anyhow::{bail, Result};
use dwell_protocol::{Request, Response, SessionId};

pub async fn execute(id: SessionId, reason: String, expect: Option<String>) -> Result<()> {
    let expected = parse_expected(expect.as_deref())?;

    match send_request(Request::Pause {
        id,
        reason,
        expected,
    })
    .await?
    {
        Response::Session(session) => {
            let entry = session.pause_log.last();
            println!("⏸️  Session #{} paused", id);
            if let Some(entry) = entry {
                println!("   Reason: {}", entry.reason);
            }
            println!(
                "   {} active seconds banked so far",
                session.active_elapsed_seconds
            );
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
