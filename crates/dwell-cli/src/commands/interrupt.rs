use super::{parse_expected, send_request};
use anyhow::{bail, Result};
use dwell_protocol::{Request, Response, SessionId};

pub async fn execute(id: SessionId, expect: Option<String>) -> Result<()> {
    let expected = parse_expected(expect.as_deref())?;

    match send_request(Request::Interrupt { id, expected }).await? {
        Response::Session(session) => {
            println!("🛑 Session #{} interrupted", id);
            println!(
                "   {} s of focused work kept on record",
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
