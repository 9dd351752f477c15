use super::{describe, send_request};
use anyhow::{bail, Result};
use dwell_protocol::{Request, Response};

pub async fn execute(json: bool) -> Result<()> {
    match send_request(Request::GetHistory).await? {
        Response::History(sessions) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
                return Ok(());
            }

            if sessions.is_empty() {
                println!("No sessions yet. Schedule one with `dwell create`.");
                return Ok(());
            }

            for session in &sessions {
                println!("{}", describe(session));
            }
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
