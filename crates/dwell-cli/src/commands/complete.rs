use super::{parse_expected, send_request};
use anyhow::{bail, Result};
use dwell_protocol::{Request, Response, SessionId};

pub async fn execute(id: SessionId, expect: Option<String>) -> Result<()> {
    let expected = parse_expected(expect.as_deref())?;

    match send_request(Request::Complete { id, expected }).await? {
        Response::Session(session) => {
            println!("✅ Session #{} completed", id);
            if let Some(actual) = session.actual_minutes() {
                println!(
                    "   {:.1} min wall clock for {} min scheduled",
                    actual, session.scheduled_minutes
                );
            }
            println!(
                "   {} s of focused work, focus score {}",
                session.active_elapsed_seconds, session.focus_score
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
