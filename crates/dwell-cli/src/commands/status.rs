use super::{describe, send_request};
use anyhow::{bail, Result};
use chrono::Utc;
use dwell_protocol::{Request, Response, Session, SessionId};

pub async fn execute(id: Option<SessionId>, json: bool) -> Result<()> {
    match id {
        Some(id) => match send_request(Request::GetSession { id }).await? {
            Response::Session(session) => print_session(&session, json)?,
            Response::Error { message, .. } => bail!("{message}"),
            _ => bail!("unexpected response from the daemon"),
        },
        None => match send_request(Request::GetHistory).await? {
            Response::History(sessions) => {
                match sessions.iter().find(|session| session.status.is_running()) {
                    Some(session) => print_session(session, json)?,
                    None if json => println!("null"),
                    None => println!("⚫ No running session"),
                }
            }
            Response::Error { message, .. } => bail!("{message}"),
            _ => bail!("unexpected response from the daemon"),
        },
    }

    Ok(())
}

fn print_session(session: &Session, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(session)?);
        return Ok(());
    }

    println!("{}", describe(session));
    println!("   Goal: {}", session.goal);

    if session.status.is_running() {
        // advisory display only, recomputed from server-held timestamps
        let remaining = session.remaining_seconds(Utc::now());
        println!(
            "   Remaining in window: {}:{:02}",
            remaining / 60,
            remaining % 60
        );
        println!(
            "   Focused so far: {} s (score {})",
            session.active_elapsed_seconds, session.focus_score
        );
    }

    Ok(())
}
