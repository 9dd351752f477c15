use crate::client::{ClientError, DaemonClient};
use crate::daemon_launcher::ensure_daemon_running;
use anyhow::{bail, Result};
use dwell_protocol::{Request, Response};

pub async fn execute(title: String, goal: String, duration: Option<i64>) -> Result<()> {
    let request = Request::Create {
        title,
        goal,
        duration_minutes: duration,
    };

    let client = DaemonClient::new();

    let response = match client.send(request.clone()).await {
        Ok(response) => response,
        Err(ClientError::DaemonNotRunning) => {
            // creation is the entry point of every workflow, so it is the one
            // command that bootstraps the daemon instead of bailing
            ensure_daemon_running().await?;
            client.send(request).await?
        }
        Err(error) => bail!("{error}"),
    };

    match response {
        Response::Session(session) => {
            println!("📌 Session scheduled (#{})", session.id.unwrap_or_default());
            println!("   Title: {}", session.title);
            println!("   Goal: {}", session.goal);
            println!("   Duration: {} min", session.scheduled_minutes);
            println!("   Run `dwell start {}` when you begin.", session.id.unwrap_or_default());
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
