use super::send_request;
use anyhow::{bail, Result};
use dwell_protocol::{Request, Response};

pub async fn execute(json: bool) -> Result<()> {
    match send_request(Request::GetWeeklyReport).await? {
        Response::WeeklyReport(buckets) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&buckets)?);
                return Ok(());
            }

            if buckets.is_empty() {
                println!("No finished sessions yet.");
                return Ok(());
            }

            for bucket in &buckets {
                println!(
                    "{}: {} finished ({} completed, {} overdue, {} interrupted)",
                    bucket.week_label,
                    bucket.total_sessions,
                    bucket.completed_sessions,
                    bucket.overdue_sessions,
                    bucket.interrupted_sessions
                );
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
