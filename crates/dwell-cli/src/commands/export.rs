use super::send_request;
use anyhow::{bail, Context, Result};
use dwell_protocol::{Request, Response};
use std::path::PathBuf;

pub async fn execute(output: Option<PathBuf>) -> Result<()> {
    match send_request(Request::ExportCsv).await? {
        Response::Csv(csv) => match output {
            Some(path) => {
                std::fs::write(&path, csv)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("📄 Sessions exported to {}", path.display());
            }
            None => {
                print!("{csv}");
            }
        },
        Response::Error { message, .. } => {
            bail!("{message}");
        }
        _ => {
            bail!("unexpected response from the daemon");
        }
    }

    Ok(())
}
