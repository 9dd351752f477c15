use crate::actors::TrackerHandle;
use anyhow::{Context, Result};
use dwell_protocol::{CommandError, Request, Response, Session};
use interprocess::local_socket::{
    tokio::{prelude::*, Stream},
    GenericFilePath, ListenerOptions,
};
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, info, instrument};

pub struct Server {
    socket_path: PathBuf,
    tracker_handle: TrackerHandle,
}

impl Server {
    pub fn new(tracker_handle: TrackerHandle) -> Result<Self> {
        Ok(Self {
            socket_path: default_socket_path(),
            tracker_handle,
        })
    }

    fn cleanup_stale_socket(&self) -> Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)
                .context("failed to remove stale socket file")?;
            debug!("removed stale socket file");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown: tokio::sync::broadcast::Receiver<()>) -> Result<()> {
        self.cleanup_stale_socket()?;

        let listener = ListenerOptions::new()
            .name(self.socket_path.as_os_str().to_fs_name::<GenericFilePath>()?)
            .create_tokio()?;

        info!(path = %self.socket_path.display(), "server listening");

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok(stream) => {
                            let tracker_handle = self.tracker_handle.clone();
                            tokio::spawn(async move {
                                if let Err(error) = handle_connection(stream, tracker_handle).await {
                                    error!(%error, "connection handler failed");
                                }
                            });
                        }
                        Err(error) => {
                            error!(%error, "failed to accept connection");
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }

        self.cleanup_socket();
        Ok(())
    }

    fn cleanup_socket(&self) {
        if let Err(error) = std::fs::remove_file(&self.socket_path) {
            debug!(%error, "socket file already removed");
        } else {
            debug!("socket file cleaned up");
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.cleanup_socket();
    }
}

#[cfg(unix)]
fn default_socket_path() -> PathBuf {
    let uid = unsafe { libc::getuid() };
    PathBuf::from(format!("/run/user/{}/dwell.sock", uid))
}

#[cfg(not(unix))]
fn default_socket_path() -> PathBuf {
    PathBuf::from(r"\\.\pipe\dwell")
}

async fn handle_connection(mut stream: Stream, tracker_handle: TrackerHandle) -> Result<()> {
    debug!("new connection accepted");

    let mut length_buffer = [0u8; 4];
    stream.read_exact(&mut length_buffer).await?;
    let length = u32::from_le_bytes(length_buffer) as usize;

    let mut payload = vec![0u8; length];
    stream.read_exact(&mut payload).await?;

    let request: Request =
        bincode::deserialize(&payload).context("failed to deserialize request")?;

    debug!(?request, "received request");

    let response = handle_request(request, &tracker_handle).await;

    debug!(?response, "sending response");

    let response_bytes = bincode::serialize(&response)?;
    let response_length = (response_bytes.len() as u32).to_le_bytes();

    stream.write_all(&response_length).await?;
    stream.write_all(&response_bytes).await?;
    stream.flush().await?;

    Ok(())
}

async fn handle_request(request: Request, tracker_handle: &TrackerHandle) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Create {
            title,
            goal,
            duration_minutes,
        } => session_response(tracker_handle.create(title, goal, duration_minutes).await),

        Request::Start { id, expected } => {
            session_response(tracker_handle.start(id, expected).await)
        }

        Request::Pause {
            id,
            reason,
            expected,
        } => session_response(tracker_handle.pause(id, reason, expected).await),

        Request::Resume { id, expected } => {
            session_response(tracker_handle.resume(id, expected).await)
        }

        Request::Complete { id, expected } => {
            session_response(tracker_handle.complete(id, expected).await)
        }

        Request::Interrupt { id, expected } => {
            session_response(tracker_handle.interrupt(id, expected).await)
        }

        Request::GetSession { id } => session_response(tracker_handle.get_session(id).await),

        Request::GetHistory => match tracker_handle.get_history().await {
            Some(Ok(sessions)) => Response::History(sessions),
            Some(Err(error)) => Response::command_error(&error),
            None => tracker_unavailable(),
        },

        Request::GetWeeklyReport => match tracker_handle.get_weekly_report().await {
            Some(Ok(buckets)) => Response::WeeklyReport(buckets),
            Some(Err(error)) => Response::command_error(&error),
            None => tracker_unavailable(),
        },

        Request::ExportCsv => match tracker_handle.export_csv().await {
            Some(Ok(csv)) => Response::Csv(csv),
            Some(Err(error)) => Response::command_error(&error),
            None => tracker_unavailable(),
        },
    }
}

fn session_response(result: Option<Result<Session, CommandError>>) -> Response {
    match result {
        Some(Ok(session)) => Response::Session(session),
        Some(Err(error)) => Response::command_error(&error),
        None => tracker_unavailable(),
    }
}

fn tracker_unavailable() -> Response {
    Response::internal_error("tracker actor unavailable")
}
