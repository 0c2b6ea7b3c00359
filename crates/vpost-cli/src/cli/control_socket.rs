//! Control socket: listener (during `vpost run`) and client (immediate triggers).
//! Protocol: one line per command: "upload <id>". Malformed lines are ignored.

use anyhow::Result;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;
use vpost_core::trigger::TriggerQueue;

/// Spawns a task that listens on `path` and enqueues an immediate upload
/// for each "upload <id>" line. A full trigger queue is reported by the
/// queue itself; the schedule stays pending for the poller either way.
pub fn spawn_control_listener(
    trigger: TriggerQueue,
    path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>> {
    let path = path.as_ref().to_path_buf();
    let handle = tokio::spawn(async move {
        let _ = std::fs::remove_file(&path);
        let listener = match UnixListener::bind(&path) {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(path = %path.display(), "control socket bind: {}", e);
                return;
            }
        };
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let trigger = trigger.clone();
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(stream).lines();
                        while let Ok(Some(line)) = reader.next_line().await {
                            if let Some(rest) = line.trim().strip_prefix("upload ") {
                                if let Ok(id) = rest.trim().parse::<i64>() {
                                    trigger.request(id);
                                }
                            }
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}

/// Sends "upload <id>\n" to a running scheduler. Returns false when no
/// scheduler is listening (missing or stale socket), so the caller can
/// drive the upload itself.
pub async fn send_upload_request(socket_path: &Path, id: i64) -> bool {
    if !socket_path.exists() {
        return false;
    }
    let Ok(mut stream) = tokio::net::UnixStream::connect(socket_path).await else {
        return false;
    };
    let msg = format!("upload {}\n", id);
    tokio::io::AsyncWriteExt::write_all(&mut stream, msg.as_bytes())
        .await
        .is_ok()
}
