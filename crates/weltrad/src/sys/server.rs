use crate::command::Command;
use crate::events::AppEvent;
use async_channel::Sender;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

/// Accepts connections on `socket_path` and forwards every parsed command
/// line. Malformed lines are logged and skipped.
pub async fn run_server(socket_path: &Path, tx: Sender<AppEvent>) {
    if fs_err::metadata(socket_path).is_ok() {
        let _ = fs_err::remove_file(socket_path);
    }

    let listener = match UnixListener::bind(socket_path) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket {}: {}", socket_path.display(), e);
            return;
        }
    };
    log::info!("Listening on {}", socket_path.display());

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        let line = line.trim();
                        if line.is_empty() || line.starts_with('#') {
                            continue;
                        }
                        match line.parse::<Command>() {
                            Ok(command) => {
                                if tx.send(AppEvent::Command(command)).await.is_err() {
                                    return;
                                }
                            }
                            Err(e) => log::warn!("Ignoring '{}': {}", line, e),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}
