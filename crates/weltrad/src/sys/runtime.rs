use crate::app::{AppModel, Notification};
use crate::command::Command;
use crate::config;
use crate::events::AppEvent;
use async_channel::{Receiver, Sender};
use kreisel::gesture::Millis;
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;

/// One animation frame at roughly 60 Hz.
pub const FRAME: Millis = Millis(16);

pub struct ServeOptions {
    pub socket_path: PathBuf,
    /// Watched for changes; `None` disables hot reload.
    pub config_path: Option<PathBuf>,
}

pub fn start_background_services(tx: Sender<AppEvent>, options: &ServeOptions) {
    {
        let tx = tx.clone();
        let socket_path = options.socket_path.clone();
        tokio::spawn(async move {
            crate::sys::server::run_server(&socket_path, tx).await;
        });
    }

    if let Some(config_path) = options.config_path.clone() {
        tokio::spawn(async move {
            config::run_async_watcher(config_path, tx).await;
        });
    }
}

/// Runs the daemon until every sender is gone.
pub fn run(model: AppModel, options: ServeOptions) -> anyhow::Result<()> {
    let rt = Runtime::new()?;

    rt.block_on(async move {
        let (tx, rx) = async_channel::bounded(64);
        start_background_services(tx, &options);
        event_loop(model, rx, options.config_path).await;
    });

    Ok(())
}

async fn event_loop(mut model: AppModel, rx: Receiver<AppEvent>, config_path: Option<PathBuf>) {
    let mut frames = tokio::time::interval(Duration::from_millis(FRAME.into()));

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(AppEvent::Command(command)) => report(model.apply(command)),
                Ok(AppEvent::ConfigReload) => reload(&mut model, config_path.as_deref()),
                Err(_) => break,
            },
            _ = frames.tick() => {
                model.apply(Command::Frame(FRAME));
            }
        }
    }
}

fn reload(model: &mut AppModel, config_path: Option<&std::path::Path>) {
    let loaded = match config_path {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };

    match loaded.and_then(|c| model.reload(&c)) {
        Ok(()) => log::info!("Configuration reloaded"),
        Err(e) => log::error!("Failed to reload config: {}", e),
    }
}

fn report(notifications: Vec<Notification>) {
    for notification in notifications {
        println!("{}", notification);
    }
}
