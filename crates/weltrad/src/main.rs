use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use weltrad::app::AppModel;
use weltrad::command::Command;
use weltrad::config;
use weltrad::sys::runtime::{self, ServeOptions};

#[derive(Parser, Debug)]
#[command(name = "weltrad", version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Run the daemon and read commands from the socket
    Serve,
    /// Run a command script without a clock and print what happens
    Replay {
        /// One command per line; blank lines and `#` comments are skipped
        script: PathBuf,
    },
    /// Send one command line to a running daemon
    Send {
        #[arg(required = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Write the default configuration file if none exists
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => serve(cli.config),
        Commands::Replay { script } => replay(cli.config, &script),
        Commands::Send { command } => send(cli.config, &command.join(" ")),
        Commands::InitConfig => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn serve(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = config::load_or_default(config_path.as_deref());
    let model = AppModel::new(&config)?;
    // The watcher matches on absolute event paths.
    let config_path = config_path
        .map(|p| std::path::absolute(&p).unwrap_or(p))
        .or_else(|| config::get_config_path().ok());

    runtime::run(
        model,
        ServeOptions {
            socket_path: config.socket_path(),
            config_path,
        },
    )
}

fn replay(config_path: Option<PathBuf>, script: &std::path::Path) -> anyhow::Result<()> {
    let config = config::load_or_default(config_path.as_deref());
    let mut model = AppModel::new(&config)?;
    let source = fs_err::read_to_string(script)?;

    for (number, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let command: Command = line
            .parse()
            .with_context(|| format!("{}:{}: '{}'", script.display(), number + 1, line))?;
        for notification in model.apply(command) {
            println!("[{}] {}", model.now(), notification);
        }
    }

    println!("{}", model.snapshot());
    Ok(())
}

fn send(config_path: Option<PathBuf>, line: &str) -> anyhow::Result<()> {
    line.parse::<Command>()
        .with_context(|| format!("Not a valid command: '{}'", line))?;

    let socket_path = config::load_or_default(config_path.as_deref()).socket_path();
    let mut stream = UnixStream::connect(&socket_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to weltrad daemon at {}: {}. Is weltrad running?",
            socket_path.display(),
            e
        )
    })?;
    writeln!(stream, "{}", line)?;
    Ok(())
}
