mod app;
mod config;
mod error;
mod event;
mod theme;
mod ui;
mod wifi;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::{
    app::{AppContext, DashboardState},
    config::IconSet,
    wifi::{Network, StatusReader, WifiPlatform},
};

/// Show the current Wi-Fi interface status and follow Wi-Fi link events
#[derive(Parser, Debug)]
#[command(
    name = "wifiglance",
    about = "Show the current Wi-Fi interface status and follow Wi-Fi link events.",
    long_about = None,
    version = env!("CARGO_PKG_VERSION"),
    disable_version_flag = true
)]
struct Args {
    /// Print version information
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: (),

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Log file for the dashboard (defaults to the temp dir)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Use ASCII icons (no Nerd Fonts required)
    #[arg(long, global = true)]
    ascii: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Print the current interface status as key/value lines
    Status,
    /// List nearby networks
    Scan,
    /// List wireless interface names
    Interfaces,
    /// Print one line per WiFi event until interrupted
    Watch {
        /// Also print the status after events that change it
        #[arg(long)]
        refresh: bool,
    },
    /// Terminal dashboard that refreshes on WiFi events
    Dashboard,
}

fn log_filter(debug: bool) -> EnvFilter {
    let level = if debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("wifiglance={level}")))
}

fn init_stderr_logging(debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(debug))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// The dashboard owns the terminal, so its logs go to a file. The guard must
/// be held until exit so buffered lines are flushed.
fn init_file_logging(args: &Args) -> WorkerGuard {
    let path = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(config::DASHBOARD_LOG_FILE));
    let dir = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| config::DASHBOARD_LOG_FILE.into());

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.debug))
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_ids(true)
        .init();
    guard
}

fn sorted_by_signal(networks: impl IntoIterator<Item = Network>) -> Vec<Network> {
    let mut networks: Vec<Network> = networks.into_iter().collect();
    networks.sort_by(|a, b| b.rssi_dbm.cmp(&a.rssi_dbm).then_with(|| a.ssid.cmp(&b.ssid)));
    networks
}

async fn watch(platform: Arc<dyn WifiPlatform>, refresh: bool) -> Result<()> {
    let mut context = AppContext::new(platform)?;
    let mut events = context.watch();
    eprintln!(
        "Watching {} for WiFi events (Ctrl-C to stop)",
        context.reader.interface_name()
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                println!("{event}");
                if refresh && event.kind.refreshes_status() {
                    print!("{}", context.reader.current_snapshot());
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    context.monitor.stop();
    Ok(())
}

async fn dashboard(platform: Arc<dyn WifiPlatform>, icons: IconSet) -> Result<()> {
    let mut context = AppContext::new(platform)?;
    let mut state = DashboardState::new(&context.reader, icons);

    let terminal = ratatui::init();
    let result = event::run(terminal, &mut context, &mut state).await;
    ratatui::restore();
    result
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    color_eyre::install()?;

    let command = args.command.unwrap_or(Command::Status);
    let _log_guard = match command {
        Command::Dashboard => Some(init_file_logging(&args)),
        _ => {
            init_stderr_logging(args.debug);
            None
        }
    };

    let platform = wifi::native();

    match command {
        Command::Status => {
            let reader = StatusReader::new(platform.as_ref())?;
            print!("{}", reader.current_snapshot());
        }
        Command::Scan => {
            let reader = StatusReader::new(platform.as_ref())?;
            let networks = tokio::task::spawn_blocking(move || reader.scan_networks()).await?;
            for network in sorted_by_signal(networks) {
                println!("{network}");
            }
        }
        Command::Interfaces => {
            for name in platform.interface_names() {
                println!("{name}");
            }
        }
        Command::Watch { refresh } => watch(platform, refresh).await?,
        Command::Dashboard => {
            dashboard(platform, IconSet::from_ascii_flag(args.ascii)).await?;
        }
    }

    Ok(())
}
