use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use clap::Parser;
use const_format::concatcp;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::TryRecvError},
    time::Interval,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trip_tracker_core::{presets::Preset, Session, SessionConfig, SessionEvent, DEFAULT_LABEL_PREFIX, DEFAULT_MAX_DISTANCE_KM};
use trip_tracker_lib::transport_mode::TransportMode;

use crate::command::{Command, HELP};

mod command;
mod render;

const LOG_DIR: &str = "log/";
const LOG_FILE: &str = concatcp!(LOG_DIR, "dashboard.log");

#[derive(Parser)]
#[command(name = "trip-dashboard")]
#[command(about = "Citizen trip tracker and planner dashboard", long_about = None)]
struct Cli {
    /// Dataset shown when the dashboard opens (initial or post-trip)
    #[arg(long, value_enum, default_value_t = Preset::Initial)]
    preset: Preset,
    /// Transport mode assigned to recorded trips
    #[arg(long, default_value = "car")]
    mode: TransportMode,
    /// Prefix of generated trip labels
    #[arg(long, default_value = DEFAULT_LABEL_PREFIX)]
    label_prefix: String,
    /// Upper bound (exclusive) of the placeholder distance, in km
    #[arg(long, default_value_t = DEFAULT_MAX_DISTANCE_KM)]
    max_distance: f64,
    /// Seed for reproducible distances
    #[arg(long)]
    seed: Option<u64>,
    /// Do not add finished trips to the dashboard data
    #[arg(long)]
    no_merge: bool,
    /// Print the elapsed time of an active trip every N seconds
    #[arg(long, value_name = "SECS")]
    live_timer: Option<u64>,
    /// Width of the longest chart bar
    #[arg(long, default_value_t = 40)]
    chart_width: usize,
    /// Log file, defaults to log/dashboard.log under the project root
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            initial_preset: self.preset,
            default_mode: self.mode.clone(),
            label_prefix: self.label_prefix.clone(),
            max_distance_km: self.max_distance,
            distance_seed: self.seed,
            merge_completed_trips: !self.no_merge,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    tracing::info!("Starting dashboard...");

    let mut session = Session::new(cli.session_config());
    let mut events = session.subscribe();

    println!("{HELP}\n");
    println!("{}\n", render::panel(&session.panel()));
    println!("{}", render::chart(session.store(), cli.chart_width));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = cli.live_timer.map(|secs| tokio::time::interval(Duration::from_secs(secs.max(1))));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };

                match Command::parse(&line) {
                    Ok(None) => {},
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => handle(command, &mut session, &mut events, cli.chart_width)?,
                    Err(err) => println!("{err}"),
                }
            },
            _ = tick(&mut ticker) => {
                if let Some(line) = render::live_line(&session.panel()) {
                    println!("{line}");
                }
            },
        }
    }

    tracing::info!("Dashboard closed");
    Ok(())
}

fn handle(
    command: Command,
    session: &mut Session,
    events: &mut broadcast::Receiver<SessionEvent>,
    chart_width: usize,
) -> anyhow::Result<()> {
    match command {
        Command::Action(action) => {
            if let Err(err) = session.dispatch(action) {
                println!("Rejected: {err}");
                return Ok(());
            }

            let revision = session.store().revision();
            let mut data_changed = false;
            loop {
                match events.try_recv() {
                    Ok(event) => {
                        data_changed |= matches!(event, SessionEvent::DataRefreshed { .. } | SessionEvent::TripEnded { merged: true, .. });
                        println!("{}", render::event(&event));
                    },
                    Err(TryRecvError::Lagged(skipped)) => tracing::warn!("Display skipped {} events", skipped),
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }

            println!("\n{}", render::panel(&session.panel()));
            if data_changed {
                tracing::debug!("Redrawing chart at revision {}", revision);
                println!("\n{}", render::chart(session.store(), chart_width));
            }
        },
        Command::Status => println!("{}", render::panel(&session.panel())),
        Command::Chart => println!("{}", render::chart(session.store(), chart_width)),
        Command::Json => println!("{}", serde_json::to_string_pretty(&session.snapshot())?),
        Command::Help => println!("{HELP}"),
        Command::Quit => {},
    }
    Ok(())
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        },
        None => std::future::pending().await,
    }
}

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let log_file = match log_file {
        Some(path) => path.to_path_buf(),
        None => project_root::get_project_root()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(LOG_FILE),
    };

    if let Some(dir) = log_file.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create log directory {dir:?}"))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .with_context(|| format!("Failed to open log file {log_file:?}"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("{}=info,trip_tracker_core=info", env!("CARGO_CRATE_NAME")).into())
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file))
        .init();

    Ok(())
}
