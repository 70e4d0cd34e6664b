//! Firecat - headless driver
//!
//! Reads IPC messages as JSON lines on stdin and writes responses and shell
//! events as JSON lines on stdout. Tabs are backed by the in-memory engine.
//! The process shuts down cleanly when stdin closes.

use anyhow::Context;
use firecat_app::{handle_message, AppState, IpcMessage, IpcResponse};
use firecat_core::BrowserConfig;
use firecat_shell::headless::HeadlessFactory;
use firecat_shell::ShellEvent;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Interval of the housekeeping tick
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Events delivered to the main loop
enum LoopEvent {
    Tick,
    Line(String),
    InputClosed,
}

fn init_logging() -> anyhow::Result<()> {
    // Library crates log through `log`
    tracing_log::LogTracer::init().context("Failed to set log tracer")?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;
    Ok(())
}

/// Config file from `FIRECAT_CONFIG`, data directory override from
/// `FIRECAT_DATA_DIR`
fn load_config() -> anyhow::Result<BrowserConfig> {
    let mut config = match std::env::var_os("FIRECAT_CONFIG") {
        Some(path) => BrowserConfig::load(&PathBuf::from(path))?,
        None => BrowserConfig::default(),
    };
    if let Some(dir) = std::env::var_os("FIRECAT_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    config.validate()?;
    Ok(config)
}

fn write_line(out: &mut impl Write, value: &serde_json::Value) {
    if let Err(e) = writeln!(out, "{}", value).and_then(|_| out.flush()) {
        warn!("Failed to write output: {}", e);
    }
}

fn write_events(out: &mut impl Write, events: &[ShellEvent]) {
    for event in events {
        write_line(out, &serde_json::json!({ "type": "event", "data": event }));
    }
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    info!("Starting Firecat...");

    let config = load_config()?;
    let factory = HeadlessFactory::new().with_blank_url(config.blank_url.clone());
    let state = AppState::new(config, Box::new(factory))
        .context("Failed to initialize app state")?;
    let state = Arc::new(Mutex::new(state));
    info!("Application state initialized");

    let mut out = io::stdout();
    {
        let mut s = firecat_app::state::lock(&state);
        s.startup();
        let events = s.process_shell_events();
        write_events(&mut out, &events);
    }

    let (tx, rx) = mpsc::channel::<LoopEvent>();

    // Spawn housekeeping ticker thread
    let tick_tx = tx.clone();
    std::thread::spawn(move || loop {
        std::thread::sleep(TICK_INTERVAL);
        if tick_tx.send(LoopEvent::Tick).is_err() {
            break;
        }
    });
    info!("Started housekeeping ticker");

    // Spawn stdin reader thread
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(LoopEvent::Line(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            }
        }
        let _ = tx.send(LoopEvent::InputClosed);
    });

    for event in rx {
        match event {
            LoopEvent::Tick => {
                let events = firecat_app::state::lock(&state).tick(Instant::now());
                write_events(&mut out, &events);
            }
            LoopEvent::Line(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let response = match serde_json::from_str::<IpcMessage>(line) {
                    Ok(message) => handle_message(&state, message),
                    Err(e) => {
                        error!("Invalid message: {}", e);
                        IpcResponse::error(format!("Invalid message: {}", e))
                    }
                };
                write_line(&mut out, &serde_json::to_value(&response)?);

                let events = firecat_app::state::lock(&state).process_shell_events();
                write_events(&mut out, &events);
            }
            LoopEvent::InputClosed => break,
        }
    }

    firecat_app::state::lock(&state).shutdown();
    Ok(())
}
