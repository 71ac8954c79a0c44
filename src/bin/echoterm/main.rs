//! EchoTerm entrypoint: connect to the assistant backend, bring up the
//! terminal UI, and run the event loop until the user quits.

mod app;
mod event_loop;
mod input;
mod session_stats;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::unbounded;
use echoterm::audio::Recorder;
use echoterm::config::AppConfig;
use echoterm::link::ServerLink;
use echoterm::telemetry::init_tracing;
use echoterm::terminal_restore::TerminalRestoreGuard;
use echoterm::{init_logging, log_debug, log_file_path};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Write};

use crate::app::App;
use crate::session_stats::format_session_stats;

fn main() -> Result<()> {
    let mut config = AppConfig::parse();

    if config.list_input_devices {
        list_input_devices()?;
        return Ok(());
    }

    config.validate()?;
    init_logging(&config);
    init_tracing(&config);
    log_debug("=== EchoTerm started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let (link_tx, link_rx) = unbounded();
    let link = ServerLink::connect(&config.server, link_tx)
        .with_context(|| format!("assistant backend unreachable at {}", config.server))?;

    let mut app = App::new(config, link);

    let terminal_guard = TerminalRestoreGuard::new();
    terminal_guard.enable_raw_mode()?;
    let mut stdout = io::stdout();
    terminal_guard.enter_alt_screen(&mut stdout)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop::run(&mut terminal, &mut app, &link_rx);

    drop(terminal);
    terminal_guard.restore();

    let stats_output = format_session_stats(&app.stats);
    if !stats_output.is_empty() {
        print!("{stats_output}");
        let _ = io::stdout().flush();
    }
    tracing::info!(
        messages = app.stats.messages_sent,
        segments = app.stats.segments,
        errors = app.stats.errors,
        "session finished"
    );
    log_debug("=== EchoTerm exiting ===");
    result
}

fn list_input_devices() -> Result<()> {
    let devices = Recorder::list_devices()?;
    if devices.is_empty() {
        println!("No audio input devices detected.");
        return Ok(());
    }
    println!("Audio input devices:");
    for name in devices {
        println!("  {name}");
    }
    Ok(())
}
