//! Single-threaded event loop.
//!
//! Everything converges here: keystrokes from crossterm, server events from
//! the link reader thread, segment results from the capture worker, and
//! `Instant`-based timers. Each source is polled without blocking, so every
//! deferred action re-validates the current mode/flags before it runs.

use crate::app::App;
use crate::input::handle_key;
use crate::ui;
use anyhow::Result;
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::event::{self, Event};
use echoterm::link::LinkNotice;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::{Duration, Instant};

/// How long to wait for a keystroke before servicing the other channels.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub(crate) fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    link_rx: &Receiver<LinkNotice>,
) -> Result<()> {
    // Initial render so the UI shows up before any event arrives.
    terminal.draw(|frame| ui::draw(frame, app))?;

    loop {
        // Drain server pushes first so a burst of chunks lands in one redraw.
        loop {
            match link_rx.try_recv() {
                Ok(notice) => app.handle_notice(notice),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }

        app.poll_segment_job();
        app.tick(Instant::now());

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key) {
                        app.quit();
                    }
                    app.request_redraw();
                }
                Event::Resize(_, _) => app.request_redraw(),
                _ => {}
            }
        }

        if app.take_redraw_request() {
            terminal.draw(|frame| ui::draw(frame, app))?;
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
