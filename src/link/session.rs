use crate::link::protocol::{ClientEvent, ServerEvent};
use crate::{log_debug, log_debug_content};
use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// What the reader thread reports back to the event loop.
#[derive(Debug)]
pub enum LinkNotice {
    Event(ServerEvent),
    Disconnected(String),
}

/// Handle to the backend connection.
///
/// Sends are fire-and-forget: once the connection drops, events are logged
/// and discarded until the process restarts.
pub struct ServerLink {
    stream: TcpStream,
    connected: Arc<AtomicBool>,
}

impl ServerLink {
    /// Connect and spawn the reader thread. Server events arrive on `tx`
    /// until the socket closes, at which point a single `Disconnected`
    /// notice is delivered.
    pub fn connect(addr: &str, tx: Sender<LinkNotice>) -> Result<Self> {
        let stream =
            TcpStream::connect(addr).with_context(|| format!("failed to connect to '{addr}'"))?;
        let _ = stream.set_nodelay(true);
        let connected = Arc::new(AtomicBool::new(true));

        let reader_stream = stream
            .try_clone()
            .context("failed to clone server stream for reading")?;
        let reader_connected = connected.clone();
        thread::spawn(move || read_loop(reader_stream, tx, reader_connected));

        tracing::info!(addr, "connected to backend");
        log_debug(&format!("Connected to backend at {addr}"));
        Ok(Self { stream, connected })
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Serialize one event as a JSON line. Dropped (with a log entry) when
    /// the connection is gone; a write failure marks the link disconnected.
    pub fn send(&mut self, event: &ClientEvent) {
        if !self.is_connected() {
            log_debug(&format!("link down; dropping event {}", event_name(event)));
            return;
        }
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(err) => {
                log_debug(&format!("failed to serialize client event: {err}"));
                return;
            }
        };
        log_debug_content(&format!("-> {json}"));
        if let Err(err) = writeln!(self.stream, "{json}") {
            log_debug(&format!("server write failed: {err}"));
            self.connected.store(false, Ordering::Relaxed);
        }
    }
}

fn read_loop(stream: TcpStream, tx: Sender<LinkNotice>, connected: Arc<AtomicBool>) {
    let reader = BufReader::new(stream);
    let mut reason = "connection closed by server".to_string();

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                reason = format!("read error: {err}");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<ServerEvent>(trimmed) {
            Ok(event) => {
                log_debug_content(&format!("<- {trimmed}"));
                if tx.send(LinkNotice::Event(event)).is_err() {
                    // Event loop has exited; nothing left to notify.
                    return;
                }
            }
            Err(err) => {
                log_debug(&format!("unrecognized server event: {err}"));
            }
        }
    }

    connected.store(false, Ordering::Relaxed);
    log_debug(&format!("server link closed: {reason}"));
    let _ = tx.send(LinkNotice::Disconnected(reason));
}

fn event_name(event: &ClientEvent) -> &'static str {
    match event {
        ClientEvent::GetLogs => "get_logs",
        ClientEvent::GetModels => "get_models",
        ClientEvent::SetModel { .. } => "set_model",
        ClientEvent::AudioChunk { .. } => "audio_chunk",
        ClientEvent::StartSpeech { .. } => "start_speech",
        ClientEvent::StopSpeech => "stop_speech",
        ClientEvent::VoiceModeChanged { .. } => "voice_mode_changed",
        ClientEvent::ManualWake => "manual_wake",
        ClientEvent::ManualSleep => "manual_sleep",
        ClientEvent::UserMessage { .. } => "user_message",
    }
}
