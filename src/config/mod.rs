//! Command-line parsing and validation helpers.

#[cfg(test)]
mod tests;
mod validation;

use crate::voice::VoiceMode;
use clap::Parser;

pub use validation::{
    MAX_SEGMENT_MS, MAX_SEGMENT_RESTART_MS, MAX_TASK_AUTOSTART_MS, MIN_SEGMENT_MS,
};

/// Default capture segment length: short enough to feel live, long enough to
/// carry a whole phrase to the recognizer.
pub const DEFAULT_SEGMENT_MS: u64 = 3_000;

/// Pause between chained capture segments.
pub const DEFAULT_SEGMENT_RESTART_MS: u64 = 100;

/// Delay before task mode starts listening after a mode switch.
pub const DEFAULT_TASK_AUTOSTART_MS: u64 = 200;

/// CLI options for the EchoTerm console. Validated values keep the capture
/// chain and the wire protocol well-behaved.
#[derive(Debug, Parser, Clone)]
#[command(about = "EchoTerm assistant console", author, version)]
pub struct AppConfig {
    /// Backend server address (host:port)
    #[arg(long, env = "ECHOTERM_SERVER", default_value = "127.0.0.1:5005")]
    pub server: String,

    /// Starting voice mode
    #[arg(long, value_enum, default_value_t = VoiceMode::Ai)]
    pub mode: VoiceMode,

    /// Preferred audio input device name
    #[arg(long)]
    pub input_device: Option<String>,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Capture segment length (milliseconds)
    #[arg(long = "segment-ms", default_value_t = DEFAULT_SEGMENT_MS)]
    pub segment_ms: u64,

    /// Pause between chained capture segments (milliseconds)
    #[arg(long = "segment-restart-ms", default_value_t = DEFAULT_SEGMENT_RESTART_MS)]
    pub segment_restart_ms: u64,

    /// Delay before task mode auto-starts listening (milliseconds)
    #[arg(long = "task-autostart-ms", default_value_t = DEFAULT_TASK_AUTOSTART_MS)]
    pub task_autostart_ms: u64,

    /// Wake phrase hint shown while task mode is in standby
    #[arg(long = "wake-phrase", default_value = "Hey Echo")]
    pub wake_phrase: String,

    /// Speak bot replies aloud from startup
    #[arg(long = "speak", default_value_t = false)]
    pub speak: bool,

    /// Override the speech synthesis command
    #[arg(long = "tts-cmd", env = "ECHOTERM_TTS_CMD")]
    pub tts_cmd: Option<String>,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "ECHOTERM_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "ECHOTERM_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging message/transcript snippets (debug log only)
    #[arg(
        long = "log-content",
        env = "ECHOTERM_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,

    /// Enable verbose timing logs
    #[arg(long)]
    pub log_timings: bool,
}
