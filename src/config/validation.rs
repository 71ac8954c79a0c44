use super::AppConfig;
use anyhow::{bail, Result};
use clap::Parser;

pub const MIN_SEGMENT_MS: u64 = 500;
pub const MAX_SEGMENT_MS: u64 = 30_000;
pub const MAX_SEGMENT_RESTART_MS: u64 = 5_000;
pub const MAX_TASK_AUTOSTART_MS: u64 = 10_000;

const MAX_WAKE_PHRASE_CHARS: usize = 64;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize the ones we pass onward.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_SEGMENT_MS..=MAX_SEGMENT_MS).contains(&self.segment_ms) {
            bail!(
                "--segment-ms must be between {MIN_SEGMENT_MS} and {MAX_SEGMENT_MS}, got {}",
                self.segment_ms
            );
        }
        if self.segment_restart_ms > MAX_SEGMENT_RESTART_MS {
            bail!(
                "--segment-restart-ms must be at most {MAX_SEGMENT_RESTART_MS}, got {}",
                self.segment_restart_ms
            );
        }
        if self.task_autostart_ms > MAX_TASK_AUTOSTART_MS {
            bail!(
                "--task-autostart-ms must be at most {MAX_TASK_AUTOSTART_MS}, got {}",
                self.task_autostart_ms
            );
        }

        self.server = validate_server_addr(&self.server)?;

        self.wake_phrase = self.wake_phrase.trim().to_string();
        if self.wake_phrase.is_empty() {
            bail!("--wake-phrase must not be empty");
        }
        if self.wake_phrase.chars().count() > MAX_WAKE_PHRASE_CHARS {
            bail!("--wake-phrase must be at most {MAX_WAKE_PHRASE_CHARS} characters");
        }

        if let Some(cmd) = &self.tts_cmd {
            if cmd.trim().is_empty() {
                bail!("--tts-cmd must not be empty when provided");
            }
        }

        Ok(())
    }
}

/// Require a `host:port` shape so a bad address fails at startup instead of
/// as an opaque connect error.
fn validate_server_addr(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("--server must not be empty");
    }
    let Some((host, port)) = trimmed.rsplit_once(':') else {
        bail!("--server must be host:port, got '{trimmed}'");
    };
    if host.is_empty() {
        bail!("--server host must not be empty");
    }
    match port.parse::<u16>() {
        Ok(port) if port > 0 => {}
        _ => bail!("--server port must be a number in 1-65535, got '{port}'"),
    }
    Ok(trimmed.to_string())
}
