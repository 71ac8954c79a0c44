//! Text-to-speech bridge.
//!
//! Shells out to the platform synthesizer (`say` on macOS, `espeak`
//! elsewhere, overridable via `--tts-cmd`). At most one utterance plays at a
//! time: starting a new one kills whatever is still speaking. When the user
//! toggle is off or no synthesizer exists, `speak` is a no-op.

use crate::log_debug;
use std::io::ErrorKind;
use std::process::{Child, Command, Stdio};

pub struct Speaker {
    enabled: bool,
    command: Option<String>,
    current: Option<Child>,
}

impl Speaker {
    pub fn new(enabled: bool, command_override: Option<String>) -> Self {
        Self {
            enabled,
            command: command_override.or_else(|| Some(default_synth_command().to_string())),
            current: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.cancel();
        }
        self.enabled
    }

    /// Speak `text` aloud. Returns whether an utterance was actually started;
    /// disabled toggle, missing synthesizer, and markup-only text all short
    /// circuit to `false`.
    pub fn speak(&mut self, text: &str) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(command) = self.command.clone() else {
            return false;
        };

        self.cancel();
        let clean = strip_markup(text);
        if clean.trim().is_empty() {
            return false;
        }

        match Command::new(&command)
            .arg(&clean)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                self.current = Some(child);
                true
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log_debug(&format!(
                    "speech synthesizer '{command}' not found; disabling speech output"
                ));
                self.command = None;
                false
            }
            Err(err) => {
                log_debug(&format!("speech synthesis failed: {err}"));
                false
            }
        }
    }

    /// Stop the in-progress utterance, if any.
    pub fn cancel(&mut self) {
        if let Some(mut child) = self.current.take() {
            match child.try_wait() {
                Ok(Some(_)) => {}
                _ => {
                    let _ = child.kill();
                    let _ = child.wait();
                }
            }
        }
    }
}

impl Drop for Speaker {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn default_synth_command() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "say"
    }
    #[cfg(not(target_os = "macos"))]
    {
        "espeak"
    }
}

/// Remove markdown punctuation the synthesizer would read aloud.
pub fn strip_markup(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '`' | '#'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_markup_removes_markdown_punctuation() {
        assert_eq!(strip_markup("**bold** `code` # heading"), "bold code  heading");
        assert_eq!(strip_markup("plain text"), "plain text");
        assert_eq!(strip_markup("*`#"), "");
    }

    #[test]
    fn speak_is_a_noop_when_disabled() {
        let mut speaker = Speaker::new(false, Some("definitely-not-a-synth".to_string()));
        assert!(!speaker.speak("hello"));
        assert!(speaker.current.is_none(), "no process may be spawned");
    }

    #[test]
    fn speak_is_a_noop_for_markup_only_text() {
        let mut speaker = Speaker::new(true, Some("definitely-not-a-synth".to_string()));
        assert!(!speaker.speak("**``##"));
        assert!(speaker.current.is_none());
    }

    #[test]
    fn missing_synthesizer_disables_future_attempts() {
        let mut speaker = Speaker::new(true, Some("echoterm-no-such-synth".to_string()));
        assert!(!speaker.speak("hello"));
        assert!(speaker.command.is_none(), "command cleared after NotFound");
        assert!(!speaker.speak("hello again"));
    }

    #[test]
    fn toggle_flips_and_reports_state() {
        let mut speaker = Speaker::new(false, Some("x".to_string()));
        assert!(speaker.toggle());
        assert!(speaker.is_enabled());
        assert!(!speaker.toggle());
        assert!(!speaker.is_enabled());
    }
}
