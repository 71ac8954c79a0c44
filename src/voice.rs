//! Voice-mode state machine.
//!
//! Two mutually exclusive modes: conversational (`ai`), where the user toggles
//! listening manually, and hands-free (`task`), where the server listens for a
//! wake phrase and confirms wake/sleep transitions. Transitions are pure: each
//! one mutates the local flags and hands back the events to emit plus the
//! follow-up work the event loop must schedule.

use crate::link::protocol::ClientEvent;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Active voice mode. The enum makes "exactly one mode" a type invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VoiceMode {
    Ai,
    Task,
}

impl VoiceMode {
    pub fn label(self) -> &'static str {
        match self {
            VoiceMode::Ai => "ai",
            VoiceMode::Task => "task",
        }
    }

    fn other(self) -> Self {
        match self {
            VoiceMode::Ai => VoiceMode::Task,
            VoiceMode::Task => VoiceMode::Ai,
        }
    }
}

/// Follow-up work a transition asks the event loop to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceDirective {
    /// Stop the in-flight capture segment and cancel any pending restart.
    StopCapture,
    /// Begin a capture segment now (subject to the device being available).
    StartCapture,
    /// Emit `start_speech` for task mode after the autostart delay.
    ScheduleTaskStart,
    /// Clear the input buffer.
    ClearInput,
    /// Submit the current input buffer as a user message if non-empty.
    SubmitInput,
}

/// Events to emit and work to schedule after a state change.
#[derive(Debug, Default)]
pub struct Transition {
    pub events: Vec<ClientEvent>,
    pub directives: Vec<VoiceDirective>,
}

/// Local voice state. The awake flag is server-authoritative: mic presses in
/// task mode only request a change, and the flag moves when the server
/// confirms via `wake_word_detected` / `task_mode_sleep`.
#[derive(Debug)]
pub struct VoiceState {
    mode: VoiceMode,
    manual_listening: bool,
    awake: bool,
    transcript: String,
    transcribing: bool,
    generation: u64,
}

impl VoiceState {
    pub fn new(mode: VoiceMode) -> Self {
        Self {
            mode,
            manual_listening: false,
            awake: false,
            transcript: String::new(),
            transcribing: false,
            generation: 0,
        }
    }

    pub fn mode(&self) -> VoiceMode {
        self.mode
    }

    pub fn is_manual_listening(&self) -> bool {
        self.manual_listening
    }

    pub fn is_awake(&self) -> bool {
        self.awake
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Current restart-chain generation. Segment jobs capture this at start;
    /// a delayed restart whose generation no longer matches is stale and must
    /// be discarded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a capture segment may run right now.
    pub fn may_record(&self) -> bool {
        match self.mode {
            VoiceMode::Ai => self.manual_listening,
            VoiceMode::Task => true,
        }
    }

    /// Flip between conversational and hands-free mode. Resets the listening
    /// and awake flags and the accumulated transcript, tells the server to
    /// stop recognition, announces the new mode, and in task mode requests
    /// the delayed autostart.
    pub fn toggle_mode(&mut self) -> Transition {
        self.mode = self.mode.other();
        self.manual_listening = false;
        self.awake = false;
        self.transcript.clear();
        self.transcribing = false;
        self.generation += 1;

        let mut transition = Transition {
            events: vec![
                ClientEvent::StopSpeech,
                ClientEvent::VoiceModeChanged { mode: self.mode },
            ],
            directives: vec![VoiceDirective::StopCapture, VoiceDirective::ClearInput],
        };
        if self.mode == VoiceMode::Task {
            transition.directives.push(VoiceDirective::ScheduleTaskStart);
        }
        transition
    }

    /// Handle a mic press. In ai mode this toggles manual listening; starting
    /// carries the current input text so in-flight edits survive on the
    /// server side. In task mode it only asks the server to wake or sleep.
    pub fn press_mic(&mut self, current_text: &str) -> Transition {
        match self.mode {
            VoiceMode::Ai => {
                if self.manual_listening {
                    self.manual_listening = false;
                    self.transcribing = false;
                    self.generation += 1;
                    Transition {
                        events: vec![ClientEvent::StopSpeech],
                        directives: vec![VoiceDirective::StopCapture],
                    }
                } else {
                    self.manual_listening = true;
                    self.transcript = current_text.to_string();
                    self.generation += 1;
                    Transition {
                        events: vec![ClientEvent::StartSpeech {
                            mode: VoiceMode::Ai,
                            current_text: Some(current_text.to_string()),
                        }],
                        directives: Vec::new(),
                    }
                }
            }
            VoiceMode::Task => {
                let event = if self.awake {
                    ClientEvent::ManualSleep
                } else {
                    ClientEvent::ManualWake
                };
                Transition {
                    events: vec![event],
                    directives: Vec::new(),
                }
            }
        }
    }

    /// The server confirmed recognition started; begin capturing if the
    /// current mode and flags allow it.
    pub fn on_speech_started(&mut self, mode: VoiceMode) -> Transition {
        let mut transition = Transition::default();
        if mode == self.mode && self.may_record() {
            transition.directives.push(VoiceDirective::StartCapture);
        }
        transition
    }

    /// The server stopped recognition; end the capture chain.
    pub fn on_speech_stopped(&mut self) -> Transition {
        self.transcribing = false;
        Transition {
            events: Vec::new(),
            directives: vec![VoiceDirective::StopCapture],
        }
    }

    /// Server-confirmed wake. Only meaningful in task mode.
    pub fn on_wake_word(&mut self) -> Transition {
        self.awake = true;
        Transition {
            events: Vec::new(),
            directives: vec![VoiceDirective::ClearInput],
        }
    }

    /// Server-confirmed return to standby.
    pub fn on_task_sleep(&mut self) -> Transition {
        self.awake = false;
        self.transcript.clear();
        Transition {
            events: Vec::new(),
            directives: vec![VoiceDirective::ClearInput],
        }
    }

    /// The server saw sustained silence; submit whatever the user has typed
    /// or dictated so far.
    pub fn on_silence_timeout(&self) -> Transition {
        Transition {
            events: Vec::new(),
            directives: vec![VoiceDirective::SubmitInput],
        }
    }

    /// Interim recognition result. In ai mode the input mirrors the rolling
    /// transcript; task mode ignores interim text. Returns the new input
    /// buffer contents when they should change.
    pub fn on_interim(&mut self, full_transcript: &str) -> Option<String> {
        self.transcribing = false;
        match self.mode {
            VoiceMode::Ai => Some(full_transcript.to_string()),
            VoiceMode::Task => None,
        }
    }

    /// Final recognition result. In ai mode the accumulated transcript
    /// replaces the input; in task mode non-empty text is appended so
    /// multiple command fragments survive.
    pub fn on_final(
        &mut self,
        text: &str,
        full_transcript: Option<&str>,
        current_input: &str,
    ) -> Option<String> {
        self.transcribing = false;
        match self.mode {
            VoiceMode::Ai => {
                self.transcript = full_transcript.unwrap_or(text).to_string();
                Some(self.transcript.clone())
            }
            VoiceMode::Task => {
                if text.is_empty() {
                    return None;
                }
                let current = current_input.trim();
                if current.is_empty() {
                    Some(text.to_string())
                } else {
                    Some(format!("{current} {text}"))
                }
            }
        }
    }

    /// Keep the transcript in sync with manual edits to the input buffer.
    pub fn sync_input_edit(&mut self, text: &str) {
        if self.mode == VoiceMode::Ai {
            self.transcript = text.to_string();
        }
    }

    /// A message was sent; the transcript session resets.
    pub fn reset_after_send(&mut self) {
        self.transcript.clear();
    }

    /// A captured segment is on its way to the recognizer.
    pub fn set_transcribing(&mut self, transcribing: bool) {
        self.transcribing = transcribing;
    }

    /// Input-box hint for the current state.
    pub fn placeholder(&self, wake_phrase: &str) -> String {
        match self.mode {
            VoiceMode::Ai => {
                if self.manual_listening && self.transcribing {
                    "Transcribing...".to_string()
                } else if self.manual_listening {
                    "Listening...".to_string()
                } else {
                    "Write or speak...".to_string()
                }
            }
            VoiceMode::Task => {
                if self.awake {
                    "Listening for command...".to_string()
                } else {
                    format!("Say '{wake_phrase}'...")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ai_state() -> VoiceState {
        VoiceState::new(VoiceMode::Ai)
    }

    #[test]
    fn toggle_mode_resets_flags_and_transcript() {
        let mut state = ai_state();
        state.press_mic("draft");
        state.awake = true;
        assert!(state.is_manual_listening());
        assert_eq!(state.transcript(), "draft");

        let transition = state.toggle_mode();

        assert_eq!(state.mode(), VoiceMode::Task);
        assert!(!state.is_manual_listening());
        assert!(!state.is_awake());
        assert_eq!(state.transcript(), "");
        assert_eq!(
            transition.events,
            vec![
                ClientEvent::StopSpeech,
                ClientEvent::VoiceModeChanged {
                    mode: VoiceMode::Task
                },
            ]
        );
        assert!(transition
            .directives
            .contains(&VoiceDirective::ScheduleTaskStart));
    }

    #[test]
    fn toggle_back_to_ai_does_not_schedule_autostart() {
        let mut state = VoiceState::new(VoiceMode::Task);
        let transition = state.toggle_mode();
        assert_eq!(state.mode(), VoiceMode::Ai);
        assert!(!transition
            .directives
            .contains(&VoiceDirective::ScheduleTaskStart));
    }

    #[test]
    fn mic_press_in_ai_mode_carries_current_text() {
        let mut state = ai_state();
        let transition = state.press_mic("half-typed thought");
        assert!(state.is_manual_listening());
        assert_eq!(
            transition.events,
            vec![ClientEvent::StartSpeech {
                mode: VoiceMode::Ai,
                current_text: Some("half-typed thought".to_string()),
            }]
        );

        let transition = state.press_mic("");
        assert!(!state.is_manual_listening());
        assert_eq!(transition.events, vec![ClientEvent::StopSpeech]);
        assert!(transition.directives.contains(&VoiceDirective::StopCapture));
    }

    #[test]
    fn mic_press_in_task_mode_does_not_flip_awake_locally() {
        let mut state = VoiceState::new(VoiceMode::Task);
        let transition = state.press_mic("");
        assert_eq!(transition.events, vec![ClientEvent::ManualWake]);
        assert!(!state.is_awake(), "awake waits for server confirmation");

        state.on_wake_word();
        assert!(state.is_awake());
        let transition = state.press_mic("");
        assert_eq!(transition.events, vec![ClientEvent::ManualSleep]);
        assert!(state.is_awake(), "sleep also waits for the server");
    }

    #[test]
    fn generation_bumps_invalidate_restart_chain() {
        let mut state = ai_state();
        state.press_mic("");
        let captured = state.generation();
        assert!(state.may_record());

        state.toggle_mode();
        assert_ne!(state.generation(), captured);
    }

    #[test]
    fn may_record_requires_manual_listen_in_ai_mode() {
        let mut state = ai_state();
        assert!(!state.may_record());
        state.press_mic("");
        assert!(state.may_record());

        let task = VoiceState::new(VoiceMode::Task);
        assert!(task.may_record(), "task mode always records");
    }

    #[test]
    fn speech_started_only_captures_for_matching_mode() {
        let mut state = ai_state();
        let transition = state.on_speech_started(VoiceMode::Ai);
        assert!(transition.directives.is_empty(), "ai idle must not record");

        state.press_mic("");
        let transition = state.on_speech_started(VoiceMode::Ai);
        assert_eq!(transition.directives, vec![VoiceDirective::StartCapture]);

        let transition = state.on_speech_started(VoiceMode::Task);
        assert!(transition.directives.is_empty(), "mode mismatch is stale");
    }

    #[test]
    fn final_transcript_replaces_in_ai_and_appends_in_task() {
        let mut state = ai_state();
        let input = state.on_final("world", Some("hello world"), "hello");
        assert_eq!(input.as_deref(), Some("hello world"));
        assert_eq!(state.transcript(), "hello world");

        let mut state = VoiceState::new(VoiceMode::Task);
        let input = state.on_final("lights on", None, "");
        assert_eq!(input.as_deref(), Some("lights on"));
        let input = state.on_final("please", None, "lights on");
        assert_eq!(input.as_deref(), Some("lights on please"));
        let input = state.on_final("", None, "lights on please");
        assert!(input.is_none(), "empty fragments must not clobber input");
    }

    #[test]
    fn wake_and_sleep_clear_input() {
        let mut state = VoiceState::new(VoiceMode::Task);
        let transition = state.on_wake_word();
        assert!(state.is_awake());
        assert_eq!(transition.directives, vec![VoiceDirective::ClearInput]);

        let transition = state.on_task_sleep();
        assert!(!state.is_awake());
        assert_eq!(transition.directives, vec![VoiceDirective::ClearInput]);
    }

    #[test]
    fn placeholder_follows_state() {
        let mut state = ai_state();
        assert_eq!(state.placeholder("Hey Echo"), "Write or speak...");
        state.press_mic("");
        assert_eq!(state.placeholder("Hey Echo"), "Listening...");
        state.set_transcribing(true);
        assert_eq!(state.placeholder("Hey Echo"), "Transcribing...");

        let mut state = VoiceState::new(VoiceMode::Task);
        assert_eq!(state.placeholder("Hey Echo"), "Say 'Hey Echo'...");
        state.on_wake_word();
        assert_eq!(state.placeholder("Hey Echo"), "Listening for command...");
    }

    #[test]
    fn silence_timeout_requests_submit() {
        let state = VoiceState::new(VoiceMode::Task);
        let transition = state.on_silence_timeout();
        assert_eq!(transition.directives, vec![VoiceDirective::SubmitInput]);
    }
}
