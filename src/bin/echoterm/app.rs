//! Central application state shared between the event loop, the renderer,
//! and the capture worker.

use crate::session_stats::SessionStats;
use echoterm::audio::{start_segment_job, Recorder, SegmentJob, SegmentMessage};
use echoterm::chat::{outgoing_message, ChatLog, MessageSender};
use echoterm::config::AppConfig;
use echoterm::dashboard::Dashboard;
use echoterm::link::{ClientEvent, LinkNotice, ServerEvent, ServerLink};
use echoterm::speech::Speaker;
use echoterm::voice::{Transition, VoiceDirective, VoiceMode, VoiceState};
use echoterm::{log_debug, log_debug_content};
use std::sync::mpsc::TryRecvError;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Maximum characters retained in the input buffer.
pub(crate) const INPUT_MAX_CHARS: usize = 8_000;

/// How long the error toast stays visible.
const TOAST_DURATION: Duration = Duration::from_secs(5);

/// Which screen is showing. Mirrors the nav sidebar of the assistant's web
/// client: chat, dashboard, logs, settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum View {
    Chat,
    Dashboard,
    Logs,
    Settings,
}

impl View {
    pub(crate) const ALL: [View; 4] = [View::Chat, View::Dashboard, View::Logs, View::Settings];

    pub(crate) fn title(self) -> &'static str {
        match self {
            View::Chat => "Chat",
            View::Dashboard => "Dashboard",
            View::Logs => "Logs",
            View::Settings => "Settings",
        }
    }

    pub(crate) fn next(self) -> Self {
        match self {
            View::Chat => View::Dashboard,
            View::Dashboard => View::Logs,
            View::Logs => View::Settings,
            View::Settings => View::Chat,
        }
    }
}

/// Transient banner for user-visible errors and notices.
pub(crate) struct Toast {
    pub(crate) text: String,
    pub(crate) expires_at: Instant,
}

/// A segment-chain restart waiting for its delay to elapse. Carries the
/// generation it was scheduled under; a mismatch at fire time means the mode
/// or flags changed in between and the restart is stale.
struct PendingRestart {
    at: Instant,
    generation: u64,
}

pub(crate) struct App {
    pub(crate) config: AppConfig,
    pub(crate) link: ServerLink,
    pub(crate) voice: VoiceState,
    pub(crate) chat: ChatLog,
    pub(crate) dashboard: Dashboard,
    pub(crate) speaker: Speaker,
    pub(crate) stats: SessionStats,
    pub(crate) view: View,
    pub(crate) input: String,
    /// Lines scrolled up from the bottom of the chat log (0 = follow tail).
    pub(crate) chat_scroll_back: u16,
    pub(crate) logs_text: String,
    pub(crate) logs_scroll_back: u16,
    pub(crate) models: Vec<String>,
    pub(crate) model_cursor: usize,
    pub(crate) toast: Option<Toast>,
    pub(crate) mic_available: bool,
    recorder: Option<Arc<Mutex<Recorder>>>,
    segment_job: Option<SegmentJob>,
    pending_restart: Option<PendingRestart>,
    pending_task_start: Option<Instant>,
    should_quit: bool,
    needs_redraw: bool,
}

impl App {
    pub(crate) fn new(config: AppConfig, link: ServerLink) -> Self {
        let recorder = match Recorder::new(config.input_device.as_deref()) {
            Ok(recorder) => {
                log_debug(&format!(
                    "Audio recorder initialized ({})",
                    recorder.device_name()
                ));
                Some(Arc::new(Mutex::new(recorder)))
            }
            Err(err) => {
                log_debug(&format!("Audio recorder not available: {err:#}"));
                None
            }
        };
        let mic_available = recorder.is_some();
        let speaker = Speaker::new(config.speak, config.tts_cmd.clone());
        let voice = VoiceState::new(config.mode);

        let mut app = Self {
            voice,
            speaker,
            link,
            chat: ChatLog::new(),
            dashboard: Dashboard::new(),
            stats: SessionStats::new(),
            view: View::Chat,
            input: String::new(),
            chat_scroll_back: 0,
            logs_text: String::new(),
            logs_scroll_back: 0,
            models: Vec::new(),
            model_cursor: 0,
            toast: None,
            mic_available,
            recorder,
            segment_job: None,
            pending_restart: None,
            pending_task_start: None,
            should_quit: false,
            needs_redraw: true,
            config,
        };

        if !app.mic_available {
            app.show_toast("Microphone access denied; voice input is disabled.");
        }
        // Task mode starts listening on its own, like the mode toggle does.
        if app.mic_available && app.voice.mode() == VoiceMode::Task {
            app.link.send(&ClientEvent::StartSpeech {
                mode: VoiceMode::Task,
                current_text: None,
            });
        }
        app
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub(crate) fn quit(&mut self) {
        self.should_quit = true;
    }

    pub(crate) fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    pub(crate) fn take_redraw_request(&mut self) -> bool {
        let requested = self.needs_redraw;
        self.needs_redraw = false;
        requested
    }

    pub(crate) fn placeholder(&self) -> String {
        self.voice.placeholder(&self.config.wake_phrase)
    }

    pub(crate) fn show_toast(&mut self, text: &str) {
        self.toast = Some(Toast {
            text: text.to_string(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
        self.request_redraw();
    }

    // ------------------------------------------------------------------
    // Server events
    // ------------------------------------------------------------------

    pub(crate) fn handle_notice(&mut self, notice: LinkNotice) {
        match notice {
            LinkNotice::Event(event) => self.handle_server_event(event),
            LinkNotice::Disconnected(reason) => {
                log_debug(&format!("link disconnected: {reason}"));
                self.dashboard.set_offline();
                self.pending_restart = None;
                self.pending_task_start = None;
                if let Some(job) = &self.segment_job {
                    job.request_stop();
                }
                self.show_toast("Connection to the assistant lost.");
            }
        }
        self.request_redraw();
    }

    fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::ModelsList { models, current } => {
                self.model_cursor = models
                    .iter()
                    .position(|model| *model == current)
                    .unwrap_or(0);
                self.models = models;
                self.dashboard.set_model(current);
            }
            ServerEvent::SpeechStarted { mode } => {
                let transition = self.voice.on_speech_started(mode);
                self.apply_transition(transition);
            }
            ServerEvent::SpeechStopped => {
                let transition = self.voice.on_speech_stopped();
                self.apply_transition(transition);
            }
            ServerEvent::SpeechInterim {
                text: _,
                full_transcript,
            } => {
                if let Some(new_input) = self.voice.on_interim(&full_transcript) {
                    self.set_input(new_input);
                }
            }
            ServerEvent::SpeechFinal {
                text,
                full_transcript,
            } => {
                if let Some(new_input) =
                    self.voice
                        .on_final(&text, full_transcript.as_deref(), &self.input)
                {
                    self.set_input(new_input);
                }
            }
            ServerEvent::WakeWordDetected => {
                log_debug("wake word detected");
                let transition = self.voice.on_wake_word();
                self.apply_transition(transition);
            }
            ServerEvent::TaskModeSleep => {
                log_debug("task mode back to standby");
                let transition = self.voice.on_task_sleep();
                self.apply_transition(transition);
            }
            ServerEvent::SilenceTimeout => {
                let transition = self.voice.on_silence_timeout();
                self.apply_transition(transition);
            }
            ServerEvent::SpeechError { error } => {
                self.stats.record_error();
                self.show_toast(&format!("Speech recognition error: {error}"));
            }
            ServerEvent::SystemStatus { status, model } => {
                self.dashboard.set_status(&status, model);
            }
            ServerEvent::ModelChanged { model } => {
                self.dashboard.set_model(model);
            }
            ServerEvent::SystemMessage { message, kind } => {
                self.chat.push_system(&message, kind);
                self.chat_scroll_back = 0;
            }
            ServerEvent::ProcessingStart => self.chat.show_thinking(),
            ServerEvent::ProcessingEnd => self.chat.hide_thinking(),
            ServerEvent::BotResponse {
                response,
                stats,
                context_usage,
            } => {
                self.chat.hide_thinking();
                self.chat.push(&response, MessageSender::Bot, stats);
                self.stats.record_reply();
                self.speaker.speak(&response);
                if let Some(usage) = context_usage {
                    self.dashboard.set_context(usage);
                }
                self.chat_scroll_back = 0;
            }
            ServerEvent::BotResponseStart => {
                self.chat.begin_streaming();
                self.chat_scroll_back = 0;
            }
            ServerEvent::BotResponseChunk { chunk } => {
                self.chat.push_chunk(&chunk);
            }
            ServerEvent::BotResponseComplete {
                stats,
                context_usage,
            } => {
                if let Some(text) = self.chat.complete_streaming(stats) {
                    self.stats.record_reply();
                    self.speaker.speak(&text);
                }
                if let Some(usage) = context_usage {
                    self.dashboard.set_context(usage);
                }
            }
            ServerEvent::SystemStats {
                cpu,
                ram,
                ram_mb,
                tokens,
            } => {
                self.dashboard.on_stats(cpu, ram, ram_mb, tokens);
            }
            ServerEvent::ErrorMessage { error } => {
                self.stats.record_error();
                self.show_toast(&error);
            }
            ServerEvent::LogsUpdate { logs } => {
                self.logs_text = logs;
                self.logs_scroll_back = 0;
            }
        }
        self.request_redraw();
    }

    // ------------------------------------------------------------------
    // Voice control
    // ------------------------------------------------------------------

    fn apply_transition(&mut self, transition: Transition) {
        for event in &transition.events {
            self.link.send(event);
        }
        for directive in &transition.directives {
            match directive {
                VoiceDirective::StopCapture => self.stop_capture(),
                VoiceDirective::StartCapture => self.start_capture(),
                VoiceDirective::ScheduleTaskStart => {
                    self.pending_task_start = Some(
                        Instant::now() + Duration::from_millis(self.config.task_autostart_ms),
                    );
                }
                VoiceDirective::ClearInput => self.input.clear(),
                VoiceDirective::SubmitInput => self.send_current_input(),
            }
        }
        self.request_redraw();
    }

    pub(crate) fn press_mic(&mut self) {
        if !self.mic_available {
            self.show_toast("Microphone unavailable; voice input is disabled.");
            return;
        }
        let current_text = self.input.clone();
        let transition = self.voice.press_mic(&current_text);
        self.apply_transition(transition);
    }

    pub(crate) fn toggle_mode(&mut self) {
        let transition = self.voice.toggle_mode();
        log_debug(&format!("voice mode switched to {}", self.voice.mode().label()));
        self.apply_transition(transition);
    }

    pub(crate) fn toggle_speak(&mut self) {
        let enabled = self.speaker.toggle();
        self.show_toast(if enabled {
            "Speech output on"
        } else {
            "Speech output off"
        });
    }

    fn start_capture(&mut self) {
        if self.segment_job.is_some() {
            // The device is a singleton; one segment at a time.
            return;
        }
        let Some(recorder) = self.recorder.clone() else {
            return;
        };
        if !self.voice.may_record() {
            return;
        }
        let job = start_segment_job(
            recorder,
            Duration::from_millis(self.config.segment_ms),
            self.voice.generation(),
        );
        log_debug("segment capture started");
        self.segment_job = Some(job);
    }

    fn stop_capture(&mut self) {
        self.pending_restart = None;
        if let Some(job) = &self.segment_job {
            job.request_stop();
        }
    }

    /// Check the capture worker without blocking the UI thread.
    pub(crate) fn poll_segment_job(&mut self) {
        let mut finished = false;
        let mut message: Option<SegmentMessage> = None;
        if let Some(job) = self.segment_job.as_mut() {
            match job.receiver.try_recv() {
                Ok(msg) => {
                    message = Some(msg);
                    finished = true;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    log_debug("segment worker disconnected unexpectedly");
                    finished = true;
                }
            }
            if finished {
                // Join the worker once it signals completion to avoid lingering handles.
                if let Some(handle) = job.handle.take() {
                    let _ = handle.join();
                }
            }
        }
        if !finished {
            return;
        }
        let generation = self
            .segment_job
            .take()
            .map(|job| job.generation)
            .unwrap_or_default();
        if let Some(message) = message {
            self.handle_segment_message(message, generation);
        }
        self.request_redraw();
    }

    fn handle_segment_message(&mut self, message: SegmentMessage, generation: u64) {
        match message {
            SegmentMessage::Captured { audio, duration_ms } => {
                self.stats.record_segment(duration_ms);
                if self.config.log_timings {
                    log_debug(&format!(
                        "timing|phase=segment|capture_ms={duration_ms}|payload_chars={}",
                        audio.len()
                    ));
                }
                self.link.send(&ClientEvent::AudioChunk { audio });
                if self.voice.mode() == VoiceMode::Ai && self.voice.is_manual_listening() {
                    self.voice.set_transcribing(true);
                }
                self.schedule_restart(generation);
            }
            SegmentMessage::Empty => {
                log_debug("segment captured no audio");
                self.schedule_restart(generation);
            }
            SegmentMessage::Error(err) => {
                // No retry; the chain simply does not continue.
                self.stats.record_error();
                log_debug(&format!("segment capture error: {err}"));
            }
        }
    }

    fn schedule_restart(&mut self, generation: u64) {
        if generation != self.voice.generation() || !self.voice.may_record() {
            return;
        }
        self.pending_restart = Some(PendingRestart {
            at: Instant::now() + Duration::from_millis(self.config.segment_restart_ms),
            generation,
        });
    }

    /// Fire any due timers: segment restarts, the task-mode autostart, and
    /// toast expiry. Every deferred action re-validates state at fire time.
    pub(crate) fn tick(&mut self, now: Instant) {
        if let Some(restart) = &self.pending_restart {
            if now >= restart.at {
                let generation = restart.generation;
                self.pending_restart = None;
                if generation == self.voice.generation() && self.voice.may_record() {
                    self.start_capture();
                } else {
                    log_debug("stale segment restart discarded");
                }
            }
        }

        if let Some(at) = self.pending_task_start {
            if now >= at {
                self.pending_task_start = None;
                if self.voice.mode() == VoiceMode::Task {
                    self.link.send(&ClientEvent::StartSpeech {
                        mode: VoiceMode::Task,
                        current_text: None,
                    });
                }
            }
        }

        if let Some(toast) = &self.toast {
            if now >= toast.expires_at {
                self.toast = None;
                self.request_redraw();
            }
        }
    }

    // ------------------------------------------------------------------
    // Chat input
    // ------------------------------------------------------------------

    pub(crate) fn send_current_input(&mut self) {
        let Some(message) = outgoing_message(&self.input) else {
            return;
        };
        self.chat.push(&message, MessageSender::User, None);
        self.stats.record_message();
        log_debug_content(&format!("user message: {message}"));
        self.link.send(&ClientEvent::UserMessage {
            message,
            mode: self.voice.mode(),
        });
        self.input.clear();
        self.voice.reset_after_send();
        self.chat_scroll_back = 0;
        self.request_redraw();
    }

    fn set_input(&mut self, text: String) {
        self.input = text;
        self.request_redraw();
    }

    pub(crate) fn push_input_char(&mut self, ch: char) {
        if self.input.len() >= INPUT_MAX_CHARS {
            return;
        }
        self.input.push(ch);
        let text = self.input.clone();
        self.voice.sync_input_edit(&text);
        self.request_redraw();
    }

    pub(crate) fn backspace_input(&mut self) {
        self.input.pop();
        let text = self.input.clone();
        self.voice.sync_input_edit(&text);
        self.request_redraw();
    }

    pub(crate) fn clear_input(&mut self) {
        self.input.clear();
        self.voice.sync_input_edit("");
        self.request_redraw();
    }

    // ------------------------------------------------------------------
    // Views and settings
    // ------------------------------------------------------------------

    pub(crate) fn switch_view(&mut self, view: View) {
        if view == self.view {
            return;
        }
        self.view = view;
        match view {
            View::Logs => self.link.send(&ClientEvent::GetLogs),
            View::Settings => self.link.send(&ClientEvent::GetModels),
            _ => {}
        }
        self.request_redraw();
    }

    pub(crate) fn scroll_up(&mut self) {
        match self.view {
            View::Chat => self.chat_scroll_back = self.chat_scroll_back.saturating_add(1),
            View::Logs => self.logs_scroll_back = self.logs_scroll_back.saturating_add(1),
            View::Settings => {
                self.model_cursor = self.model_cursor.saturating_sub(1);
            }
            View::Dashboard => return,
        }
        self.request_redraw();
    }

    pub(crate) fn scroll_down(&mut self) {
        match self.view {
            View::Chat => self.chat_scroll_back = self.chat_scroll_back.saturating_sub(1),
            View::Logs => self.logs_scroll_back = self.logs_scroll_back.saturating_sub(1),
            View::Settings => {
                if !self.models.is_empty() {
                    self.model_cursor = (self.model_cursor + 1).min(self.models.len() - 1);
                }
            }
            View::Dashboard => return,
        }
        self.request_redraw();
    }

    pub(crate) fn page_up(&mut self) {
        for _ in 0..10 {
            self.scroll_up();
        }
    }

    pub(crate) fn page_down(&mut self) {
        for _ in 0..10 {
            self.scroll_down();
        }
    }

    /// Settings view: ask the backend to switch to the highlighted model.
    pub(crate) fn confirm_model(&mut self) {
        if let Some(model) = self.models.get(self.model_cursor) {
            self.link.send(&ClientEvent::SetModel {
                model: model.clone(),
            });
        }
    }
}
