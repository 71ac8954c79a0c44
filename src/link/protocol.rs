//! Typed messages for the backend event channel.
//!
//! Each wire event becomes one enum variant with its required and optional
//! fields declared, so a missing `stats` or `context_usage` is an `Option`
//! at compile time instead of a surprise at field-access time.

use crate::voice::VoiceMode;
use serde::{Deserialize, Serialize};

// ============================================================================
// Events (client → server)
// ============================================================================

/// Events emitted by this client.
///
/// Serialized as JSON with an `"event"` tag field for type discrimination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum ClientEvent {
    /// Request the backend's buffered log text
    #[serde(rename = "get_logs")]
    GetLogs,

    /// Request the available model list
    #[serde(rename = "get_models")]
    GetModels,

    /// Select the active model
    #[serde(rename = "set_model")]
    SetModel { model: String },

    /// One captured audio segment, WAV-encoded and base64-transported
    #[serde(rename = "audio_chunk")]
    AudioChunk { audio: String },

    /// Begin speech recognition; ai mode carries the current input text so
    /// in-flight edits are preserved server-side
    #[serde(rename = "start_speech")]
    StartSpeech {
        mode: VoiceMode,
        #[serde(skip_serializing_if = "Option::is_none")]
        current_text: Option<String>,
    },

    /// Stop speech recognition
    #[serde(rename = "stop_speech")]
    StopSpeech,

    /// The user switched voice modes
    #[serde(rename = "voice_mode_changed")]
    VoiceModeChanged { mode: VoiceMode },

    /// Wake task mode without the wake phrase
    #[serde(rename = "manual_wake")]
    ManualWake,

    /// Put task mode back into standby
    #[serde(rename = "manual_sleep")]
    ManualSleep,

    /// A chat message typed or dictated by the user
    #[serde(rename = "user_message")]
    UserMessage { message: String, mode: VoiceMode },
}

// ============================================================================
// Events (server → client)
// ============================================================================

/// Events pushed by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event")]
pub enum ServerEvent {
    #[serde(rename = "models_list")]
    ModelsList { models: Vec<String>, current: String },

    /// Recognition is running; the client should start its capture chain
    #[serde(rename = "speech_started")]
    SpeechStarted { mode: VoiceMode },

    #[serde(rename = "speech_stopped")]
    SpeechStopped,

    /// Rolling partial transcript for the current utterance
    #[serde(rename = "speech_interim")]
    SpeechInterim {
        text: String,
        full_transcript: String,
    },

    /// Finalized transcript fragment. Task mode omits `full_transcript`.
    #[serde(rename = "speech_final")]
    SpeechFinal {
        text: String,
        #[serde(default)]
        full_transcript: Option<String>,
    },

    #[serde(rename = "wake_word_detected")]
    WakeWordDetected,

    #[serde(rename = "task_mode_sleep")]
    TaskModeSleep,

    /// The recognizer saw sustained silence; auto-submit pending input
    #[serde(rename = "silence_timeout")]
    SilenceTimeout,

    #[serde(rename = "speech_error")]
    SpeechError { error: String },

    #[serde(rename = "system_status")]
    SystemStatus {
        status: String,
        #[serde(default)]
        model: Option<String>,
    },

    #[serde(rename = "model_changed")]
    ModelChanged { model: String },

    /// Out-of-band notice rendered inline in the chat log
    #[serde(rename = "system_message")]
    SystemMessage {
        message: String,
        #[serde(rename = "type")]
        kind: SystemNote,
    },

    #[serde(rename = "processing_start")]
    ProcessingStart,

    #[serde(rename = "processing_end")]
    ProcessingEnd,

    /// Complete (non-streamed) reply
    #[serde(rename = "bot_response")]
    BotResponse {
        response: String,
        #[serde(default)]
        stats: Option<ResponseStats>,
        #[serde(default)]
        context_usage: Option<ContextUsage>,
    },

    #[serde(rename = "bot_response_start")]
    BotResponseStart,

    #[serde(rename = "bot_response_chunk")]
    BotResponseChunk { chunk: String },

    #[serde(rename = "bot_response_complete")]
    BotResponseComplete {
        #[serde(default)]
        stats: Option<ResponseStats>,
        #[serde(default)]
        context_usage: Option<ContextUsage>,
    },

    /// Periodic resource sample for the dashboard
    #[serde(rename = "system_stats")]
    SystemStats {
        cpu: f64,
        ram: f64,
        #[serde(default)]
        ram_mb: Option<f64>,
        #[serde(default)]
        tokens: Option<u64>,
    },

    #[serde(rename = "error_message")]
    ErrorMessage { error: String },

    /// Full replacement text for the logs view
    #[serde(rename = "logs_update")]
    LogsUpdate { logs: String },
}

// ============================================================================
// Payload types
// ============================================================================

/// Per-reply generation stats; the backend formats `time` for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStats {
    pub tokens: u64,
    pub time: String,
}

/// Consumed vs maximum conversation context, in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextUsage {
    pub current: u64,
    pub max: u64,
}

/// Severity of a `system_message` notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemNote {
    Info,
    Warning,
    Error,
}
