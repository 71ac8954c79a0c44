//! Chat transcript model.
//!
//! Holds the rendered message list plus the two transient bits of state the
//! stream protocol needs: the single in-flight streaming message and the
//! "thinking" placeholder. Rendering is the binary's job; this module only
//! owns the data.

use crate::link::protocol::{ResponseStats, SystemNote};
use chrono::Local;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSender {
    User,
    Bot,
    System,
}

/// One rendered chat bubble. Immutable once finalized; the log grows for the
/// lifetime of the session.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub sender: MessageSender,
    pub text: String,
    pub stats: Option<ResponseStats>,
    pub timestamp: String,
    /// Severity styling for system notices.
    pub note: Option<SystemNote>,
}

/// Message list plus streaming/thinking state.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    /// Index of the in-flight streaming message, if any. At most one stream
    /// is active at a time.
    streaming: Option<usize>,
    thinking: bool,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    pub fn has_active_stream(&self) -> bool {
        self.streaming.is_some()
    }

    /// Append a finalized message with a timestamp.
    pub fn push(&mut self, text: &str, sender: MessageSender, stats: Option<ResponseStats>) {
        self.messages.push(ChatMessage {
            sender,
            text: text.to_string(),
            stats,
            timestamp: clock_stamp(),
            note: None,
        });
    }

    /// Append a system notice with severity styling.
    pub fn push_system(&mut self, text: &str, note: SystemNote) {
        self.messages.push(ChatMessage {
            sender: MessageSender::System,
            text: text.to_string(),
            stats: None,
            timestamp: clock_stamp(),
            note: Some(note),
        });
    }

    /// Show the transient "thinking" placeholder. A second call while one is
    /// visible is a no-op.
    pub fn show_thinking(&mut self) {
        self.thinking = true;
    }

    pub fn hide_thinking(&mut self) {
        self.thinking = false;
    }

    /// Open a streaming bot message. Hides the thinking placeholder. If a
    /// stream is somehow still open, it is finalized (without stats) first so
    /// its text is not lost.
    pub fn begin_streaming(&mut self) {
        self.hide_thinking();
        if self.streaming.is_some() {
            let _ = self.complete_streaming(None);
        }
        self.messages.push(ChatMessage {
            sender: MessageSender::Bot,
            text: String::new(),
            stats: None,
            timestamp: String::new(),
            note: None,
        });
        self.streaming = Some(self.messages.len() - 1);
    }

    /// Append a chunk to the active stream. Chunks with no active stream are
    /// dropped silently.
    pub fn push_chunk(&mut self, chunk: &str) {
        if let Some(index) = self.streaming {
            if let Some(message) = self.messages.get_mut(index) {
                message.text.push_str(chunk);
            }
        }
    }

    /// Finalize the active stream: stamp time and stats, clear the in-flight
    /// reference, and hand back the accumulated text (for speech synthesis).
    /// Returns `None` when no stream is active.
    pub fn complete_streaming(&mut self, stats: Option<ResponseStats>) -> Option<String> {
        let index = self.streaming.take()?;
        let message = self.messages.get_mut(index)?;
        message.timestamp = clock_stamp();
        message.stats = stats;
        Some(message.text.clone())
    }
}

/// Trim typed input down to a sendable message. Whitespace-only input
/// produces nothing: no chat bubble, no event.
pub fn outgoing_message(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn clock_stamp() -> String {
    Local::now().format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_records_sender_and_timestamp() {
        let mut log = ChatLog::new();
        log.push("hello", MessageSender::User, None);
        assert_eq!(log.messages().len(), 1);
        let message = &log.messages()[0];
        assert_eq!(message.sender, MessageSender::User);
        assert_eq!(message.text, "hello");
        assert!(!message.timestamp.is_empty());
    }

    #[test]
    fn streamed_text_is_concatenation_of_chunks_in_order() {
        let mut log = ChatLog::new();
        log.begin_streaming();
        log.push_chunk("The ");
        log.push_chunk("quick ");
        log.push_chunk("fox.");
        let text = log.complete_streaming(None).expect("stream was active");
        assert_eq!(text, "The quick fox.");
        assert_eq!(log.messages().last().expect("message").text, "The quick fox.");
        assert!(!log.has_active_stream());
    }

    #[test]
    fn chunk_without_active_stream_is_a_noop() {
        let mut log = ChatLog::new();
        log.push_chunk("orphan");
        assert!(log.messages().is_empty());
        assert!(log.complete_streaming(None).is_none());
    }

    #[test]
    fn complete_attaches_stats_and_timestamp() {
        let mut log = ChatLog::new();
        log.begin_streaming();
        assert!(log.messages()[0].timestamp.is_empty());
        log.push_chunk("done");
        let stats = ResponseStats {
            tokens: 7,
            time: "120ms".to_string(),
        };
        log.complete_streaming(Some(stats.clone()));
        let message = &log.messages()[0];
        assert_eq!(message.stats, Some(stats));
        assert!(!message.timestamp.is_empty());
    }

    #[test]
    fn begin_while_streaming_finalizes_the_old_stream() {
        let mut log = ChatLog::new();
        log.begin_streaming();
        log.push_chunk("first");
        log.begin_streaming();
        log.push_chunk("second");
        log.complete_streaming(None);

        assert_eq!(log.messages().len(), 2);
        assert_eq!(log.messages()[0].text, "first");
        assert_eq!(log.messages()[1].text, "second");
    }

    #[test]
    fn thinking_placeholder_is_idempotent() {
        let mut log = ChatLog::new();
        log.show_thinking();
        log.show_thinking();
        assert!(log.is_thinking());
        log.hide_thinking();
        assert!(!log.is_thinking());
        log.hide_thinking();
        assert!(!log.is_thinking());
    }

    #[test]
    fn begin_streaming_hides_thinking() {
        let mut log = ChatLog::new();
        log.show_thinking();
        log.begin_streaming();
        assert!(!log.is_thinking());
    }

    #[test]
    fn whitespace_only_input_is_not_sendable() {
        assert_eq!(outgoing_message(""), None);
        assert_eq!(outgoing_message("   \t  "), None);
        assert_eq!(outgoing_message("  hi  "), Some("hi".to_string()));
    }

    #[test]
    fn system_notices_carry_severity() {
        let mut log = ChatLog::new();
        log.push_system("task failed", SystemNote::Error);
        let message = &log.messages()[0];
        assert_eq!(message.sender, MessageSender::System);
        assert_eq!(message.note, Some(SystemNote::Error));
    }
}
