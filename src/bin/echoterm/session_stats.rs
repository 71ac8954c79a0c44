//! Session statistics tracking.
//!
//! Counts what happened during a session and formats a short summary printed
//! after the terminal is restored on exit.

use std::time::{Duration, Instant};

/// Counters for one console session.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Messages the user sent (typed or dictated)
    pub messages_sent: u32,
    /// Bot replies rendered (streamed or complete)
    pub bot_replies: u32,
    /// Audio segments shipped to the recognizer
    pub segments: u32,
    /// Total captured audio duration in seconds
    pub total_capture_secs: f32,
    /// Errors surfaced to the user
    pub errors: u32,
    /// Session start time
    start_time: Option<Instant>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn record_message(&mut self) {
        self.messages_sent += 1;
    }

    pub fn record_reply(&mut self) {
        self.bot_replies += 1;
    }

    /// Record one shipped audio segment.
    pub fn record_segment(&mut self, duration_ms: u64) {
        self.segments += 1;
        self.total_capture_secs += duration_ms as f32 / 1000.0;
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn session_duration(&self) -> Duration {
        self.start_time
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    /// Check if any activity occurred.
    pub fn has_activity(&self) -> bool {
        self.messages_sent > 0 || self.bot_replies > 0 || self.segments > 0 || self.errors > 0
    }
}

/// Format session stats for display on exit. Empty when nothing happened.
pub fn format_session_stats(stats: &SessionStats) -> String {
    if !stats.has_activity() {
        return String::new();
    }

    let mut lines = vec![
        String::new(),
        "Session Summary".to_string(),
        "───────────────".to_string(),
        format_stat_line("Messages", &stats.messages_sent.to_string()),
        format_stat_line("Replies", &stats.bot_replies.to_string()),
    ];

    if stats.segments > 0 {
        lines.push(format_stat_line("Segments", &stats.segments.to_string()));
        lines.push(format_stat_line(
            "Audio sent",
            &format_duration(stats.total_capture_secs),
        ));
    }

    if stats.errors > 0 {
        lines.push(format_stat_line("Errors", &stats.errors.to_string()));
    }

    let session_dur = format_duration(stats.session_duration().as_secs_f32());
    lines.push(format_stat_line("Session", &session_dur));
    lines.push(String::new());

    lines.join("\n")
}

fn format_stat_line(label: &str, value: &str) -> String {
    format!("{label:<12} {value}")
}

fn format_duration(secs: f32) -> String {
    if secs < 60.0 {
        format!("{secs:.1}s")
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins as u32, remaining_secs)
    } else {
        let hours = (secs / 3600.0).floor();
        let remaining_mins = ((secs % 3600.0) / 60.0).floor();
        format!("{}h {}m", hours as u32, remaining_mins as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_no_activity() {
        let stats = SessionStats::new();
        assert!(!stats.has_activity());
        assert!(format_session_stats(&stats).is_empty());
    }

    #[test]
    fn segments_accumulate_audio_time() {
        let mut stats = SessionStats::new();
        stats.record_segment(3_000);
        stats.record_segment(1_500);
        assert_eq!(stats.segments, 2);
        assert!((stats.total_capture_secs - 4.5).abs() < 1e-6);
    }

    #[test]
    fn summary_lists_recorded_counters() {
        let mut stats = SessionStats::new();
        stats.record_message();
        stats.record_reply();
        stats.record_segment(3_000);
        stats.record_error();
        let output = format_session_stats(&stats);
        assert!(output.contains("Session Summary"));
        assert!(output.contains("Messages"));
        assert!(output.contains("Segments"));
        assert!(output.contains("Errors"));
    }

    #[test]
    fn summary_omits_segment_lines_without_captures() {
        let mut stats = SessionStats::new();
        stats.record_message();
        let output = format_session_stats(&stats);
        assert!(!output.contains("Segments"));
        assert!(!output.contains("Audio sent"));
    }

    #[test]
    fn format_duration_covers_all_ranges() {
        assert_eq!(format_duration(30.5), "30.5s");
        assert_eq!(format_duration(125.0), "2m 5s");
        assert_eq!(format_duration(3725.0), "1h 2m");
    }
}
