use super::*;
use clap::Parser;

fn test_config() -> AppConfig {
    AppConfig::parse_from(["echoterm"])
}

#[test]
fn defaults_are_valid() {
    let mut config = test_config();
    config.validate().expect("defaults should validate");
    assert_eq!(config.server, "127.0.0.1:5005");
    assert_eq!(config.segment_ms, DEFAULT_SEGMENT_MS);
    assert_eq!(config.segment_restart_ms, DEFAULT_SEGMENT_RESTART_MS);
    assert_eq!(config.task_autostart_ms, DEFAULT_TASK_AUTOSTART_MS);
    assert_eq!(config.mode, crate::voice::VoiceMode::Ai);
}

#[test]
fn segment_ms_bounds_are_enforced() {
    let mut config = test_config();
    config.segment_ms = MIN_SEGMENT_MS - 1;
    assert!(config.validate().is_err());

    config.segment_ms = MAX_SEGMENT_MS + 1;
    assert!(config.validate().is_err());

    config.segment_ms = MAX_SEGMENT_MS;
    config.validate().expect("upper bound is inclusive");
}

#[test]
fn restart_and_autostart_delays_are_bounded() {
    let mut config = test_config();
    config.segment_restart_ms = MAX_SEGMENT_RESTART_MS + 1;
    assert!(config.validate().is_err());

    let mut config = test_config();
    config.task_autostart_ms = MAX_TASK_AUTOSTART_MS + 1;
    assert!(config.validate().is_err());

    let mut config = test_config();
    config.segment_restart_ms = 0;
    config.validate().expect("a zero restart delay is allowed");
}

#[test]
fn server_address_must_be_host_port() {
    for bad in ["", "localhost", "host:", ":5005", "host:notaport", "host:0"] {
        let mut config = test_config();
        config.server = bad.to_string();
        assert!(config.validate().is_err(), "'{bad}' should be rejected");
    }

    let mut config = test_config();
    config.server = "  assistant.local:9000  ".to_string();
    config.validate().expect("padded address is trimmed");
    assert_eq!(config.server, "assistant.local:9000");
}

#[test]
fn wake_phrase_is_trimmed_and_required() {
    let mut config = test_config();
    config.wake_phrase = "  Hey Echo  ".to_string();
    config.validate().expect("phrase validates");
    assert_eq!(config.wake_phrase, "Hey Echo");

    config.wake_phrase = "   ".to_string();
    assert!(config.validate().is_err());

    config.wake_phrase = "x".repeat(80);
    assert!(config.validate().is_err());
}

#[test]
fn empty_tts_override_is_rejected() {
    let mut config = test_config();
    config.tts_cmd = Some("  ".to_string());
    assert!(config.validate().is_err());

    config.tts_cmd = Some("say".to_string());
    config.validate().expect("real command validates");
}

#[test]
fn mode_flag_parses_both_modes() {
    let config = AppConfig::parse_from(["echoterm", "--mode", "task"]);
    assert_eq!(config.mode, crate::voice::VoiceMode::Task);
}
