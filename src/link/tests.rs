use super::protocol::*;
use super::session::*;
use crate::voice::VoiceMode;
use crossbeam_channel::unbounded;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

fn wire(event: &ClientEvent) -> Value {
    serde_json::to_value(event).expect("client event serializes")
}

#[test]
fn client_events_use_wire_names() {
    assert_eq!(wire(&ClientEvent::GetLogs)["event"], "get_logs");
    assert_eq!(wire(&ClientEvent::GetModels)["event"], "get_models");
    assert_eq!(wire(&ClientEvent::StopSpeech)["event"], "stop_speech");
    assert_eq!(wire(&ClientEvent::ManualWake)["event"], "manual_wake");
    assert_eq!(wire(&ClientEvent::ManualSleep)["event"], "manual_sleep");

    let value = wire(&ClientEvent::UserMessage {
        message: "hello".to_string(),
        mode: VoiceMode::Ai,
    });
    assert_eq!(value["event"], "user_message");
    assert_eq!(value["message"], "hello");
    assert_eq!(value["mode"], "ai");

    let value = wire(&ClientEvent::VoiceModeChanged {
        mode: VoiceMode::Task,
    });
    assert_eq!(value["event"], "voice_mode_changed");
    assert_eq!(value["mode"], "task");
}

#[test]
fn start_speech_omits_absent_current_text() {
    let value = wire(&ClientEvent::StartSpeech {
        mode: VoiceMode::Task,
        current_text: None,
    });
    assert_eq!(value["event"], "start_speech");
    assert!(value.get("current_text").is_none());

    let value = wire(&ClientEvent::StartSpeech {
        mode: VoiceMode::Ai,
        current_text: Some("draft".to_string()),
    });
    assert_eq!(value["current_text"], "draft");
}

#[test]
fn server_events_deserialize_from_wire_shapes() {
    let event: ServerEvent = serde_json::from_value(json!({
        "event": "speech_interim",
        "text": "world",
        "full_transcript": "hello world",
    }))
    .expect("interim parses");
    assert_eq!(
        event,
        ServerEvent::SpeechInterim {
            text: "world".to_string(),
            full_transcript: "hello world".to_string(),
        }
    );

    let event: ServerEvent = serde_json::from_value(json!({
        "event": "system_message",
        "type": "warning",
        "message": "Command 'ping' not recognized as a task.",
    }))
    .expect("system message parses");
    match event {
        ServerEvent::SystemMessage { kind, .. } => assert_eq!(kind, SystemNote::Warning),
        other => panic!("expected system message, got {other:?}"),
    }
}

#[test]
fn task_mode_final_omits_full_transcript() {
    let event: ServerEvent = serde_json::from_value(json!({
        "event": "speech_final",
        "text": "lights on",
    }))
    .expect("task final parses");
    assert_eq!(
        event,
        ServerEvent::SpeechFinal {
            text: "lights on".to_string(),
            full_transcript: None,
        }
    );
}

#[test]
fn response_complete_tolerates_missing_payloads() {
    let event: ServerEvent =
        serde_json::from_value(json!({ "event": "bot_response_complete" }))
            .expect("bare completion parses");
    assert_eq!(
        event,
        ServerEvent::BotResponseComplete {
            stats: None,
            context_usage: None,
        }
    );

    let event: ServerEvent = serde_json::from_value(json!({
        "event": "bot_response_complete",
        "stats": { "tokens": 42, "time": "850ms" },
        "context_usage": { "current": 128, "max": 8192 },
    }))
    .expect("full completion parses");
    assert_eq!(
        event,
        ServerEvent::BotResponseComplete {
            stats: Some(ResponseStats {
                tokens: 42,
                time: "850ms".to_string(),
            }),
            context_usage: Some(ContextUsage {
                current: 128,
                max: 8192,
            }),
        }
    );
}

#[test]
fn system_stats_tolerate_missing_optionals() {
    let event: ServerEvent = serde_json::from_value(json!({
        "event": "system_stats",
        "cpu": 12.5,
        "ram": 3.1,
    }))
    .expect("minimal stats parse");
    assert_eq!(
        event,
        ServerEvent::SystemStats {
            cpu: 12.5,
            ram: 3.1,
            ram_mb: None,
            tokens: None,
        }
    );
}

#[test]
fn link_delivers_events_and_reports_disconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr").to_string();

    let server = thread::spawn(move || {
        let (mut socket, _) = listener.accept().expect("accept");
        writeln!(socket, r#"{{"event": "processing_start"}}"#).expect("write event");
        writeln!(socket, "not json at all").expect("write junk");
        writeln!(
            socket,
            r#"{{"event": "bot_response_chunk", "chunk": "Hi"}}"#
        )
        .expect("write chunk");

        // Read one client event back before hanging up.
        let mut line = String::new();
        BufReader::new(socket.try_clone().expect("clone"))
            .read_line(&mut line)
            .expect("read client event");
        line
    });

    let (tx, rx) = unbounded();
    let mut link = ServerLink::connect(&addr, tx).expect("connect");
    link.send(&ClientEvent::GetModels);

    let timeout = Duration::from_secs(5);
    match rx.recv_timeout(timeout).expect("first notice") {
        LinkNotice::Event(ServerEvent::ProcessingStart) => {}
        other => panic!("expected processing_start, got {other:?}"),
    }
    // The junk line is skipped, so the chunk arrives next.
    match rx.recv_timeout(timeout).expect("second notice") {
        LinkNotice::Event(ServerEvent::BotResponseChunk { chunk }) => assert_eq!(chunk, "Hi"),
        other => panic!("expected chunk, got {other:?}"),
    }

    let sent = server.join().expect("server thread");
    let value: Value = serde_json::from_str(sent.trim()).expect("client line is JSON");
    assert_eq!(value["event"], "get_models");

    match rx.recv_timeout(timeout).expect("disconnect notice") {
        LinkNotice::Disconnected(_) => {}
        other => panic!("expected disconnect, got {other:?}"),
    }
    assert!(!link.is_connected());
}

#[test]
fn send_after_disconnect_is_dropped_quietly() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr").to_string();

    let server = thread::spawn(move || {
        let (socket, _) = listener.accept().expect("accept");
        drop(socket);
    });

    let (tx, rx) = unbounded();
    let mut link = ServerLink::connect(&addr, tx).expect("connect");
    server.join().expect("server thread");

    match rx.recv_timeout(Duration::from_secs(5)).expect("notice") {
        LinkNotice::Disconnected(_) => {}
        other => panic!("expected disconnect, got {other:?}"),
    }

    // No panic, no retry loop; the event just disappears.
    link.send(&ClientEvent::StopSpeech);
    assert!(!link.is_connected());
}
