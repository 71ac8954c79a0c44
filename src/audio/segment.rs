//! Background worker that captures one fixed-length audio segment and encodes
//! it for transport. Keeps the UI responsive: the event loop polls the job's
//! channel instead of blocking on the device.

use super::recorder::Recorder;
use super::resample::resample_to_target_rate;
use super::TARGET_RATE;
use crate::log_debug;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Result of one segment capture, sent back to the event loop exactly once.
#[derive(Debug, PartialEq)]
pub enum SegmentMessage {
    /// Encoded payload ready to emit as an `audio_chunk` event.
    Captured { audio: String, duration_ms: u64 },
    /// The window elapsed without any usable audio.
    Empty,
    /// Capture or encoding failed; the chain does not continue.
    Error(String),
}

/// Handle the event loop uses to poll the capture worker.
pub struct SegmentJob {
    pub receiver: mpsc::Receiver<SegmentMessage>,
    pub handle: Option<thread::JoinHandle<()>>,
    /// Raised to end the capture window early; buffered audio still ships.
    pub stop_flag: Arc<AtomicBool>,
    /// Voice-state generation this segment was started under. A delayed
    /// restart is only honored while the generation is unchanged.
    pub generation: u64,
}

impl SegmentJob {
    pub fn request_stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }
}

/// Spawn a worker thread that records one segment and encodes it.
pub fn start_segment_job(
    recorder: Arc<Mutex<Recorder>>,
    duration: Duration,
    generation: u64,
) -> SegmentJob {
    let (tx, rx) = mpsc::sync_channel(1);
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();

    let handle = thread::spawn(move || {
        // Do the device work off the UI thread and send back one message.
        let message = capture_segment(recorder, duration, stop_flag_clone);
        let _ = tx.send(message);
    });

    SegmentJob {
        receiver: rx,
        handle: Some(handle),
        stop_flag,
        generation,
    }
}

fn capture_segment(
    recorder: Arc<Mutex<Recorder>>,
    duration: Duration,
    stop_flag: Arc<AtomicBool>,
) -> SegmentMessage {
    let started = Instant::now();
    let capture = {
        let guard = match recorder.lock() {
            Ok(guard) => guard,
            Err(_) => return SegmentMessage::Error("audio recorder lock poisoned".to_string()),
        };
        guard.record_chunks(duration, Some(&stop_flag))
    };

    match capture {
        Ok(mut capture) => {
            if capture.chunks.iter().all(|chunk| chunk.is_empty()) {
                return SegmentMessage::Empty;
            }
            match drain_to_wav_base64(&mut capture.chunks, capture.sample_rate) {
                Ok(audio) => SegmentMessage::Captured {
                    audio,
                    duration_ms: started.elapsed().as_millis() as u64,
                },
                Err(err) => SegmentMessage::Error(format!("{err:#}")),
            }
        }
        Err(err) => {
            log_debug(&format!("segment capture failed: {err:#}"));
            SegmentMessage::Error(format!("{err:#}"))
        }
    }
}

/// Merge the buffered chunks into one WAV container, base64-encode it for
/// transport, and leave the chunk buffer empty.
pub fn drain_to_wav_base64(chunks: &mut Vec<Vec<f32>>, sample_rate: u32) -> Result<String> {
    let merged: Vec<f32> = chunks.drain(..).flatten().collect();
    let samples = resample_to_target_rate(&merged, sample_rate);
    let bytes = encode_wav(&samples)?;
    Ok(BASE64.encode(bytes))
}

/// Write 16 kHz mono PCM into an in-memory WAV container.
pub(super) fn encode_wav(samples: &[f32]) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: TARGET_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).context("failed to start WAV writer")?;
        for &sample in samples {
            let clamped = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(clamped)
                .context("failed to write WAV sample")?;
        }
        writer.finalize().context("failed to finalize WAV data")?;
    }
    Ok(cursor.into_inner())
}
