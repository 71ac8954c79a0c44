use super::dispatch::append_downmixed_samples;
use super::resample::{
    design_low_pass, downsampling_tap_count, low_pass_fir, resample_linear,
    resample_to_target_rate,
};
use super::segment::encode_wav;
use super::{drain_to_wav_base64, TARGET_RATE};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

#[test]
fn downmix_passes_mono_through() {
    let mut buf = Vec::new();
    append_downmixed_samples(&mut buf, &[0.1f32, 0.2, 0.3], 1, |s| s);
    assert_eq!(buf, vec![0.1, 0.2, 0.3]);
}

#[test]
fn downmix_averages_stereo_frames() {
    let mut buf = Vec::new();
    append_downmixed_samples(&mut buf, &[1.0f32, 0.0, 0.5, 0.5], 2, |s| s);
    assert_eq!(buf, vec![0.5, 0.5]);
}

#[test]
fn downmix_converts_i16_samples() {
    let mut buf = Vec::new();
    append_downmixed_samples(&mut buf, &[i16::MAX, 0], 1, |s| s as f32 / 32_768.0);
    assert!((buf[0] - 0.99997).abs() < 1e-4);
    assert_eq!(buf[1], 0.0);
}

#[test]
fn resample_is_identity_at_target_rate() {
    let input = vec![0.1, 0.2, 0.3, 0.4];
    assert_eq!(resample_to_target_rate(&input, TARGET_RATE), input);
}

#[test]
fn resample_halves_sample_count_from_32khz() {
    let input = vec![0.5f32; 3200];
    let output = resample_to_target_rate(&input, 32_000);
    let expected = input.len() / 2;
    assert!(
        (output.len() as i64 - expected as i64).abs() <= 2,
        "expected ~{expected} samples, got {}",
        output.len()
    );
}

#[test]
fn resample_doubles_sample_count_from_8khz() {
    let input = vec![0.25f32; 800];
    let output = resample_to_target_rate(&input, 8_000);
    let expected = input.len() * 2;
    assert!(
        (output.len() as i64 - expected as i64).abs() <= 2,
        "expected ~{expected} samples, got {}",
        output.len()
    );
}

#[test]
fn resample_rejects_zero_rate() {
    let input = vec![0.1, 0.2];
    assert_eq!(resample_to_target_rate(&input, 0), input);
}

#[test]
fn resample_linear_interpolates_midpoints() {
    let input = vec![0.0f32, 1.0];
    let output = resample_linear(&input, 2.0);
    assert_eq!(output.len(), 4);
    assert_eq!(output[0], 0.0);
    assert!((output[1] - 0.5).abs() < 1e-6);
}

#[test]
fn tap_count_is_odd_and_bounded() {
    for rate in [16_000u32, 22_050, 44_100, 48_000, 192_000] {
        let taps = downsampling_tap_count(rate);
        assert_eq!(taps % 2, 1, "taps for {rate} should be odd");
        assert!(taps <= 129);
    }
}

#[test]
fn low_pass_preserves_dc_level() {
    let input = vec![0.5f32; 256];
    let output = low_pass_fir(&input, 48_000, 33);
    // Normalized taps keep a constant signal roughly constant away from the edges.
    assert!((output[128] - 0.5).abs() < 1e-3);
}

#[test]
fn low_pass_coefficients_are_normalized() {
    let coeffs = design_low_pass(0.25, 21);
    let sum: f32 = coeffs.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);
}

#[test]
fn drained_segment_is_base64_of_merged_chunks() {
    let c1 = vec![0.1f32, -0.2, 0.3];
    let c2 = vec![0.4f32, 0.5];
    let mut chunks = vec![c1.clone(), c2.clone()];

    let payload = drain_to_wav_base64(&mut chunks, TARGET_RATE).expect("encode segment");

    let merged: Vec<f32> = c1.into_iter().chain(c2).collect();
    let expected = BASE64.encode(encode_wav(&merged).expect("encode wav"));
    assert_eq!(payload, expected);
    assert!(chunks.is_empty(), "chunk buffer must be cleared after emit");
}

#[test]
fn encoded_segment_decodes_as_wav() {
    let samples = vec![0.0f32, 0.5, -0.5, 1.0, -1.0];
    let bytes = encode_wav(&samples).expect("encode wav");

    let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).expect("parse wav");
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, TARGET_RATE);
    assert_eq!(spec.bits_per_sample, 16);

    let decoded: Vec<i16> = reader
        .into_samples::<i16>()
        .map(|s| s.expect("sample"))
        .collect();
    assert_eq!(decoded.len(), samples.len());
    assert_eq!(decoded[0], 0);
    assert_eq!(decoded[3], i16::MAX);
    assert_eq!(decoded[4], -i16::MAX);
}

#[test]
fn out_of_range_samples_are_clamped() {
    let bytes = encode_wav(&[2.0f32, -2.0]).expect("encode wav");
    let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).expect("parse wav");
    let decoded: Vec<i16> = reader
        .into_samples::<i16>()
        .map(|s| s.expect("sample"))
        .collect();
    assert_eq!(decoded, vec![i16::MAX, -i16::MAX]);
}
