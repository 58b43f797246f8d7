use approx::assert_relative_eq;
use vocalizer_core::{find_range, AnalysisConfig, AudioBuffer, VocalRange};

const SR: u32 = 44100;
const HOP: usize = 1024;

fn tone(frequency: f32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.6 * (2.0 * std::f32::consts::PI * frequency * i as f32 / SR as f32).sin())
        .collect()
}

/// Builds a recording from (frequency, hops) segments; 0 Hz means silence.
fn recording(segments: &[(f32, usize)]) -> AudioBuffer {
    let mut samples = Vec::new();
    for &(frequency, hops) in segments {
        let len = hops * HOP;
        if frequency > 0.0 {
            samples.extend(tone(frequency, len));
        } else {
            samples.extend(std::iter::repeat(0.0).take(len));
        }
    }
    AudioBuffer::new(samples, SR)
}

#[test]
fn two_tones_separated_by_silence() {
    let buffer = recording(&[(0.0, 4), (220.0, 20), (0.0, 10), (440.0, 20), (0.0, 4)]);
    let range = find_range(&buffer, &AnalysisConfig::default());

    assert!(range.is_determined());
    let low = range.low_hz.unwrap();
    let high = range.high_hz.unwrap();
    assert!((low - 220.0).abs() / 220.0 < 0.02, "low {}", low);
    assert!((high - 440.0).abs() / 440.0 < 0.02, "high {}", high);
    assert!((range.span_semitones().unwrap() - 12.0).abs() < 0.5);
}

#[test]
fn silent_recording_has_no_range() {
    let buffer = AudioBuffer::new(vec![0.0; SR as usize * 3], SR);
    let range = find_range(&buffer, &AnalysisConfig::default());
    assert_eq!(range, VocalRange::undetermined());
    assert_eq!(range.to_string(), "no range detected");
}

#[test]
fn single_sustained_note() {
    let buffer = recording(&[(330.0, 40)]);
    let range = find_range(&buffer, &AnalysisConfig::default());
    let low = range.low_hz.unwrap();
    let high = range.high_hz.unwrap();
    assert!(low <= high);
    assert_relative_eq!(low, 330.0, max_relative = 0.02);
    assert_relative_eq!(high, 330.0, max_relative = 0.02);
}

#[test]
fn out_of_band_tone_is_ignored() {
    let buffer = recording(&[(3000.0, 20), (0.0, 4), (262.0, 20)]);
    let range = find_range(&buffer, &AnalysisConfig::default());
    let high = range.high_hz.unwrap();
    assert!((high - 262.0).abs() / 262.0 < 0.02, "high {}", high);
}
