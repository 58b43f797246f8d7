use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vocalizer_core::{estimate, AnalysisConfig, AudioFrame, DifferenceMethod, PitchEstimate};

const SR: u32 = 44100;

fn sine(frequency: f32, sample_rate: u32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            0.5 * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

fn assert_close(estimate: PitchEstimate, expected: f32) {
    let f = estimate
        .frequency()
        .unwrap_or_else(|| panic!("no pitch for {} Hz", expected));
    assert!(
        (f - expected).abs() / expected < 0.02,
        "expected {} Hz, got {} Hz",
        expected,
        f
    );
}

#[test]
fn pure_tones_within_two_percent() {
    let config = AnalysisConfig::default();
    for &freq in &[65.0, 98.0, 147.0, 220.0, 330.0, 440.0, 660.0, 880.0, 1200.0] {
        let samples = sine(freq, SR, 2048);
        assert_close(estimate(&AudioFrame::new(&samples, SR), &config), freq);
    }
}

#[test]
fn other_sample_rates() {
    let config = AnalysisConfig::default();
    for &rate in &[16000u32, 22050, 48000] {
        let samples = sine(261.63, rate, 2048);
        assert_close(estimate(&AudioFrame::new(&samples, rate), &config), 261.63);
    }
}

#[test]
fn silence_of_any_size() {
    let config = AnalysisConfig::default();
    for &len in &[0usize, 1, 3, 4, 5, 64, 1024, 2048, 4096] {
        let samples = vec![0.0f32; len];
        assert_eq!(
            estimate(&AudioFrame::new(&samples, SR), &config),
            PitchEstimate::NoPitch,
            "len {}",
            len
        );
    }
}

#[test]
fn white_noise_is_mostly_unvoiced() {
    let config = AnalysisConfig::default();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let trials = 100;
    let unvoiced = (0..trials)
        .filter(|_| {
            let noise: Vec<f32> = (0..2048).map(|_| rng.random_range(-1.0f32..1.0)).collect();
            !estimate(&AudioFrame::new(&noise, SR), &config).is_voiced()
        })
        .count();
    assert!(unvoiced >= 95, "only {} of {} noise frames unvoiced", unvoiced, trials);
}

#[test]
fn out_of_band_tones_are_rejected() {
    let config = AnalysisConfig::default();
    for &freq in &[30.0, 3000.0] {
        let samples = sine(freq, SR, 2048);
        assert_eq!(
            estimate(&AudioFrame::new(&samples, SR), &config),
            PitchEstimate::NoPitch,
            "{} Hz",
            freq
        );
    }
}

#[test]
fn voiced_results_stay_in_band() {
    let config = AnalysisConfig::default();
    let mut freq = 20.0f32;
    while freq < 5000.0 {
        let samples = sine(freq, SR, 2048);
        if let Some(f) = estimate(&AudioFrame::new(&samples, SR), &config).frequency() {
            assert!((50.0..=2000.0).contains(&f), "{} Hz input gave {} Hz", freq, f);
        }
        freq *= 1.1;
    }
}

#[test]
fn narrower_band_rejects_low_voice() {
    let config = AnalysisConfig {
        min_frequency: 180.0,
        max_frequency: 1200.0,
        ..Default::default()
    };
    let low = sine(110.0, SR, 2048);
    assert_eq!(estimate(&AudioFrame::new(&low, SR), &config), PitchEstimate::NoPitch);
    let high = sine(440.0, SR, 2048);
    assert_close(estimate(&AudioFrame::new(&high, SR), &config), 440.0);
}

#[test]
fn repeated_calls_agree() {
    let config = AnalysisConfig::default();
    let samples = sine(392.0, SR, 2048);
    let frame = AudioFrame::new(&samples, SR);
    assert_eq!(estimate(&frame, &config), estimate(&frame, &config));
}

#[test]
fn fft_difference_matches_direct() {
    let direct = AnalysisConfig::default();
    let fft = AnalysisConfig {
        difference: DifferenceMethod::Fft,
        ..Default::default()
    };
    for &freq in &[82.0, 196.0, 440.0, 987.0] {
        let samples: Vec<f32> = sine(freq, SR, 2048)
            .iter()
            .zip(sine(freq * 2.0, SR, 2048))
            .map(|(a, b)| a + 0.3 * b)
            .collect();
        let frame = AudioFrame::new(&samples, SR);
        let a = estimate(&frame, &direct).frequency().unwrap();
        let b = estimate(&frame, &fft).frequency().unwrap();
        assert!((a - b).abs() / a < 1e-3, "{} Hz: direct {} vs fft {}", freq, a, b);
    }
}

#[test]
fn harmonic_voice_like_signal() {
    // Fundamental plus decaying harmonics, as a sung vowel roughly has.
    let f0 = 196.0;
    let samples: Vec<f32> = (0..2048)
        .map(|i| {
            let t = i as f32 / SR as f32;
            (1..=5)
                .map(|h| {
                    let h = h as f32;
                    (0.4 / h) * (2.0 * std::f32::consts::PI * f0 * h * t).sin()
                })
                .sum()
        })
        .collect();
    assert_close(
        estimate(&AudioFrame::new(&samples, SR), &AnalysisConfig::default()),
        f0,
    );
}
