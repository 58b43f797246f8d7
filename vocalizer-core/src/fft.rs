//! # Fast Fourier Transform (FFT) Module
//!
//! FFT-backed computation of the YIN difference function. The squared
//! difference expands into two energy terms and one cross-correlation term,
//!
//! `d(τ) = Σ x[i]² + Σ x[i+τ]² - 2 Σ x[i]·x[i+τ]`, for i in [0, W),
//!
//! where the energy terms come from a running sum of squares and the
//! cross term from a single forward/inverse FFT pair. This is O(N log N)
//! instead of the direct O(W²) double loop and matches it within float
//! tolerance.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Planned transforms for one FFT length, reused across frames.
pub struct DifferencePlan {
    len: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    window: Vec<Complex<f64>>,
    signal: Vec<Complex<f64>>,
}

impl std::fmt::Debug for DifferencePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DifferencePlan").field("len", &self.len).finish()
    }
}

impl DifferencePlan {
    /// Plans transforms for frames whose half-length is `window`.
    pub fn new(window: usize) -> Self {
        // Lags stay below `window`, so 2W points keep the circular
        // correlation free of wrap-around.
        let len = (2 * window).max(1);
        let mut planner = FftPlanner::<f64>::new();
        Self {
            len,
            forward: planner.plan_fft_forward(len),
            inverse: planner.plan_fft_inverse(len),
            window: vec![Complex::new(0.0, 0.0); len],
            signal: vec![Complex::new(0.0, 0.0); len],
        }
    }

    /// Half-length the plan was built for.
    pub fn window(&self) -> usize {
        self.len / 2
    }

    /// Fills `out[τ]` with the difference function for τ in [0, out.len()).
    ///
    /// `samples` must hold at least `2 * out.len()` values and `out.len()`
    /// must equal [`DifferencePlan::window`].
    pub fn difference(&mut self, samples: &[f32], out: &mut [f32]) {
        let w = out.len();
        debug_assert_eq!(w, self.window());
        debug_assert!(samples.len() >= 2 * w);
        if w == 0 {
            return;
        }

        for (i, slot) in self.window.iter_mut().enumerate() {
            *slot = if i < w {
                Complex::new(samples[i] as f64, 0.0)
            } else {
                Complex::new(0.0, 0.0)
            };
        }
        for (i, slot) in self.signal.iter_mut().enumerate() {
            *slot = Complex::new(samples[i] as f64, 0.0);
        }

        self.forward.process(&mut self.window);
        self.forward.process(&mut self.signal);

        // Cross-correlation: conj(A) · B in the frequency domain.
        for (a, b) in self.window.iter_mut().zip(self.signal.iter()) {
            *a = a.conj() * b;
        }
        self.inverse.process(&mut self.window);
        let scale = 1.0 / self.len as f64;

        // prefix[k] = Σ x[j]² for j < k
        let mut prefix = Vec::with_capacity(2 * w + 1);
        prefix.push(0.0f64);
        let mut acc = 0.0f64;
        for &s in &samples[..2 * w] {
            acc += (s as f64) * (s as f64);
            prefix.push(acc);
        }

        let head_energy = prefix[w];
        for (tau, value) in out.iter_mut().enumerate() {
            let shifted_energy = prefix[tau + w] - prefix[tau];
            let cross = self.window[tau].re * scale;
            let diff = head_energy + shifted_energy - 2.0 * cross;
            *value = diff.max(0.0) as f32;
        }
    }
}
