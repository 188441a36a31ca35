// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! FFT helpers for spectrum derivation

use rustfft::{num_complex::Complex64, FftPlanner};

/// Hanning window coefficients `0.5 - 0.5 cos(2πn / (N-1))`
///
/// A single-sample window is `[1.0]`, an empty one is empty.
pub fn hann_window(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denominator = (len - 1) as f64;
            (0..len)
                .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / denominator).cos())
                .collect()
        }
    }
}

/// Apply the Hanning window to the input signal
pub fn apply_hann(signal: &[f64]) -> Vec<f64> {
    signal
        .iter()
        .zip(hann_window(signal.len()))
        .map(|(&sample, w)| sample * w)
        .collect()
}

/// Compute FFT of the input signal
fn compute_fft(signal: &[f64]) -> Vec<Complex64> {
    // Convert input to complex numbers
    let mut buffer: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(signal.len());
    fft.process(&mut buffer);

    buffer
}

/// One-sided magnitude spectrum of `signal`.
///
/// Keeps bins `0..=L/2` of the `L`-point transform. Magnitudes are divided by
/// `normalization` (the number of meaningful samples before any zero padding)
/// and multiplied by `scale`.
pub fn one_sided_magnitude(signal: &[f64], normalization: usize, scale: f64) -> Vec<f64> {
    if signal.is_empty() || normalization == 0 {
        return Vec::new();
    }

    let fft_output = compute_fft(signal);
    let useful_bins = signal.len() / 2 + 1;

    fft_output
        .iter()
        .take(useful_bins)
        .map(|c| c.norm() * scale / normalization as f64)
        .collect()
}

/// Frequency of every one-sided bin of an `fft_len`-point transform
pub fn bin_frequencies(fft_len: usize, sample_rate: f64) -> Vec<f64> {
    if fft_len == 0 {
        return Vec::new();
    }
    let df = sample_rate / fft_len as f64;
    (0..fft_len / 2 + 1).map(|k| k as f64 * df).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_window_is_symmetric() {
        for len in [2usize, 3, 8, 101, 1024] {
            let w = hann_window(len);
            for n in 0..len {
                assert!((w[n] - w[len - 1 - n]).abs() < 1e-12, "len {} n {}", len, n);
            }
            assert!(w[0].abs() < 1e-12);
        }
    }

    #[test]
    fn test_hann_window_peak_is_one_for_odd_length() {
        let w = hann_window(9);
        assert!((w[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_windows() {
        assert!(hann_window(0).is_empty());
        assert_eq!(hann_window(1), vec![1.0]);
    }

    #[test]
    fn test_dc_signal_magnitude() {
        let signal = vec![1.0; 16];
        let magnitude = one_sided_magnitude(&signal, 16, 1.0);

        assert_eq!(magnitude.len(), 9);
        assert!((magnitude[0] - 1.0).abs() < 1e-12);
        assert!(magnitude[1..].iter().all(|&m| m < 1e-9));
    }

    #[test]
    fn test_bin_frequencies() {
        let freqs = bin_frequencies(8, 1000.0);
        assert_eq!(freqs, vec![0.0, 125.0, 250.0, 375.0, 500.0]);
        assert!(bin_frequencies(0, 1000.0).is_empty());
    }
}
