// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Time-domain captures and their spectrum derivation
//!
//! A [`Waveform`] moves through three states: raw, windowed and
//! windowed+padded. The derived sequences are cached on the instance and are
//! always recomputed from the raw amplitudes, never from an earlier derived
//! result.
//!
//! ## Usage
//!
//! ```
//! use t8_spectra::spectral::Waveform;
//!
//! let rate = 1000.0;
//! let time: Vec<f64> = (0..1000).map(|i| i as f64 / rate).collect();
//! let amplitude = time
//!     .iter()
//!     .map(|t| (2.0 * std::f64::consts::PI * 50.0 * t).sin())
//!     .collect();
//!
//! let mut waveform = Waveform::load(time, amplitude, rate).unwrap();
//! let spectrum = waveform.create_spectrum(0.0, 100.0).unwrap();
//! let (peak, _) = spectrum.peak().unwrap();
//! assert!((peak - 50.0).abs() < 0.5);
//! ```

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use super::fft;
use super::spectrum::Spectrum;
use crate::decoding::{self, WaveformBlock};
use crate::error::{SignalError, SignalResult};

/// Zero padding factor used when none is configured
pub const DEFAULT_PAD_FACTOR: usize = 4;

/// Amplitude scale matching the device's spectrum convention
pub const DEFAULT_AMPLITUDE_SCALE: f64 = 2.0 * std::f64::consts::SQRT_2;

/// Largest pad factor accepted in configured options
pub const MAX_PAD_FACTOR: usize = 64;

/// Relative deviation allowed between the time steps of flat records
const TIME_STEP_TOLERANCE: f64 = 1e-6;

/// Parameters of the spectrum derivation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumOptions {
    /// Padded length is `pad_factor` times the sample count
    pub pad_factor: usize,
    /// Multiplier applied to the normalized FFT magnitude
    pub amplitude_scale: f64,
}

impl Default for SpectrumOptions {
    fn default() -> Self {
        Self {
            pad_factor: DEFAULT_PAD_FACTOR,
            amplitude_scale: DEFAULT_AMPLITUDE_SCALE,
        }
    }
}

impl SpectrumOptions {
    /// Check the options before they drive a derivation
    ///
    /// ### Errors
    ///
    /// `SignalError::Validation` when the pad factor is outside
    /// `1..=MAX_PAD_FACTOR` or the amplitude scale is not a positive number.
    pub fn validate(&self) -> SignalResult<()> {
        if self.pad_factor < 1 || self.pad_factor > MAX_PAD_FACTOR {
            return Err(SignalError::validation(format!(
                "Zero padding factor must be between 1 and {}, got {}",
                MAX_PAD_FACTOR, self.pad_factor
            )));
        }
        if !self.amplitude_scale.is_finite() || self.amplitude_scale <= 0.0 {
            return Err(SignalError::validation(format!(
                "Amplitude scale must be a positive number, got {}",
                self.amplitude_scale
            )));
        }
        Ok(())
    }
}

/// Time-domain samples at a fixed sampling rate
#[derive(Debug, Clone)]
pub struct Waveform {
    time: Vec<f64>,
    amplitude: Vec<f64>,
    sampling_rate: f64,
    options: SpectrumOptions,
    windowed: Option<Vec<f64>>,
    padded: Option<Vec<f64>>,
}

impl Waveform {
    /// Build a waveform from its time axis, samples and rate
    ///
    /// ### Arguments
    ///
    /// * `time` - Sample instants in seconds, strictly increasing
    /// * `amplitude` - One sample per time value
    /// * `sampling_rate` - Samples per second
    ///
    /// ### Errors
    ///
    /// `SignalError::Validation` when the sequences differ in length or are
    /// empty, the rate is not a positive number, or time does not increase.
    pub fn load(time: Vec<f64>, amplitude: Vec<f64>, sampling_rate: f64) -> SignalResult<Self> {
        if time.len() != amplitude.len() {
            return Err(SignalError::validation(format!(
                "Waveform has {} time values but {} amplitudes",
                time.len(),
                amplitude.len()
            )));
        }
        if amplitude.is_empty() {
            return Err(SignalError::validation("Waveform holds no samples"));
        }
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(SignalError::validation(format!(
                "Sampling rate must be positive, got {}",
                sampling_rate
            )));
        }
        if let Some(pair) = time.windows(2).find(|w| !(w[1] > w[0])) {
            return Err(SignalError::validation(format!(
                "Waveform time axis must be strictly increasing ({} followed by {})",
                pair[0], pair[1]
            )));
        }

        Ok(Self {
            time,
            amplitude,
            sampling_rate,
            options: SpectrumOptions::default(),
            windowed: None,
            padded: None,
        })
    }

    /// Decode a device waveform capture, the time axis starts at zero
    pub fn from_encoded_block(block: &WaveformBlock) -> SignalResult<Self> {
        if !block.sample_rate.is_finite() || block.sample_rate <= 0.0 {
            return Err(SignalError::validation(format!(
                "Sampling rate must be positive, got {}",
                block.sample_rate
            )));
        }

        let amplitude = decoding::decode_block(&block.samples)?;
        let time = (0..amplitude.len())
            .map(|i| i as f64 / block.sample_rate)
            .collect();
        debug!(
            "Decoded waveform of {} samples at {} Hz",
            amplitude.len(),
            block.sample_rate
        );
        Self::load(time, amplitude, block.sample_rate)
    }

    /// Build a waveform from `(time, amplitude)` records.
    ///
    /// The sampling rate is the inverse of the time step, so at least two
    /// records are needed and every step must match the first one.
    ///
    /// ### Errors
    ///
    /// `SignalError::Validation` for fewer than two records, a non-uniform
    /// time axis, or anything [`Waveform::load`] rejects.
    pub fn from_flat_records(records: &[(f64, f64)]) -> SignalResult<Self> {
        if records.len() < 2 {
            return Err(SignalError::validation(format!(
                "At least two records are needed to derive a sampling rate, got {}",
                records.len()
            )));
        }

        let step = records[1].0 - records[0].0;
        if !step.is_finite() || step <= 0.0 {
            return Err(SignalError::validation(format!(
                "Waveform time axis must be strictly increasing ({} followed by {})",
                records[0].0, records[1].0
            )));
        }
        if let Some((index, pair)) = records
            .windows(2)
            .enumerate()
            .find(|(_, w)| ((w[1].0 - w[0].0) - step).abs() > step * TIME_STEP_TOLERANCE)
        {
            return Err(SignalError::validation(format!(
                "Waveform time axis is not uniform: step {} at record {} differs from {}",
                pair[1].0 - pair[0].0,
                index + 1,
                step
            )));
        }

        let (time, amplitude) = records.iter().copied().unzip();
        Self::load(time, amplitude, 1.0 / step)
    }

    /// Replace the spectrum derivation parameters.
    ///
    /// A cached padded sequence is dropped when the pad factor changes.
    pub fn with_options(mut self, options: SpectrumOptions) -> SignalResult<Self> {
        options.validate()?;
        if options.pad_factor != self.options.pad_factor {
            self.padded = None;
        }
        self.options = options;
        Ok(self)
    }

    pub fn options(&self) -> &SpectrumOptions {
        &self.options
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn amplitude(&self) -> &[f64] {
        &self.amplitude
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    pub fn len(&self) -> usize {
        self.amplitude.len()
    }

    /// A loaded waveform always holds samples
    pub fn is_empty(&self) -> bool {
        self.amplitude.is_empty()
    }

    /// Time covered by the samples, in seconds
    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.sampling_rate
    }

    pub fn windowed(&self) -> Option<&[f64]> {
        self.windowed.as_deref()
    }

    pub fn padded(&self) -> Option<&[f64]> {
        self.padded.as_deref()
    }

    /// `(time, amplitude)` pairs in time order
    pub fn records(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time.iter().copied().zip(self.amplitude.iter().copied())
    }

    /// Multiply the raw samples by a Hanning window of the same length
    pub fn apply_window(&mut self) -> &[f64] {
        self.windowed.insert(fft::apply_hann(&self.amplitude))
    }

    /// Append `factor * N - N` zeros after the windowed samples.
    ///
    /// Windows the samples first when that has not happened yet. The factor
    /// becomes the waveform's pad factor for later derivations.
    ///
    /// ### Arguments
    ///
    /// * `factor` - Ratio of padded to original length, `1` copies the
    ///   windowed samples unchanged
    ///
    /// ### Returns
    ///
    /// The padded sequence, also kept on the waveform
    ///
    /// ### Errors
    ///
    /// `SignalError::Validation` when `factor` is zero or the padded length
    /// cannot be allocated.
    pub fn zero_pad(&mut self, factor: usize) -> SignalResult<&[f64]> {
        if factor < 1 {
            return Err(SignalError::validation(format!(
                "Zero padding factor must be at least 1, got {}",
                factor
            )));
        }

        if self.windowed.is_none() {
            self.apply_window();
        }
        let windowed = self.windowed.as_deref().unwrap_or_default();

        let padded_len = windowed.len().checked_mul(factor).ok_or_else(|| {
            SignalError::validation(format!(
                "Zero padding {} samples by {} overflows the addressable length",
                windowed.len(),
                factor
            ))
        })?;

        let mut padded: Vec<f64> = Vec::new();
        padded.try_reserve_exact(padded_len).map_err(|e| {
            SignalError::validation(format!(
                "Cannot allocate {} padded samples: {}",
                padded_len, e
            ))
        })?;
        padded.extend_from_slice(windowed);
        padded.resize(padded_len, 0.0);

        self.options.pad_factor = factor;
        let padded: &[f64] = self.padded.insert(padded);
        Ok(padded)
    }

    /// Derive the one-sided magnitude spectrum and keep `[fmin, fmax]`.
    ///
    /// Windowing and padding run first when they have not already. Magnitudes
    /// are normalized by the number of original samples so padding does not
    /// change the amplitude scale. Bin `k` sits at `k * rate / padded_len`.
    ///
    /// ### Arguments
    ///
    /// * `fmin` - Lowest frequency kept, in Hz
    /// * `fmax` - Highest frequency kept, in Hz
    ///
    /// ### Returns
    ///
    /// The band-limited spectrum, empty when no bin falls in the band
    ///
    /// ### Errors
    ///
    /// `SignalError::Validation` when a bound is not finite, `fmin` is
    /// negative, or `fmin > fmax`.
    pub fn create_spectrum(&mut self, fmin: f64, fmax: f64) -> SignalResult<Spectrum> {
        if !fmin.is_finite() || !fmax.is_finite() {
            return Err(SignalError::validation(format!(
                "Frequency bounds must be finite, got [{}, {}]",
                fmin, fmax
            )));
        }
        if fmin < 0.0 {
            return Err(SignalError::validation(format!(
                "Minimum frequency must not be negative, got {}",
                fmin
            )));
        }
        if fmin > fmax {
            return Err(SignalError::validation(format!(
                "Minimum frequency {} is above maximum frequency {}",
                fmin, fmax
            )));
        }

        if self.windowed.is_none() {
            self.apply_window();
        }
        if self.padded.is_none() {
            let factor = self.options.pad_factor;
            self.zero_pad(factor)?;
        }
        let padded = self.padded.as_deref().unwrap_or_default();

        let amplitude =
            fft::one_sided_magnitude(padded, self.amplitude.len(), self.options.amplitude_scale);
        let frequency = fft::bin_frequencies(padded.len(), self.sampling_rate);
        debug!(
            "FFT of {} padded samples gives {} bins of {:.4} Hz",
            padded.len(),
            frequency.len(),
            self.sampling_rate / padded.len() as f64
        );

        let spectrum = Spectrum::load(frequency, amplitude)?;
        Ok(spectrum.filter(fmin, fmax))
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Waveform(srate={}, duration={:.3}s)",
            self.sampling_rate,
            self.duration()
        )
    }
}
