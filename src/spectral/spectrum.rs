// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Frequency-domain amplitude data

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::decoding::{self, SpectrumBlock};
use crate::error::{SignalError, SignalResult};

/// Frequency band `[min, max]` in Hz, both ends included
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub min: f64,
    pub max: f64,
}

/// Diagnostic description of a spectrum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumSummary {
    /// `None` when the spectrum is empty
    pub band: Option<FrequencyBand>,
    pub samples: usize,
}

impl fmt::Display for SpectrumSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.band {
            Some(band) => write!(
                f,
                "Spectrum(freq_range=({:.2}Hz, {:.2}Hz), num_samples={})",
                band.min, band.max, self.samples
            ),
            None => write!(f, "Spectrum(freq_range=(empty), num_samples=0)"),
        }
    }
}

/// Amplitudes over a strictly increasing, non-negative frequency axis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Spectrum {
    frequency: Vec<f64>,
    amplitude: Vec<f64>,
}

impl Spectrum {
    /// Build a spectrum from matching frequency and amplitude sequences.
    ///
    /// An empty spectrum is valid.
    ///
    /// ### Errors
    ///
    /// Returns a validation error when the lengths differ, or when the
    /// frequency axis is not finite, non-negative and strictly increasing.
    pub fn load(frequency: Vec<f64>, amplitude: Vec<f64>) -> SignalResult<Self> {
        if frequency.len() != amplitude.len() {
            return Err(SignalError::validation(format!(
                "Spectrum has {} frequencies but {} amplitudes",
                frequency.len(),
                amplitude.len()
            )));
        }
        if let Some(bad) = frequency.iter().find(|f| !f.is_finite() || **f < 0.0) {
            return Err(SignalError::validation(format!(
                "Spectrum frequencies must be finite and non-negative, found {}",
                bad
            )));
        }
        if let Some(pair) = frequency.windows(2).find(|w| w[1] <= w[0]) {
            return Err(SignalError::validation(format!(
                "Spectrum frequencies must be strictly increasing ({} followed by {})",
                pair[0], pair[1]
            )));
        }

        Ok(Self {
            frequency,
            amplitude,
        })
    }

    /// Decode a device spectrum capture
    pub fn from_encoded_block(block: &SpectrumBlock) -> SignalResult<Self> {
        let amplitude = decoding::decode_block(&block.amplitudes)?;
        let frequency = block.frequency_axis(amplitude.len());
        debug!(
            "Decoded spectrum of {} bins over [{}, {}] Hz",
            amplitude.len(),
            block.min_freq,
            block.max_freq
        );
        Self::load(frequency, amplitude)
    }

    /// Build a spectrum from `(frequency, amplitude)` records
    pub fn from_flat_records(records: &[(f64, f64)]) -> SignalResult<Self> {
        let (frequency, amplitude) = records.iter().copied().unzip();
        Self::load(frequency, amplitude)
    }

    pub fn frequency(&self) -> &[f64] {
        &self.frequency
    }

    pub fn amplitude(&self) -> &[f64] {
        &self.amplitude
    }

    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// `(frequency, amplitude)` pairs in axis order
    pub fn records(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequency
            .iter()
            .copied()
            .zip(self.amplitude.iter().copied())
    }

    /// Lowest and highest frequency present
    pub fn band(&self) -> Option<FrequencyBand> {
        match (self.frequency.first(), self.frequency.last()) {
            (Some(&min), Some(&max)) => Some(FrequencyBand { min, max }),
            _ => None,
        }
    }

    pub fn summary(&self) -> SpectrumSummary {
        SpectrumSummary {
            band: self.band(),
            samples: self.len(),
        }
    }

    /// Keep exactly the bins with `fmin <= frequency <= fmax`.
    ///
    /// The axis is sorted so the kept bins form one contiguous run. A band
    /// that misses the data, or an inverted band, gives an empty spectrum.
    ///
    /// ### Examples
    ///
    /// ```
    /// use t8_spectra::Spectrum;
    ///
    /// let spectrum = Spectrum::load(vec![0.0, 10.0, 20.0, 30.0], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    /// let band = spectrum.filter(10.0, 20.0);
    /// assert_eq!(band.frequency(), &[10.0, 20.0]);
    /// assert!(spectrum.filter(30.0, 10.0).is_empty());
    /// ```
    pub fn filter(&self, fmin: f64, fmax: f64) -> Spectrum {
        let start = self.frequency.partition_point(|&f| f < fmin);
        let end = self.frequency.partition_point(|&f| f <= fmax);

        if end <= start {
            return Spectrum::default();
        }

        Spectrum {
            frequency: self.frequency[start..end].to_vec(),
            amplitude: self.amplitude[start..end].to_vec(),
        }
    }

    /// Frequency and amplitude of the strongest bin
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.records()
            .filter(|(_, a)| !a.is_nan())
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

impl fmt::Display for Spectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.summary().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoding::tests::encode_zint;
    use crate::decoding::{ArrayFormat, EncodedBlock, Scaling};

    fn sample() -> Spectrum {
        Spectrum::load(
            vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0],
            vec![0.1, 0.5, 2.0, 0.7, 0.3, 0.2],
        )
        .unwrap()
    }

    #[test]
    fn test_load_rejects_length_mismatch() {
        let result = Spectrum::load(vec![0.0, 1.0], vec![1.0]);
        assert!(matches!(result, Err(SignalError::Validation { .. })));
    }

    #[test]
    fn test_load_rejects_unsorted_or_negative_axis() {
        assert!(Spectrum::load(vec![1.0, 1.0], vec![0.0, 0.0]).is_err());
        assert!(Spectrum::load(vec![2.0, 1.0], vec![0.0, 0.0]).is_err());
        assert!(Spectrum::load(vec![-1.0, 1.0], vec![0.0, 0.0]).is_err());
    }

    #[test]
    fn test_empty_spectrum_is_valid() {
        let spectrum = Spectrum::load(Vec::new(), Vec::new()).unwrap();
        assert!(spectrum.is_empty());
        assert_eq!(spectrum.band(), None);
        assert_eq!(spectrum.peak(), None);
        assert_eq!(spectrum.to_string(), "Spectrum(freq_range=(empty), num_samples=0)");
    }

    #[test]
    fn test_filter_is_inclusive_and_keeps_order() {
        let filtered = sample().filter(10.0, 30.0);
        assert_eq!(filtered.frequency(), &[10.0, 20.0, 30.0]);
        assert_eq!(filtered.amplitude(), &[0.5, 2.0, 0.7]);
    }

    #[test]
    fn test_filter_does_not_mutate_source() {
        let spectrum = sample();
        let _ = spectrum.filter(10.0, 20.0);
        assert_eq!(spectrum.len(), 6);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let once = sample().filter(5.0, 42.0);
        let twice = once.filter(5.0, 42.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_outside_data_is_empty() {
        let spectrum = sample();
        assert!(spectrum.filter(60.0, 100.0).is_empty());
        assert!(spectrum.filter(11.0, 19.0).is_empty());
        assert!(spectrum.filter(30.0, 10.0).is_empty());
    }

    #[test]
    fn test_summary_and_peak() {
        let spectrum = sample();
        assert_eq!(
            spectrum.band(),
            Some(FrequencyBand {
                min: 0.0,
                max: 50.0
            })
        );
        assert_eq!(spectrum.peak(), Some((20.0, 2.0)));
        assert_eq!(
            spectrum.to_string(),
            "Spectrum(freq_range=(0.00Hz, 50.00Hz), num_samples=6)"
        );
    }

    #[test]
    fn test_from_encoded_block() {
        let block = SpectrumBlock {
            amplitudes: EncodedBlock {
                data: encode_zint(&[0, 10, 20, 30, 40]),
                format: ArrayFormat::Zint,
                scaling: Scaling::Factor(0.1),
            },
            min_freq: 0.0,
            max_freq: 100.0,
        };

        let spectrum = Spectrum::from_encoded_block(&block).unwrap();
        assert_eq!(spectrum.frequency(), &[0.0, 25.0, 50.0, 75.0, 100.0]);
        assert!((spectrum.amplitude()[4] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_flat_records() {
        let spectrum = Spectrum::from_flat_records(&[(1.0, 3.0), (2.0, 4.0)]).unwrap();
        assert_eq!(spectrum.records().collect::<Vec<_>>(), vec![(1.0, 3.0), (2.0, 4.0)]);
    }
}
