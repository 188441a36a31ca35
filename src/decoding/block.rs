// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Encoded sample blocks as handed over by a data source

use serde::{Deserialize, Serialize};

use super::ArrayFormat;
use crate::error::{SignalError, SignalResult};

/// Closed amplitude range `[min, max]` the integer codes are mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn validate(&self) -> SignalResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(SignalError::validation(format!(
                "Value range bounds must be finite, got [{}, {}]",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(SignalError::validation(format!(
                "Value range minimum {} is above its maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// How decoded numbers become amplitudes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Scaling {
    /// Affine map of the full `i16` code range onto the given range
    Range(ValueRange),
    /// Multiplicative factor reported by the device
    Factor(f64),
}

/// One encoded array plus everything needed to decode it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedBlock {
    pub data: String,
    pub format: ArrayFormat,
    pub scaling: Scaling,
}

/// Encoded waveform capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformBlock {
    pub samples: EncodedBlock,
    /// Samples per second
    pub sample_rate: f64,
}

/// Encoded spectrum capture, its bins spread evenly over `[min_freq, max_freq]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumBlock {
    pub amplitudes: EncodedBlock,
    pub min_freq: f64,
    pub max_freq: f64,
}

impl SpectrumBlock {
    /// Spacing between two bins when the block holds `bins` values
    pub fn frequency_step(&self, bins: usize) -> f64 {
        if bins < 2 {
            0.0
        } else {
            (self.max_freq - self.min_freq) / (bins - 1) as f64
        }
    }

    /// Evenly spaced frequency axis with both ends included
    pub fn frequency_axis(&self, bins: usize) -> Vec<f64> {
        let step = self.frequency_step(bins);
        (0..bins)
            .map(|i| {
                if i + 1 == bins && bins > 1 {
                    self.max_freq
                } else {
                    self.min_freq + step * i as f64
                }
            })
            .collect()
    }
}
