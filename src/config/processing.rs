// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Processing and output configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::spectral::{SpectrumOptions, DEFAULT_AMPLITUDE_SCALE, DEFAULT_PAD_FACTOR};

/// Spectrum derivation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Zero padding factor, the padded length is `pad_factor * N`
    #[serde(default = "default_pad_factor")]
    pub pad_factor: usize,

    /// Multiplier applied to the normalized FFT magnitude
    #[serde(default = "default_amplitude_scale")]
    pub amplitude_scale: f64,
}

fn default_pad_factor() -> usize {
    DEFAULT_PAD_FACTOR
}

fn default_amplitude_scale() -> f64 {
    DEFAULT_AMPLITUDE_SCALE
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            pad_factor: default_pad_factor(),
            amplitude_scale: default_amplitude_scale(),
        }
    }
}

impl ProcessingConfig {
    pub fn spectrum_options(&self) -> SpectrumOptions {
        SpectrumOptions {
            pad_factor: self.pad_factor,
            amplitude_scale: self.amplitude_scale,
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving CSV exports
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Directory receiving PNG figures
    #[serde(default = "default_figures_dir")]
    pub figures_dir: PathBuf,
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("output").join("reports")
}

fn default_figures_dir() -> PathBuf {
    PathBuf::from("output").join("figures")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            reports_dir: default_reports_dir(),
            figures_dir: default_figures_dir(),
        }
    }
}
