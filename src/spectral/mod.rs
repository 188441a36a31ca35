// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).
//!
//! Spectral analysis module
//!
//! This module turns waveforms into spectra (Hanning window, zero padding,
//! FFT) and lines a derived spectrum up with the device's own spectrum.

pub mod comparator;
mod fft;
pub mod spectrum;
pub mod waveform;

pub use comparator::{SpectrumComparator, SpectrumComparison};
pub use fft::hann_window;
pub use spectrum::{FrequencyBand, Spectrum, SpectrumSummary};
pub use waveform::{
    SpectrumOptions, Waveform, DEFAULT_AMPLITUDE_SCALE, DEFAULT_PAD_FACTOR, MAX_PAD_FACTOR,
};
