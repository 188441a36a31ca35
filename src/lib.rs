// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! T8 spectra library
//!
//! This library turns the captures of a T8 vibration unit into waveforms and
//! spectra: it decodes the unit's compact sample arrays, derives a spectrum
//! from a waveform (Hanning window, zero padding, FFT) and lines it up with
//! the spectrum the unit computed itself.

pub mod acquisition;
pub mod config;
pub mod decoding;
pub mod error;
pub mod plot;
pub mod spectral;
pub mod utility;

pub use error::{SignalError, SignalResult};
pub use spectral::{Spectrum, SpectrumComparator, SpectrumComparison, Waveform};
