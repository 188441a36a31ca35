// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Comparison of a derived spectrum with the device's reference spectrum

use log::{debug, info};

use super::spectrum::{FrequencyBand, Spectrum};
use super::waveform::Waveform;
use crate::error::{SignalError, SignalResult};

/// Two spectra restricted to the same band.
///
/// The spectra keep their own resolution, index `i` of one does not
/// correspond to index `i` of the other.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumComparison {
    /// Band taken from the reference spectrum
    pub band: FrequencyBand,
    /// Spectrum derived from the waveform
    pub derived: Spectrum,
    /// Device spectrum filtered to the band
    pub reference: Spectrum,
}

impl SpectrumComparison {
    /// Distance in Hz between the two spectra's strongest bins
    pub fn peak_offset(&self) -> Option<f64> {
        match (self.derived.peak(), self.reference.peak()) {
            (Some((derived, _)), Some((reference, _))) => Some(derived - reference),
            _ => None,
        }
    }
}

/// Aligns a waveform's spectrum with a reference spectrum
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectrumComparator;

impl SpectrumComparator {
    pub fn new() -> Self {
        Self
    }

    /// Derive the waveform spectrum over the band covered by `reference`.
    ///
    /// The reference defines the band. Its own filtering is normally a no-op
    /// but keeps both spectra on identical boundaries.
    ///
    /// ### Arguments
    ///
    /// * `waveform` - capture to transform, windowed and padded on demand
    /// * `reference` - spectrum computed by the unit for the same capture
    ///
    /// ### Returns
    ///
    /// A [`SpectrumComparison`] holding both spectra over the reference band.
    ///
    /// ### Errors
    ///
    /// Returns a validation error when `reference` is empty, and propagates
    /// any error of [`Waveform::create_spectrum`].
    pub fn compare(
        &self,
        waveform: &mut Waveform,
        reference: &Spectrum,
    ) -> SignalResult<SpectrumComparison> {
        let band = reference.band().ok_or_else(|| {
            SignalError::validation("Reference spectrum is empty, no comparison band")
        })?;
        debug!("Comparison band: [{}, {}] Hz", band.min, band.max);

        let derived = waveform.create_spectrum(band.min, band.max)?;
        let reference = reference.filter(band.min, band.max);

        info!("Derived {}, reference {}", derived, reference);

        Ok(SpectrumComparison {
            band,
            derived,
            reference,
        })
    }
}
