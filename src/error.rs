// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Errors raised by the signal pipeline

use thiserror::Error;

/// Errors of the decoding and spectrum derivation pipeline.
///
/// Both kinds are fatal to the current pipeline run, nothing is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// The encoded sample block could not be turned into numbers
    #[error("Decode error: {reason}")]
    Decode { reason: String },

    /// Lengths, ranges or parameters are inconsistent
    #[error("Validation error: {reason}")]
    Validation { reason: String },
}

impl SignalError {
    pub fn decode(reason: impl Into<String>) -> Self {
        SignalError::Decode {
            reason: reason.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        SignalError::Validation {
            reason: reason.into(),
        }
    }
}

pub type SignalResult<T> = std::result::Result<T, SignalError>;
