// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Utility module for common utilities used throughout the project

pub mod timestamp;

// Re-exports for use in other modules
pub use timestamp::{iso_to_unix, unix_to_iso, TimeReference};
