// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Acquisition module
//!
//! This module handles getting captures in and out of the program: from the
//! T8 unit over its REST interface, or from flat CSV files.

pub mod api;
pub mod file;

pub use api::{base_url, T8Client};
pub use file::{
    capture_file_name, capture_path, figure_path, load_records_csv, save_spectrum_csv,
    save_waveform_csv,
};
