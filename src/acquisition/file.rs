// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Flat two-column CSV files
//!
//! Waveforms are written as `time,amp` with time in seconds, spectra as
//! `freq,amp`. The first row is always a header.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::config::CaptureConfig;
use crate::spectral::{Spectrum, Waveform};

fn capture_stem(prefix: &str, capture: &CaptureConfig, date: &str) -> String {
    format!(
        "{}_{}_{}_{}_{}",
        prefix,
        capture.machine,
        capture.point,
        capture.pmode,
        date.replace(':', "-")
    )
}

/// File name of an exported capture, e.g.
/// `waveform_LP_Turbine_MAD31CY005_AM1_2019-04-11T18-25-54.csv`
pub fn capture_file_name(prefix: &str, capture: &CaptureConfig, date: &str) -> String {
    format!("{}.csv", capture_stem(prefix, capture, date))
}

/// Path of a capture figure inside the figures directory, same naming as
/// the CSV exports with a `.png` extension
pub fn figure_path<P: AsRef<Path>>(
    figures_dir: P,
    prefix: &str,
    capture: &CaptureConfig,
    date: &str,
) -> PathBuf {
    figures_dir
        .as_ref()
        .join(format!("{}.png", capture_stem(prefix, capture, date)))
}

/// Path of an exported capture inside the reports directory
pub fn capture_path<P: AsRef<Path>>(
    reports_dir: P,
    prefix: &str,
    capture: &CaptureConfig,
    date: &str,
) -> PathBuf {
    reports_dir
        .as_ref()
        .join(capture_file_name(prefix, capture, date))
}

fn write_records<P, I>(path: P, header: &str, records: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = (f64, f64)>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating output directory {:?}", parent);
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create file {:?}", path))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", header)?;
    let mut rows = 0usize;
    for (x, y) in records {
        writeln!(writer, "{},{}", x, y)?;
        rows += 1;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write file {:?}", path))?;

    debug!("Wrote {} rows to {:?}", rows, path);
    Ok(())
}

/// Save a waveform as `time,amp`
pub fn save_waveform_csv<P: AsRef<Path>>(path: P, waveform: &Waveform) -> Result<()> {
    write_records(path, "time,amp", waveform.records())
}

/// Save a spectrum as `freq,amp`
pub fn save_spectrum_csv<P: AsRef<Path>>(path: P, spectrum: &Spectrum) -> Result<()> {
    write_records(path, "freq,amp", spectrum.records())
}

/// Read the numeric rows of a two-column CSV file, skipping its header
pub fn load_records_csv<P: AsRef<Path>>(path: P) -> Result<Vec<(f64, f64)>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open file {:?}", path))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate().skip(1) {
        let line = line.with_context(|| format!("Failed to read {:?}", path))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut columns = line.split(',').map(str::trim);
        let (first, second) = match (columns.next(), columns.next(), columns.next()) {
            (Some(first), Some(second), None) => (first, second),
            _ => anyhow::bail!(
                "{:?} line {}: expected two columns, got '{}'",
                path,
                index + 1,
                line
            ),
        };

        let x: f64 = first
            .parse()
            .with_context(|| format!("{:?} line {}: invalid number '{}'", path, index + 1, first))?;
        let y: f64 = second.parse().with_context(|| {
            format!("{:?} line {}: invalid number '{}'", path, index + 1, second)
        })?;
        records.push((x, y));
    }

    debug!("Read {} rows from {:?}", records.len(), path);
    Ok(records)
}
