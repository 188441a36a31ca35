// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Create Spectrum
//!
//! Offline tool deriving a spectrum from a waveform CSV file (`time,amp`).
//! The band defaults to `[0, Nyquist]`. When a reference spectrum CSV is
//! given, the band is taken from it and both spectra are summarized side by
//! side. `--plot` draws the result as a PNG figure.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use t8_spectra::acquisition::{load_records_csv, save_spectrum_csv};
use t8_spectra::plot::{render_comparison_png, render_spectrum_png, PlotStyle};
use t8_spectra::spectral::{
    Spectrum, SpectrumComparator, SpectrumOptions, Waveform, DEFAULT_AMPLITUDE_SCALE,
    DEFAULT_PAD_FACTOR,
};

#[derive(Parser)]
#[command(name = "create_spectrum")]
#[command(about = "Derive a spectrum from a waveform CSV file")]
struct Args {
    /// Waveform CSV file with `time,amp` columns
    #[arg(value_name = "INPUT_FILE")]
    input: PathBuf,

    /// Lower bound of the band in Hz
    #[arg(long, default_value_t = 0.0)]
    fmin: f64,

    /// Upper bound of the band in Hz, Nyquist when omitted
    #[arg(long)]
    fmax: Option<f64>,

    /// Zero padding factor
    #[arg(long, default_value_t = DEFAULT_PAD_FACTOR)]
    pad_factor: usize,

    /// Reference spectrum CSV file with `freq,amp` columns
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Output spectrum CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// PNG figure of the spectrum, or of the overlay when a reference is given
    #[arg(long, value_name = "PNG_FILE")]
    plot: Option<PathBuf>,
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "waveform".to_string());
    input.with_file_name(format!("{}_spectrum.csv", stem))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let records = load_records_csv(&args.input)
        .with_context(|| format!("Failed to load waveform {}", args.input.display()))?;
    let mut waveform = Waveform::from_flat_records(&records)?.with_options(SpectrumOptions {
        pad_factor: args.pad_factor,
        amplitude_scale: DEFAULT_AMPLITUDE_SCALE,
    })?;
    info!("Loaded {}", waveform);

    let spectrum = match &args.reference {
        Some(reference_path) => {
            let reference = Spectrum::from_flat_records(&load_records_csv(reference_path)?)?;
            let comparison = SpectrumComparator::new().compare(&mut waveform, &reference)?;

            println!("Derived:   {}", comparison.derived.summary());
            println!("Reference: {}", comparison.reference.summary());
            if let Some(offset) = comparison.peak_offset() {
                println!("Peak offset: {:.2} Hz", offset);
            }
            if let Some(figure) = &args.plot {
                render_comparison_png(figure, &comparison, &PlotStyle::default())?;
                info!("Comparison figure saved to {}", figure.display());
            }
            comparison.derived
        }
        None => {
            let fmax = args.fmax.unwrap_or(waveform.sampling_rate() / 2.0);
            let spectrum = waveform.create_spectrum(args.fmin, fmax)?;
            println!("{}", spectrum.summary());
            if let Some(figure) = &args.plot {
                render_spectrum_png(figure, &spectrum, &PlotStyle::default())?;
                info!("Spectrum figure saved to {}", figure.display());
            }
            spectrum
        }
    };

    if let Some((freq, amp)) = spectrum.peak() {
        println!("Peak: {:.6} at {:.2} Hz", amp, freq);
    }

    let output = args.output.unwrap_or_else(|| default_output(&args.input));
    save_spectrum_csv(&output, &spectrum)?;
    info!("Spectrum saved to {}", output.display());

    Ok(())
}
