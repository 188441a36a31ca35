// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Command line client of a T8 vibration unit
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::info;

use t8_spectra::acquisition::{self, T8Client};
use t8_spectra::config::{self, CaptureConfig, Config};
use t8_spectra::plot::{self, PlotStyle};
use t8_spectra::spectral::{SpectrumComparator, Spectrum, Waveform};
use t8_spectra::utility::{iso_to_unix, unix_to_iso};

/// Fetch waveforms and spectra from a T8 unit and compare them
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output the configuration schema as JSON and exit
    #[arg(long)]
    show_config_schema: bool,

    /// User for HTTP basic authentication
    #[arg(short = 'u', long, env = "T8_USER")]
    user: Option<String>,

    /// Password for HTTP basic authentication
    #[arg(short = 'p', long, env = "T8_PASSW", hide_env_values = true)]
    passw: Option<String>,

    /// Host of the T8 unit
    #[arg(short = 'H', long, env = "T8_HOST")]
    host: Option<String>,

    /// Zero padding factor used when deriving spectra
    #[arg(long)]
    pad_factor: Option<usize>,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable all logging output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Machine, point and processing mode, falling back to the configuration
#[derive(Debug, ClapArgs)]
struct CaptureArgs {
    /// Machine tag
    #[arg(short = 'M', long)]
    machine: Option<String>,

    /// Measurement point tag
    #[arg(short = 'p', long)]
    point: Option<String>,

    /// Processing mode tag
    #[arg(short = 'm', long)]
    pmode: Option<String>,
}

impl CaptureArgs {
    fn resolve(&self, defaults: &CaptureConfig) -> CaptureConfig {
        CaptureConfig {
            machine: self.machine.clone().unwrap_or_else(|| defaults.machine.clone()),
            point: self.point.clone().unwrap_or_else(|| defaults.point.clone()),
            pmode: self.pmode.clone().unwrap_or_else(|| defaults.pmode.clone()),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the stored waveforms
    ListWaves {
        #[command(flatten)]
        capture: CaptureArgs,
    },
    /// List the stored spectra
    ListSpectra {
        #[command(flatten)]
        capture: CaptureArgs,
    },
    /// Download one waveform as CSV
    GetWave {
        #[command(flatten)]
        capture: CaptureArgs,
        /// Capture date, YYYY-MM-DDTHH:MM:SS
        #[arg(short = 't', long)]
        date: String,
        /// Also draw the capture as a PNG figure
        #[arg(long)]
        plot: bool,
    },
    /// Download one spectrum as CSV
    GetSpectrum {
        #[command(flatten)]
        capture: CaptureArgs,
        /// Capture date, YYYY-MM-DDTHH:MM:SS
        #[arg(short = 't', long)]
        date: String,
        /// Also draw the capture as a PNG figure
        #[arg(long)]
        plot: bool,
    },
    /// Compare the spectrum derived from a waveform with the unit's spectrum
    Compare {
        #[command(flatten)]
        capture: CaptureArgs,
        /// Capture date, YYYY-MM-DDTHH:MM:SS
        #[arg(short = 't', long)]
        date: String,
        /// Also draw the capture as a PNG figure
        #[arg(long)]
        plot: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    // Check if --show-config-schema flag is set
    if args.show_config_schema {
        return config::output_config_schema();
    }

    let Some(command) = args.command else {
        anyhow::bail!("No command given, run with --help to list them");
    };

    // Load configuration
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let mut config = Config::from_file(&config_path)?;

    // Apply command line overrides
    config.apply_args(args.host, args.user, args.passw, args.pad_factor);
    config::utils::validate_specific_rules(&config)?;

    let client = T8Client::new(&config.device)?;

    match command {
        Command::ListWaves { capture } => {
            let capture = capture.resolve(&config.capture);
            for ts in client.list_waves(&capture).await? {
                println!("{}", unix_to_iso(ts, config.device.time_reference)?);
            }
        }
        Command::ListSpectra { capture } => {
            let capture = capture.resolve(&config.capture);
            for ts in client.list_spectra(&capture).await? {
                println!("{}", unix_to_iso(ts, config.device.time_reference)?);
            }
        }
        Command::GetWave {
            capture,
            date,
            plot: draw,
        } => {
            let capture = capture.resolve(&config.capture);
            let ts = iso_to_unix(&date, config.device.time_reference)?;
            let block = client.get_wave(&capture, ts).await?;
            let waveform = Waveform::from_encoded_block(&block)?;
            info!("{}", waveform);

            let path =
                acquisition::capture_path(&config.output.reports_dir, "waveform", &capture, &date);
            acquisition::save_waveform_csv(&path, &waveform)?;
            info!("Waveform saved to {}", path.display());

            if draw {
                let figure =
                    acquisition::figure_path(&config.output.figures_dir, "waveform", &capture, &date);
                plot::render_waveform_png(&figure, &waveform, &PlotStyle::default())?;
                info!("Waveform figure saved to {}", figure.display());
            }
        }
        Command::GetSpectrum {
            capture,
            date,
            plot: draw,
        } => {
            let capture = capture.resolve(&config.capture);
            let ts = iso_to_unix(&date, config.device.time_reference)?;
            let block = client.get_spectrum(&capture, ts).await?;
            let spectrum = Spectrum::from_encoded_block(&block)?;
            info!("{}", spectrum);

            let path =
                acquisition::capture_path(&config.output.reports_dir, "spectrum", &capture, &date);
            acquisition::save_spectrum_csv(&path, &spectrum)?;
            info!("Spectrum saved to {}", path.display());

            if draw {
                let figure =
                    acquisition::figure_path(&config.output.figures_dir, "spectrum", &capture, &date);
                plot::render_spectrum_png(&figure, &spectrum, &PlotStyle::default())?;
                info!("Spectrum figure saved to {}", figure.display());
            }
        }
        Command::Compare {
            capture,
            date,
            plot: draw,
        } => {
            let capture = capture.resolve(&config.capture);
            let ts = iso_to_unix(&date, config.device.time_reference)?;

            let wave_block = client.get_wave(&capture, ts).await?;
            let spectrum_block = client.get_spectrum(&capture, ts).await?;

            let mut waveform = Waveform::from_encoded_block(&wave_block)?
                .with_options(config.processing.spectrum_options())?;
            let reference = Spectrum::from_encoded_block(&spectrum_block)?;

            let comparison = SpectrumComparator::new().compare(&mut waveform, &reference)?;

            info!("Derived:   {}", comparison.derived.summary());
            info!("Reference: {}", comparison.reference.summary());
            if let Some((freq, amp)) = comparison.derived.peak() {
                info!("Derived peak: {:.6} at {:.2} Hz", amp, freq);
            }
            if let Some((freq, amp)) = comparison.reference.peak() {
                info!("Reference peak: {:.6} at {:.2} Hz", amp, freq);
            }
            if let Some(offset) = comparison.peak_offset() {
                info!("Peak offset: {:.2} Hz", offset);
            }

            let reports = &config.output.reports_dir;
            let derived_path =
                acquisition::capture_path(reports, "derived_spectrum", &capture, &date);
            let reference_path =
                acquisition::capture_path(reports, "reference_spectrum", &capture, &date);
            acquisition::save_spectrum_csv(&derived_path, &comparison.derived)?;
            acquisition::save_spectrum_csv(&reference_path, &comparison.reference)?;
            info!(
                "Spectra saved to {} and {}",
                derived_path.display(),
                reference_path.display()
            );

            if draw {
                let figure = acquisition::figure_path(
                    &config.output.figures_dir,
                    "comparison",
                    &capture,
                    &date,
                );
                plot::render_comparison_png(&figure, &comparison, &PlotStyle::default())?;
                info!("Comparison figure saved to {}", figure.display());
            }
        }
    }

    Ok(())
}
