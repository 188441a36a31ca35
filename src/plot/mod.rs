// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! PNG figures of waveforms, spectra and spectrum comparisons
//!
//! Figures are drawn with the pure-Rust bitmap backend of `plotters`. They
//! carry a light grid but no text, so no font has to be available on the
//! machine. Axis ranges are logged at debug level when a figure is written.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use t8_spectra::plot::{render_spectrum_png, PlotStyle};
//! use t8_spectra::spectral::Spectrum;
//!
//! let spectrum = Spectrum::load(vec![10.0, 20.0, 30.0], vec![0.1, 0.4, 0.2]).unwrap();
//! render_spectrum_png(Path::new("output/figures/spectrum.png"), &spectrum, &PlotStyle::default())
//!     .unwrap();
//! ```

use std::fs;
use std::ops::Range;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::debug;
use plotters::prelude::*;

use crate::spectral::{Spectrum, SpectrumComparison, Waveform};

/// Size and colors of a figure
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    /// Line colors, the first one for the main or derived series
    pub palette: Vec<RGBColor>,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: WHITE,
            palette: vec![BLUE, RED, GREEN, MAGENTA],
        }
    }
}

impl PlotStyle {
    fn color(&self, index: usize) -> RGBColor {
        if self.palette.is_empty() {
            BLACK
        } else {
            self.palette[index % self.palette.len()]
        }
    }
}

fn draw_error<E: std::fmt::Debug>(err: E) -> anyhow::Error {
    anyhow!("Failed to draw figure: {:?}", err)
}

/// Finite `(min, max)` over every point of every series
fn bounds<'a, I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    values
        .into_iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Axis range with a small margin, never zero-width
fn axis_range(min: f64, max: f64, margin: f64) -> Range<f64> {
    if max > min {
        let pad = (max - min) * margin;
        (min - pad)..(max + pad)
    } else {
        let half = if min != 0.0 { min.abs() * 0.5 } else { 0.5 };
        (min - half)..(max + half)
    }
}

/// Draw one line per series into a PNG file
fn render_lines(path: &Path, style: &PlotStyle, series: &[Vec<(f64, f64)>]) -> Result<()> {
    let x_bounds = bounds(series.iter().flatten().map(|(x, _)| x));
    let y_bounds = bounds(series.iter().flatten().map(|(_, y)| y));
    let ((x_min, x_max), (y_min, y_max)) = match (x_bounds, y_bounds) {
        (Some(x), Some(y)) => (x, y),
        _ => anyhow::bail!("Nothing to draw in {}", path.display()),
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating figure directory {:?}", parent);
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
    }

    let x_range = axis_range(x_min, x_max, 0.0);
    let y_range = axis_range(y_min.min(0.0), y_max, 0.05);
    debug!(
        "Drawing {} series into {} (x {:?}, y {:?})",
        series.len(),
        path.display(),
        x_range,
        y_range
    );

    {
        let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
        root.fill(&style.background).map_err(draw_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .build_cartesian_2d(x_range, y_range)
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .light_line_style(&BLACK.mix(0.05))
            .bold_line_style(&BLACK.mix(0.15))
            .draw()
            .map_err(draw_error)?;

        for (index, points) in series.iter().enumerate() {
            let color = style.color(index);
            chart
                .draw_series(LineSeries::new(
                    points.iter().copied().filter(|(x, y)| x.is_finite() && y.is_finite()),
                    &color,
                ))
                .map_err(draw_error)?;
        }

        root.present()
            .map_err(draw_error)
            .with_context(|| format!("Failed to write figure {}", path.display()))?;
    }

    debug!("Figure written to {}", path.display());
    Ok(())
}

/// Render a waveform as amplitude over time
///
/// ### Errors
///
/// Fails when the directory or the PNG file cannot be written.
pub fn render_waveform_png(path: &Path, waveform: &Waveform, style: &PlotStyle) -> Result<()> {
    render_lines(path, style, &[waveform.records().collect()])
}

/// Render a spectrum as amplitude over frequency
///
/// ### Errors
///
/// Fails on an empty spectrum, or when the PNG file cannot be written.
pub fn render_spectrum_png(path: &Path, spectrum: &Spectrum, style: &PlotStyle) -> Result<()> {
    if spectrum.is_empty() {
        anyhow::bail!("Cannot draw an empty spectrum");
    }
    render_lines(path, style, &[spectrum.records().collect()])
}

/// Overlay the derived spectrum (first palette color) on the reference
/// spectrum (second palette color)
///
/// ### Errors
///
/// Fails when both spectra are empty, or when the PNG file cannot be
/// written.
pub fn render_comparison_png(
    path: &Path,
    comparison: &SpectrumComparison,
    style: &PlotStyle,
) -> Result<()> {
    if comparison.derived.is_empty() && comparison.reference.is_empty() {
        anyhow::bail!("Cannot draw a comparison of two empty spectra");
    }
    render_lines(
        path,
        style,
        &[
            comparison.derived.records().collect(),
            comparison.reference.records().collect(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral::SpectrumComparator;
    use tempfile::tempdir;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn is_png(path: &Path) -> bool {
        fs::read(path)
            .map(|bytes| bytes.starts_with(&PNG_MAGIC))
            .unwrap_or(false)
    }

    fn sine_waveform(freq: f64, sample_rate: f64, samples: usize) -> Waveform {
        let time: Vec<f64> = (0..samples).map(|i| i as f64 / sample_rate).collect();
        let amplitude = time
            .iter()
            .map(|t| (2.0 * std::f64::consts::PI * freq * t).sin())
            .collect();
        Waveform::load(time, amplitude, sample_rate).unwrap()
    }

    #[test]
    fn test_waveform_figure_is_a_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("figures").join("waveform.png");

        render_waveform_png(&path, &sine_waveform(5.0, 100.0, 100), &PlotStyle::default())
            .unwrap();

        assert!(is_png(&path));
    }

    #[test]
    fn test_spectrum_figure_is_a_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spectrum.png");
        let spectrum = Spectrum::load(vec![10.0, 20.0, 30.0], vec![0.1, 0.4, 0.2]).unwrap();

        render_spectrum_png(&path, &spectrum, &PlotStyle::default()).unwrap();

        assert!(is_png(&path));
    }

    #[test]
    fn test_comparison_figure_is_a_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("comparison.png");
        let reference = Spectrum::load(vec![2.0, 10.0, 20.0], vec![0.1, 0.7, 0.1]).unwrap();
        let mut waveform = sine_waveform(10.0, 100.0, 200);
        let comparison = SpectrumComparator::new()
            .compare(&mut waveform, &reference)
            .unwrap();

        let style = PlotStyle {
            width: 320,
            height: 200,
            ..PlotStyle::default()
        };
        render_comparison_png(&path, &comparison, &style).unwrap();

        assert!(is_png(&path));
    }

    #[test]
    fn test_empty_spectrum_is_not_drawn() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.png");

        assert!(render_spectrum_png(&path, &Spectrum::default(), &PlotStyle::default()).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_single_point_gets_a_usable_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("single.png");
        let spectrum = Spectrum::load(vec![50.0], vec![0.0]).unwrap();

        render_spectrum_png(&path, &spectrum, &PlotStyle::default()).unwrap();
        assert!(is_png(&path));

        let range = axis_range(50.0, 50.0, 0.0);
        assert!(range.start < 50.0 && range.end > 50.0);
    }
}
