use anyhow::Result;
use base64::Engine;
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use t8_spectra::acquisition::{load_records_csv, save_spectrum_csv, save_waveform_csv};
use t8_spectra::decoding::{ArrayFormat, EncodedBlock, Scaling, SpectrumBlock, WaveformBlock};
use t8_spectra::spectral::{Spectrum, SpectrumComparator, Waveform};
use tempfile::tempdir;

const SAMPLE_RATE: f64 = 2560.0;
const CODE_SCALE: f64 = 16000.0;

fn encode_zint(codes: &[i16]) -> String {
    let bytes: Vec<u8> = codes.iter().flat_map(|c| c.to_le_bytes()).collect();
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&bytes, 6);
    base64::engine::general_purpose::STANDARD.encode(compressed)
}

/// One second of a unit sine at `freq`, as the device would send it
fn wave_block(freq: f64) -> WaveformBlock {
    let codes: Vec<i16> = (0..SAMPLE_RATE as usize)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE;
            ((2.0 * PI * freq * t).sin() * CODE_SCALE).round() as i16
        })
        .collect();

    WaveformBlock {
        samples: EncodedBlock {
            data: encode_zint(&codes),
            format: ArrayFormat::Zint,
            scaling: Scaling::Factor(1.0 / CODE_SCALE),
        },
        sample_rate: SAMPLE_RATE,
    }
}

/// Reference spectrum over [2.5, 1000] Hz with a single line at 100 Hz
fn spectrum_block() -> SpectrumBlock {
    let bins = 400;
    let step = (1000.0 - 2.5) / (bins - 1) as f64;
    let codes: Vec<i16> = (0..bins)
        .map(|i| {
            let freq = 2.5 + step * i as f64;
            if (freq - 100.0).abs() < step / 2.0 {
                707
            } else {
                3
            }
        })
        .collect();

    SpectrumBlock {
        amplitudes: EncodedBlock {
            data: encode_zint(&codes),
            format: ArrayFormat::Zint,
            scaling: Scaling::Factor(0.001),
        },
        min_freq: 2.5,
        max_freq: 1000.0,
    }
}

#[test]
fn test_device_captures_compare_on_the_reference_band() -> Result<()> {
    let mut waveform = Waveform::from_encoded_block(&wave_block(100.0))?;
    let reference = Spectrum::from_encoded_block(&spectrum_block())?;
    assert_eq!(waveform.len(), 2560);
    assert_eq!(reference.len(), 400);

    let comparison = SpectrumComparator::new().compare(&mut waveform, &reference)?;

    assert_eq!(comparison.band.min, 2.5);
    assert_eq!(comparison.band.max, 1000.0);
    assert_eq!(comparison.reference, reference);

    let freqs = comparison.derived.frequency();
    assert!(freqs[0] >= 2.5);
    assert!(*freqs.last().unwrap() <= 1000.0);

    // A unit sine shows up at its RMS value
    let (peak_freq, peak_amp) = comparison.derived.peak().unwrap();
    assert!((peak_freq - 100.0).abs() < 0.5, "peak at {}", peak_freq);
    assert!((peak_amp - FRAC_1_SQRT_2).abs() < 1e-2, "peak of {}", peak_amp);

    let (ref_freq, ref_amp) = comparison.reference.peak().unwrap();
    assert!((ref_freq - 100.0).abs() < 2.5);
    assert!((ref_amp - 0.707).abs() < 1e-9);
    assert!(comparison.peak_offset().unwrap().abs() < 2.5);

    Ok(())
}

#[test]
fn test_comparison_is_repeatable() -> Result<()> {
    let reference = Spectrum::from_encoded_block(&spectrum_block())?;

    let mut first = Waveform::from_encoded_block(&wave_block(250.0))?;
    let mut second = Waveform::from_encoded_block(&wave_block(250.0))?;

    let comparator = SpectrumComparator::new();
    let a = comparator.compare(&mut first, &reference)?;
    let b = comparator.compare(&mut second, &reference)?;
    assert_eq!(a, b);

    // A second run on the same waveform reuses its windowed and padded data
    let c = comparator.compare(&mut first, &reference)?;
    assert_eq!(a, c);

    Ok(())
}

#[test]
fn test_flat_files_feed_the_offline_pipeline() -> Result<()> {
    let temp_dir = tempdir()?;
    let wave_path = temp_dir.path().join("waveform.csv");
    let reference_path = temp_dir.path().join("reference.csv");

    let waveform = Waveform::from_encoded_block(&wave_block(100.0))?;
    let reference = Spectrum::from_encoded_block(&spectrum_block())?;
    save_waveform_csv(&wave_path, &waveform)?;
    save_spectrum_csv(&reference_path, &reference)?;

    let mut reloaded = Waveform::from_flat_records(&load_records_csv(&wave_path)?)?;
    let reference = Spectrum::from_flat_records(&load_records_csv(&reference_path)?)?;
    assert!((reloaded.sampling_rate() - SAMPLE_RATE).abs() < 1e-6);

    let comparison = SpectrumComparator::new().compare(&mut reloaded, &reference)?;
    let (peak_freq, _) = comparison.derived.peak().unwrap();
    assert!((peak_freq - 100.0).abs() < 0.5);

    Ok(())
}

#[test]
fn test_empty_reference_cannot_be_compared() -> Result<()> {
    let mut waveform = Waveform::from_encoded_block(&wave_block(100.0))?;
    let result = SpectrumComparator::new().compare(&mut waveform, &Spectrum::default());
    assert!(result.is_err());
    Ok(())
}
