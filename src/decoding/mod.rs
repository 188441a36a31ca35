// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Sample decoding module
//!
//! The T8 device ships every numeric array (waveform samples, spectrum
//! amplitudes) as a compact text payload. Three array formats exist and are
//! selected with the `array_fmt` query parameter of the REST API:
//!
//! - `zint`: base64 of a zlib stream of little-endian `i16` codes
//! - `zlib`: base64 of a zlib stream of little-endian `f32` values
//! - `b64`: base64 of little-endian `f32` values
//!
//! Integer codes are turned into amplitudes either by an affine map onto a
//! `(min_value, max_value)` range or by the device's multiplicative factor.
//! Decoding keeps no state between calls and performs no I/O.

mod block;

pub use block::{EncodedBlock, Scaling, SpectrumBlock, ValueRange, WaveformBlock};

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{SignalError, SignalResult};

/// Number of distinct `i16` codes minus one, the width of the zint range
const ZINT_SPAN: f64 = (i16::MAX as i32 - i16::MIN as i32) as f64;

/// Array encodings served by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArrayFormat {
    #[default]
    Zint,
    Zlib,
    B64,
}

impl ArrayFormat {
    /// Value of the `array_fmt` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrayFormat::Zint => "zint",
            ArrayFormat::Zlib => "zlib",
            ArrayFormat::B64 => "b64",
        }
    }
}

impl fmt::Display for ArrayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArrayFormat {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zint" => Ok(ArrayFormat::Zint),
            "zlib" => Ok(ArrayFormat::Zlib),
            "b64" => Ok(ArrayFormat::B64),
            other => Err(SignalError::validation(format!(
                "Unknown array format '{}' (expected zint, zlib or b64)",
                other
            ))),
        }
    }
}

/// Decode a zint payload and map every code onto `range`.
///
/// `i16::MIN` lands exactly on `range.min` and `i16::MAX` exactly on
/// `range.max`. Every result is clamped into the range so rounding can never
/// push a sample outside of it.
///
/// ### Arguments
///
/// * `encoded` - base64 text of a zlib stream of little-endian `i16` codes
/// * `range` - amplitude range the full code span is mapped onto
///
/// ### Returns
///
/// One amplitude per code, in payload order.
///
/// ### Errors
///
/// Returns [`SignalError::Validation`] for a non-finite or inverted range and
/// [`SignalError::Decode`] when the payload is not valid base64, is not a
/// zlib stream or holds an odd number of bytes.
pub fn decode(encoded: &str, range: ValueRange) -> SignalResult<Vec<f64>> {
    range.validate()?;
    let codes = decode_codes(encoded)?;

    Ok(codes
        .into_iter()
        .map(|code| {
            let t = (code as i32 - i16::MIN as i32) as f64 / ZINT_SPAN;
            (range.min * (1.0 - t) + range.max * t).clamp(range.min, range.max)
        })
        .collect())
}

/// Decode a payload of any format and multiply it by the device `factor`
///
/// Integer codes of a `zint` payload are converted to `f64` before scaling.
///
/// ### Errors
///
/// Fails on a non-finite factor, or when the payload does not match `format`.
///
/// ### Examples
///
/// ```
/// use base64::Engine;
/// use t8_spectra::decoding::{decode_scaled, ArrayFormat};
///
/// let bytes: Vec<u8> = [1.5f32, -2.0]
///     .iter()
///     .flat_map(|value| value.to_le_bytes())
///     .collect();
/// let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
///
/// let values = decode_scaled(&encoded, ArrayFormat::B64, 2.0).unwrap();
/// assert_eq!(values, vec![3.0, -4.0]);
/// ```
pub fn decode_scaled(encoded: &str, format: ArrayFormat, factor: f64) -> SignalResult<Vec<f64>> {
    if !factor.is_finite() {
        return Err(SignalError::validation(format!(
            "Scale factor must be finite, got {}",
            factor
        )));
    }

    let raw: Vec<f64> = match format {
        ArrayFormat::Zint => decode_codes(encoded)?
            .into_iter()
            .map(|code| code as f64)
            .collect(),
        ArrayFormat::Zlib => {
            let bytes = inflate(&base64_bytes(encoded)?)?;
            floats_from_le(&bytes)?
        }
        ArrayFormat::B64 => floats_from_le(&base64_bytes(encoded)?)?,
    };

    Ok(raw.into_iter().map(|value| value * factor).collect())
}

/// Decode an encoded block according to its own format and scaling
///
/// ### Errors
///
/// Range scaling only applies to `zint` blocks, a float format with a range
/// is a validation error. Decoding errors are those of [`decode`] and
/// [`decode_scaled`].
pub fn decode_block(block: &EncodedBlock) -> SignalResult<Vec<f64>> {
    match block.scaling {
        Scaling::Range(range) => {
            if block.format != ArrayFormat::Zint {
                return Err(SignalError::validation(format!(
                    "Range scaling needs integer codes, the {} format carries floats",
                    block.format
                )));
            }
            decode(&block.data, range)
        }
        Scaling::Factor(factor) => decode_scaled(&block.data, block.format, factor),
    }
}

/// Split a zint payload into its raw `i16` codes
pub fn decode_codes(encoded: &str) -> SignalResult<Vec<i16>> {
    let bytes = inflate(&base64_bytes(encoded)?)?;

    if bytes.len() % 2 != 0 {
        return Err(SignalError::decode(format!(
            "Payload of {} bytes ends in the middle of a 16-bit code",
            bytes.len()
        )));
    }

    let codes: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    debug!("Decoded {} zint codes", codes.len());
    Ok(codes)
}

fn base64_bytes(encoded: &str) -> SignalResult<Vec<u8>> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(SignalError::decode("Encoded payload is empty"));
    }

    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| SignalError::decode(format!("Invalid base64 payload: {}", e)))
}

fn inflate(compressed: &[u8]) -> SignalResult<Vec<u8>> {
    let bytes = miniz_oxide::inflate::decompress_to_vec_zlib(compressed)
        .map_err(|e| SignalError::decode(format!("zlib inflate failed: {:?}", e)))?;

    if bytes.is_empty() {
        return Err(SignalError::decode("Inflated payload holds no samples"));
    }
    Ok(bytes)
}

fn floats_from_le(bytes: &[u8]) -> SignalResult<Vec<f64>> {
    if bytes.is_empty() {
        return Err(SignalError::decode("Payload holds no samples"));
    }
    if bytes.len() % 4 != 0 {
        return Err(SignalError::decode(format!(
            "Payload of {} bytes ends in the middle of a 32-bit float",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|quad| f32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]) as f64)
        .collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a zint payload the way the device does
    pub(crate) fn encode_zint(codes: &[i16]) -> String {
        let bytes: Vec<u8> = codes.iter().flat_map(|c| c.to_le_bytes()).collect();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&bytes, 6);
        base64::engine::general_purpose::STANDARD.encode(compressed)
    }

    fn float_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_extreme_codes_map_onto_range_bounds() {
        let encoded = encode_zint(&[i16::MIN, i16::MAX]);
        let decoded = decode(&encoded, ValueRange::new(-1.0, 1.0)).unwrap();

        assert_eq!(decoded.len(), 2);
        assert!((decoded[0] + 1.0).abs() < 1e-12);
        assert!((decoded[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_decoding_is_deterministic() {
        let encoded = encode_zint(&[-1200, 0, 37, 32000, -32000, 5]);
        let range = ValueRange::new(-3.5, 12.25);

        let first = decode(&encoded, range).unwrap();
        let second = decode(&encoded, range).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_decoded_values_stay_within_range() {
        let codes: Vec<i16> = (i16::MIN..=i16::MAX).step_by(97).chain([i16::MAX]).collect();
        let encoded = encode_zint(&codes);

        for range in [
            ValueRange::new(0.1, 0.3),
            ValueRange::new(-1e-3, 7.0),
            ValueRange::new(2.0, 2.0),
        ] {
            let decoded = decode(&encoded, range).unwrap();
            assert_eq!(decoded.len(), codes.len());
            for value in decoded {
                assert!(value >= range.min && value <= range.max, "{} outside {:?}", value, range);
            }
        }
    }

    #[test]
    fn test_mapping_is_affine() {
        let encoded = encode_zint(&[i16::MIN, 0, i16::MAX]);
        let decoded = decode(&encoded, ValueRange::new(0.0, 65535.0)).unwrap();
        assert!((decoded[1] - 32768.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_and_malformed_payloads_fail_with_decode_error() {
        let range = ValueRange::new(-1.0, 1.0);

        assert!(matches!(decode("", range), Err(SignalError::Decode { .. })));
        assert!(matches!(decode("   ", range), Err(SignalError::Decode { .. })));
        assert!(matches!(decode("@@not*base64!", range), Err(SignalError::Decode { .. })));

        // Valid base64, not a zlib stream
        let not_zlib = base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3, 4]);
        assert!(matches!(decode(&not_zlib, range), Err(SignalError::Decode { .. })));

        // Odd number of bytes after inflating
        let odd = base64::engine::general_purpose::STANDARD
            .encode(miniz_oxide::deflate::compress_to_vec_zlib(&[1u8, 2, 3], 6));
        assert!(matches!(decode(&odd, range), Err(SignalError::Decode { .. })));

        // Zero samples
        let empty = base64::engine::general_purpose::STANDARD
            .encode(miniz_oxide::deflate::compress_to_vec_zlib(&[], 6));
        assert!(matches!(decode(&empty, range), Err(SignalError::Decode { .. })));
    }

    #[test]
    fn test_invalid_range_fails_with_validation_error() {
        let encoded = encode_zint(&[0, 1]);
        assert!(matches!(
            decode(&encoded, ValueRange::new(1.0, -1.0)),
            Err(SignalError::Validation { .. })
        ));
        assert!(matches!(
            decode(&encoded, ValueRange::new(f64::NAN, 1.0)),
            Err(SignalError::Validation { .. })
        ));
    }

    #[test]
    fn test_scaled_zint_multiplies_raw_codes() {
        let encoded = encode_zint(&[-2, 0, 4]);
        let decoded = decode_scaled(&encoded, ArrayFormat::Zint, 0.5).unwrap();
        assert_eq!(decoded, vec![-1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_float_formats() {
        let values = [0.25f32, -1.5, 3.0];
        let bytes = float_bytes(&values);

        let b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
        assert_eq!(
            decode_scaled(&b64, ArrayFormat::B64, 2.0).unwrap(),
            vec![0.5, -3.0, 6.0]
        );

        let zlib = base64::engine::general_purpose::STANDARD
            .encode(miniz_oxide::deflate::compress_to_vec_zlib(&bytes, 6));
        assert_eq!(
            decode_scaled(&zlib, ArrayFormat::Zlib, 1.0).unwrap(),
            vec![0.25, -1.5, 3.0]
        );

        let truncated = base64::engine::general_purpose::STANDARD.encode(&bytes[..5]);
        assert!(matches!(
            decode_scaled(&truncated, ArrayFormat::B64, 1.0),
            Err(SignalError::Decode { .. })
        ));
    }

    #[test]
    fn test_block_with_range_requires_zint() {
        let block = EncodedBlock {
            data: base64::engine::general_purpose::STANDARD.encode(float_bytes(&[1.0])),
            format: ArrayFormat::B64,
            scaling: Scaling::Range(ValueRange::new(0.0, 1.0)),
        };
        assert!(matches!(decode_block(&block), Err(SignalError::Validation { .. })));
    }

    #[test]
    fn test_array_format_parsing() {
        assert_eq!("ZINT".parse::<ArrayFormat>().unwrap(), ArrayFormat::Zint);
        assert_eq!("b64".parse::<ArrayFormat>().unwrap(), ArrayFormat::B64);
        assert!("gzip".parse::<ArrayFormat>().is_err());
        assert_eq!(ArrayFormat::Zlib.to_string(), "zlib");
    }
}
