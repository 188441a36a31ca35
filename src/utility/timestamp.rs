// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Conversion between capture dates and the device's Unix timestamps
//!
//! Capture dates are written `YYYY-MM-DDTHH:MM:SS` without an offset. They
//! are read either as UTC or as the local time of the machine running the
//! client.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Format of capture dates on the command line and in file names
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Clock in which capture dates are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeReference {
    #[default]
    Utc,
    Local,
}

/// Convert a `YYYY-MM-DDTHH:MM:SS` date into a Unix timestamp
///
/// ### Errors
///
/// Fails on a malformed date, or on a local date that falls in a DST gap or
/// overlap.
///
/// ### Examples
///
/// ```
/// use t8_spectra::utility::{iso_to_unix, TimeReference};
///
/// let timestamp = iso_to_unix("2019-04-11T18:25:54", TimeReference::Utc).unwrap();
/// assert_eq!(timestamp, 1555007154);
/// ```
pub fn iso_to_unix(date: &str, reference: TimeReference) -> Result<i64> {
    let naive = NaiveDateTime::parse_from_str(date.trim(), ISO_FORMAT)
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DDTHH:MM:SS", date))?;

    match reference {
        TimeReference::Utc => Ok(naive.and_utc().timestamp()),
        TimeReference::Local => Local
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.timestamp())
            .ok_or_else(|| anyhow!("Local date '{}' is ambiguous or does not exist", date)),
    }
}

/// Convert a Unix timestamp into a `YYYY-MM-DDTHH:MM:SS` date
pub fn unix_to_iso(timestamp: i64, reference: TimeReference) -> Result<String> {
    let utc = DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| anyhow!("Timestamp {} is out of range", timestamp))?;

    Ok(match reference {
        TimeReference::Utc => utc.format(ISO_FORMAT).to_string(),
        TimeReference::Local => utc.with_timezone(&Local).format(ISO_FORMAT).to_string(),
    })
}
