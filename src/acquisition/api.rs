// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! REST client of the T8 unit
//!
//! Captures live under `{host}/rest/{waves|spectra}/{machine}/{point}/{pmode}`.
//! Listing that path returns the available captures, appending a Unix
//! timestamp returns one capture with its samples encoded in the requested
//! array format.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::config::{CaptureConfig, DeviceConfig};
use crate::decoding::{ArrayFormat, EncodedBlock, Scaling, SpectrumBlock, WaveformBlock};

/// Kind of capture stored by the unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    Wave,
    Spectrum,
}

impl CaptureKind {
    fn path_segment(&self) -> &'static str {
        match self {
            CaptureKind::Wave => "waves",
            CaptureKind::Spectrum => "spectra",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListPayload {
    #[serde(rename = "_items", default)]
    items: Vec<ListItem>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    #[serde(rename = "_links")]
    links: ItemLinks,
}

#[derive(Debug, Deserialize)]
struct ItemLinks {
    #[serde(rename = "self")]
    self_link: String,
}

#[derive(Debug, Deserialize)]
struct WavePayload {
    sample_rate: f64,
    #[serde(default = "default_factor")]
    factor: f64,
    data: String,
}

#[derive(Debug, Deserialize)]
struct SpectrumPayload {
    #[serde(default)]
    min_freq: f64,
    max_freq: f64,
    factor: f64,
    data: String,
}

fn default_factor() -> f64 {
    1.0
}

/// Build the base URL of a unit from its configured host.
///
/// Hosts without a scheme are reached over plain HTTP. A path prefix such as
/// `mirror.example.com/unit7` is kept.
///
/// ### Examples
///
/// ```
/// use t8_spectra::acquisition::base_url;
///
/// let url = base_url("mirror.example.com/unit7").unwrap();
/// assert_eq!(url.as_str(), "http://mirror.example.com/unit7");
/// ```
pub fn base_url(host: &str) -> Result<Url> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        anyhow::bail!("Device host is empty");
    }

    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };

    let url = Url::parse(&with_scheme)
        .with_context(|| format!("Failed to parse device host '{}'", host))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        anyhow::bail!("Device host '{}' cannot be used as a base URL", host);
    }
    Ok(url)
}

/// URL of a capture list, or of one capture when `timestamp` is given
pub fn capture_url(
    base: &Url,
    kind: CaptureKind,
    capture: &CaptureConfig,
    timestamp: Option<i64>,
    format: ArrayFormat,
) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| anyhow!("Base URL {} cannot hold a path", base))?;
        segments.pop_if_empty().extend([
            "rest",
            kind.path_segment(),
            capture.machine.as_str(),
            capture.point.as_str(),
            capture.pmode.as_str(),
        ]);
        if let Some(ts) = timestamp {
            segments.push(&ts.to_string());
        }
    }
    if timestamp.is_some() {
        url.query_pairs_mut()
            .append_pair("array_fmt", format.as_str());
    }
    Ok(url)
}

/// Extract the capture timestamps of a list response.
///
/// Each item links to itself; the last segment of that link is the Unix
/// timestamp of the capture.
pub fn parse_timestamps(body: &str) -> Result<Vec<i64>> {
    let payload: ListPayload =
        serde_json::from_str(body).context("Failed to parse capture list")?;

    payload
        .items
        .iter()
        .map(|item| {
            let link = item.links.self_link.trim_end_matches('/');
            let last = link.rsplit('/').next().unwrap_or(link);
            last.parse::<i64>()
                .with_context(|| format!("Capture link '{}' does not end with a timestamp", link))
        })
        .collect()
}

/// Turn a wave response into an encoded waveform block
pub fn parse_wave(body: &str, format: ArrayFormat) -> Result<WaveformBlock> {
    let payload: WavePayload =
        serde_json::from_str(body).context("Failed to parse wave response")?;

    Ok(WaveformBlock {
        samples: EncodedBlock {
            data: payload.data,
            format,
            scaling: Scaling::Factor(payload.factor),
        },
        sample_rate: payload.sample_rate,
    })
}

/// Turn a spectrum response into an encoded spectrum block
pub fn parse_spectrum(body: &str, format: ArrayFormat) -> Result<SpectrumBlock> {
    let payload: SpectrumPayload =
        serde_json::from_str(body).context("Failed to parse spectrum response")?;

    Ok(SpectrumBlock {
        amplitudes: EncodedBlock {
            data: payload.data,
            format,
            scaling: Scaling::Factor(payload.factor),
        },
        min_freq: payload.min_freq,
        max_freq: payload.max_freq,
    })
}

/// Authenticated client of one T8 unit
#[derive(Debug, Clone)]
pub struct T8Client {
    client: reqwest::Client,
    base: Url,
    user: String,
    password: String,
    array_format: ArrayFormat,
}

impl T8Client {
    /// Create a client from the device section of the configuration
    ///
    /// ### Errors
    ///
    /// Fails when the host, user or password is missing, when the host does
    /// not form a valid base URL, or when the HTTP client cannot be built.
    pub fn new(device: &DeviceConfig) -> Result<Self> {
        device.require_credentials()?;
        let base = base_url(&device.host)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(device.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;

        debug!("T8 client targeting {}", base);
        Ok(Self {
            client,
            base,
            user: device.user.clone(),
            password: device.password.clone(),
            array_format: device.array_format,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn array_format(&self) -> ArrayFormat {
        self.array_format
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if status != StatusCode::OK {
            anyhow::bail!("Request to {} returned HTTP {}", url, status);
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))
    }

    async fn list(&self, kind: CaptureKind, capture: &CaptureConfig) -> Result<Vec<i64>> {
        let url = capture_url(&self.base, kind, capture, None, self.array_format)?;
        let body = self.get_text(url).await?;
        let timestamps = parse_timestamps(&body)?;
        info!(
            "{} {} captures available for {}/{}/{}",
            timestamps.len(),
            kind.path_segment(),
            capture.machine,
            capture.point,
            capture.pmode
        );
        Ok(timestamps)
    }

    /// Timestamps of the stored waveforms
    pub async fn list_waves(&self, capture: &CaptureConfig) -> Result<Vec<i64>> {
        self.list(CaptureKind::Wave, capture).await
    }

    /// Timestamps of the stored spectra
    pub async fn list_spectra(&self, capture: &CaptureConfig) -> Result<Vec<i64>> {
        self.list(CaptureKind::Spectrum, capture).await
    }

    /// Fetch one waveform capture
    ///
    /// ### Arguments
    ///
    /// * `capture` - machine, point and processing mode of the capture
    /// * `timestamp` - Unix timestamp of the capture, as listed by [`Self::list_waves`]
    ///
    /// ### Returns
    ///
    /// The still encoded samples with their sample rate and scaling.
    ///
    /// ### Errors
    ///
    /// Fails on a transport error, on any status other than `200 OK`, or when
    /// the body is not a wave payload.
    pub async fn get_wave(&self, capture: &CaptureConfig, timestamp: i64) -> Result<WaveformBlock> {
        let url = capture_url(
            &self.base,
            CaptureKind::Wave,
            capture,
            Some(timestamp),
            self.array_format,
        )?;
        let body = self.get_text(url).await?;
        parse_wave(&body, self.array_format)
    }

    /// Fetch one spectrum capture
    pub async fn get_spectrum(
        &self,
        capture: &CaptureConfig,
        timestamp: i64,
    ) -> Result<SpectrumBlock> {
        let url = capture_url(
            &self.base,
            CaptureKind::Spectrum,
            capture,
            Some(timestamp),
            self.array_format,
        )?;
        let body = self.get_text(url).await?;
        parse_spectrum(&body, self.array_format)
    }
}
