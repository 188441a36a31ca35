// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Device and capture configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::decoding::ArrayFormat;
use crate::utility::TimeReference;

/// How to reach and authenticate against the T8 unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Host of the unit, optionally with scheme and path prefix
    #[serde(default = "default_host")]
    pub host: String,

    /// User for HTTP basic authentication
    #[serde(default)]
    pub user: String,

    /// Password for HTTP basic authentication
    #[serde(default)]
    pub password: String,

    /// Array encoding requested from the unit
    #[serde(default)]
    pub array_format: ArrayFormat,

    /// Timeout of a single request
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Clock in which capture dates are written
    #[serde(default)]
    pub time_reference: TimeReference,
}

fn default_host() -> String {
    "lzfs45.mirror.twave.io/lzfs45".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            user: String::new(),
            password: String::new(),
            array_format: ArrayFormat::default(),
            timeout_seconds: default_timeout_seconds(),
            time_reference: TimeReference::default(),
        }
    }
}

impl DeviceConfig {
    /// Names of the credentials that are still empty
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.user.is_empty() {
            missing.push("USER");
        }
        if self.password.is_empty() {
            missing.push("PASSW");
        }
        if self.host.is_empty() {
            missing.push("HOST");
        }
        missing
    }

    /// Fail with every missing credential listed at once
    pub fn require_credentials(&self) -> Result<()> {
        let missing = self.missing_credentials();
        if !missing.is_empty() {
            anyhow::bail!(
                "Missing the following required credentials: {}",
                missing.join(", ")
            );
        }
        Ok(())
    }
}

/// Machine, measurement point and processing mode identifying a capture series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_machine")]
    pub machine: String,

    #[serde(default = "default_point")]
    pub point: String,

    #[serde(default = "default_pmode")]
    pub pmode: String,
}

fn default_machine() -> String {
    "LP_Turbine".to_string()
}

fn default_point() -> String {
    "MAD31CY005".to_string()
}

fn default_pmode() -> String {
    "AM1".to_string()
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            machine: default_machine(),
            point: default_point(),
            pmode: default_pmode(),
        }
    }
}
