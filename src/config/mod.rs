// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the T8 client
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings. The configuration is backed by a YAML file and
//! validated against a JSON schema before it is deserialized.
//!
//! ## Configuration Structure
//!
//! - `device`: how to reach the T8 unit (host, credentials, array format)
//! - `capture`: default machine, point and processing mode
//! - `processing`: spectrum derivation parameters
//! - `output`: where exported files go
//!
//! Nothing in the signal pipeline reads this configuration on its own: the
//! values are handed to the client and the pipeline at call time.
//!
//! ## Usage
//!
//! ```no_run
//! use t8_spectra::config::Config;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file("config.yaml").unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(
//!     Some("t8.example.com".to_string()), // Host
//!     Some("operator".to_string()),       // User
//!     None,                               // Password
//!     Some(2),                            // Pad factor
//! );
//!
//! println!("Device host: {}", config.device.host);
//! ```

pub mod device;
pub mod processing;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

// Re-export all types for public API
pub use device::{CaptureConfig, DeviceConfig};
pub use processing::{OutputConfig, ProcessingConfig};
pub use utils::output_config_schema;

/// Embedded JSON schema of the configuration file
pub(crate) const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Root configuration structure for the T8 client.
///
/// Each section falls back to its defaults when it is absent from the file,
/// so a minimal file only needs the credentials.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Connection settings of the T8 unit
    #[serde(default)]
    pub device: DeviceConfig,

    /// Capture used when the command line does not name one
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Spectrum derivation parameters
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Export locations
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Original path: {:?}, Sample path: {:?}", path, sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        Self::from_yaml_str(&contents).or_else(|err| {
            error!("Configuration error in {}: {:#}", path.display(), err);
            // Leave a file with the default values for the user to edit
            if let Err(e) = Self::create_sample_config(path) {
                error!("Failed to create sample config: {}", e);
            }
            Err(err.context(format!("Invalid configuration file {}", path.display())))
        })
    }

    /// Parse, validate and deserialize a YAML document
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        // First step: convert YAML to a generic Value
        let yaml_value: serde_yml::Value =
            serde_yml::from_str(contents).context("Failed to parse YAML configuration")?;

        // An empty document means "all defaults"
        let json_value = if yaml_value.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            serde_json::to_value(&yaml_value)
                .context("Failed to convert YAML to JSON for validation")?
        };

        let schema: serde_json::Value =
            serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        debug!("Validating configuration against schema");
        if let Err(error) = validator.validate(&json_value) {
            anyhow::bail!("Configuration validation failed: {}", error);
        }

        debug!("Schema validation passed, deserializing into Config structure");
        let config: Config = serde_json::from_value(json_value)
            .context("Failed to deserialize configuration")?;

        utils::validate_specific_rules(&config)?;
        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only values that are explicitly provided override the loaded
    /// configuration.
    ///
    /// # Parameters
    ///
    /// * `host` - Host of the T8 unit, with or without scheme
    /// * `user` - User for HTTP basic authentication
    /// * `password` - Password for HTTP basic authentication
    /// * `pad_factor` - Zero padding factor of the spectrum derivation
    pub fn apply_args(
        &mut self,
        host: Option<String>,
        user: Option<String>,
        password: Option<String>,
        pad_factor: Option<usize>,
    ) {
        if let Some(host) = host {
            debug!("Overriding host from command line: {}", host);
            self.device.host = host;
        }
        if let Some(user) = user {
            debug!("Overriding user from command line: {}", user);
            self.device.user = user;
        }
        if let Some(password) = password {
            debug!("Overriding password from command line");
            self.device.password = password;
        }
        if let Some(factor) = pad_factor {
            debug!("Overriding pad factor from command line: {}", factor);
            self.processing.pad_factor = factor;
        }
    }
}
