// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the t8-spectra project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::debug;

use super::{Config, CONFIG_SCHEMA};
use crate::acquisition::api::base_url;

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// # Example
///
/// ```bash
/// ./t8_client --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    // Parse the schema to a JSON Value to pretty-format it
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Validates the configuration against rules the JSON schema cannot express.
///
/// # Validation Rules
///
/// - **Processing**: pad factor in `1..=MAX_PAD_FACTOR`, positive finite amplitude scale
/// - **Host**: when set, it must form a valid base URL
/// - **Output**: the reports and figures directories must not be empty
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    config
        .processing
        .spectrum_options()
        .validate()
        .context("Invalid processing section")?;

    if !config.device.host.is_empty() {
        base_url(&config.device.host)
            .with_context(|| format!("Invalid device host '{}'", config.device.host))?;
    }

    if config.device.timeout_seconds == 0 {
        anyhow::bail!("Request timeout must be at least one second");
    }

    if config.output.reports_dir.as_os_str().is_empty() {
        anyhow::bail!("Reports directory must not be empty");
    }

    if config.output.figures_dir.as_os_str().is_empty() {
        anyhow::bail!("Figures directory must not be empty");
    }

    Ok(())
}
