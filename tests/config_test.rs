use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Once;
use t8_spectra::config::Config;
use t8_spectra::decoding::ArrayFormat;
use t8_spectra::utility::TimeReference;
use tempfile::tempdir;

static INIT: Once = Once::new();

// Setup logger for tests
fn setup() {
    INIT.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

#[test]
fn test_config_load_and_save() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    // Create a custom config
    let mut config = Config::default();
    config.device.host = "10.0.0.5".to_string();
    config.device.user = "operator".to_string();
    config.device.password = "secret".to_string();
    config.device.array_format = ArrayFormat::Zlib;
    config.device.time_reference = TimeReference::Local;
    config.capture.machine = "LP_Pump".to_string();
    config.processing.pad_factor = 2;

    config.save_to_file(&config_path)?;
    let loaded_config = Config::from_file(&config_path)?;

    assert_eq!(loaded_config.device.host, "10.0.0.5");
    assert_eq!(loaded_config.device.user, "operator");
    assert_eq!(loaded_config.device.password, "secret");
    assert_eq!(loaded_config.device.array_format, ArrayFormat::Zlib);
    assert_eq!(loaded_config.device.time_reference, TimeReference::Local);
    assert_eq!(loaded_config.capture.machine, "LP_Pump");
    assert_eq!(loaded_config.capture.point, "MAD31CY005");
    assert_eq!(loaded_config.processing.pad_factor, 2);

    Ok(())
}

#[test]
fn test_missing_file_creates_default() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let non_existent_path = temp_dir.path().join("non_existent.yaml");

    let default_config = Config::from_file(&non_existent_path)?;

    assert!(non_existent_path.exists());
    assert_eq!(default_config.device.host, "lzfs45.mirror.twave.io/lzfs45");
    assert_eq!(default_config.device.timeout_seconds, 30);
    assert_eq!(default_config.capture.pmode, "AM1");
    assert_eq!(default_config.processing.pad_factor, 4);

    Ok(())
}

#[test]
fn test_partial_file_uses_defaults() -> Result<()> {
    setup();
    let config = Config::from_yaml_str(
        r#"
device:
  user: operator
  password: secret
"#,
    )?;
    assert_eq!(config.device.user, "operator");
    assert_eq!(config.device.host, "lzfs45.mirror.twave.io/lzfs45");
    assert!(config.device.missing_credentials().is_empty());

    let empty = Config::from_yaml_str("")?;
    assert_eq!(empty.device.missing_credentials(), vec!["USER", "PASSW"]);

    Ok(())
}

#[test]
fn test_apply_args_overrides_only_given_values() {
    let mut config = Config::default();

    config.apply_args(
        Some("t8.example.com".to_string()),
        Some("operator".to_string()),
        None,
        None,
    );

    assert_eq!(config.device.host, "t8.example.com");
    assert_eq!(config.device.user, "operator");
    assert_eq!(config.device.password, "");
    assert_eq!(config.processing.pad_factor, 4);

    config.apply_args(None, None, Some("secret".to_string()), Some(1));
    assert_eq!(config.device.password, "secret");
    assert_eq!(config.processing.pad_factor, 1);
    assert!(config.device.require_credentials().is_ok());
}

#[test]
fn test_missing_credentials_are_reported_together() {
    let mut config = Config::default();
    config.device.host = String::new();

    let err = config.device.require_credentials().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing the following required credentials: USER, PASSW, HOST"
    );
}

#[test]
fn test_schema_rejects_out_of_range_values() {
    setup();
    assert!(Config::from_yaml_str("processing:\n  pad_factor: 0\n").is_err());
    assert!(Config::from_yaml_str("processing:\n  pad_factor: 65\n").is_err());
    assert!(Config::from_yaml_str("processing:\n  pad_factor: 64\n").is_ok());
    assert!(Config::from_yaml_str("processing:\n  amplitude_scale: -1.0\n").is_err());
    assert!(Config::from_yaml_str("device:\n  array_format: csv\n").is_err());
    assert!(Config::from_yaml_str("device:\n  timeout_seconds: 0\n").is_err());
    assert!(Config::from_yaml_str("unknown_section: {}\n").is_err());
}

#[test]
fn test_invalid_file_creates_sample_file() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    // Valid YAML but wrong structure
    let invalid_yaml = r#"
device:
  host: 12345
  timeout_seconds: "thirty"
capture:
  machine: []
"#;
    fs::write(&config_path, invalid_yaml)?;

    let result = Config::from_file(&config_path);
    assert!(result.is_err(), "Config loading should have failed");

    let sample_path = config_path.with_extension("sample.yaml");
    assert!(
        Path::new(&sample_path).exists(),
        "Sample config file was not created"
    );

    // The sample file holds the defaults and loads cleanly
    let sample_config = Config::from_file(&sample_path)?;
    assert_eq!(sample_config.device.timeout_seconds, 30);

    Ok(())
}

#[test]
fn test_malformed_yaml_is_an_error() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "device: [unclosed\n")?;

    assert!(Config::from_file(&config_path).is_err());
    Ok(())
}
