// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::fs;
use std::sync::Once;

use anyhow::Result;
use rust_environmental_sensor::config::{Config, TransportType};
use tempfile::tempdir;

static INIT: Once = Once::new();

fn setup() {
    INIT.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

#[test]
fn test_missing_config_file_is_created_with_defaults() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let config = Config::from_file(&config_path)?;
    assert!(config_path.exists(), "Default config file was not written");
    assert_eq!(config, Config::default());
    assert_eq!(config.sensor.address, 0x22);
    assert_eq!(config.sensor.settle_delay_ms, 500);
    assert_eq!(config.sensor.response_timeout_ms, 200);
    assert_eq!(config.transport.transport_type, TransportType::I2c);
    assert_eq!(config.transport.device, "/dev/i2c-1");
    assert_eq!(config.transport.baud_rate, 9600);

    // The written file loads back to the same values
    assert_eq!(Config::from_file(&config_path)?, config);
    Ok(())
}

#[test]
fn test_config_round_trip() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("sensor.yaml");

    let mut config = Config::default();
    config.sensor.address = 0x30;
    config.sensor.verbose = true;
    config.transport.transport_type = TransportType::ModbusRtu;
    config.transport.device = "/dev/ttyUSB0".to_string();
    config.transport.baud_rate = 19200;
    config.save_to_file(&config_path)?;

    let contents = fs::read_to_string(&config_path)?;
    assert!(contents.contains("type: modbus_rtu"));

    let loaded = Config::from_file(&config_path)?;
    assert_eq!(loaded, config);
    Ok(())
}

#[test]
fn test_partial_config_uses_section_defaults() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(
        &config_path,
        r#"
sensor:
  address: 35
transport:
  type: mock
"#,
    )?;

    let config = Config::from_file(&config_path)?;
    assert_eq!(config.sensor.address, 35);
    assert_eq!(config.sensor.settle_delay_ms, 500);
    assert_eq!(config.transport.transport_type, TransportType::Mock);
    assert_eq!(config.transport.device, "/dev/i2c-1");
    Ok(())
}

#[test]
fn test_schema_violation_creates_sample_file() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(
        &config_path,
        r#"
sensor:
  address: 300  # Does not fit in one byte
"#,
    )?;

    let result = Config::from_file(&config_path);
    assert!(result.is_err(), "Config loading should have failed");

    let sample_path = config_path.with_extension("sample.yaml");
    assert!(sample_path.exists(), "Sample config file was not created");
    let sample_config = Config::from_file(&sample_path)?;
    assert_eq!(sample_config, Config::default());
    Ok(())
}

#[test]
fn test_unknown_transport_is_rejected() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "transport:\n  type: spi\n")?;

    assert!(Config::from_file(&config_path).is_err());
    assert!(config_path.with_extension("sample.yaml").exists());
    Ok(())
}

#[test]
fn test_unknown_field_is_rejected() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "sensor:\n  adress: 34\n")?;

    assert!(Config::from_file(&config_path).is_err());
    Ok(())
}

#[test]
fn test_specific_rules_reject_odd_baud_rate() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(
        &config_path,
        r#"
transport:
  type: modbus_rtu
  device: /dev/ttyUSB0
  baud_rate: 12345
"#,
    )?;

    let err = Config::from_file(&config_path).unwrap_err();
    assert!(err.to_string().contains("baud rate"), "unexpected error: {}", err);
    assert!(config_path.with_extension("sample.yaml").exists());
    Ok(())
}

#[test]
fn test_zero_response_timeout_is_rejected() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "sensor:\n  response_timeout_ms: 0\n")?;

    assert!(Config::from_file(&config_path).is_err());
    assert!(config_path.with_extension("sample.yaml").exists());

    fs::write(&config_path, "sensor:\n  response_timeout_ms: 1\n")?;
    assert_eq!(Config::from_file(&config_path)?.sensor.response_timeout_ms, 1);
    Ok(())
}

#[test]
fn test_broadcast_address_is_rejected() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "sensor:\n  address: 0\n")?;

    assert!(Config::from_file(&config_path).is_err());
    Ok(())
}

#[test]
fn test_apply_args_overrides_only_given_values() {
    setup();
    let mut config = Config::default();
    config.apply_args(None, None, None, None, false);
    assert_eq!(config, Config::default());

    config.apply_args(
        Some(TransportType::ModbusRtu),
        Some("/dev/ttyAMA0".to_string()),
        Some(0x40),
        Some(38400),
        true,
    );
    assert_eq!(config.transport.transport_type, TransportType::ModbusRtu);
    assert_eq!(config.transport.device, "/dev/ttyAMA0");
    assert_eq!(config.sensor.address, 0x40);
    assert_eq!(config.transport.baud_rate, 38400);
    assert!(config.sensor.verbose);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_in_memory_config() {
    setup();
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.sensor.address = 0;
    assert!(config.validate().is_err());

    config.sensor.address = 0x22;
    config.transport.device = "  ".to_string();
    assert!(config.validate().is_err());
}
