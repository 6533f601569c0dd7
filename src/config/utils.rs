// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! Schema access and the validation rules the JSON schema cannot express.

use anyhow::{Context, Result};
use log::{debug, warn};

use super::Config;
use crate::sensor::registers::{BROADCAST_ADDRESS, MAX_DEVICE_ADDRESS};

/// Embedded JSON schema of the configuration file
pub const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Serial baud rates accepted for the Modbus-RTU link
pub const STANDARD_BAUD_RATES: [u32; 8] = [1200, 2400, 4800, 9600, 14400, 19200, 38400, 57600];

/// Output the embedded JSON schema to the console.
///
/// Called for the `--show-config-schema` flag.
///
/// # Example
///
/// ```bash
/// ./rust_environmental_sensor --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;
    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;
    println!("{}", formatted_schema);
    Ok(())
}

/// Validate a JSON value against the embedded schema
pub fn validate_against_schema(value: &serde_json::Value) -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;
    let validator = jsonschema::draft202012::options()
        .should_validate_formats(true)
        .build(&schema)?;

    if let Err(error) = validator.validate(value) {
        anyhow::bail!("Configuration validation failed: {}", error);
    }
    Ok(())
}

/// Validates the configuration against rules that aren't covered by the JSON schema.
///
/// # Validation Rules
///
/// - **Broadcast address**: address 0x00 is refused, no sensor answers on it
/// - **Address range**: an address above 0xF7 is accepted with a warning
/// - **Device path**: must not be empty for hardware transports
/// - **Baud rate**: must be one of [`STANDARD_BAUD_RATES`] for Modbus-RTU
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    if config.sensor.address == BROADCAST_ADDRESS {
        anyhow::bail!("Sensor address 0x00 is the Modbus broadcast address");
    }
    if config.sensor.address > MAX_DEVICE_ADDRESS {
        warn!(
            "Sensor address 0x{:02X} is above 0x{:02X}, the sensor will not accept it",
            config.sensor.address, MAX_DEVICE_ADDRESS
        );
    }

    let transport = &config.transport;
    if transport.transport_type.is_hardware() && transport.device.trim().is_empty() {
        anyhow::bail!(
            "A device path is required for the {} transport",
            transport.transport_type
        );
    }

    if transport.transport_type == super::TransportType::ModbusRtu
        && !STANDARD_BAUD_RATES.contains(&transport.baud_rate)
    {
        anyhow::bail!(
            "Invalid baud rate {}, expected one of {:?}",
            transport.baud_rate,
            STANDARD_BAUD_RATES
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportType;

    #[test]
    fn test_schema_parses() {
        let schema: serde_json::Value = serde_json::from_str(CONFIG_SCHEMA).unwrap();
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn test_default_config_passes_rules() {
        assert!(validate_specific_rules(&Config::default()).is_ok());
    }

    #[test]
    fn test_broadcast_address_is_refused() {
        let mut config = Config::default();
        config.sensor.address = 0;
        assert!(validate_specific_rules(&config).is_err());
    }

    #[test]
    fn test_high_address_only_warns() {
        let mut config = Config::default();
        config.sensor.address = 0xF8;
        assert!(validate_specific_rules(&config).is_ok());
    }

    #[test]
    fn test_baud_rate_checked_for_modbus_only() {
        let mut config = Config::default();
        config.transport.baud_rate = 12345;
        assert!(validate_specific_rules(&config).is_ok());

        config.transport.transport_type = TransportType::ModbusRtu;
        assert!(validate_specific_rules(&config).is_err());
        config.transport.baud_rate = 19200;
        assert!(validate_specific_rules(&config).is_ok());
    }

    #[test]
    fn test_mock_needs_no_device() {
        let mut config = Config::default();
        config.transport.device = String::new();
        assert!(validate_specific_rules(&config).is_err());
        config.transport.transport_type = TransportType::Mock;
        assert!(validate_specific_rules(&config).is_ok());
    }
}
