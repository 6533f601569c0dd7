// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the environmental sensor reader
//!
//! The configuration is backed by a YAML file and validated against an
//! embedded JSON schema before it is deserialized.
//!
//! ## Configuration Structure
//!
//! - `sensor`: sensor address and timing
//! - `transport`: link used to reach the sensor (I2C, Modbus-RTU or mock)
//!
//! ## Usage
//!
//! ```no_run
//! use rust_environmental_sensor::config::{Config, TransportType};
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("config.yaml")).unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(
//!     Some(TransportType::ModbusRtu),     // Transport
//!     Some("/dev/ttyUSB0".to_string()),   // Device
//!     Some(0x22),                         // Address
//!     Some(9600),                         // Baud rate
//!     false,                              // Verbose
//! );
//!
//! println!("Sensor address: 0x{:02X}", config.sensor.address);
//! ```

pub mod sensor;
pub mod transport;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

pub use sensor::SensorConfig;
pub use transport::{TransportConfig, TransportType};
pub use utils::output_config_schema;

/// Root configuration structure
///
/// Each section falls back to its default values when missing from the file,
/// so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Sensor address and timing.
    #[serde(default)]
    pub sensor: SensorConfig,

    /// How the sensor is reached.
    #[serde(default)]
    pub transport: TransportConfig,
}

impl Config {
    /// Write a `*.sample.yaml` file with default values next to `path`
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
    ///
    /// A missing file is created with default values. When the file fails
    /// validation a sample file is written next to it and an error is returned.
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

        let yaml_value: serde_yml::Value = serde_yml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML configuration from {:?}", path))?;

        // An empty document parses as null, which means all defaults
        let json_value = match serde_json::to_value(&yaml_value).with_context(|| {
            format!("Failed to convert YAML to JSON for validation: {:?}", path)
        })? {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            value => value,
        };

        debug!("Validating {} configuration against schema", path.display());
        if let Err(err) = utils::validate_against_schema(&json_value) {
            error!("Configuration validation error before deserialization");
            Self::create_sample_config(path)?;
            return Err(err);
        }

        let config: Config = match serde_json::from_value(json_value) {
            Ok(config) => config,
            Err(err) => {
                error!("Configuration deserialization error: {}", err);
                if let Err(e) = Self::create_sample_config(path) {
                    error!("Failed to create sample config: {}", e);
                }
                return Err(anyhow::anyhow!(
                    "Failed to deserialize configuration from {}: {}",
                    path.display(),
                    err
                ));
            }
        };

        if let Err(err) = utils::validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            Self::create_sample_config(path)?;
            return Err(err);
        }

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

    /// Check an in-memory configuration with the same rules as [`Config::from_file`]
    pub fn validate(&self) -> Result<()> {
        let json_value =
            serde_json::to_value(self).context("Failed to convert configuration to JSON")?;
        utils::validate_against_schema(&json_value)?;
        utils::validate_specific_rules(self)
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only provided values override the configuration; `verbose` can only
    /// turn transaction logging on.
    pub fn apply_args(
        &mut self,
        transport: Option<TransportType>,
        device: Option<String>,
        address: Option<u8>,
        baud_rate: Option<u32>,
        verbose: bool,
    ) {
        if let Some(transport) = transport {
            debug!("Overriding transport from command line: {}", transport);
            self.transport.transport_type = transport;
        }
        if let Some(device) = device {
            debug!("Overriding device from command line: {}", device);
            self.transport.device = device;
        }
        if let Some(address) = address {
            debug!("Overriding address from command line: 0x{:02X}", address);
            self.sensor.address = address;
        }
        if let Some(baud_rate) = baud_rate {
            debug!("Overriding baud rate from command line: {}", baud_rate);
            self.transport.baud_rate = baud_rate;
        }
        if verbose {
            self.sensor.verbose = true;
        }
    }
}
