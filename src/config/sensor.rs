// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Sensor addressing and timing configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sensor::registers::DEFAULT_DEVICE_ADDRESS;

/// Configuration of the sensor itself
///
/// # Fields
///
/// * `address` - I2C address or Modbus slave id (default: 0x22)
/// * `settle_delay_ms` - Wait before the first transaction (default: 500)
/// * `response_timeout_ms` - Modbus answer timeout (default: 200)
/// * `verbose` - Log every register transaction (default: false)
///
/// # Example
///
/// ```
/// use rust_environmental_sensor::config::SensorConfig;
///
/// let sensor_config = SensorConfig {
///     address: 0x23,
///     ..SensorConfig::default()
/// };
/// assert_eq!(sensor_config.settle_delay_ms, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Bus address of the sensor.
    ///
    /// The same value is used as I2C address and as Modbus slave id. Valid
    /// range is 0x01-0xF7; 0x00 is the Modbus broadcast address.
    pub address: u8,

    /// Delay before the first transaction, in milliseconds.
    pub settle_delay_ms: u64,

    /// Maximum time to wait for a Modbus answer, in milliseconds.
    ///
    /// Ignored on I2C.
    pub response_timeout_ms: u64,

    /// Log every register transaction at debug level.
    pub verbose: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_DEVICE_ADDRESS,
            settle_delay_ms: 500,
            response_timeout_ms: 200,
            verbose: false,
        }
    }
}

impl SensorConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}
