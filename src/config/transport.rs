// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Transport configuration
//!
//! Selects how the sensor is reached: a native I2C bus, a Modbus-RTU serial
//! link, or the in-memory simulated sensor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sensor::registers::DEFAULT_BAUD_RATE;

/// Kind of link used to reach the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    /// Linux i2c-dev bus (`/dev/i2c-*`)
    #[default]
    I2c,
    /// Modbus-RTU over a serial port
    ModbusRtu,
    /// Simulated sensor, for testing without hardware
    Mock,
}

impl TransportType {
    /// Whether this transport needs a real device node
    pub fn is_hardware(self) -> bool {
        !matches!(self, TransportType::Mock)
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportType::I2c => write!(f, "i2c"),
            TransportType::ModbusRtu => write!(f, "modbus_rtu"),
            TransportType::Mock => write!(f, "mock"),
        }
    }
}

impl FromStr for TransportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "i2c" => Ok(TransportType::I2c),
            "modbus_rtu" | "modbus-rtu" | "modbus" | "rtu" => Ok(TransportType::ModbusRtu),
            "mock" => Ok(TransportType::Mock),
            other => Err(format!(
                "unknown transport '{}', expected i2c, modbus_rtu or mock",
                other
            )),
        }
    }
}

/// Configuration for the sensor transport
///
/// # Example
///
/// ```
/// use rust_environmental_sensor::config::{TransportConfig, TransportType};
///
/// let transport = TransportConfig {
///     transport_type: TransportType::ModbusRtu,
///     device: "/dev/ttyUSB0".to_string(),
///     baud_rate: 9600,
/// };
/// assert!(transport.transport_type.is_hardware());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Transport kind
    #[serde(rename = "type")]
    pub transport_type: TransportType,

    /// I2C bus device or serial port path.
    ///
    /// Ignored by the mock transport.
    pub device: String,

    /// Serial baud rate, only used by Modbus-RTU.
    ///
    /// The sensor ships at 9600 baud, 8 data bits, no parity, 1 stop bit.
    pub baud_rate: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            transport_type: TransportType::I2c,
            device: "/dev/i2c-1".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}
