// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rust environmental sensor library
//!
//! Driver for the DFRobot SEN0500/SEN0501 multifunctional environmental
//! sensor. It reads temperature, humidity, UV index, luminous intensity,
//! atmospheric pressure and elevation over an I2C bus or a Modbus-RTU link.

pub mod config;
pub mod sensor;
pub mod transport;

pub use config::Config;
pub use sensor::{
    DeviceIdentity, EnvironmentalSensor, Measurements, PressureUnit, SensorError,
    TemperatureUnit,
};
pub use transport::{RegisterTransport, TransportError, TransportKind};
