// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Environmental sensor driver
//!
//! [`EnvironmentalSensor`] drives one SEN0500/SEN0501 board through exactly one
//! [`RegisterTransport`]. Every accessor issues a fresh register read and applies
//! the matching conversion from [`conversion`]; nothing is cached.
//!
//! # Example
//!
//! ```no_run
//! use rust_environmental_sensor::sensor::{EnvironmentalSensor, TemperatureUnit};
//! use rust_environmental_sensor::transport::SimulatedSensor;
//!
//! let mut sensor = EnvironmentalSensor::new_i2c(SimulatedSensor::new(), 0x22);
//! sensor.begin()?;
//! let celsius = sensor.temperature(TemperatureUnit::Celsius)?;
//! println!("{:.2} °C", celsius);
//! # Ok::<(), rust_environmental_sensor::sensor::SensorError>(())
//! ```

pub mod conversion;
pub mod error;
pub mod registers;

use std::fmt;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::transport::{
    I2cBus, I2cRegisterTransport, ModbusRegisterTransport, ModbusRtu, RegisterTransport,
    TransportError, TransportKind,
};

pub use conversion::{PressureUnit, TemperatureUnit};
pub use error::SensorError;
pub use registers::{Register, SensorVariant};

use registers::{BROADCAST_ADDRESS, MAX_DEVICE_ADDRESS};

/// Delay before the first transaction, the board needs it after power-up
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);
/// Answer timeout configured on the transport by [`EnvironmentalSensor::begin`]
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(200);

/// Product identification read from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub pid: u16,
    pub vid: u16,
    pub version: u16,
    /// `None` when the PID matches neither known board
    pub variant: Option<SensorVariant>,
}

/// One reading of every physical quantity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurements {
    pub timestamp: DateTime<Utc>,
    pub temperature: f32,
    pub temperature_unit: TemperatureUnit,
    pub humidity: f32,
    pub ultraviolet_index: f32,
    pub luminous_intensity: f32,
    pub atmospheric_pressure: u16,
    pub pressure_unit: PressureUnit,
    pub elevation: f32,
}

impl fmt::Display for Measurements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.timestamp.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(
            f,
            "  temperature:          {:.2} {}",
            self.temperature,
            self.temperature_unit.symbol()
        )?;
        writeln!(f, "  humidity:             {:.2} %", self.humidity)?;
        writeln!(f, "  ultraviolet index:    {:.2}", self.ultraviolet_index)?;
        writeln!(f, "  luminous intensity:   {:.2} lx", self.luminous_intensity)?;
        writeln!(
            f,
            "  atmospheric pressure: {} {}",
            self.atmospheric_pressure,
            self.pressure_unit.symbol()
        )?;
        write!(f, "  elevation:            {:.2} m", self.elevation)
    }
}

/// Driver for one environmental sensor board
pub struct EnvironmentalSensor<T: RegisterTransport> {
    transport: T,
    address: u8,
    settle_delay: Duration,
    response_timeout: Duration,
    verbose: bool,
    log_target: String,
}

impl<B: I2cBus> EnvironmentalSensor<I2cRegisterTransport<B>> {
    /// Driver for a sensor at `address` on an I2C bus
    pub fn new_i2c(bus: B, address: u8) -> Self {
        Self::new(I2cRegisterTransport::new(bus), address)
    }
}

impl<M: ModbusRtu> EnvironmentalSensor<ModbusRegisterTransport<M>> {
    /// Driver for a sensor answering as Modbus slave `address`
    pub fn new_modbus(client: M, address: u8) -> Self {
        Self::new(ModbusRegisterTransport::new(client), address)
    }
}

impl<T: RegisterTransport> EnvironmentalSensor<T> {
    /// Wrap `transport` for the sensor at `address`
    ///
    /// Nothing is sent on the bus until [`begin`](Self::begin) or an accessor is called.
    pub fn new(transport: T, address: u8) -> Self {
        Self {
            transport,
            address,
            settle_delay: DEFAULT_SETTLE_DELAY,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            verbose: false,
            log_target: format!("env_sensor@0x{:02X}", address),
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the answer timeout and apply it to the transport right away
    ///
    /// [`begin`](Self::begin) applies it again.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self.transport.set_response_timeout(timeout);
        self
    }

    /// Enable per-transaction debug output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// Hand the transport back to the caller
    pub fn release(self) -> T {
        self.transport
    }

    fn trace(&self, args: fmt::Arguments<'_>) {
        if self.verbose {
            debug!(target: self.log_target.as_str(), "{}", args);
        }
    }

    /// Wait for the board, configure the transport and check the device answers
    ///
    /// Fails on the broadcast address, when the DEVICE_ADDR register does not
    /// echo the configured address, or when the probe cannot reach the device.
    /// An address above 0xF7 is only reported in the log.
    pub fn begin(&mut self) -> Result<(), SensorError> {
        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }
        self.transport.set_response_timeout(self.response_timeout);

        if self.address > MAX_DEVICE_ADDRESS {
            warn!(
                target: self.log_target.as_str(),
                "Device address 0x{:02X} is above 0x{:02X}, the sensor will not accept it",
                self.address,
                MAX_DEVICE_ADDRESS
            );
        }
        if self.address == BROADCAST_ADDRESS {
            error!(target: self.log_target.as_str(), "Cannot probe the broadcast address");
            return Err(SensorError::BroadcastAddress);
        }

        let reported = self.probe_address(self.address).map_err(|e| {
            error!(target: self.log_target.as_str(), "Probe failed: {}", e);
            SensorError::from(e)
        })?;
        if reported != self.address {
            error!(
                target: self.log_target.as_str(),
                "DEVICE_ADDR register holds 0x{:02X}", reported
            );
            return Err(SensorError::AddressMismatch {
                expected: self.address,
                reported,
            });
        }

        info!(
            target: self.log_target.as_str(),
            "Sensor ready on {} transport", self.transport.kind()
        );
        Ok(())
    }

    /// Low byte of the DEVICE_ADDR register of whatever answers at `address`
    fn probe_address(&mut self, address: u8) -> Result<u8, TransportError> {
        let word = self
            .transport
            .read_word(address, Register::DeviceAddress.offset())?;
        self.trace(format_args!(
            "DEVICE_ADDR at 0x{:02X} reads 0x{:04X}",
            address, word
        ));
        Ok((word & 0x00FF) as u8)
    }

    /// Check that a sensor answers at `address` and reports that address
    ///
    /// Never fails: communication errors are logged and reported as `false`.
    pub fn detect_device_address(&mut self, address: u8) -> bool {
        match self.probe_address(address) {
            Ok(reported) => reported == address,
            Err(e) => {
                warn!(
                    target: self.log_target.as_str(),
                    "No sensor detected at 0x{:02X}: {}", address, e
                );
                false
            }
        }
    }

    /// Read `buffer.len()` bytes starting at `register`
    ///
    /// Returns the number of bytes stored. Without a buffer nothing is sent and
    /// `Ok(0)` is returned.
    pub fn read_register(
        &mut self,
        register: Register,
        buffer: Option<&mut [u8]>,
    ) -> Result<usize, SensorError> {
        let Some(buf) = buffer else {
            warn!(
                target: self.log_target.as_str(),
                "No buffer given for register {}, nothing read",
                register.name()
            );
            return Ok(0);
        };

        let count = self
            .transport
            .read_block(self.address, register.offset(), buf)?;
        self.trace(format_args!(
            "{} (0x{:04X}): {:02X?}",
            register.name(),
            register.offset(),
            &buf[..count]
        ));
        Ok(count)
    }

    /// One register as a big-endian 16-bit value
    fn read_raw(&mut self, register: Register) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        let count = self.read_register(register, Some(&mut buf))?;
        if count < buf.len() {
            return Err(TransportError::ShortRead {
                expected: buf.len(),
                actual: count,
            }
            .into());
        }
        Ok(u16::from_be_bytes(buf))
    }

    pub fn device_pid(&mut self) -> Result<u16, SensorError> {
        self.read_raw(Register::Pid)
    }

    pub fn device_vid(&mut self) -> Result<u16, SensorError> {
        self.read_raw(Register::Vid)
    }

    pub fn firmware_version(&mut self) -> Result<u16, SensorError> {
        self.read_raw(Register::Version)
    }

    /// Raw content of the DEVICE_ADDR register
    pub fn device_address_register(&mut self) -> Result<u16, SensorError> {
        self.read_raw(Register::DeviceAddress)
    }

    /// Raw UART_CTRL0 and UART_CTRL1 words
    pub fn uart_control(&mut self) -> Result<(u16, u16), SensorError> {
        let ctrl0 = self.read_raw(Register::UartCtrl0)?;
        let ctrl1 = self.read_raw(Register::UartCtrl1)?;
        Ok((ctrl0, ctrl1))
    }

    pub fn identity(&mut self) -> Result<DeviceIdentity, SensorError> {
        let pid = self.device_pid()?;
        let vid = self.device_vid()?;
        let version = self.firmware_version()?;
        Ok(DeviceIdentity {
            pid,
            vid,
            version,
            variant: SensorVariant::from_pid(pid),
        })
    }

    pub fn temperature(&mut self, unit: TemperatureUnit) -> Result<f32, SensorError> {
        let raw = self.read_raw(Register::Temperature)?;
        Ok(conversion::temperature_from_raw(raw, unit))
    }

    /// Relative humidity in percent
    pub fn humidity(&mut self) -> Result<f32, SensorError> {
        let raw = self.read_raw(Register::Humidity)?;
        Ok(conversion::humidity_from_raw(raw))
    }

    /// UV index; the firmware version decides how the raw value is read
    pub fn ultraviolet_intensity(&mut self) -> Result<f32, SensorError> {
        let version = self.firmware_version()?;
        let raw = self.read_raw(Register::UltravioletIntensity)?;
        Ok(conversion::uv_index_from_raw(version, raw))
    }

    /// Illuminance in lux
    pub fn luminous_intensity(&mut self) -> Result<f32, SensorError> {
        let raw = self.read_raw(Register::LuminousIntensity)?;
        Ok(conversion::luminous_from_raw(raw))
    }

    pub fn atmosphere_pressure(&mut self, unit: PressureUnit) -> Result<u16, SensorError> {
        let raw = self.read_raw(Register::AtmosphericPressure)?;
        Ok(conversion::pressure_from_raw(raw, unit))
    }

    /// Elevation in meters, derived from the atmospheric pressure
    pub fn elevation(&mut self) -> Result<f32, SensorError> {
        let raw = self.read_raw(Register::AtmosphericPressure)?;
        Ok(conversion::elevation_from_raw(raw))
    }

    /// Read every quantity once
    pub fn measure(
        &mut self,
        temperature_unit: TemperatureUnit,
        pressure_unit: PressureUnit,
    ) -> Result<Measurements, SensorError> {
        Ok(Measurements {
            timestamp: Utc::now(),
            temperature: self.temperature(temperature_unit)?,
            temperature_unit,
            humidity: self.humidity()?,
            ultraviolet_index: self.ultraviolet_intensity()?,
            luminous_intensity: self.luminous_intensity()?,
            atmospheric_pressure: self.atmosphere_pressure(pressure_unit)?,
            pressure_unit,
            elevation: self.elevation()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::SimulatedSensor;
    use approx::assert_relative_eq;

    fn simulated() -> (SimulatedSensor, EnvironmentalSensor<I2cRegisterTransport<SimulatedSensor>>) {
        let device = SimulatedSensor::new();
        let sensor =
            EnvironmentalSensor::new_i2c(device.clone(), 0x22).with_settle_delay(Duration::ZERO);
        (device, sensor)
    }

    #[test]
    fn test_construction_sends_nothing() {
        let (device, sensor) = simulated();
        assert_eq!(sensor.address(), 0x22);
        assert_eq!(sensor.kind(), TransportKind::I2c);
        assert_eq!(device.transaction_count(), 0);
    }

    #[test]
    fn test_begin_accepts_matching_device() {
        let (_, mut sensor) = simulated();
        assert!(sensor.begin().is_ok());
    }

    #[test]
    fn test_absent_buffer_reads_nothing() {
        let (device, mut sensor) = simulated();
        assert_eq!(sensor.read_register(Register::Temperature, None).unwrap(), 0);
        assert_eq!(device.transaction_count(), 0);
    }

    #[test]
    fn test_every_accessor_hits_the_bus() {
        let (device, mut sensor) = simulated();
        sensor.humidity().unwrap();
        sensor.humidity().unwrap();
        // pointer write and block read per access
        assert_eq!(device.transaction_count(), 4);
    }

    #[test]
    fn test_measure_collects_all_quantities() {
        let (_, mut sensor) = simulated();
        let m = sensor
            .measure(TemperatureUnit::Celsius, PressureUnit::Hectopascal)
            .unwrap();
        assert_relative_eq!(m.temperature, 25.0, epsilon = 0.01);
        assert_relative_eq!(m.humidity, 50.0);
        assert_relative_eq!(m.ultraviolet_index, 3.0);
        assert_eq!(m.atmospheric_pressure, 1013);
        assert!(m.to_string().contains("1013 hPa"));
    }

    #[test]
    fn test_identity_recognises_gravity_board() {
        let (_, mut sensor) = simulated();
        let identity = sensor.identity().unwrap();
        assert_eq!(identity.pid, 0x01F5);
        assert_eq!(identity.vid, 0x3343);
        assert_eq!(identity.version, 0x1001);
        assert_eq!(identity.variant, Some(SensorVariant::Gravity));
    }

    #[test]
    fn test_release_returns_transport() {
        let (device, sensor) = simulated();
        let bus = sensor.release().release();
        bus.set_register(0x0A, 0);
        assert_eq!(device.register(0x0A), Some(0));
    }
}
