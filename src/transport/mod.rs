// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Register transports for the environmental sensor
//!
//! The sensor exposes the same register map over two very different links:
//!
//! - **I2C**: the host writes a register pointer byte then reads a block of bytes.
//!   The pointer addresses bytes, so a 16-bit register `R` lives at pointer `R * 2`.
//! - **Modbus-RTU**: the host reads input registers from a slave on a serial line.
//!
//! Two low-level traits describe what the driver consumes from each link
//! ([`I2cBus`] and [`ModbusRtu`]). They are wrapped by the two variants of the
//! [`RegisterTransport`] capability, which is the only thing the sensor driver holds.
//!
//! ## Implementations
//!
//! - [`i2c::LinuxI2cBus`]: `/dev/i2c-*` character devices (Linux and Android)
//! - [`modbus_rtu::RtuClient`]: `tokio-modbus` synchronous RTU client on a serial port
//! - [`mock::SimulatedSensor`]: in-memory sensor answering on both protocols

pub mod i2c;
pub mod mock;
pub mod modbus_rtu;

use std::time::Duration;

use anyhow::Result;
use log::info;
use thiserror::Error;

use crate::config::{TransportConfig, TransportType};

pub use i2c::LinuxI2cBus;
pub use mock::SimulatedSensor;
pub use modbus_rtu::RtuClient;

/// Errors raised while moving bytes between the host and the sensor
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I2C bus error: {0}")]
    I2c(String),

    #[error("Modbus exception from slave 0x{slave:02X} at register 0x{register:04X}: {code}")]
    ModbusException {
        slave: u8,
        register: u16,
        code: String,
    },

    #[error("No response from Modbus slave 0x{slave:02X}")]
    NoResponse { slave: u8 },

    #[error("No device acknowledged address 0x{address:02X}")]
    NoDevice { address: u8 },

    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("Transport not supported: {0}")]
    Unsupported(String),
}

/// Which link a [`RegisterTransport`] talks over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    I2c,
    ModbusRtu,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::I2c => write!(f, "i2c"),
            TransportKind::ModbusRtu => write!(f, "modbus-rtu"),
        }
    }
}

/// Raw I2C bus primitives consumed by the driver
///
/// A register read is a plain write of the pointer byte followed by a separate
/// read transaction, so only these two operations are needed.
pub trait I2cBus {
    /// Write `data` to the device at `address`
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), TransportError>;

    /// Read `length` bytes from the device at `address`
    fn read(&mut self, address: u8, length: usize) -> Result<Vec<u8>, TransportError>;
}

/// Modbus-RTU input register primitives consumed by the driver
///
/// Framing, CRC and inter-frame timing belong to the implementation.
pub trait ModbusRtu {
    /// Maximum time to wait for a slave answer
    fn set_response_timeout(&mut self, timeout: Duration);

    /// Read `count` consecutive input registers starting at `register`
    fn read_input_registers(
        &mut self,
        slave: u8,
        register: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransportError>;

    /// Read a single input register
    fn read_input_register(&mut self, slave: u8, register: u16) -> Result<u16, TransportError> {
        let words = self.read_input_registers(slave, register, 1)?;
        words
            .first()
            .copied()
            .ok_or(TransportError::ShortRead {
                expected: 2,
                actual: 0,
            })
    }
}

/// Register-level capability held by the sensor driver
///
/// Both variants read big-endian register contents into a byte buffer; they only
/// differ in how the register is addressed on the wire.
pub trait RegisterTransport {
    /// Link this transport talks over
    fn kind(&self) -> TransportKind;

    /// Configure the answer timeout. Only the serial link has one.
    fn set_response_timeout(&mut self, _timeout: Duration) {}

    /// Read `buf.len()` bytes starting at `register` of the device at `address`
    ///
    /// Returns the number of bytes stored in `buf`.
    fn read_block(
        &mut self,
        address: u8,
        register: u16,
        buf: &mut [u8],
    ) -> Result<usize, TransportError>;

    /// Read one 16-bit register
    fn read_word(&mut self, address: u8, register: u16) -> Result<u16, TransportError> {
        let mut buf = [0u8; 2];
        let count = self.read_block(address, register, &mut buf)?;
        if count < buf.len() {
            return Err(TransportError::ShortRead {
                expected: buf.len(),
                actual: count,
            });
        }
        Ok(u16::from_be_bytes(buf))
    }
}

impl<T: RegisterTransport + ?Sized> RegisterTransport for &mut T {
    fn kind(&self) -> TransportKind {
        (**self).kind()
    }

    fn set_response_timeout(&mut self, timeout: Duration) {
        (**self).set_response_timeout(timeout)
    }

    fn read_block(
        &mut self,
        address: u8,
        register: u16,
        buf: &mut [u8],
    ) -> Result<usize, TransportError> {
        (**self).read_block(address, register, buf)
    }

    fn read_word(&mut self, address: u8, register: u16) -> Result<u16, TransportError> {
        (**self).read_word(address, register)
    }
}

impl<T: RegisterTransport + ?Sized> RegisterTransport for Box<T> {
    fn kind(&self) -> TransportKind {
        (**self).kind()
    }

    fn set_response_timeout(&mut self, timeout: Duration) {
        (**self).set_response_timeout(timeout)
    }

    fn read_block(
        &mut self,
        address: u8,
        register: u16,
        buf: &mut [u8],
    ) -> Result<usize, TransportError> {
        (**self).read_block(address, register, buf)
    }

    fn read_word(&mut self, address: u8, register: u16) -> Result<u16, TransportError> {
        (**self).read_word(address, register)
    }
}

/// I2C variant of the register capability
pub struct I2cRegisterTransport<B> {
    bus: B,
}

impl<B: I2cBus> I2cRegisterTransport<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Give back the wrapped bus
    pub fn release(self) -> B {
        self.bus
    }
}

/// Byte pointer addressing `register` on the I2C side
///
/// The pointer register is 8 bits wide; offsets above 0x7F wrap like they do
/// on the device.
pub fn i2c_pointer(register: u16) -> u8 {
    (register.wrapping_mul(2) & 0xFF) as u8
}

impl<B: I2cBus> RegisterTransport for I2cRegisterTransport<B> {
    fn kind(&self) -> TransportKind {
        TransportKind::I2c
    }

    fn read_block(
        &mut self,
        address: u8,
        register: u16,
        buf: &mut [u8],
    ) -> Result<usize, TransportError> {
        self.bus.write(address, &[i2c_pointer(register)])?;
        let data = self.bus.read(address, buf.len())?;
        if data.len() < buf.len() {
            return Err(TransportError::ShortRead {
                expected: buf.len(),
                actual: data.len(),
            });
        }
        buf.copy_from_slice(&data[..buf.len()]);
        Ok(buf.len())
    }
}

/// Modbus-RTU variant of the register capability
pub struct ModbusRegisterTransport<M> {
    client: M,
}

impl<M: ModbusRtu> ModbusRegisterTransport<M> {
    pub fn new(client: M) -> Self {
        Self { client }
    }

    /// Give back the wrapped client
    pub fn release(self) -> M {
        self.client
    }
}

impl<M: ModbusRtu> RegisterTransport for ModbusRegisterTransport<M> {
    fn kind(&self) -> TransportKind {
        TransportKind::ModbusRtu
    }

    fn set_response_timeout(&mut self, timeout: Duration) {
        self.client.set_response_timeout(timeout);
    }

    fn read_block(
        &mut self,
        address: u8,
        register: u16,
        buf: &mut [u8],
    ) -> Result<usize, TransportError> {
        if buf.is_empty() {
            return Ok(0);
        }
        let count = u16::try_from(buf.len().div_ceil(2)).map_err(|_| {
            TransportError::Unsupported(format!("block of {} bytes is too large", buf.len()))
        })?;
        let words = self.client.read_input_registers(address, register, count)?;

        let mut written = 0;
        for (chunk, word) in buf.chunks_mut(2).zip(words.iter()) {
            let bytes = word.to_be_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
            written += chunk.len();
        }
        Ok(written)
    }

    fn read_word(&mut self, address: u8, register: u16) -> Result<u16, TransportError> {
        self.client.read_input_register(address, register)
    }
}

/// Open the register transport described by `config`
///
/// `address` is the sensor address; the I2C device is opened on it and the
/// Modbus client uses it as its initial slave.
pub fn open(config: &TransportConfig, address: u8) -> Result<Box<dyn RegisterTransport>> {
    info!(
        "Opening {:?} transport on '{}' for sensor 0x{:02X}",
        config.transport_type, config.device, address
    );
    match config.transport_type {
        TransportType::I2c => Ok(Box::new(I2cRegisterTransport::new(LinuxI2cBus::open(
            &config.device,
            address,
        )?))),
        TransportType::ModbusRtu => Ok(Box::new(ModbusRegisterTransport::new(
            RtuClient::open(&config.device, config.baud_rate, address)?,
        ))),
        TransportType::Mock => Ok(Box::new(I2cRegisterTransport::new(
            SimulatedSensor::with_address(address),
        ))),
    }
}
