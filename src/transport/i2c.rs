// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Native I2C bus through `/dev/i2c-*`
//!
//! Uses the kernel i2c-dev interface. On other platforms the bus cannot be
//! opened and [`LinuxI2cBus::open`] reports it.

use super::{I2cBus, TransportError};

#[cfg(any(target_os = "linux", target_os = "android"))]
use i2cdev::{core::I2CDevice, linux::LinuxI2CDevice};
#[cfg(any(target_os = "linux", target_os = "android"))]
use log::debug;

/// I2C bus opened on a Linux i2c-dev character device
#[cfg(any(target_os = "linux", target_os = "android"))]
pub struct LinuxI2cBus {
    dev: LinuxI2CDevice,
    path: String,
    address: u8,
}

#[cfg(any(target_os = "linux", target_os = "android"))]
impl LinuxI2cBus {
    /// Open `path` (e.g. "/dev/i2c-1") with `address` as the current slave
    pub fn open(path: &str, address: u8) -> Result<Self, TransportError> {
        let dev = LinuxI2CDevice::new(path, u16::from(address))
            .map_err(|e| TransportError::I2c(format!("cannot open {}: {}", path, e)))?;
        debug!("Opened I2C bus {} at address 0x{:02X}", path, address);
        Ok(Self {
            dev,
            path: path.to_string(),
            address,
        })
    }

    fn select(&mut self, address: u8) -> Result<(), TransportError> {
        if address != self.address {
            self.dev
                .set_slave_address(u16::from(address))
                .map_err(|e| TransportError::I2c(format!("{}: {}", self.path, e)))?;
            self.address = address;
        }
        Ok(())
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
impl I2cBus for LinuxI2cBus {
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), TransportError> {
        self.select(address)?;
        self.dev
            .write(data)
            .map_err(|e| TransportError::I2c(format!("write to 0x{:02X}: {}", address, e)))
    }

    fn read(&mut self, address: u8, length: usize) -> Result<Vec<u8>, TransportError> {
        self.select(address)?;
        let mut buf = vec![0u8; length];
        self.dev
            .read(&mut buf)
            .map_err(|e| TransportError::I2c(format!("read from 0x{:02X}: {}", address, e)))?;
        Ok(buf)
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub struct LinuxI2cBus;

#[cfg(not(any(target_os = "linux", target_os = "android")))]
impl LinuxI2cBus {
    pub fn open(_path: &str, _address: u8) -> Result<Self, TransportError> {
        Err(TransportError::Unsupported(
            "i2c transport is linux-only".to_string(),
        ))
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
impl I2cBus for LinuxI2cBus {
    fn write(&mut self, _address: u8, _data: &[u8]) -> Result<(), TransportError> {
        Err(TransportError::Unsupported(
            "i2c transport is linux-only".to_string(),
        ))
    }

    fn read(&mut self, _address: u8, _length: usize) -> Result<Vec<u8>, TransportError> {
        Err(TransportError::Unsupported(
            "i2c transport is linux-only".to_string(),
        ))
    }
}
