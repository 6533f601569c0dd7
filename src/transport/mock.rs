// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Simulated environmental sensor
//!
//! [`SimulatedSensor`] keeps a register file in memory and answers both as an
//! I2C slave (pointer write then block read) and as a Modbus-RTU slave (input
//! register reads). It backs the `mock` transport type and the test suites.
//!
//! Clones share the same register file, so a test can hand one clone to the
//! driver and keep another to change register values or inspect traffic.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::debug;

use super::{I2cBus, ModbusRtu, TransportError};
use crate::sensor::registers::{Register, DEFAULT_DEVICE_ADDRESS, DEVICE_PID_GRAVITY, DEVICE_VID};

/// Number of 16-bit registers exposed by the simulated device
const REGISTER_COUNT: usize = 16;

#[derive(Debug)]
struct SimulatedState {
    address: u8,
    registers: [u16; REGISTER_COUNT],
    pointer: Option<u8>,
    transactions: usize,
    offline: bool,
    response_timeout: Option<Duration>,
}

/// In-memory sensor answering on I2C and Modbus-RTU
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    state: Arc<Mutex<SimulatedState>>,
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSensor {
    /// Create a Gravity-variant sensor at the factory address with indoor readings
    pub fn new() -> Self {
        Self::with_address(DEFAULT_DEVICE_ADDRESS)
    }

    /// Create a simulated sensor answering at `address`
    pub fn with_address(address: u8) -> Self {
        let mut registers = [0u16; REGISTER_COUNT];
        registers[Register::Pid.offset() as usize] = DEVICE_PID_GRAVITY;
        registers[Register::Vid.offset() as usize] = DEVICE_VID;
        registers[Register::DeviceAddress.offset() as usize] = u16::from(address);
        registers[Register::Version.offset() as usize] = 0x1001;
        // UV index 3.0 on the 0x1001 firmware
        registers[Register::UltravioletIntensity.offset() as usize] = 5400;
        registers[Register::LuminousIntensity.offset() as usize] = 500;
        // 25 °C
        registers[Register::Temperature.offset() as usize] = 26214;
        // 50 %RH
        registers[Register::Humidity.offset() as usize] = 32768;
        registers[Register::AtmosphericPressure.offset() as usize] = 1013;
        registers[Register::Elevation.offset() as usize] = 17;

        Self {
            state: Arc::new(Mutex::new(SimulatedState {
                address,
                registers,
                pointer: None,
                transactions: 0,
                offline: false,
                response_timeout: None,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimulatedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite one register of the simulated device
    pub fn set_register(&self, register: u16, value: u16) {
        let mut state = self.state();
        if let Some(slot) = state.registers.get_mut(register as usize) {
            *slot = value;
        }
    }

    /// Current content of one register
    pub fn register(&self, register: u16) -> Option<u16> {
        self.state().registers.get(register as usize).copied()
    }

    /// Make every following transaction fail as if the device was unplugged
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Last register pointer written over I2C
    pub fn last_pointer(&self) -> Option<u8> {
        self.state().pointer
    }

    /// Number of bus transactions seen so far
    pub fn transaction_count(&self) -> usize {
        self.state().transactions
    }

    /// Response timeout last configured through the Modbus side
    pub fn response_timeout(&self) -> Option<Duration> {
        self.state().response_timeout
    }
}

impl SimulatedState {
    fn byte_at(&self, pointer: usize) -> Option<u8> {
        let word = self.registers.get(pointer / 2)?;
        let bytes = word.to_be_bytes();
        Some(bytes[pointer % 2])
    }
}

impl I2cBus for SimulatedSensor {
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state();
        state.transactions += 1;
        if state.offline || address != state.address {
            return Err(TransportError::NoDevice { address });
        }
        // Writable registers are not simulated, only the pointer byte matters
        if let Some(&pointer) = data.first() {
            debug!("Simulated sensor pointer set to 0x{:02X}", pointer);
            state.pointer = Some(pointer);
        }
        Ok(())
    }

    fn read(&mut self, address: u8, length: usize) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state();
        state.transactions += 1;
        if state.offline || address != state.address {
            return Err(TransportError::NoDevice { address });
        }
        let start = usize::from(state.pointer.unwrap_or(0));
        (start..start + length)
            .map(|pointer| {
                state.byte_at(pointer).ok_or_else(|| {
                    TransportError::I2c(format!("pointer 0x{:02X} is out of range", pointer))
                })
            })
            .collect()
    }
}

impl ModbusRtu for SimulatedSensor {
    fn set_response_timeout(&mut self, timeout: Duration) {
        self.state().response_timeout = Some(timeout);
    }

    fn read_input_registers(
        &mut self,
        slave: u8,
        register: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransportError> {
        let mut state = self.state();
        state.transactions += 1;
        if state.offline || slave != state.address {
            return Err(TransportError::NoResponse { slave });
        }
        let start = register as usize;
        let end = start + count as usize;
        state
            .registers
            .get(start..end)
            .map(<[u16]>::to_vec)
            .ok_or_else(|| TransportError::ModbusException {
                slave,
                register,
                code: "IllegalDataAddress".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_register_file() {
        let sensor = SimulatedSensor::new();
        assert_eq!(sensor.register(0x00), Some(DEVICE_PID_GRAVITY));
        assert_eq!(sensor.register(0x01), Some(DEVICE_VID));
        assert_eq!(sensor.register(0x02), Some(0x22));
        assert_eq!(sensor.register(0x40), None);
    }

    #[test]
    fn test_i2c_pointer_selects_bytes() {
        let mut sensor = SimulatedSensor::new();
        sensor.set_register(0x0C, 0x03F5);

        sensor.write(0x22, &[0x18]).unwrap();
        assert_eq!(sensor.read(0x22, 2).unwrap(), vec![0x03, 0xF5]);

        // Odd pointer starts on the low byte
        sensor.write(0x22, &[0x19]).unwrap();
        assert_eq!(sensor.read(0x22, 1).unwrap(), vec![0xF5]);
        assert_eq!(sensor.transaction_count(), 4);
    }

    #[test]
    fn test_i2c_wrong_address_is_not_acknowledged() {
        let mut sensor = SimulatedSensor::new();
        assert!(matches!(
            sensor.write(0x23, &[0x00]),
            Err(TransportError::NoDevice { address: 0x23 })
        ));
    }

    #[test]
    fn test_modbus_out_of_range_is_an_exception() {
        let mut sensor = SimulatedSensor::new();
        let err = sensor.read_input_registers(0x22, 0x0F, 2).unwrap_err();
        assert!(matches!(err, TransportError::ModbusException { register: 0x0F, .. }));
    }

    #[test]
    fn test_offline_sensor_fails_everything() {
        let mut sensor = SimulatedSensor::new();
        sensor.set_offline(true);
        assert!(sensor.read(0x22, 2).is_err());
        assert!(sensor.read_input_register(0x22, 0x02).is_err());
    }

    #[test]
    fn test_clones_share_register_file() {
        let sensor = SimulatedSensor::new();
        let mut handle = sensor.clone();
        sensor.set_register(0x0B, 0xABCD);
        assert_eq!(handle.read_input_register(0x22, 0x0B).unwrap(), 0xABCD);
        handle.set_response_timeout(Duration::from_millis(200));
        assert_eq!(sensor.response_timeout(), Some(Duration::from_millis(200)));
    }
}
