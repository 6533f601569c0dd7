// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus-RTU client on a serial port
//!
//! Thin blocking wrapper around the `tokio-modbus` synchronous RTU client.
//! The sensor's serial link is fixed at 8 data bits, no parity, 1 stop bit;
//! only the baud rate is configurable.

use std::io::ErrorKind;
use std::time::Duration;

use log::debug;
use tokio_modbus::prelude::*;

use super::{ModbusRtu, TransportError};

/// Response timeout used until `set_response_timeout` is called
pub const OPEN_RESPONSE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Blocking Modbus-RTU master bound to one serial port
pub struct RtuClient {
    ctx: sync::Context,
    port: String,
    slave: u8,
}

impl RtuClient {
    /// Open `port` at `baud_rate` (8N1) with `slave` as the initial slave address
    pub fn open(port: &str, baud_rate: u32, slave: u8) -> Result<Self, TransportError> {
        let builder = tokio_serial::new(port, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One);

        let ctx = sync::rtu::connect_slave_with_timeout(
            &builder,
            Slave(slave),
            Some(OPEN_RESPONSE_TIMEOUT),
        )?;
        debug!(
            "Opened Modbus-RTU link on {} at {} baud, slave 0x{:02X}",
            port, baud_rate, slave
        );
        Ok(Self {
            ctx,
            port: port.to_string(),
            slave,
        })
    }

    /// Serial port this client talks on
    pub fn port(&self) -> &str {
        &self.port
    }

    fn select(&mut self, slave: u8) {
        if slave != self.slave {
            self.ctx.set_slave(Slave(slave));
            self.slave = slave;
        }
    }
}

impl ModbusRtu for RtuClient {
    fn set_response_timeout(&mut self, timeout: Duration) {
        self.ctx.set_timeout(timeout);
    }

    fn read_input_registers(
        &mut self,
        slave: u8,
        register: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransportError> {
        self.select(slave);
        match self.ctx.read_input_registers(register, count) {
            Ok(Ok(words)) => {
                debug!(
                    "Slave 0x{:02X} register 0x{:04X}: {:04X?}",
                    slave, register, words
                );
                Ok(words)
            }
            Ok(Err(code)) => Err(TransportError::ModbusException {
                slave,
                register,
                code: format!("{:?}", code),
            }),
            Err(tokio_modbus::Error::Transport(err)) if err.kind() == ErrorKind::TimedOut => {
                Err(TransportError::NoResponse { slave })
            }
            Err(tokio_modbus::Error::Transport(err)) => Err(TransportError::Io(err)),
            Err(err) => Err(TransportError::Io(std::io::Error::new(
                ErrorKind::InvalidData,
                err.to_string(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_timeout_differs_from_driver_timeout() {
        assert_eq!(OPEN_RESPONSE_TIMEOUT, Duration::from_millis(1000));
        assert_ne!(OPEN_RESPONSE_TIMEOUT, crate::sensor::DEFAULT_RESPONSE_TIMEOUT);
    }

    #[test]
    fn test_open_missing_port_fails() {
        let result = RtuClient::open("/dev/ttyDoesNotExist", 9600, 0x22);
        assert!(result.is_err());
    }
}
