// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! SEN0500/SEN0501 register map and identity constants

use serde::Serialize;

/// Product ID of the Gravity (SEN0501) board
pub const DEVICE_PID_GRAVITY: u16 = 0x01F5;
/// Product ID of the Breakout (SEN0500) board
pub const DEVICE_PID_BREAKOUT: u16 = 0x01F4;
/// Vendor ID reported by both boards
pub const DEVICE_VID: u16 = 0x3343;

/// Factory device address on both I2C and Modbus
pub const DEFAULT_DEVICE_ADDRESS: u8 = 0x22;
/// Modbus broadcast address, never answered
pub const BROADCAST_ADDRESS: u8 = 0x00;
/// Highest usable device address
pub const MAX_DEVICE_ADDRESS: u8 = 0xF7;

/// Firmware revision reporting the UV index as a digital count
pub const UV_DIGITAL_FIRMWARE: u16 = 0x1001;

/// Baud rate of the sensor's serial link, not changeable on the device
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Logical 16-bit registers of the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum Register {
    Pid = 0x0000,
    Vid = 0x0001,
    DeviceAddress = 0x0002,
    UartCtrl0 = 0x0003,
    UartCtrl1 = 0x0004,
    Version = 0x0005,
    UltravioletIntensity = 0x0008,
    LuminousIntensity = 0x0009,
    Temperature = 0x000A,
    Humidity = 0x000B,
    AtmosphericPressure = 0x000C,
    Elevation = 0x000D,
}

impl Register {
    /// Every mapped register, in address order
    pub const ALL: [Register; 12] = [
        Register::Pid,
        Register::Vid,
        Register::DeviceAddress,
        Register::UartCtrl0,
        Register::UartCtrl1,
        Register::Version,
        Register::UltravioletIntensity,
        Register::LuminousIntensity,
        Register::Temperature,
        Register::Humidity,
        Register::AtmosphericPressure,
        Register::Elevation,
    ];

    /// Word offset of the register
    pub const fn offset(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::Pid => "PID",
            Register::Vid => "VID",
            Register::DeviceAddress => "DEVICE_ADDR",
            Register::UartCtrl0 => "UART_CTRL0",
            Register::UartCtrl1 => "UART_CTRL1",
            Register::Version => "VERSION",
            Register::UltravioletIntensity => "ULTRAVIOLET_INTENSITY",
            Register::LuminousIntensity => "LUMINOUS_INTENSITY",
            Register::Temperature => "TEMP",
            Register::Humidity => "HUMIDITY",
            Register::AtmosphericPressure => "ATMOSPHERIC_PRESSURE",
            Register::Elevation => "ELEVATION",
        }
    }
}

/// Board variant, told apart by product ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorVariant {
    /// SEN0501, Gravity connector
    Gravity,
    /// SEN0500, bare breakout
    Breakout,
}

impl SensorVariant {
    pub fn from_pid(pid: u16) -> Option<Self> {
        match pid {
            DEVICE_PID_GRAVITY => Some(SensorVariant::Gravity),
            DEVICE_PID_BREAKOUT => Some(SensorVariant::Breakout),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_offsets() {
        assert_eq!(Register::Pid.offset(), 0x00);
        assert_eq!(Register::Version.offset(), 0x05);
        assert_eq!(Register::UltravioletIntensity.offset(), 0x08);
        assert_eq!(Register::Temperature.offset(), 0x0A);
        assert_eq!(Register::Elevation.offset(), 0x0D);
    }

    #[test]
    fn test_register_table_is_sorted() {
        let offsets: Vec<u16> = Register::ALL.iter().map(|r| r.offset()).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
    }

    #[test]
    fn test_variant_from_pid() {
        assert_eq!(SensorVariant::from_pid(0x01F5), Some(SensorVariant::Gravity));
        assert_eq!(SensorVariant::from_pid(0x01F4), Some(SensorVariant::Breakout));
        assert_eq!(SensorVariant::from_pid(0x1234), None);
    }
}
