// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Raw register value to physical unit conversions
//!
//! Every function here is pure: it takes the big-endian 16-bit value read
//! from a register and returns the quantity the sensor datasheet defines for
//! it. The driver calls them right after each register read.

use serde::{Deserialize, Serialize};

use super::registers::UV_DIGITAL_FIRMWARE;

/// Lowest analog UV sensor output considered meaningful, in volts
pub const UV_VOLTAGE_MIN: f32 = 0.99;
/// Analog UV output clamp ceiling, in volts
pub const UV_VOLTAGE_CLAMP_MAX: f32 = 2.99;
/// Analog UV output mapped to the top of the index scale, in volts
///
/// Below [`UV_VOLTAGE_CLAMP_MAX`], so a clamped reading maps slightly above 15.
pub const UV_VOLTAGE_SCALE_MAX: f32 = 2.9;
/// Top of the UV index scale
pub const UV_INDEX_MAX: f32 = 15.0;
/// Digital UV count per index unit on firmware 0x1001
pub const UV_DIGITAL_SCALE: f32 = 1800.0;

/// Sea-level reference pressure used by the elevation formula, in hPa
pub const SEA_LEVEL_PRESSURE_HPA: f32 = 1015.0;

/// Temperature unit selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

/// Atmospheric pressure unit selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureUnit {
    #[default]
    Hectopascal,
    Kilopascal,
}

impl PressureUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            PressureUnit::Hectopascal => "hPa",
            PressureUnit::Kilopascal => "kPa",
        }
    }
}

/// Temperature in °C from the TEMP register
pub fn celsius_from_raw(raw: u16) -> f32 {
    (-45.0 + (f64::from(raw) * 175.0) / 1024.0 / 64.0) as f32
}

pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    (f64::from(celsius) * 1.8 + 32.0) as f32
}

/// Temperature from the TEMP register in the requested unit
pub fn temperature_from_raw(raw: u16, unit: TemperatureUnit) -> f32 {
    let celsius = celsius_from_raw(raw);
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius_to_fahrenheit(celsius),
    }
}

/// Relative humidity in percent from the HUMIDITY register
pub fn humidity_from_raw(raw: u16) -> f32 {
    f32::from(raw) * 100.0 / 65536.0
}

/// Linearly remap `x` from `[in_min, in_max]` to `[out_min, out_max]`
///
/// No range check: `in_min == in_max` divides by zero.
pub fn map_float(x: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Output voltage of the analog UV sensor from a 10-bit ADC code
pub fn uv_voltage_from_raw(raw: u16) -> f32 {
    3.0 * f32::from(raw) / 1024.0
}

/// UV index from the ULTRAVIOLET_INTENSITY register
///
/// Firmware 0x1001 reports a digital count; every other revision reports the
/// ADC code of an analog UV sensor, which is clamped then mapped onto 0..15.
pub fn uv_index_from_raw(version: u16, raw: u16) -> f32 {
    if version == UV_DIGITAL_FIRMWARE {
        return f32::from(raw) / UV_DIGITAL_SCALE;
    }

    let mut voltage = uv_voltage_from_raw(raw);
    if voltage <= UV_VOLTAGE_MIN {
        voltage = UV_VOLTAGE_MIN;
    } else if voltage >= UV_VOLTAGE_CLAMP_MAX {
        voltage = UV_VOLTAGE_CLAMP_MAX;
    }
    map_float(
        voltage,
        UV_VOLTAGE_MIN,
        UV_VOLTAGE_SCALE_MAX,
        0.0,
        UV_INDEX_MAX,
    )
}

/// Illuminance in lux from the LUMINOUS_INTENSITY register
///
/// Fourth degree correction curve of the light sensor.
pub fn luminous_from_raw(raw: u16) -> f32 {
    let x = f32::from(raw);
    x * (1.0023 + x * (8.1488e-5 + x * (-9.3924e-9 + x * 6.0135e-13)))
}

/// Atmospheric pressure from the ATMOSPHERIC_PRESSURE register
///
/// The register holds hPa; kPa is an integer division.
pub fn pressure_from_raw(raw: u16, unit: PressureUnit) -> u16 {
    match unit {
        PressureUnit::Hectopascal => raw,
        PressureUnit::Kilopascal => raw / 10,
    }
}

/// Elevation in meters from the ATMOSPHERIC_PRESSURE register (barometric formula)
pub fn elevation_from_raw(raw: u16) -> f32 {
    let ratio = f64::from(f32::from(raw) / SEA_LEVEL_PRESSURE_HPA);
    (44330.0 * (1.0 - ratio.powf(0.1903))) as f32
}
