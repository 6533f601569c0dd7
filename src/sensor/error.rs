// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use thiserror::Error;

use crate::transport::TransportError;

/// Errors reported by the sensor driver
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Address 0x00 is the broadcast address, no sensor answers on it")]
    BroadcastAddress,

    #[error("Sensor at 0x{expected:02X} reports address 0x{reported:02X}")]
    AddressMismatch { expected: u8, reported: u8 },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl SensorError {
    /// Status code reported to callers that expect the `0` / `-1` convention
    pub fn status_code(&self) -> i32 {
        -1
    }
}

/// Map an initialisation result to the `0` / `-1` status convention
pub fn status_code<T>(result: &Result<T, SensorError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => e.status_code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_failure_maps_to_minus_one() {
        let errors = [
            SensorError::BroadcastAddress,
            SensorError::AddressMismatch {
                expected: 0x22,
                reported: 0x23,
            },
            SensorError::Transport(TransportError::NoResponse { slave: 0x22 }),
        ];
        for error in &errors {
            assert_eq!(error.status_code(), -1);
        }
        assert_eq!(status_code::<()>(&Ok(())), 0);
        assert_eq!(status_code::<()>(&Err(SensorError::BroadcastAddress)), -1);
    }

    #[test]
    fn test_mismatch_message_shows_both_addresses() {
        let error = SensorError::AddressMismatch {
            expected: 0x22,
            reported: 0x40,
        };
        assert_eq!(error.to_string(), "Sensor at 0x22 reports address 0x40");
    }
}
