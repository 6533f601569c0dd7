// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use rust_environmental_sensor::config::{Config, TransportType};
use rust_environmental_sensor::sensor::{EnvironmentalSensor, Register};
use rust_environmental_sensor::transport;

/// Dump the raw register map of an environmental sensor
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Configuration file providing transport defaults
    #[clap(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Transport: i2c, modbus_rtu or mock
    #[clap(long)]
    transport: Option<TransportType>,

    /// I2C bus device or serial port
    #[clap(long)]
    device: Option<String>,

    /// Sensor address (decimal)
    #[clap(long)]
    address: Option<u8>,

    /// Serial baud rate
    #[clap(long)]
    baud_rate: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let args = Args::parse();

    let mut config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load configuration from {:?}", args.config))?;
    config.apply_args(
        args.transport,
        args.device,
        args.address,
        args.baud_rate,
        false,
    );

    println!(
        "Reading sensor 0x{:02X} over {} on {}",
        config.sensor.address, config.transport.transport_type, config.transport.device
    );
    let link = transport::open(&config.transport, config.sensor.address)?;
    let mut sensor = EnvironmentalSensor::new(link, config.sensor.address)
        .with_settle_delay(Duration::ZERO)
        .with_response_timeout(config.sensor.response_timeout());

    for register in Register::ALL {
        let mut buf = [0u8; 2];
        match sensor.read_register(register, Some(&mut buf)) {
            Ok(_) => {
                let value = u16::from_be_bytes(buf);
                println!(
                    "0x{:04X} {:<22} 0x{:04X} ({})",
                    register.offset(),
                    register.name(),
                    value,
                    value
                );
            }
            Err(e) => println!(
                "0x{:04X} {:<22} error: {}",
                register.offset(),
                register.name(),
                e
            ),
        }
    }

    Ok(())
}
