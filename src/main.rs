// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-environmental-sensor project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the environmental sensor reader

use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info, warn};

use rust_environmental_sensor::config::{output_config_schema, Config, TransportType};
use rust_environmental_sensor::sensor::{EnvironmentalSensor, PressureUnit, TemperatureUnit};
use rust_environmental_sensor::transport;

/// Read a DFRobot SEN0500/SEN0501 environmental sensor
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (created with defaults if missing)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Transport: i2c, modbus_rtu or mock
    #[arg(short, long)]
    transport: Option<TransportType>,

    /// I2C bus device or serial port
    #[arg(short, long)]
    device: Option<String>,

    /// Sensor address, decimal or 0x-prefixed hexadecimal
    #[arg(short, long, value_parser = parse_address)]
    address: Option<u8>,

    /// Serial baud rate (Modbus-RTU only)
    #[arg(short, long)]
    baud_rate: Option<u32>,

    /// Report temperature in Fahrenheit
    #[arg(long)]
    fahrenheit: bool,

    /// Report pressure in kPa instead of hPa
    #[arg(long)]
    kpa: bool,

    /// Number of readings, 0 to read forever
    #[arg(short = 'n', long, default_value_t = 1)]
    count: u32,

    /// Delay between readings in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    interval_ms: u64,

    /// How many times to try initializing the sensor
    #[arg(long, default_value_t = 5)]
    init_attempts: u32,

    /// Print readings as JSON, one object per line
    #[arg(long)]
    json: bool,

    /// Debug logging and per-transaction sensor traces
    #[arg(short, long)]
    verbose: bool,

    /// Output the configuration JSON schema and exit
    #[arg(long)]
    show_config_schema: bool,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, default_level),
    );

    match run(args) {
        Ok(code) => process::exit(code),
        Err(err) => {
            error!("{:#}", err);
            process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<i32> {
    if args.show_config_schema {
        output_config_schema()?;
        return Ok(0);
    }

    let mut config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load configuration from {:?}", args.config))?;
    config.apply_args(
        args.transport,
        args.device,
        args.address,
        args.baud_rate,
        args.verbose,
    );
    config.validate()?;
    debug!("Effective configuration: {:?}", config);

    let temperature_unit = if args.fahrenheit {
        TemperatureUnit::Fahrenheit
    } else {
        TemperatureUnit::Celsius
    };
    let pressure_unit = if args.kpa {
        PressureUnit::Kilopascal
    } else {
        PressureUnit::Hectopascal
    };

    let link = transport::open(&config.transport, config.sensor.address)?;
    let mut sensor = EnvironmentalSensor::new(link, config.sensor.address)
        .with_settle_delay(config.sensor.settle_delay())
        .with_response_timeout(config.sensor.response_timeout())
        .with_verbose(config.sensor.verbose);

    let attempts = args.init_attempts.max(1);
    let mut attempt = 1;
    while let Err(err) = sensor.begin() {
        if attempt >= attempts {
            error!(
                "Sensor initialization failed after {} attempt(s): {}",
                attempt, err
            );
            return Ok(err.status_code());
        }
        warn!("Sensor initialization failed ({}), retrying", err);
        attempt += 1;
        thread::sleep(Duration::from_secs(1));
    }

    let identity = sensor.identity()?;
    info!(
        "Sensor PID 0x{:04X} VID 0x{:04X} firmware 0x{:04X} ({})",
        identity.pid,
        identity.vid,
        identity.version,
        identity
            .variant
            .map(|v| format!("{:?}", v))
            .unwrap_or_else(|| "unknown board".to_string())
    );

    let mut taken = 0u32;
    loop {
        let measurements = sensor.measure(temperature_unit, pressure_unit)?;
        if args.json {
            println!("{}", serde_json::to_string(&measurements)?);
        } else {
            println!("{}", measurements);
        }

        taken += 1;
        if args.count != 0 && taken >= args.count {
            break;
        }
        thread::sleep(Duration::from_millis(args.interval_ms));
    }

    Ok(0)
}
