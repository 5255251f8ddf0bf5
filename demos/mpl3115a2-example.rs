use chrono::Local;
use clap::{Parser, ValueEnum};
use log::{error, info};
use std::path::Path;
use std::process::ExitCode;
use std::{thread, time};

use mpl3115a2_i2c::i2cio;
use mpl3115a2_i2c::mpl3115a2::*;

const EXIT_CODE_SET_CTR_C_HNDLR_FAILED: u8 = 0x02;
const EXIT_CODE_BUS_INIT_FAILED: u8 = 0x71;
const EXIT_CODE_DEVICE_ID_FAILED: u8 = 0x72;
const EXIT_CODE_RESET_FAILED: u8 = 0x73;
const EXIT_CODE_SET_SEA_LEVEL_FAILED: u8 = 0x74;
const EXIT_CODE_MEASUREMENT_FAILED: u8 = 0x75;

const RESET_STARTUP_DELAY_MS: u64 = 50;
const DATA_ACQUISITION_DELAY_MS: u64 = 2000;

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum AcquisitionMode {
    Barometer,
    Altimeter,
}

#[derive(Parser)]
struct Args {
    // -- i2c bus device
    bus_path: String,
    #[clap(value_enum)]
    mode: AcquisitionMode,
    // -- averaging depth, 2^ratio samples
    #[clap(default_value_t = 3)]
    oversample_ratio: i32,
}

fn main() -> ExitCode {
    // -- read .env file
    dotenv::dotenv().ok();
    // -- setup logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let now = Local::now();
    info!("Starting up: {now}");

    let args = Args::parse();
    let bus_path = args.bus_path;
    info!("Using i2c bus device {bus_path}");

    // -- set handler for Ctrl-C
    if let Err(err) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, terminating...");
        std::process::exit(0);
    }) {
        error!("ERROR - Failed to set Ctrl-C handler: {err}");
        return ExitCode::from(EXIT_CODE_SET_CTR_C_HNDLR_FAILED);
    }

    info!("Initializing MPL3115A2");
    let bus_path = Path::new(&bus_path);
    let mut bus = match i2cio::get_bus(bus_path) {
        Ok(bus) => bus,
        Err(err) => {
            error!("ERROR - Failed to open i2c bus: {err}");
            return ExitCode::from(EXIT_CODE_BUS_INIT_FAILED);
        }
    };
    let dev_addr = Mpl3115a2DeviceAddress::Default;
    if let Err(err) = i2cio::set_slave(&mut bus, dev_addr.value()) {
        error!("ERROR - Failed to set slave address: {err}");
        return ExitCode::from(EXIT_CODE_BUS_INIT_FAILED);
    }

    let sensor = MPL3115A2::new();
    // -- check if device is available by reading its id
    let device_id = match sensor.read_device_id(&mut bus) {
        Ok(device_id) => device_id,
        Err(err) => {
            error!("ERROR - Failed to read device id: {err}");
            return ExitCode::from(EXIT_CODE_DEVICE_ID_FAILED);
        }
    };
    if device_id != sensor.device_id() {
        error!(
            "ERROR - Found unknown device id '{device_id:#04x}', expected '{:#04x}'",
            sensor.device_id()
        );
        return ExitCode::from(EXIT_CODE_DEVICE_ID_FAILED);
    }
    // -- start from a known state
    if let Err(err) = sensor.reset(&mut bus) {
        error!("ERROR - Failed to reset sensor: {err}");
        return ExitCode::from(EXIT_CODE_RESET_FAILED);
    }
    thread::sleep(time::Duration::from_millis(RESET_STARTUP_DELAY_MS));

    if args.mode == AcquisitionMode::Altimeter {
        // -- altitude is computed against the sea level reference
        let sea_level = sensor.get_default_sea_level_pressure();
        info!("Setting sea level reference pressure to {sea_level} Pa");
        if let Err(err) = sensor.modify_sea_level_pressure(&mut bus, sea_level) {
            error!("ERROR - Failed to set sea level reference: {err}");
            return ExitCode::from(EXIT_CODE_SET_SEA_LEVEL_FAILED);
        }
    }

    loop {
        match args.mode {
            AcquisitionMode::Barometer => {
                let (pressure, temperature) =
                    match sensor.measure_pressure(&mut bus, args.oversample_ratio) {
                        Ok(vals) => vals,
                        Err(err) => {
                            error!("ERROR - Failed to measure pressure: {err}");
                            return ExitCode::from(EXIT_CODE_MEASUREMENT_FAILED);
                        }
                    };
                info!("pressure: {pressure} Pa, temperature: {temperature} *C");
            }
            AcquisitionMode::Altimeter => {
                let (altitude, temperature) =
                    match sensor.measure_altitude(&mut bus, args.oversample_ratio) {
                        Ok(vals) => vals,
                        Err(err) => {
                            error!("ERROR - Failed to measure altitude: {err}");
                            return ExitCode::from(EXIT_CODE_MEASUREMENT_FAILED);
                        }
                    };
                info!("altitude: {altitude} m, temperature: {temperature} *C");
            }
        }
        // -- delay next reading
        let data_acquisition_delay = time::Duration::from_millis(DATA_ACQUISITION_DELAY_MS);
        thread::sleep(data_acquisition_delay);
    }
}
