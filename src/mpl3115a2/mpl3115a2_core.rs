#[allow(unused_imports)]
use log::{debug, info, warn};
use std::{thread, time};

use crate::i2cio::I2cBus;

use super::mpl3115a2_enums::*;
use super::mpl3115a2_fixed::*;

// -- device id held in MPL3115A2_REG_DEVICE_ID
const MPL3115A2_DEVICE_ID: u8 = 0xc4;

// -- length of multi-byte registers
const MPL3115A2_LEN_PRESSURE_DATA: usize = 3;
const MPL3115A2_LEN_TEMPERATURE_DATA: usize = 2;
#[allow(dead_code)]
const MPL3115A2_LEN_PRESSURE_DELTA: usize = 3;
#[allow(dead_code)]
const MPL3115A2_LEN_TEMPERATURE_DELTA: usize = 2;
#[allow(dead_code)]
const MPL3115A2_LEN_BAROMETRIC_INPUT: usize = 2;
#[allow(dead_code)]
const MPL3115A2_LEN_PRESSURE_TARGET: usize = 2;
#[allow(dead_code)]
const MPL3115A2_LEN_PRESSURE_WINDOW: usize = 2;
#[allow(dead_code)]
const MPL3115A2_LEN_PRESSURE_MIN: usize = 3;
#[allow(dead_code)]
const MPL3115A2_LEN_TEMPERATURE_MIN: usize = 2;
#[allow(dead_code)]
const MPL3115A2_LEN_PRESSURE_MAX: usize = 3;
#[allow(dead_code)]
const MPL3115A2_LEN_TEMPERATURE_MAX: usize = 2;

// -- registers
const MPL3115A2_REG_STATUS: u8 = 0x00;
#[allow(dead_code)]
const MPL3115A2_REG_PRESSURE_DATA: u8 = 0x01;
#[allow(dead_code)]
const MPL3115A2_REG_TEMPERATURE_DATA: u8 = 0x04;
const MPL3115A2_REG_DR_STATUS: u8 = 0x06;
#[allow(dead_code)]
const MPL3115A2_REG_PRESSURE_DELTA: u8 = 0x07;
#[allow(dead_code)]
const MPL3115A2_REG_TEMPERATURE_DELTA: u8 = 0x0a;
const MPL3115A2_REG_DEVICE_ID: u8 = 0x0c;
#[allow(dead_code)]
const MPL3115A2_REG_FIFO_STATUS: u8 = 0x0d;
#[allow(dead_code)]
const MPL3115A2_REG_FIFO_DATA: u8 = 0x0e;
#[allow(dead_code)]
const MPL3115A2_REG_FIFO_SETUP: u8 = 0x0f;
#[allow(dead_code)]
const MPL3115A2_REG_TIME_DELAY: u8 = 0x10;
#[allow(dead_code)]
const MPL3115A2_REG_SYSTEM_MODE: u8 = 0x11;
#[allow(dead_code)]
const MPL3115A2_REG_INT_SOURCE: u8 = 0x12;
const MPL3115A2_REG_EVENT_CONFIG: u8 = 0x13;
const MPL3115A2_REG_BAROMETRIC_INPUT: u8 = 0x14;
#[allow(dead_code)]
const MPL3115A2_REG_PRESSURE_TARGET: u8 = 0x16;
#[allow(dead_code)]
const MPL3115A2_REG_TEMPERATURE_TARGET: u8 = 0x18;
#[allow(dead_code)]
const MPL3115A2_REG_PRESSURE_WINDOW: u8 = 0x19;
#[allow(dead_code)]
const MPL3115A2_REG_TEMPERATURE_WINDOW: u8 = 0x1b;
#[allow(dead_code)]
const MPL3115A2_REG_PRESSURE_MIN: u8 = 0x1c;
#[allow(dead_code)]
const MPL3115A2_REG_TEMPERATURE_MIN: u8 = 0x1e;
#[allow(dead_code)]
const MPL3115A2_REG_PRESSURE_MAX: u8 = 0x21;
#[allow(dead_code)]
const MPL3115A2_REG_TEMPERATURE_MAX: u8 = 0x24;
const MPL3115A2_REG_CTRL_REG1: u8 = 0x26;
#[allow(dead_code)]
const MPL3115A2_REG_CTRL_REG2: u8 = 0x27;
#[allow(dead_code)]
const MPL3115A2_REG_CTRL_REG3: u8 = 0x28;
#[allow(dead_code)]
const MPL3115A2_REG_CTRL_REG4: u8 = 0x29;
#[allow(dead_code)]
const MPL3115A2_REG_CTRL_REG5: u8 = 0x2a;
const MPL3115A2_REG_PRESSURE_OFFSET: u8 = 0x2b;
const MPL3115A2_REG_TEMPERATURE_OFFSET: u8 = 0x2c;
const MPL3115A2_REG_ALTITUDE_OFFSET: u8 = 0x2d;

// -- DR_STATUS flags
const MPL3115A2_PRES_TEMP_DATA_READY_BIT: u8 = 0x08;
const MPL3115A2_PRES_DATA_READY_BIT: u8 = 0x04;
const MPL3115A2_TEMP_DATA_READY_BIT: u8 = 0x02;

// -- CTRL_REG1 bits
const MPL3115A2_CTRL_ALTIMETER_BIT: u8 = 0x80;
const MPL3115A2_CTRL_RESET_BIT: u8 = 0x04;
const MPL3115A2_CTRL_ACTIVE_BIT: u8 = 0x01;
const MPL3115A2_CTRL_OVERSAMPLE_SHIFT: u8 = 3;
const MPL3115A2_OVERSAMPLE_RATIO_MAX: i32 = 7;

// -- event configuration flags
const MPL3115A2_EVENT_TEMPERATURE_BIT: u8 = 0x01;
const MPL3115A2_EVENT_PRESSURE_BIT: u8 = 0x02;
const MPL3115A2_EVENT_DATA_READY_BIT: u8 = 0x04;

// -- compensation limits, in register granularity
const MPL3115A2_PRESSURE_SHIFT_MIN_PA: i16 = -512;
const MPL3115A2_PRESSURE_SHIFT_MAX_PA: i16 = 508;
const MPL3115A2_TEMPERATURE_SHIFT_MIN: f32 = -8.0;
const MPL3115A2_TEMPERATURE_SHIFT_MAX: f32 = 7.9375;

// -- barometric input power-on default is 50663 two-Pascal units
const MPL3115A2_DEFAULT_SEA_LEVEL_PRESSURE_PA: u32 = 101326;

const MPL3115A2_POLL_INTERVAL_MS: u64 = 2;
const MPL3115A2_POLL_MAX_ATTEMPTS: u32 = 500;

// -- status poll policy for one measurement, bounds the data ready wait
#[derive(Clone, Debug)]
pub struct Mpl3115a2PollConfig {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for Mpl3115a2PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: MPL3115A2_POLL_INTERVAL_MS,
            max_attempts: MPL3115A2_POLL_MAX_ATTEMPTS,
        }
    }
}

/// MPL3115A2 driver handle. Holds no device state; the bus is passed to every
/// call, so callers sharing one bus between threads must serialize access.
pub struct MPL3115A2 {
    // -- driver side poll policy, not device state
    poll_config: Mpl3115a2PollConfig,
}

impl Default for MPL3115A2 {
    fn default() -> Self {
        Self::new()
    }
}

impl MPL3115A2 {
    pub fn new() -> Self {
        MPL3115A2 {
            poll_config: Mpl3115a2PollConfig::default(),
        }
    }

    pub fn with_poll_config(poll_config: Mpl3115a2PollConfig) -> Self {
        MPL3115A2 { poll_config }
    }

    // -- oversample ratio n selects 2^n averaging, encoded into bits 3-5
    fn encode_ctrl_oversample_ratio(oversample_ratio: i32) -> Result<u8, std::io::Error> {
        if !(0..=MPL3115A2_OVERSAMPLE_RATIO_MAX).contains(&oversample_ratio) {
            let errmsg = format!(
                "oversample ratio '{oversample_ratio}' out of range [0..{MPL3115A2_OVERSAMPLE_RATIO_MAX}]"
            );
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, errmsg));
        }
        Ok((oversample_ratio as u8) << MPL3115A2_CTRL_OVERSAMPLE_SHIFT)
    }

    fn encode_ctrl_altimeter_mode(altimeter_mode: bool) -> u8 {
        match altimeter_mode {
            false => 0,
            true => MPL3115A2_CTRL_ALTIMETER_BIT,
        }
    }

    fn encode_ctrl_reset_bit(activate_reset: bool) -> u8 {
        match activate_reset {
            false => 0,
            true => MPL3115A2_CTRL_RESET_BIT,
        }
    }

    fn encode_ctrl_active_status(activate_sensor: bool) -> u8 {
        match activate_sensor {
            false => 0,
            true => MPL3115A2_CTRL_ACTIVE_BIT,
        }
    }

    fn encode_event_flags(temperature_event: bool, pressure_event: bool) -> u8 {
        let mut flags = 0;
        if temperature_event {
            flags |= MPL3115A2_EVENT_TEMPERATURE_BIT;
        }
        if pressure_event {
            flags |= MPL3115A2_EVENT_PRESSURE_BIT;
        }
        if temperature_event || pressure_event {
            flags |= MPL3115A2_EVENT_DATA_READY_BIT;
        }
        flags
    }

    fn read_status_reg(bus: &mut impl I2cBus) -> Result<u8, std::io::Error> {
        bus.read_byte(MPL3115A2_REG_STATUS)
    }

    fn write_ctrl_reg1(bus: &mut impl I2cBus, value: u8) -> Result<(), std::io::Error> {
        debug!("Setting register MPL3115A2_REG_CTRL_REG1 {MPL3115A2_REG_CTRL_REG1:#x} to value {value:#010b}");
        bus.write_byte(MPL3115A2_REG_CTRL_REG1, value)
    }

    fn write_event_mode(
        bus: &mut impl I2cBus,
        temperature_event: bool,
        pressure_event: bool,
    ) -> Result<(), std::io::Error> {
        let flags = Self::encode_event_flags(temperature_event, pressure_event);
        debug!("Setting register MPL3115A2_REG_EVENT_CONFIG {MPL3115A2_REG_EVENT_CONFIG:#x} to value {flags:#010b}");
        bus.write_byte(MPL3115A2_REG_EVENT_CONFIG, flags)
    }

    pub fn read_device_id(&self, bus: &mut impl I2cBus) -> Result<u8, std::io::Error> {
        let device_id = bus.read_byte(MPL3115A2_REG_DEVICE_ID)?;
        debug!("Got device id: {device_id:#04x}");
        Ok(device_id)
    }

    /// Expected value of the device id register.
    pub fn device_id(&self) -> u8 {
        MPL3115A2_DEVICE_ID
    }

    pub fn get_dr_status(
        &self,
        bus: &mut impl I2cBus,
    ) -> Result<
        (
            Mpl3115a2StatusPressureTemperatureData,
            Mpl3115a2StatusPressureData,
            Mpl3115a2StatusTemperatureData,
        ),
        std::io::Error,
    > {
        let reg_val = bus.read_byte(MPL3115A2_REG_DR_STATUS)?;
        debug!("Got register MPL3115A2_REG_DR_STATUS {MPL3115A2_REG_DR_STATUS:#x} value {reg_val:#010b}");
        let pres_temp_ready = match (reg_val & MPL3115A2_PRES_TEMP_DATA_READY_BIT) > 0 {
            false => Mpl3115a2StatusPressureTemperatureData::NotReady,
            true => Mpl3115a2StatusPressureTemperatureData::Ready,
        };
        let pres_ready = match (reg_val & MPL3115A2_PRES_DATA_READY_BIT) > 0 {
            false => Mpl3115a2StatusPressureData::NotReady,
            true => Mpl3115a2StatusPressureData::Ready,
        };
        let temp_ready = match (reg_val & MPL3115A2_TEMP_DATA_READY_BIT) > 0 {
            false => Mpl3115a2StatusTemperatureData::NotReady,
            true => Mpl3115a2StatusTemperatureData::Ready,
        };
        Ok((pres_temp_ready, pres_ready, temp_ready))
    }

    /// Measure altitude in meters and temperature in degrees Celsius.
    /// The oversample ratio selects 2^ratio averaging, range [0..7].
    pub fn measure_altitude(
        &self,
        bus: &mut impl I2cBus,
        oversample_ratio: i32,
    ) -> Result<(f32, f32), std::io::Error> {
        let (raw_pressure, raw_temperature) =
            self.measure_raw(bus, oversample_ratio, Mpl3115a2PressureMode::Altimeter)?;
        let (pres_int, pres_frac) = raw_pressure.to_signed_q16_4();
        let (temp_int, temp_frac) = raw_temperature.to_signed_q8_4();
        let altitude = pres_int as f32 + pres_frac as f32 / (1 << 4) as f32;
        let temperature = temp_int as f32 + temp_frac as f32 / (1 << 4) as f32;
        Ok((altitude, temperature))
    }

    /// Measure pressure in Pascal and temperature in degrees Celsius.
    /// The oversample ratio selects 2^ratio averaging, range [0..7].
    pub fn measure_pressure(
        &self,
        bus: &mut impl I2cBus,
        oversample_ratio: i32,
    ) -> Result<(f32, f32), std::io::Error> {
        let (raw_pressure, raw_temperature) =
            self.measure_raw(bus, oversample_ratio, Mpl3115a2PressureMode::Barometer)?;
        let (pres_int, pres_frac) = raw_pressure.to_unsigned_q18_2();
        let (temp_int, temp_frac) = raw_temperature.to_signed_q8_4();
        let pressure = pres_int as f32 + pres_frac as f32 / (1 << 2) as f32;
        let temperature = temp_int as f32 + temp_frac as f32 / (1 << 4) as f32;
        Ok((pressure, temperature))
    }

    fn measure_raw(
        &self,
        bus: &mut impl I2cBus,
        oversample_ratio: i32,
        pressure_mode: Mpl3115a2PressureMode,
    ) -> Result<(RawPressure, RawTemperature), std::io::Error> {
        debug!("Measuring in {pressure_mode} mode...");
        let altimeter_mode = pressure_mode == Mpl3115a2PressureMode::Altimeter;
        let mut flags = Self::encode_ctrl_altimeter_mode(altimeter_mode);
        flags |= Self::encode_ctrl_oversample_ratio(oversample_ratio)?;
        // -- set mode and oversample ratio, activation comes as a second write
        Self::write_ctrl_reg1(bus, flags)?;
        // -- raise data event flags for both pressure and temperature
        Self::write_event_mode(bus, true, true)?;
        flags |= Self::encode_ctrl_active_status(true);
        Self::write_ctrl_reg1(bus, flags)?;
        // -- wait until the conversion cycle is done
        let mut attempts: u32 = 0;
        loop {
            thread::sleep(time::Duration::from_millis(self.poll_config.interval_ms));
            let status = Self::read_status_reg(bus)?;
            if status & MPL3115A2_PRES_TEMP_DATA_READY_BIT != 0 {
                break;
            }
            attempts += 1;
            if attempts >= self.poll_config.max_attempts {
                let errmsg = format!("no data ready after {attempts} status polls");
                return Err(std::io::Error::new(std::io::ErrorKind::TimedOut, errmsg));
            }
        }
        Self::read_raw_pressure_temperature(bus)
    }

    fn read_raw_pressure_temperature(
        bus: &mut impl I2cBus,
    ) -> Result<(RawPressure, RawTemperature), std::io::Error> {
        const BLOCK_LEN: usize =
            1 + MPL3115A2_LEN_PRESSURE_DATA + MPL3115A2_LEN_TEMPERATURE_DATA;
        // -- set the read cursor to STATUS, then fetch status and samples in one transfer
        bus.write_bytes(&[MPL3115A2_REG_STATUS])?;
        let mut read_buf: [u8; BLOCK_LEN] = [0; BLOCK_LEN];
        bus.read_bytes(&mut read_buf)?;
        debug!("Got raw sample block: {read_buf:02x?}");
        let raw_pressure = RawPressure {
            pres_msb: read_buf[1],
            pres_csb: read_buf[2],
            pres_lsb: read_buf[3],
        };
        let raw_temperature = RawTemperature {
            temp_msb: read_buf[4],
            temp_lsb: read_buf[5],
        };
        Ok((raw_pressure, raw_temperature))
    }

    /// Reboot the sensor. The device terminates the bus connection while it
    /// restarts, so a failing write here is expected and not surfaced.
    pub fn reset(&self, bus: &mut impl I2cBus) -> Result<(), std::io::Error> {
        debug!("Resetting sensor...");
        let flags = Self::encode_ctrl_reset_bit(true);
        if let Err(err) = Self::write_ctrl_reg1(bus, flags) {
            debug!("Ignoring write failure while the sensor reboots: {err}");
        }
        Ok(())
    }

    /// Put the sensor back into standby mode.
    pub fn set_standby(&self, bus: &mut impl I2cBus) -> Result<(), std::io::Error> {
        Self::write_ctrl_reg1(bus, Self::encode_ctrl_active_status(false))
    }

    /// Change the sea level reference used by the device for altitude
    /// calculation. The register holds the value in 2 Pa units.
    pub fn modify_sea_level_pressure(
        &self,
        bus: &mut impl I2cBus,
        pressure_at_sea_level: u32,
    ) -> Result<(), std::io::Error> {
        let reg_val = pressure_at_sea_level / 2;
        debug!("Setting register MPL3115A2_REG_BAROMETRIC_INPUT {MPL3115A2_REG_BAROMETRIC_INPUT:#x} to value {reg_val}");
        bus.write_bytes(&[
            MPL3115A2_REG_BAROMETRIC_INPUT,
            (reg_val >> 8) as u8,
            (reg_val & 0xff) as u8,
        ])
    }

    pub fn get_default_sea_level_pressure(&self) -> u32 {
        MPL3115A2_DEFAULT_SEA_LEVEL_PRESSURE_PA
    }

    /// Shift reported altitude by -128 to +127 meters.
    pub fn compensate_altitude(
        &self,
        bus: &mut impl I2cBus,
        shift_m: i8,
    ) -> Result<(), std::io::Error> {
        debug!("Setting altitude offset to {shift_m} m");
        bus.write_byte(MPL3115A2_REG_ALTITUDE_OFFSET, shift_m as u8)
    }

    /// Shift reported pressure by -512 to +508 Pascal, in 4 Pa steps.
    pub fn compensate_pressure(
        &self,
        bus: &mut impl I2cBus,
        shift_pa: i16,
    ) -> Result<(), std::io::Error> {
        if !(MPL3115A2_PRESSURE_SHIFT_MIN_PA..=MPL3115A2_PRESSURE_SHIFT_MAX_PA).contains(&shift_pa)
        {
            let errmsg = format!(
                "pressure compensation '{shift_pa}' out of range [{MPL3115A2_PRESSURE_SHIFT_MIN_PA}..{MPL3115A2_PRESSURE_SHIFT_MAX_PA}]"
            );
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, errmsg));
        }
        let reg_val = (shift_pa / 4) as i8;
        debug!("Setting pressure offset to {shift_pa} Pa, register value {reg_val}");
        bus.write_byte(MPL3115A2_REG_PRESSURE_OFFSET, reg_val as u8)
    }

    /// Shift reported temperature by -8 to +7.9375 degrees Celsius, in
    /// 0.0625 degree steps.
    pub fn compensate_temperature(
        &self,
        bus: &mut impl I2cBus,
        shift_deg: f32,
    ) -> Result<(), std::io::Error> {
        if !(MPL3115A2_TEMPERATURE_SHIFT_MIN..=MPL3115A2_TEMPERATURE_SHIFT_MAX)
            .contains(&shift_deg)
        {
            let errmsg = format!(
                "temperature compensation '{shift_deg}' out of range [{MPL3115A2_TEMPERATURE_SHIFT_MIN}..{MPL3115A2_TEMPERATURE_SHIFT_MAX}]"
            );
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, errmsg));
        }
        let reg_val = (shift_deg * 16.0) as i8;
        debug!("Setting temperature offset to {shift_deg} degrees, register value {reg_val}");
        bus.write_byte(MPL3115A2_REG_TEMPERATURE_OFFSET, reg_val as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq)]
    enum BusTransaction {
        WriteByte { register: u8, value: u8 },
        WriteBytes { data: Vec<u8> },
        ReadByte { register: u8 },
        ReadBytes { len: usize },
    }

    // -- records transactions, serves pre-programmed read data
    #[derive(Default)]
    struct MockBus {
        transactions: Vec<BusTransaction>,
        byte_reads: VecDeque<u8>,
        block_reads: VecDeque<Vec<u8>>,
        fail_writes: bool,
    }

    impl I2cBus for MockBus {
        fn read_byte(&mut self, register: u8) -> Result<u8, std::io::Error> {
            self.transactions.push(BusTransaction::ReadByte { register });
            self.byte_reads
                .pop_front()
                .ok_or_else(|| std::io::Error::other("no byte read programmed"))
        }

        fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), std::io::Error> {
            self.transactions
                .push(BusTransaction::ReadBytes { len: buf.len() });
            let data = self
                .block_reads
                .pop_front()
                .ok_or_else(|| std::io::Error::other("no block read programmed"))?;
            buf.copy_from_slice(&data);
            Ok(())
        }

        fn write_byte(&mut self, register: u8, value: u8) -> Result<(), std::io::Error> {
            if self.fail_writes {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "device gone",
                ));
            }
            self.transactions
                .push(BusTransaction::WriteByte { register, value });
            Ok(())
        }

        fn write_bytes(&mut self, data: &[u8]) -> Result<(), std::io::Error> {
            if self.fail_writes {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "device gone",
                ));
            }
            self.transactions.push(BusTransaction::WriteBytes {
                data: data.to_vec(),
            });
            Ok(())
        }
    }

    fn fast_sensor() -> MPL3115A2 {
        MPL3115A2::with_poll_config(Mpl3115a2PollConfig {
            interval_ms: 0,
            max_attempts: 5,
        })
    }

    #[test]
    fn oversample_ratio_round_trips_through_bits_3_to_5() {
        for ratio in 0..=7 {
            let bits = MPL3115A2::encode_ctrl_oversample_ratio(ratio).unwrap();
            assert_eq!((bits >> 3) as i32, ratio);
            assert_eq!(bits & !0x38, 0);
        }
        assert_eq!(
            MPL3115A2::encode_ctrl_oversample_ratio(8).unwrap_err().kind(),
            std::io::ErrorKind::InvalidInput
        );
        assert_eq!(
            MPL3115A2::encode_ctrl_oversample_ratio(-1).unwrap_err().kind(),
            std::io::ErrorKind::InvalidInput
        );
    }

    #[test]
    fn control_flags_compose_by_or() {
        let flags = MPL3115A2::encode_ctrl_altimeter_mode(true)
            | MPL3115A2::encode_ctrl_oversample_ratio(7).unwrap()
            | MPL3115A2::encode_ctrl_reset_bit(true)
            | MPL3115A2::encode_ctrl_active_status(true);
        assert_eq!(flags, 0x80 | 0x38 | 0x04 | 0x01);
    }

    #[test]
    fn event_flags_carry_data_ready_bit() {
        assert_eq!(MPL3115A2::encode_event_flags(false, false), 0x00);
        assert_eq!(MPL3115A2::encode_event_flags(true, false), 0x01 | 0x04);
        assert_eq!(MPL3115A2::encode_event_flags(false, true), 0x02 | 0x04);
        assert_eq!(MPL3115A2::encode_event_flags(true, true), 0x07);
    }

    #[test]
    fn measure_pressure_runs_configure_poll_read() {
        let sensor = fast_sensor();
        let mut bus = MockBus::default();
        // -- not ready twice, then ready
        bus.byte_reads = VecDeque::from([0x00, 0x00, 0x0c]);
        bus.block_reads = VecDeque::from([vec![0x0c, 0x01, 0x90, 0x30, 0x16, 0x40]]);
        let (pressure, temperature) = sensor.measure_pressure(&mut bus, 3).unwrap();
        assert_eq!(pressure, 1600.75);
        assert_eq!(temperature, 22.25);
        let expected = vec![
            BusTransaction::WriteByte { register: 0x26, value: 0x18 },
            BusTransaction::WriteByte { register: 0x13, value: 0x07 },
            BusTransaction::WriteByte { register: 0x26, value: 0x19 },
            BusTransaction::ReadByte { register: 0x00 },
            BusTransaction::ReadByte { register: 0x00 },
            BusTransaction::ReadByte { register: 0x00 },
            BusTransaction::WriteBytes { data: vec![0x00] },
            BusTransaction::ReadBytes { len: 6 },
        ];
        assert_eq!(bus.transactions, expected);
    }

    #[test]
    fn measure_altitude_sets_altimeter_bit_and_decodes_signed() {
        let sensor = fast_sensor();
        let mut bus = MockBus::default();
        bus.byte_reads = VecDeque::from([0x0c]);
        bus.block_reads = VecDeque::from([vec![0x0c, 0xff, 0xf8, 0x40, 0x16, 0x40]]);
        let (altitude, temperature) = sensor.measure_altitude(&mut bus, 3).unwrap();
        assert_eq!(altitude, -7.75);
        assert_eq!(temperature, 22.25);
        assert_eq!(
            bus.transactions[0],
            BusTransaction::WriteByte { register: 0x26, value: 0x98 }
        );
        assert_eq!(
            bus.transactions[2],
            BusTransaction::WriteByte { register: 0x26, value: 0x99 }
        );
    }

    #[test]
    fn measure_validates_before_any_bus_traffic() {
        let sensor = fast_sensor();
        let mut bus = MockBus::default();
        let err = sensor.measure_pressure(&mut bus, 8).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert!(bus.transactions.is_empty());
    }

    #[test]
    fn poll_exhaustion_times_out() {
        let sensor = MPL3115A2::with_poll_config(Mpl3115a2PollConfig {
            interval_ms: 0,
            max_attempts: 3,
        });
        let mut bus = MockBus::default();
        bus.byte_reads = VecDeque::from([0x00, 0x00, 0x00]);
        let err = sensor.measure_pressure(&mut bus, 0).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
        let polls = bus
            .transactions
            .iter()
            .filter(|t| matches!(t, BusTransaction::ReadByte { register: 0x00 }))
            .count();
        assert_eq!(polls, 3);
    }

    #[test]
    fn modify_sea_level_pressure_writes_half_pascal_value() {
        let sensor = MPL3115A2::new();
        let mut bus = MockBus::default();
        sensor.modify_sea_level_pressure(&mut bus, 101326).unwrap();
        assert_eq!(
            bus.transactions,
            vec![BusTransaction::WriteBytes { data: vec![0x14, 0xc5, 0xe7] }]
        );
    }

    #[test]
    fn compensate_pressure_scales_and_validates() {
        let sensor = MPL3115A2::new();
        let mut bus = MockBus::default();
        sensor.compensate_pressure(&mut bus, 508).unwrap();
        assert_eq!(
            bus.transactions,
            vec![BusTransaction::WriteByte { register: 0x2b, value: 0x7f }]
        );
        let err = sensor.compensate_pressure(&mut bus, 509).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert_eq!(bus.transactions.len(), 1);
        sensor.compensate_pressure(&mut bus, -512).unwrap();
        assert_eq!(
            bus.transactions[1],
            BusTransaction::WriteByte { register: 0x2b, value: (-128i8) as u8 }
        );
    }

    #[test]
    fn compensate_temperature_scales_and_validates() {
        let sensor = MPL3115A2::new();
        let mut bus = MockBus::default();
        let err = sensor.compensate_temperature(&mut bus, 8.0).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert!(bus.transactions.is_empty());
        sensor.compensate_temperature(&mut bus, 7.9375).unwrap();
        assert_eq!(
            bus.transactions,
            vec![BusTransaction::WriteByte { register: 0x2c, value: 127 }]
        );
    }

    #[test]
    fn compensate_altitude_writes_signed_byte() {
        let sensor = MPL3115A2::new();
        let mut bus = MockBus::default();
        sensor.compensate_altitude(&mut bus, -50).unwrap();
        assert_eq!(
            bus.transactions,
            vec![BusTransaction::WriteByte { register: 0x2d, value: (-50i8) as u8 }]
        );
    }

    #[test]
    fn reset_writes_reset_bit_and_tolerates_lost_device() {
        let sensor = MPL3115A2::new();
        let mut bus = MockBus::default();
        sensor.reset(&mut bus).unwrap();
        assert_eq!(
            bus.transactions,
            vec![BusTransaction::WriteByte { register: 0x26, value: 0x04 }]
        );
        // -- the device drops the connection while rebooting
        let mut bus = MockBus {
            fail_writes: true,
            ..MockBus::default()
        };
        assert!(sensor.reset(&mut bus).is_ok());
    }

    #[test]
    fn set_standby_clears_active_bit() {
        let sensor = MPL3115A2::new();
        let mut bus = MockBus::default();
        sensor.set_standby(&mut bus).unwrap();
        assert_eq!(
            bus.transactions,
            vec![BusTransaction::WriteByte { register: 0x26, value: 0x00 }]
        );
    }

    #[test]
    fn read_device_id_reads_expected_register() {
        let sensor = MPL3115A2::new();
        let mut bus = MockBus::default();
        bus.byte_reads = VecDeque::from([0xc4]);
        let device_id = sensor.read_device_id(&mut bus).unwrap();
        assert_eq!(device_id, sensor.device_id());
        assert_eq!(
            bus.transactions,
            vec![BusTransaction::ReadByte { register: 0x0c }]
        );
    }

    #[test]
    fn dr_status_decodes_ready_bits() {
        let sensor = MPL3115A2::new();
        let mut bus = MockBus::default();
        bus.byte_reads = VecDeque::from([0x0c]);
        let (pres_temp_ready, pres_ready, temp_ready) = sensor.get_dr_status(&mut bus).unwrap();
        assert_eq!(pres_temp_ready, Mpl3115a2StatusPressureTemperatureData::Ready);
        assert_eq!(pres_ready, Mpl3115a2StatusPressureData::Ready);
        assert_eq!(temp_ready, Mpl3115a2StatusTemperatureData::NotReady);
        assert_eq!(
            bus.transactions,
            vec![BusTransaction::ReadByte { register: 0x06 }]
        );
    }

    #[test]
    fn default_sea_level_pressure_matches_device_default() {
        let sensor = MPL3115A2::new();
        assert_eq!(sensor.get_default_sea_level_pressure(), 101326);
    }
}
