use i2c_linux::I2c;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub fn get_bus(bus_path: &Path) -> Result<I2c<File>, std::io::Error> {
    I2c::from_path(bus_path)
}

pub fn set_slave(i2c: &mut I2c<File>, dev_addr: u16) -> Result<(), std::io::Error> {
    i2c.smbus_set_slave_address(dev_addr, false)
}

/// Register-addressed bus access as the sensor driver uses it.
///
/// `write_bytes` sends a register address byte followed by payload bytes and
/// is also used with a bare address to set the cursor for a following
/// `read_bytes`, which reads sequentially from the previously addressed
/// register. All operations go to the slave selected via [`set_slave`].
pub trait I2cBus {
    fn read_byte(&mut self, register: u8) -> Result<u8, std::io::Error>;
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), std::io::Error>;
    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), std::io::Error>;
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), std::io::Error>;
}

impl I2cBus for I2c<File> {
    fn read_byte(&mut self, register: u8) -> Result<u8, std::io::Error> {
        self.smbus_read_byte_data(register)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), std::io::Error> {
        self.read_exact(buf)
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), std::io::Error> {
        self.smbus_write_byte_data(register, value)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), std::io::Error> {
        self.write_all(data)
    }
}
