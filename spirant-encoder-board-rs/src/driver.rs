//! Seesaw protocol primitives.
//!
//! Crate-private. Handles register addressing, big-endian payloads and the
//! settle delay the Seesaw firmware needs between a register write and the
//! following read. Consumers use [`QuadEncoderBoard`](crate::QuadEncoderBoard).

use embassy_time::{Duration, Timer};
use embedded_hal_async::i2c::I2c;

use crate::error::EncoderError;
use crate::registers::SEESAW_DELAY_US;

/// Two-byte Seesaw register address: `[module, offset]`.
pub(crate) type Register = [u8; 2];

pub(crate) struct SeesawDriver<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> SeesawDriver<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Write the register address, wait, then read the response.
    ///
    /// Separate `write()` and `read()` calls rather than `write_read()`:
    /// a repeated start leaves the firmware no time to prepare the data.
    async fn write_then_read(
        &mut self,
        register: Register,
        buffer: &mut [u8],
    ) -> Result<(), EncoderError<I2C::Error>> {
        self.i2c.write(self.address, &register).await?;
        Timer::after(Duration::from_micros(SEESAW_DELAY_US)).await;
        self.i2c.read(self.address, buffer).await?;
        Ok(())
    }

    /// Read a big-endian 32-bit word.
    pub async fn read_u32(&mut self, register: Register) -> Result<u32, EncoderError<I2C::Error>> {
        let mut buf = [0u8; 4];
        self.write_then_read(register, &mut buf).await?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Read a big-endian signed 32-bit value.
    pub async fn read_i32(&mut self, register: Register) -> Result<i32, EncoderError<I2C::Error>> {
        Ok(self.read_u32(register).await? as i32)
    }

    /// Write a 32-bit word in one transaction: `[module, offset, b3, b2, b1, b0]`.
    pub async fn write_u32(
        &mut self,
        register: Register,
        value: u32,
    ) -> Result<(), EncoderError<I2C::Error>> {
        let mut buf = [0u8; 6];
        buf[..2].copy_from_slice(&register);
        buf[2..].copy_from_slice(&value.to_be_bytes());
        self.i2c.write(self.address, &buf).await?;
        Ok(())
    }

    pub async fn write_i32(
        &mut self,
        register: Register,
        value: i32,
    ) -> Result<(), EncoderError<I2C::Error>> {
        self.write_u32(register, value as u32).await
    }

    pub async fn write_u8(
        &mut self,
        register: Register,
        value: u8,
    ) -> Result<(), EncoderError<I2C::Error>> {
        let buf = [register[0], register[1], value];
        self.i2c.write(self.address, &buf).await?;
        Ok(())
    }
}
