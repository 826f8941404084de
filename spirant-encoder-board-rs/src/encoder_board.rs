//! High-level interface for the Adafruit Quad Rotary Encoder Breakout.
//!
//! [`QuadEncoderBoard`] wraps the Seesaw driver with index validation,
//! encoder and GPIO register addressing, and [`read_controls`] which
//! gathers everything the looper's control surface polls in one call.
//!
//! [`read_controls`]: QuadEncoderBoard::read_controls

use embedded_hal_async::i2c::I2c;

use crate::driver::SeesawDriver;
use crate::error::EncoderError;
use crate::registers::{
    switch_mask, switches_from_bulk, ENCODER_COUNT, ENCODER_INT_SET, ENCODER_POSITION,
    GPIO_BULK, GPIO_BULK_SET, GPIO_DIRCLR_BULK, GPIO_INTENSET, GPIO_INTFLAG, GPIO_PULLENSET,
    MODULE_ENCODER, MODULE_GPIO,
};

/// One poll of the board: encoder positions and switch states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardReading {
    /// Absolute encoder positions, indexed by encoder.
    pub positions: [i32; ENCODER_COUNT],
    /// `true` while the encoder's push switch is held down.
    pub switches: [bool; ENCODER_COUNT],
}

/// Async interface for the Adafruit Quad Rotary Encoder Breakout.
///
/// # Example
///
/// ```no_run
/// use encoder_driver::{QuadEncoderBoard, DEFAULT_ADDRESS};
///
/// # async fn example(i2c: impl embedded_hal_async::i2c::I2c) {
/// let mut board = QuadEncoderBoard::new(i2c, DEFAULT_ADDRESS);
/// board.configure_switches().await.unwrap();
///
/// let reading = board.read_controls().await.unwrap();
/// if reading.switches[0] {
///     // record switch held
/// }
/// # }
/// ```
pub struct QuadEncoderBoard<I2C> {
    driver: SeesawDriver<I2C>,
}

impl<I2C> QuadEncoderBoard<I2C>
where
    I2C: I2c,
{
    /// Create a board interface. No I2C traffic.
    ///
    /// # Arguments
    /// * `i2c` — I2C peripheral (taken for exclusive access)
    /// * `address` — 7-bit I2C device address (default 0x49)
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            driver: SeesawDriver::new(i2c, address),
        }
    }

    fn check_encoder(encoder: u8) -> Result<(), EncoderError<I2C::Error>> {
        if (encoder as usize) < ENCODER_COUNT {
            Ok(())
        } else {
            Err(EncoderError::InvalidEncoder)
        }
    }

    // -----------------------------------------------------------------------
    // Encoders
    // -----------------------------------------------------------------------

    /// Read the absolute position of one encoder.
    ///
    /// The firmware accumulates ticks in a signed 32-bit counter with no
    /// limits; callers work with differences between reads.
    ///
    /// # Errors
    /// * [`EncoderError::InvalidEncoder`] if `encoder >= 4`
    /// * [`EncoderError::I2c`] on communication failure
    pub async fn read_position(&mut self, encoder: u8) -> Result<i32, EncoderError<I2C::Error>> {
        Self::check_encoder(encoder)?;
        self.driver
            .read_i32([MODULE_ENCODER, ENCODER_POSITION | encoder])
            .await
    }

    /// Read all four encoder positions, one transaction each.
    ///
    /// # Errors
    /// Returns the first I2C error; no partial results.
    pub async fn read_all_positions(
        &mut self,
    ) -> Result<[i32; ENCODER_COUNT], EncoderError<I2C::Error>> {
        let mut positions = [0i32; ENCODER_COUNT];
        for (encoder, position) in positions.iter_mut().enumerate() {
            *position = self.read_position(encoder as u8).await?;
        }
        Ok(positions)
    }

    /// Overwrite one encoder's accumulator.
    ///
    /// # Errors
    /// * [`EncoderError::InvalidEncoder`] if `encoder >= 4`
    /// * [`EncoderError::I2c`] on communication failure
    pub async fn set_position(
        &mut self,
        encoder: u8,
        value: i32,
    ) -> Result<(), EncoderError<I2C::Error>> {
        Self::check_encoder(encoder)?;
        self.driver
            .write_i32([MODULE_ENCODER, ENCODER_POSITION | encoder], value)
            .await
    }

    // -----------------------------------------------------------------------
    // Push switches
    // -----------------------------------------------------------------------

    /// Make the four switch pins inputs with pull-ups.
    ///
    /// Must be called once after power-on before [`read_switches`](Self::read_switches)
    /// returns meaningful levels.
    pub async fn configure_switches(&mut self) -> Result<(), EncoderError<I2C::Error>> {
        let mask = switch_mask();
        self.driver
            .write_u32([MODULE_GPIO, GPIO_DIRCLR_BULK], mask)
            .await?;
        self.driver
            .write_u32([MODULE_GPIO, GPIO_PULLENSET], mask)
            .await?;
        self.driver
            .write_u32([MODULE_GPIO, GPIO_BULK_SET], mask)
            .await?;

        #[cfg(feature = "defmt")]
        defmt::debug!("switch pins configured: mask {=u32:#x}", mask);

        Ok(())
    }

    /// Read the four push switches. `true` means pressed.
    pub async fn read_switches(
        &mut self,
    ) -> Result<[bool; ENCODER_COUNT], EncoderError<I2C::Error>> {
        let bits = self.driver.read_u32([MODULE_GPIO, GPIO_BULK]).await?;
        Ok(switches_from_bulk(bits))
    }

    /// Read positions and switches together.
    pub async fn read_controls(&mut self) -> Result<BoardReading, EncoderError<I2C::Error>> {
        let positions = self.read_all_positions().await?;
        let switches = self.read_switches().await?;
        Ok(BoardReading {
            positions,
            switches,
        })
    }

    // -----------------------------------------------------------------------
    // Interrupts
    // -----------------------------------------------------------------------

    /// Enable the change interrupt for one encoder.
    ///
    /// The board's INT pin is active-low and shared by all sources.
    /// Interrupts are disabled after power-on.
    ///
    /// # Errors
    /// * [`EncoderError::InvalidEncoder`] if `encoder >= 4`
    /// * [`EncoderError::I2c`] on communication failure
    pub async fn enable_interrupt(&mut self, encoder: u8) -> Result<(), EncoderError<I2C::Error>> {
        Self::check_encoder(encoder)?;
        self.driver
            .write_u8([MODULE_ENCODER, ENCODER_INT_SET | encoder], 1)
            .await
    }

    /// Enable the change interrupt on every encoder.
    pub async fn enable_all_interrupts(&mut self) -> Result<(), EncoderError<I2C::Error>> {
        for encoder in 0..ENCODER_COUNT as u8 {
            self.enable_interrupt(encoder).await?;
        }
        Ok(())
    }

    /// Also pull INT low when a push switch changes level.
    pub async fn enable_switch_interrupts(&mut self) -> Result<(), EncoderError<I2C::Error>> {
        self.driver
            .write_u32([MODULE_GPIO, GPIO_INTENSET], switch_mask())
            .await
    }

    /// Clear pending interrupt flags and release the INT pin.
    ///
    /// Reading the flag register clears it, so call this after reading the
    /// board to re-arm the next falling edge.
    pub async fn clear_interrupt_flags(&mut self) -> Result<(), EncoderError<I2C::Error>> {
        let _ = self.driver.read_u32([MODULE_GPIO, GPIO_INTFLAG]).await?;
        Ok(())
    }
}
