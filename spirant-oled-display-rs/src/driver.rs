//! SSD1306 wrapper in async buffered graphics mode.
//!
//! [`OledDriver`] owns the panel: construction without bus traffic,
//! explicit async initialisation, and whole-frame redraws of a
//! [`DisplayState`].

use display_interface_i2c::I2CInterface;
use embedded_hal_async::i2c::I2c;
use ssd1306::{mode::BufferedGraphicsModeAsync, prelude::*, I2CDisplayInterface, Ssd1306Async};

use crate::error::OledError;
use crate::layout::{render_display, DisplayConfig, DisplayState};

/// Concrete display type used internally by [`OledDriver`].
type Display<I2C> = Ssd1306Async<
    I2CInterface<I2C>,
    DisplaySize128x64,
    BufferedGraphicsModeAsync<DisplaySize128x64>,
>;

/// Async driver for the looper's SSD1306 128×64 status display.
///
/// # Lifecycle
///
/// 1. [`OledDriver::new()`] builds the driver. No I2C traffic.
/// 2. [`OledDriver::init()`] sends the SSD1306 initialisation sequence.
/// 3. [`OledDriver::draw()`] renders a [`DisplayState`] and flushes it, or
///    draw by hand through [`OledDriver::display_mut()`] and
///    [`OledDriver::flush()`].
///
/// # Example
///
/// ```no_run
/// use spirant::looper::LoopSnapshot;
/// use spirant_oled_display_rs::{DisplayConfig, DisplayState, OledDriver};
///
/// # async fn example(i2c: impl embedded_hal_async::i2c::I2c) {
/// let mut oled = OledDriver::new(i2c, 0x3C);
/// oled.init().await.unwrap();
/// let state = DisplayState::from_snapshot(&LoopSnapshot::default());
/// oled.draw(&state, &DisplayConfig::default()).await.unwrap();
/// # }
/// ```
pub struct OledDriver<I2C> {
    display: Display<I2C>,
    initialized: bool,
}

impl<I2C> OledDriver<I2C>
where
    I2C: I2c,
{
    /// Construct an uninitialised driver.
    ///
    /// # Arguments
    /// * `i2c` — I2C peripheral (taken for exclusive access).
    /// * `address` — 7-bit device address (usually `0x3C` or `0x3D`).
    pub fn new(i2c: I2C, address: u8) -> Self {
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);
        let display = Ssd1306Async::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();

        Self {
            display,
            initialized: false,
        }
    }

    /// Initialise the panel.
    ///
    /// # Errors
    ///
    /// Returns [`OledError::InitializationFailed`] if the panel does not
    /// accept the command sequence.
    pub async fn init(&mut self) -> Result<(), OledError> {
        self.display
            .init()
            .await
            .map_err(|_| OledError::InitializationFailed)?;
        self.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::debug!("SSD1306 initialised");

        Ok(())
    }

    /// Clear the in-memory frame buffer. No I2C traffic.
    pub fn clear_buffer(&mut self) {
        self.display.clear_buffer();
    }

    /// Transfer the frame buffer to the panel.
    ///
    /// At 400 kHz a full 1024-byte frame takes about 20 ms.
    ///
    /// # Errors
    ///
    /// [`OledError::NotInitialized`] before [`init()`](Self::init), or
    /// [`OledError::Display`] on a bus failure.
    pub async fn flush(&mut self) -> Result<(), OledError> {
        if !self.initialized {
            return Err(OledError::NotInitialized);
        }
        self.display.flush().await?;
        Ok(())
    }

    /// Redraw the whole frame from `state` and flush it.
    ///
    /// # Errors
    ///
    /// Same as [`flush()`](Self::flush).
    pub async fn draw(
        &mut self,
        state: &DisplayState,
        config: &DisplayConfig,
    ) -> Result<(), OledError> {
        if !self.initialized {
            return Err(OledError::NotInitialized);
        }
        self.display.clear_buffer();
        render_display(&mut self.display, state, config)?;
        self.flush().await
    }

    /// Underlying `ssd1306` display for direct `embedded-graphics` drawing.
    ///
    /// `None` until the driver has been initialised.
    pub fn display_mut(&mut self) -> Option<&mut Display<I2C>> {
        if self.initialized {
            Some(&mut self.display)
        } else {
            None
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}
