//! Error types for the looper display.

use display_interface::DisplayError;

/// Errors that can occur while driving the OLED.
///
/// The `ssd1306` crate folds I2C bus errors into [`DisplayError`], so this
/// enum stays non-generic.
#[derive(Debug)]
pub enum OledError {
    /// Display interface error (I2C or other bus-level failure).
    Display(DisplayError),
    /// The panel did not accept the initialisation sequence.
    InitializationFailed,
    /// A bus operation was attempted before
    /// [`OledDriver::init()`](crate::OledDriver::init).
    NotInitialized,
}

impl From<DisplayError> for OledError {
    fn from(e: DisplayError) -> Self {
        OledError::Display(e)
    }
}

impl core::fmt::Display for OledError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OledError::Display(_) => f.write_str("display interface error"),
            OledError::InitializationFailed => f.write_str("display initialisation failed"),
            OledError::NotInitialized => f.write_str("display not initialised"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OledError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            OledError::Display(_) => defmt::write!(f, "display interface error"),
            OledError::InitializationFailed => defmt::write!(f, "display initialisation failed"),
            OledError::NotInitialized => defmt::write!(f, "display not initialised"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use std::string::ToString;

    #[test]
    fn display_error_converts() {
        let err: OledError = DisplayError::BusWriteError.into();
        assert!(matches!(err, OledError::Display(DisplayError::BusWriteError)));
    }

    #[test]
    fn messages_are_readable() {
        assert_eq!(
            OledError::NotInitialized.to_string(),
            "display not initialised"
        );
    }
}
