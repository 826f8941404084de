//! Error types for the encoder driver.

use core::fmt;

/// Errors that can occur when talking to the encoder board.
#[derive(Debug)]
pub enum EncoderError<E> {
    /// Underlying I2C bus error.
    I2c(E),

    /// Encoder index out of range (must be 0–3).
    InvalidEncoder,
}

// Lets `?` lift raw bus errors.
impl<E> From<E> for EncoderError<E> {
    fn from(error: E) -> Self {
        EncoderError::I2c(error)
    }
}

impl<E: fmt::Debug> fmt::Display for EncoderError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncoderError::I2c(e) => write!(f, "I2C error: {:?}", e),
            EncoderError::InvalidEncoder => write!(f, "invalid encoder index (must be 0-3)"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for EncoderError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            EncoderError::I2c(e) => defmt::write!(f, "I2C error: {}", e),
            EncoderError::InvalidEncoder => defmt::write!(f, "invalid encoder index"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use std::string::ToString;

    #[derive(Debug, PartialEq)]
    struct Nack;

    #[test]
    fn bus_error_lifts_with_question_mark() {
        fn fails() -> Result<(), EncoderError<Nack>> {
            Err::<(), Nack>(Nack)?;
            Ok(())
        }
        assert!(matches!(fails(), Err(EncoderError::I2c(Nack))));
    }

    #[test]
    fn display_messages() {
        let err: EncoderError<Nack> = EncoderError::InvalidEncoder;
        assert_eq!(err.to_string(), "invalid encoder index (must be 0-3)");
        assert_eq!(EncoderError::I2c(Nack).to_string(), "I2C error: Nack");
    }
}
