//! Async driver for the Adafruit Quad Rotary Encoder Breakout.
//!
//! An Embassy-compatible I2C driver for the Seesaw-based quad encoder
//! board (Product #5752): four rotary encoders, each with a push switch.
//! On the looper the encoders set the continuous controls and the push
//! switches are record, play, clear and select.
//!
//! # Architecture
//!
//! - **`driver`** (crate-private): Seesaw protocol primitives (timing,
//!   endianness, register addressing).
//! - **[`QuadEncoderBoard`]**: validated positions, switches and
//!   interrupts.
//! - **[`switches_from_bulk`]**: pure decoding of the GPIO bulk word.
//!
//! # Quick start
//!
//! ```no_run
//! use encoder_driver::{QuadEncoderBoard, DEFAULT_ADDRESS};
//!
//! # async fn example(i2c: impl embedded_hal_async::i2c::I2c) {
//! let mut board = QuadEncoderBoard::new(i2c, DEFAULT_ADDRESS);
//! board.configure_switches().await.unwrap();
//! let reading = board.read_controls().await.unwrap();
//! # let _ = reading;
//! # }
//! ```
//!
//! # Features
//!
//! - **`defmt`**: [`defmt::Format`] on error and reading types, plus
//!   debug logging.

#![no_std]

pub use encoder_board::{BoardReading, QuadEncoderBoard};
pub use error::EncoderError;
pub use registers::{switch_mask, switches_from_bulk, DEFAULT_ADDRESS, ENCODER_COUNT, SWITCH_PINS};

mod driver;
mod encoder_board;
mod error;
mod registers;
