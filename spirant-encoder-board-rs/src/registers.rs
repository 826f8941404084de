//! Seesaw register map for the Adafruit Quad Rotary Encoder Breakout.
//!
//! Registers are addressed with two bytes: module ID, then the register
//! offset within that module. Per-encoder registers OR the encoder index
//! into the base offset: `[MODULE_ENCODER, ENCODER_POSITION | encoder]`.

// ---------------------------------------------------------------------------
// Module IDs
// ---------------------------------------------------------------------------

/// Seesaw GPIO module.
pub const MODULE_GPIO: u8 = 0x01;

/// Seesaw encoder module.
pub const MODULE_ENCODER: u8 = 0x11;

// ---------------------------------------------------------------------------
// GPIO module registers (32-bit pin bitmasks)
// ---------------------------------------------------------------------------

/// Make the masked pins inputs.
pub const GPIO_DIRCLR_BULK: u8 = 0x03;

/// Pin levels, one bit per pin.
pub const GPIO_BULK: u8 = 0x04;

/// Drive the masked pins high. On inputs with pulls enabled this selects
/// pull-up.
pub const GPIO_BULK_SET: u8 = 0x05;

/// Enable pin-change interrupts on the masked pins.
pub const GPIO_INTENSET: u8 = 0x08;

/// Interrupt flags (read-only). Reading clears every flag and releases
/// the INT pin.
pub const GPIO_INTFLAG: u8 = 0x0A;

/// Enable pull resistors on the masked pins.
pub const GPIO_PULLENSET: u8 = 0x0B;

// ---------------------------------------------------------------------------
// Encoder module registers (base addresses)
// ---------------------------------------------------------------------------

/// Enable the change interrupt for one encoder.
pub const ENCODER_INT_SET: u8 = 0x10;

/// Absolute encoder position (32-bit signed).
pub const ENCODER_POSITION: u8 = 0x30;

// ---------------------------------------------------------------------------
// Board layout and protocol constants
// ---------------------------------------------------------------------------

/// Delay in microseconds the Seesaw firmware needs between the register
/// write and the data read.
pub const SEESAW_DELAY_US: u64 = 125;

/// Default I2C address for the Adafruit Quad Rotary Encoder Breakout.
pub const DEFAULT_ADDRESS: u8 = 0x49;

/// Number of rotary encoders on the board.
pub const ENCODER_COUNT: usize = 4;

/// Seesaw GPIO pins wired to the push switch of encoders 0–3.
pub const SWITCH_PINS: [u8; ENCODER_COUNT] = [12, 14, 17, 9];

/// Bitmask of every switch pin, as used by the bulk GPIO registers.
pub const fn switch_mask() -> u32 {
    let mut mask = 0;
    let mut i = 0;
    while i < ENCODER_COUNT {
        mask |= 1 << SWITCH_PINS[i];
        i += 1;
    }
    mask
}

/// Decode a `GPIO_BULK` word into per-encoder switch states.
///
/// The switches pull their pin to ground, so a low bit means pressed.
/// Bits for other pins are ignored.
///
/// ```
/// use encoder_driver::switches_from_bulk;
///
/// // Every pin high except pin 14 (encoder 1's switch).
/// assert_eq!(switches_from_bulk(!(1 << 14)), [false, true, false, false]);
/// ```
pub fn switches_from_bulk(bits: u32) -> [bool; ENCODER_COUNT] {
    SWITCH_PINS.map(|pin| bits & (1 << pin) == 0)
}
