//! Looper status display for the SSD1306 (128×64) using Embassy.
//!
//! This crate provides [`OledDriver`], a wrapper around the [`ssd1306`]
//! crate in async buffered-graphics mode, the frame layout in [`layout`],
//! and (with the `task` feature) [`display_update_task`], a throttled
//! refresh loop that reads the latest [`LoopSnapshot`] published by the
//! audio side.
//!
//! # Frame
//!
//! Four vertical bars show the continuous controls (`mix`, `in`, `loop`,
//! `rnd`) with their percentages. The selected control's label is drawn
//! inverted. Above the bars sit the transport mode (`stopped`, `playing`,
//! `recording`, `resetting`) and a line tracking the play position.
//!
//! # Quick Start
//!
//! ```ignore
//! use spirant_oled_display_rs::{
//!     display_update_task, publish_snapshot, shared_snapshot, DisplayConfig, OledDriver,
//!     SharedSnapshot,
//! };
//!
//! static SNAPSHOT: SharedSnapshot = shared_snapshot();
//!
//! // In your Embassy main:
//! let oled = OledDriver::new(i2c_oled, 0x3C);
//! spawner.spawn(oled_task(oled, DisplayConfig::default())).unwrap();
//!
//! // In the audio callback, after LoopEngine::process_block:
//! publish_snapshot(&SNAPSHOT, engine.snapshot());
//!
//! #[embassy_executor::task]
//! async fn oled_task(driver: OledDriver<MyI2cType>, config: DisplayConfig) {
//!     display_update_task(driver, &SNAPSHOT, config).await;
//! }
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`** — structured logging via [`defmt`].
//! - **`task`** — [`display_update_task`] and the snapshot hand-off
//!   (pulls in `embassy-sync` and `embassy-time`).
//!
//! [`LoopSnapshot`]: spirant::looper::LoopSnapshot

#![no_std]

#[cfg(feature = "task")]
pub mod display_task;
pub mod driver;
pub mod error;
pub mod layout;

// ── Re-exports for convenience ───────────────────────────────────────────

#[cfg(feature = "task")]
pub use display_task::{
    display_update_task, publish_snapshot, read_snapshot, shared_snapshot, SharedSnapshot,
};
pub use driver::OledDriver;
pub use error::OledError;
pub use layout::{render_display, DisplayChanges, DisplayConfig, DisplayState};
