//! Spirant looper core.
//!
//! See [`looper`] for the engine, the control contract and the display
//! snapshot.

#![cfg_attr(not(test), no_std)]

pub mod looper;
