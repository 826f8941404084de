//! Display update task and the snapshot hand-off from the audio side.
//!
//! The audio callback calls [`publish_snapshot`] once per block. The
//! [`display_update_task`] reads the latest snapshot at its own pace and
//! redraws only when something visible changed.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Instant, Timer};
use embedded_hal_async::i2c::I2c;

use spirant::looper::LoopSnapshot;

use crate::driver::OledDriver;
use crate::layout::{DisplayChanges, DisplayConfig, DisplayState};

/// Latest engine snapshot, shared between the audio interrupt and the
/// display task.
///
/// A blocking critical-section mutex, so the writer never awaits and the
/// reader never sees a half-written snapshot.
pub type SharedSnapshot = Mutex<CriticalSectionRawMutex, Cell<LoopSnapshot>>;

/// A [`SharedSnapshot`] holding the power-on state, usable in a `static`.
pub const fn shared_snapshot() -> SharedSnapshot {
    Mutex::new(Cell::new(LoopSnapshot::power_on()))
}

/// Store `snapshot` for the display. Safe to call from the audio interrupt.
pub fn publish_snapshot(shared: &SharedSnapshot, snapshot: LoopSnapshot) {
    shared.lock(|cell| cell.set(snapshot));
}

/// Read the most recently published snapshot.
pub fn read_snapshot(shared: &SharedSnapshot) -> LoopSnapshot {
    shared.lock(|cell| cell.get())
}

/// Periodic display update loop.
///
/// A plain `async fn`, **not** an Embassy `#[task]`. Embassy tasks cannot
/// be generic, so wrap it in a concrete task:
///
/// ```ignore
/// static SNAPSHOT: SharedSnapshot = shared_snapshot();
///
/// #[embassy_executor::task]
/// async fn oled_task(driver: OledDriver<MyConcreteI2cType>, config: DisplayConfig) {
///     display_update_task(driver, &SNAPSHOT, config).await;
/// }
/// ```
///
/// # Control flow
///
/// 1. Initialise the panel. On failure, log and return.
/// 2. Loop:
///    - Sleep until one refresh period after the last refresh. The wake-up
///      is checked against [`Instant::now`] so a late wake never causes
///      two refreshes inside one period.
///    - Copy the shared snapshot out (critical section held briefly).
///    - Build a [`DisplayState`] and skip the frame if nothing changed.
///    - Render and flush (~20 ms I2C, no lock held). A failed flush is
///      logged and retried on the next period.
pub async fn display_update_task<I2C>(
    mut driver: OledDriver<I2C>,
    shared: &'static SharedSnapshot,
    config: DisplayConfig,
) where
    I2C: I2c,
{
    if let Err(_e) = driver.init().await {
        #[cfg(feature = "defmt")]
        defmt::error!("OLED init failed: {}", _e);
        return;
    }

    #[cfg(feature = "defmt")]
    defmt::info!("OLED initialised, refresh every {} ms", config.update_period_ms());

    let period = Duration::from_millis(config.update_period_ms());
    let mut last_refresh = Instant::now();
    let mut last_state: Option<DisplayState> = None;

    loop {
        Timer::at(last_refresh + period).await;

        let now = Instant::now();
        if now.duration_since(last_refresh) < period {
            continue;
        }
        last_refresh = now;

        let new_state = DisplayState::from_snapshot(&read_snapshot(shared));

        if let Some(previous) = &last_state {
            if !DisplayChanges::detect(previous, &new_state).any_changed() {
                continue;
            }
        }

        if let Err(_e) = driver.draw(&new_state, &config).await {
            #[cfg(feature = "defmt")]
            defmt::error!("OLED refresh failed: {}", _e);
            continue;
        }

        last_state = Some(new_state);
    }
}
