//! Display layout types and rendering logic.
//!
//! This module defines the immutable [`DisplayState`] snapshot, the
//! [`DisplayChanges`] diff, and the [`render_display`] function that draws
//! a frame using `embedded-graphics`.

use core::fmt::Write;

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text, TextStyle, TextStyleBuilder},
};
use heapless::String;

use spirant::looper::{LoopSnapshot, CONTROL_COUNT, CONTROL_LABELS};

/// Glyph size of [`FONT_6X10`].
const CHAR_WIDTH: u32 = 6;
const CHAR_HEIGHT: u32 = 10;

// ── DisplayConfig ────────────────────────────────────────────────────────

/// Configuration for the display layout and update task.
///
/// All layout geometry lives here. [`DisplayConfig::default()`] gives the
/// 128×64 layout: four 8 px bars on a 32 px pitch, two thirds of the
/// height at most, refreshed at 60 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Display refresh rate in Hz. Default: 60.
    pub update_frequency_hz: u32,

    // ── Layout geometry ──────────────────────────────────────────────
    /// Total display width in pixels. Default: 128.
    pub display_width: u32,
    /// Total display height in pixels. Default: 64.
    pub display_height: u32,
    /// Width of each control bar. Default: 8.
    pub bar_width: u32,
    /// Gap between one bar and the next. Default: 24.
    pub bar_spacing: u32,
    /// Bar height at 100 %. Default: 36.
    pub bar_max_height: u32,
    /// Top of the control label row. Default: 0.
    pub label_y: i32,
    /// Top of the transport mode row. Default: 12.
    pub mode_y: i32,
    /// Row of the loop progress line. Default: 25.
    pub progress_y: i32,
    /// Draw light-on-dark when `false`, dark-on-light when `true`.
    pub invert: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            update_frequency_hz: 60,
            display_width: 128,
            display_height: 64,
            bar_width: 8,
            bar_spacing: 24,
            bar_max_height: 36,
            label_y: 0,
            mode_y: 12,
            progress_y: 25,
            invert: false,
        }
    }
}

impl DisplayConfig {
    /// Convert the configured frequency to a refresh period in milliseconds.
    ///
    /// Formula: `1000 / update_frequency_hz`.
    pub fn update_period_ms(&self) -> u64 {
        1000 / self.update_frequency_hz.max(1) as u64
    }

    /// Horizontal distance between the left edges of two columns.
    pub fn column_pitch(&self) -> u32 {
        self.bar_width + self.bar_spacing
    }

    /// Left edge of column `i`.
    pub fn column_x(&self, i: usize) -> i32 {
        (self.column_pitch() * i as u32 + 1) as i32
    }

    /// Bar height in pixels for a percentage.
    pub fn bar_height(&self, percent: u8) -> u32 {
        self.bar_max_height * percent.min(100) as u32 / 100
    }

    fn colors(&self) -> (BinaryColor, BinaryColor) {
        if self.invert {
            (BinaryColor::Off, BinaryColor::On)
        } else {
            (BinaryColor::On, BinaryColor::Off)
        }
    }
}

// ── DisplayState ─────────────────────────────────────────────────────────

/// Immutable snapshot of everything the display needs to render one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Transport mode text.
    pub mode: &'static str,
    /// Highlighted control column.
    pub selected: usize,
    /// Control values as percentages, one per column.
    pub percents: [u8; CONTROL_COUNT],
    /// Play position within the loop, 0–1000.
    pub progress_permille: u16,
}

impl DisplayState {
    /// Build from a loop snapshot.
    ///
    /// The selection is clamped so a stale or torn snapshot can never
    /// address a column that does not exist.
    pub fn from_snapshot(snapshot: &LoopSnapshot) -> Self {
        Self {
            mode: snapshot.mode_label(),
            selected: snapshot.selected_index(),
            percents: snapshot.percentages(),
            progress_permille: snapshot.progress_permille(),
        }
    }
}

// ── DisplayChanges ───────────────────────────────────────────────────────

/// Identifies which parts of the display changed between two
/// [`DisplayState`] snapshots.
pub struct DisplayChanges {
    /// `true` if the mode text differs.
    pub mode_changed: bool,
    /// `true` if a different column is highlighted.
    pub selection_changed: bool,
    /// `true` if the progress line moved.
    pub progress_changed: bool,
    /// Per-column flag: `true` if the value differs.
    pub column_changed: [bool; CONTROL_COUNT],
}

impl DisplayChanges {
    /// Diff two states field-by-field.
    pub fn detect(old: &DisplayState, new: &DisplayState) -> Self {
        let mut column_changed = [false; CONTROL_COUNT];
        for (i, changed) in column_changed.iter_mut().enumerate() {
            *changed = old.percents[i] != new.percents[i];
        }

        Self {
            mode_changed: old.mode != new.mode,
            selection_changed: old.selected != new.selected,
            progress_changed: old.progress_permille != new.progress_permille,
            column_changed,
        }
    }

    /// Returns `true` if any field changed.
    pub fn any_changed(&self) -> bool {
        self.mode_changed
            || self.selection_changed
            || self.progress_changed
            || self.column_changed.iter().any(|&c| c)
    }
}

// ── Rendering ────────────────────────────────────────────────────────────

/// Render a [`DisplayState`] to a display buffer using `embedded-graphics`.
///
/// # Layout
///
/// ```text
/// ┌──────────────────────────────────────────────────┐
/// │ [mix]      in        loop       rnd              │  ← label_y (selected label inverted)
/// │ recording                                        │  ← mode_y
/// │ ─────────────────                                │  ← progress_y (loop position)
/// │ █          █                                     │
/// │ █ 50       █ 100     ▁ 0        ▁ 0              │  ← bars grow up from the bottom
/// └──────────────────────────────────────────────────┘
/// ```
///
/// # Example
///
/// ```no_run
/// # use spirant_oled_display_rs::layout::{DisplayState, render_display};
/// # use spirant_oled_display_rs::DisplayConfig;
/// # use spirant::looper::LoopSnapshot;
/// # fn example(display: &mut impl embedded_graphics::draw_target::DrawTarget<Color = embedded_graphics::pixelcolor::BinaryColor>) {
/// let state = DisplayState::from_snapshot(&LoopSnapshot::default());
/// let config = DisplayConfig::default();
/// render_display(display, &state, &config).ok();
/// # }
/// ```
pub fn render_display<D>(
    display: &mut D,
    state: &DisplayState,
    config: &DisplayConfig,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let (fg, bg) = config.colors();
    let top_left: TextStyle = TextStyleBuilder::new().baseline(Baseline::Top).build();
    let text = MonoTextStyle::new(&FONT_6X10, fg);
    let highlighted = MonoTextStyle::new(&FONT_6X10, bg);

    if config.invert {
        display.clear(bg)?;
    }

    // ── Control labels ───────────────────────────────────────────────
    for (i, label) in CONTROL_LABELS.iter().enumerate() {
        let x = config.column_x(i);
        let style = if i == state.selected {
            let width = label.len() as u32 * CHAR_WIDTH + 2;
            Rectangle::new(Point::new(x - 1, config.label_y), Size::new(width, CHAR_HEIGHT))
                .into_styled(PrimitiveStyle::with_fill(fg))
                .draw(display)?;
            highlighted
        } else {
            text
        };
        Text::with_text_style(label, Point::new(x, config.label_y), style, top_left)
            .draw(display)?;
    }

    // ── Mode line ────────────────────────────────────────────────────
    Text::with_text_style(state.mode, Point::new(0, config.mode_y), text, top_left)
        .draw(display)?;

    // ── Loop progress ────────────────────────────────────────────────
    let progress_px = config.display_width * state.progress_permille.min(1000) as u32 / 1000;
    if progress_px > 0 {
        Line::new(
            Point::new(0, config.progress_y),
            Point::new(progress_px as i32 - 1, config.progress_y),
        )
        .into_styled(PrimitiveStyle::with_stroke(fg, 1))
        .draw(display)?;
    }

    // ── Bars and percentages ─────────────────────────────────────────
    let bottom = config.display_height as i32;
    for (i, &percent) in state.percents.iter().enumerate() {
        let x = config.column_x(i);

        let height = config.bar_height(percent);
        if height > 0 {
            Rectangle::new(
                Point::new(x, bottom - height as i32),
                Size::new(config.bar_width, height),
            )
            .into_styled(PrimitiveStyle::with_fill(fg))
            .draw(display)?;
        }

        let mut buf: String<4> = String::new();
        let _ = write!(buf, "{}", percent);
        Text::with_text_style(
            buf.as_str(),
            Point::new(
                x + config.bar_width as i32 + 2,
                bottom - CHAR_HEIGHT as i32,
            ),
            text,
            top_left,
        )
        .draw(display)?;
    }

    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    /// 128×64 one-bit frame buffer.
    struct Frame {
        pixels: [[bool; 128]; 64],
    }

    impl Frame {
        fn new() -> Self {
            Self {
                pixels: [[false; 128]; 64],
            }
        }

        fn on(&self, x: usize, y: usize) -> bool {
            self.pixels[y][x]
        }

        fn lit_in_rows(&self, rows: core::ops::Range<usize>) -> usize {
            rows.map(|y| self.pixels[y].iter().filter(|&&p| p).count())
                .sum()
        }
    }

    impl OriginDimensions for Frame {
        fn size(&self) -> Size {
            Size::new(128, 64)
        }
    }

    impl DrawTarget for Frame {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(p, color) in pixels {
                if (0..128).contains(&p.x) && (0..64).contains(&p.y) {
                    self.pixels[p.y as usize][p.x as usize] = color.is_on();
                }
            }
            Ok(())
        }
    }

    fn snapshot(values: [f32; 4]) -> LoopSnapshot {
        LoopSnapshot {
            values,
            ..LoopSnapshot::default()
        }
    }

    fn draw(state: &DisplayState, config: &DisplayConfig) -> Frame {
        let mut frame = Frame::new();
        render_display(&mut frame, state, config).unwrap();
        frame
    }

    // ── DisplayState ─────────────────────────────────────────────────

    #[test]
    fn from_snapshot_copies_values() {
        let snap = LoopSnapshot {
            playing: true,
            selected: 2,
            loop_length: 100,
            play_cursor: 25,
            ..snapshot([0.0, 0.5, 1.0, 0.25])
        };
        let state = DisplayState::from_snapshot(&snap);
        assert_eq!(state.mode, "playing");
        assert_eq!(state.selected, 2);
        assert_eq!(state.percents, [0, 50, 100, 25]);
        assert_eq!(state.progress_permille, 250);
    }

    #[test]
    fn from_snapshot_clamps_selection() {
        let snap = LoopSnapshot {
            selected: 42,
            ..LoopSnapshot::default()
        };
        assert_eq!(DisplayState::from_snapshot(&snap).selected, 3);
    }

    // ── DisplayChanges ───────────────────────────────────────────────

    #[test]
    fn display_changes_detect_mode() {
        let a = DisplayState::from_snapshot(&LoopSnapshot::default());
        let b = DisplayState::from_snapshot(&LoopSnapshot {
            recording: true,
            ..LoopSnapshot::default()
        });
        let changes = DisplayChanges::detect(&a, &b);
        assert!(changes.mode_changed);
        assert!(!changes.selection_changed);
        assert!(changes.any_changed());
    }

    #[test]
    fn display_changes_detect_column() {
        let a = DisplayState::from_snapshot(&snapshot([0.1, 0.2, 0.3, 0.4]));
        let b = DisplayState::from_snapshot(&snapshot([0.1, 0.9, 0.3, 0.4]));
        let changes = DisplayChanges::detect(&a, &b);
        assert_eq!(changes.column_changed, [false, true, false, false]);
        assert!(!changes.mode_changed);
        assert!(changes.any_changed());
    }

    #[test]
    fn display_changes_no_changes() {
        let state = DisplayState::from_snapshot(&snapshot([0.5; 4]));
        assert!(!DisplayChanges::detect(&state, &state).any_changed());
    }

    // ── DisplayConfig ────────────────────────────────────────────────

    #[test]
    fn default_config_values() {
        let c = DisplayConfig::default();
        assert_eq!(c.update_frequency_hz, 60);
        assert_eq!(c.display_width, 128);
        assert_eq!(c.display_height, 64);
        assert_eq!(c.bar_width, 8);
        assert_eq!(c.bar_spacing, 24);
        assert_eq!(c.bar_max_height, 36);
        assert!(!c.invert);
    }

    #[test]
    fn update_period_60hz() {
        assert_eq!(DisplayConfig::default().update_period_ms(), 16);
    }

    #[test]
    fn update_period_30hz() {
        let c = DisplayConfig {
            update_frequency_hz: 30,
            ..DisplayConfig::default()
        };
        assert_eq!(c.update_period_ms(), 33);
    }

    #[test]
    fn columns_sit_on_32px_pitch() {
        let c = DisplayConfig::default();
        assert_eq!(c.column_x(0), 1);
        assert_eq!(c.column_x(1), 33);
        assert_eq!(c.column_x(3), 97);
    }

    #[test]
    fn bar_height_scales_with_percent() {
        let c = DisplayConfig::default();
        assert_eq!(c.bar_height(0), 0);
        assert_eq!(c.bar_height(50), 18);
        assert_eq!(c.bar_height(100), 36);
        assert_eq!(c.bar_height(250), 36);
    }

    // ── Rendering ────────────────────────────────────────────────────

    #[test]
    fn full_bar_spans_max_height() {
        let config = DisplayConfig::default();
        let state = DisplayState::from_snapshot(&snapshot([1.0, 0.0, 0.0, 0.0]));
        let frame = draw(&state, &config);

        assert!(frame.on(1, 63));
        assert!(frame.on(8, 28));
        assert!(!frame.on(1, 27));
        // Empty bar in column 1.
        assert!(!frame.on(33, 63));
    }

    #[test]
    fn selected_label_is_highlighted() {
        let config = DisplayConfig::default();
        let state = DisplayState {
            selected: 1,
            ..DisplayState::from_snapshot(&LoopSnapshot::default())
        };
        let frame = draw(&state, &config);

        // Highlight box starts one pixel left of the label.
        assert!(frame.on(32, 0));
        assert!(!frame.on(0, 0));
    }

    #[test]
    fn mode_text_is_drawn() {
        let config = DisplayConfig::default();
        let state = DisplayState::from_snapshot(&LoopSnapshot {
            recording: true,
            ..LoopSnapshot::default()
        });
        let frame = draw(&state, &config);
        assert!(frame.lit_in_rows(12..22) > 0);
    }

    #[test]
    fn progress_line_tracks_position() {
        let config = DisplayConfig::default();
        let state = DisplayState {
            progress_permille: 500,
            ..DisplayState::from_snapshot(&LoopSnapshot::default())
        };
        let frame = draw(&state, &config);
        assert!(frame.on(0, 25));
        assert!(frame.on(63, 25));
        assert!(!frame.on(64, 25));
    }

    #[test]
    fn inverted_layout_fills_background() {
        let config = DisplayConfig {
            invert: true,
            ..DisplayConfig::default()
        };
        let state = DisplayState::from_snapshot(&snapshot([1.0, 0.0, 0.0, 0.0]));
        let frame = draw(&state, &config);

        assert!(frame.on(127, 40));
        // Bars are drawn dark on the lit background.
        assert!(!frame.on(1, 63));
    }
}
