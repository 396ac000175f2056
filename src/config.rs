//! Scan engine configuration and constants
//!
//! Compile-time constants for the scanning core are centralized here.
//! Operator-tunable runtime knobs live in [`crate::scan::controller::ScanConfig`].

use crate::types::{Frequency, SampleKind, ScanStep};

/// Number of spectrum histogram bins (one per display column)
pub const SPECTRUM_BINS: usize = 128;

/// Depth of the zoom range stack
pub const RANGE_STACK_DEPTH: usize = 5;

/// Maximum number of loot catalog entries
pub const LOOT_CAPACITY: usize = 64;

/// Number of calibration sample points across a span
pub const CALIBRATION_POINTS: usize = 5;

/// Margin added above the calibration median to form the squelch threshold
pub const SQUELCH_MARGIN: u16 = 2;

/// Consecutive-closed ticks per slow-decay run
pub const DECAY_RUN_TICKS: u16 = 64;

/// Minimum autoscale headroom above the histogram peak, in level units
pub const AUTOSCALE_HEADROOM_MIN: u16 = 20;

/// Default cursor half-width in bins
pub const CURSOR_DEFAULT_HALF_WIDTH: usize = 16;

/// Selectable dwell times in milliseconds, indexed by the dwell settings
pub const DWELL_TIMES_MS: [u32; 8] = [0, 500, 1000, 2000, 5000, 10_000, 30_000, 60_000];

/// Default per-sample settle delay hint in microseconds
///
/// Passed to the sampler, which owns the actual blocking; readings taken
/// with less settling than this are biased toward the previous frequency.
pub const DEFAULT_SETTLE_US: u32 = 1_000;

/// Settle delay hint for the open-confirmation re-sample, in microseconds
pub const CONFIRM_SETTLE_US: u32 = 60_000;

/// Spur interval of the chip's own clock harmonics
///
/// Exact multiples of this frequency read as carriers on an idle antenna;
/// the garbage-skip policy forces them closed.
pub const DEFAULT_GARBAGE_INTERVAL_HZ: u32 = 1_300_000;

/// FM broadcast band lower edge, excluded by the frequency catcher
pub const BROADCAST_FM_LOW_HZ: u32 = 88_000_000;

/// FM broadcast band upper edge, excluded by the frequency catcher
pub const BROADCAST_FM_HIGH_HZ: u32 = 108_000_000;

/// VHF/UHF boundary used by the catcher's band filter
pub const FILTER_BOUND_HZ: u32 = 280_000_000;

/// Grid the frequency catcher locks onto, in Hz
pub const CATCH_STEP_HZ: u32 = 1_000;

/// Default scan span start (VHF business band)
pub const DEFAULT_SPAN_START_HZ: u32 = 172_000_000;

/// Default scan span end: 128 steps of 25 kHz above the start
pub const DEFAULT_SPAN_END_HZ: u32 = 172_000_000 + 25_000 * 128;

/// Default scan step
pub const DEFAULT_STEP: ScanStep = ScanStep::KHz25;

/// Default sample kind for the sweep
pub const DEFAULT_SAMPLE_KIND: SampleKind = SampleKind::Rssi;

/// Build the default span start frequency
#[must_use]
pub const fn default_span_start() -> Frequency {
    Frequency::from_hz_const(DEFAULT_SPAN_START_HZ)
}

/// Build the default span end frequency
#[must_use]
pub const fn default_span_end() -> Frequency {
    Frequency::from_hz_const(DEFAULT_SPAN_END_HZ)
}
