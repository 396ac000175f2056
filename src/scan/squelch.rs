//! Adaptive squelch threshold
//!
//! Decides, from one level sample, whether a frequency carries a real
//! signal, while tracking noise-floor drift across a wide scan:
//!
//! - **Calibration** seeds the threshold from five points across the span
//!   (median + margin), so one point on an active carrier cannot bias it.
//! - **Fast hysteresis** bumps the threshold up by one when a fresh `open`
//!   fails its longer-settled confirmation re-sample.
//! - **Slow decay** lowers the threshold by one after a 64-tick closed run,
//!   skipped for any run in which a confirmation happened.

use crate::config::{CALIBRATION_POINTS, DECAY_RUN_TICKS, SQUELCH_MARGIN};
use crate::dsp::stats;
use crate::scan::band::Band;
use crate::types::Frequency;

/// Squelch threshold calibrator and tracker
///
/// The threshold lives in the same chip units as the level samples and is
/// saturated at both ends of the u16 domain, never wrapped.
#[derive(Clone, Copy, Debug)]
pub struct SquelchCalibrator {
    threshold: u16,
    margin: u16,
    closed_run: u16,
    confirmed_in_run: bool,
    calibrated: bool,
}

impl SquelchCalibrator {
    /// Create an uncalibrated calibrator with the default margin
    #[must_use]
    pub const fn new() -> Self {
        Self::with_margin(SQUELCH_MARGIN)
    }

    /// Create an uncalibrated calibrator with an explicit margin
    #[must_use]
    pub const fn with_margin(margin: u16) -> Self {
        Self {
            threshold: 0,
            margin,
            closed_run: 0,
            confirmed_in_run: false,
            calibrated: false,
        }
    }

    /// The five representative frequencies to sample for calibration
    ///
    /// Both ends, the midpoint and the two quarter points, each rounded to
    /// the band's step grid.
    #[must_use]
    pub fn calibration_points(band: &Band) -> [Frequency; CALIBRATION_POINTS] {
        let start = band.start().as_hz();
        let span = band.span_hz();
        let step = band.step().as_hz();

        let mut points = [band.start(); CALIBRATION_POINTS];
        for (i, point) in points.iter_mut().enumerate() {
            // In-range by construction: start + span stays within the band.
            // Quarter math in u64 keeps the last point exactly on the end.
            let hz = start + (u64::from(span) * i as u64 / 4) as u32;
            *point = Frequency::from_hz(hz)
                .unwrap_or(band.start())
                .round_to_step(step);
        }
        points
    }

    /// Seed the threshold from the five calibration samples
    ///
    /// Threshold = median of the five + margin. Order-independent, robust
    /// to a single outlier landing on an active signal. Also resets the
    /// hysteresis and decay bookkeeping.
    pub fn calibrate(&mut self, samples: [u16; CALIBRATION_POINTS]) {
        self.threshold = stats::median5(samples).saturating_add(self.margin);
        self.closed_run = 0;
        self.confirmed_in_run = false;
        self.calibrated = true;
    }

    /// Whether [`Self::calibrate`] has run since construction or reset
    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Current threshold in level units
    #[must_use]
    pub const fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Classify one level sample: open at or above the threshold
    #[must_use]
    pub const fn classify(&self, level: u16) -> bool {
        level >= self.threshold
    }

    /// Record that a confirmation re-sample ran during the current run
    ///
    /// Any confirmation, passed or failed, suppresses the slow decay for
    /// the whole 64-tick run it falls in. Deliberately asymmetric: see the
    /// decay tests before changing this.
    pub fn note_confirmation(&mut self) {
        self.confirmed_in_run = true;
    }

    /// Raise the threshold by one after a failed confirmation
    ///
    /// The initial threshold was too low; the sample that opened the gate
    /// did not survive a longer-settled re-read.
    pub fn raise_floor(&mut self) {
        self.threshold = self.threshold.saturating_add(1);
    }

    /// Count one closed classification toward the slow decay
    ///
    /// After exactly [`DECAY_RUN_TICKS`] closed ticks the run ends: the
    /// threshold drops by one unless a confirmation ran during the run.
    /// Open ticks do not reset the counter; the decay tests pin this
    /// behavior, keep it when touching the bookkeeping here.
    ///
    /// Returns `true` when a decay step was applied.
    pub fn closed_tick(&mut self) -> bool {
        self.closed_run += 1;
        if self.closed_run < DECAY_RUN_TICKS {
            return false;
        }
        self.closed_run = 0;
        let decayed = !self.confirmed_in_run;
        if decayed {
            self.threshold = self.threshold.saturating_sub(1);
        }
        self.confirmed_in_run = false;
        decayed
    }

    /// Forget the calibration, returning to the uncalibrated state
    pub fn reset(&mut self) {
        *self = Self::with_margin(self.margin);
    }
}

impl Default for SquelchCalibrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SquelchCalibrator {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Squelch(thr={}, run={})", self.threshold, self.closed_run);
    }
}
