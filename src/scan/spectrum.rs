//! Spectrum binning engine
//!
//! Maps a continuous scan span onto a fixed 128-bin histogram of per-bin
//! level maxima, with autoscaling and a cursor-driven zoom selection.
//! A separate rolling window serves the fixed-frequency waveform mode.
//! The core only accumulates and exposes bin data; drawing belongs to the
//! presentation layer.

use heapless::HistoryBuffer;

use crate::config::{AUTOSCALE_HEADROOM_MIN, CURSOR_DEFAULT_HALF_WIDTH, SPECTRUM_BINS};
use crate::dsp::{scale, stats};
use crate::scan::band::Band;
use crate::types::{Frequency, Measurement};

/// Vertical display range produced by the autoscaler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaleRange {
    /// Bottom of the displayed range (smallest painted level)
    pub v_min: u16,
    /// Top of the displayed range (peak plus headroom)
    pub v_max: u16,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ScaleRange {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}..{}", self.v_min, self.v_max);
    }
}

/// Swept-mode spectrum histogram
///
/// Bin count is constant regardless of span width; re-initializing with a
/// new band rescales the frequency-to-bin mapping and zeroes the bins.
/// The owning controller must re-initialize on *every* span commit, since
/// the mapping depends on the span.
#[derive(Clone, Debug)]
pub struct SpectrumBins {
    bins: [u16; SPECTRUM_BINS],
    filled: usize,
    /// Bin painted by the previous sample, for stale-peak reset
    last_bin: Option<usize>,
    start: Frequency,
    end: Frequency,
    step_hz: u32,
}

impl SpectrumBins {
    /// Create a histogram aligned to `band`
    #[must_use]
    pub fn new(band: &Band) -> Self {
        Self {
            bins: [0; SPECTRUM_BINS],
            filled: 0,
            last_bin: None,
            start: band.start(),
            end: band.end(),
            step_hz: band.step().as_hz(),
        }
    }

    /// Re-align to a new band: rescale the mapping, zero every bin
    pub fn reinit(&mut self, band: &Band) {
        *self = Self::new(band);
    }

    /// Reset the sweep-pass bookkeeping at the start of a new pass
    ///
    /// Keeps the accumulated bins; only forgets which bin the previous
    /// sample painted, so the first sample of the new pass resets its bin.
    pub fn begin_sweep(&mut self) {
        self.last_bin = None;
    }

    /// Map a frequency onto a bin index, rounded
    #[must_use]
    pub fn freq_to_bin(&self, f: Frequency) -> usize {
        scale::convert_domain(
            f.as_hz(),
            self.start.as_hz(),
            self.end.as_hz(),
            0,
            (SPECTRUM_BINS - 1) as u32,
        ) as usize
    }

    /// Map a bin index back onto its frequency, rounded
    ///
    /// Inverse of [`Self::freq_to_bin`] up to one-step round-trip
    /// tolerance.
    #[must_use]
    pub fn bin_to_freq(&self, bin: usize) -> Frequency {
        let hz = scale::convert_domain(
            bin.min(SPECTRUM_BINS - 1) as u32,
            0,
            (SPECTRUM_BINS - 1) as u32,
            self.start.as_hz(),
            self.end.as_hz(),
        );
        // The mapped value lies inside the band span, which is valid.
        Frequency::from_hz(hz).unwrap_or(self.start)
    }

    /// Accumulate one measurement into the histogram
    ///
    /// Paints every bin covered by `[f, f + step]`. A bin not owned by the
    /// immediately preceding sample is reset before the maximum is taken,
    /// so a stale peak from the previous sweep pass cannot outlive a lower
    /// reading from this pass.
    pub fn add_point(&mut self, msm: &Measurement) {
        let xs = self.freq_to_bin(msm.frequency);
        let xe = self.freq_to_bin(Frequency::from_hz(
            msm.frequency.as_hz().saturating_add(self.step_hz),
        )
        .unwrap_or(self.end));

        for x in xs..=xe.min(SPECTRUM_BINS - 1) {
            if self.last_bin != Some(x) {
                self.last_bin = Some(x);
                self.bins[x] = 0;
            }
            if msm.level > self.bins[x] {
                self.bins[x] = msm.level;
            }
        }

        if xe + 1 > self.filled {
            self.filled = (xe + 1).min(SPECTRUM_BINS);
        }
    }

    /// Vertical range for display
    ///
    /// Bottom is the smallest painted (nonzero) level. Headroom above the
    /// peak is the observed spread, but never less than 20 units, so a
    /// near-flat histogram still renders with visible relief instead of a
    /// full-height bar.
    #[must_use]
    pub fn autoscale(&self) -> ScaleRange {
        let painted = &self.bins[..self.filled];
        let v_min = stats::min_nonzero(painted);
        let v_max = stats::max(painted);
        let spread = v_max - v_min;
        ScaleRange {
            v_min,
            v_max: v_max.saturating_add(spread.max(AUTOSCALE_HEADROOM_MIN)),
        }
    }

    /// Crude noise-floor estimate over the painted bins
    #[must_use]
    pub fn noise_floor(&self) -> u16 {
        stats::rms(&self.bins[..self.filled])
    }

    /// Peak level over the painted bins
    #[must_use]
    pub fn peak(&self) -> u16 {
        stats::max(&self.bins[..self.filled])
    }

    /// Read-only snapshot of the bin array
    #[must_use]
    pub const fn bins(&self) -> &[u16; SPECTRUM_BINS] {
        &self.bins
    }

    /// Number of bins painted so far
    #[must_use]
    pub const fn filled(&self) -> usize {
        self.filled
    }

    /// Span start this histogram is aligned to
    #[must_use]
    pub const fn start(&self) -> Frequency {
        self.start
    }

    /// Span end this histogram is aligned to
    #[must_use]
    pub const fn end(&self) -> Frequency {
        self.end
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SpectrumBins {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Spectrum({}..{}, filled={})",
            self.start,
            self.end,
            self.filled
        );
    }
}

/// Rolling level window for fixed-frequency waveform mode
///
/// One slot per tick: the newest sample is appended at the tail and the
/// oldest is dropped (overwrite-oldest ring). Used when monitoring a single
/// frequency instead of sweeping.
pub struct RollingGraph {
    window: HistoryBuffer<u16, SPECTRUM_BINS>,
}

impl RollingGraph {
    /// Create an empty window
    #[must_use]
    pub fn new() -> Self {
        Self {
            window: HistoryBuffer::new(),
        }
    }

    /// Append one sample, dropping the oldest once full
    pub fn push(&mut self, level: u16) {
        self.window.write(level);
    }

    /// Number of samples collected, up to the window length
    #[must_use]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Whether no sample has been collected yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window.len() == 0
    }

    /// Copy the window into `out`, newest sample last
    ///
    /// While warming up, the leading slots stay zero, mirroring the blank
    /// left edge of the waveform display.
    pub fn snapshot(&self, out: &mut [u16; SPECTRUM_BINS]) {
        out.fill(0);
        let len = self.window.len();
        for (slot, &level) in out[SPECTRUM_BINS - len..]
            .iter_mut()
            .zip(self.window.oldest_ordered())
        {
            *slot = level;
        }
    }

    /// Drop every sample
    pub fn clear(&mut self) {
        self.window = HistoryBuffer::new();
    }
}

impl Default for RollingGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RollingGraph {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "RollingGraph(len={})", self.window.len());
    }
}

/// Bin-indexed selection cursor for zooming
///
/// Position and half-width both count bins. The selection `[x - w, x + w]`
/// converts back to a frequency sub-span for the range stack. Reset to
/// center/default width whenever a new band is committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    x: usize,
    half_width: usize,
}

impl Cursor {
    /// Create a centered cursor with the default half-width
    #[must_use]
    pub const fn new() -> Self {
        Self {
            x: SPECTRUM_BINS / 2,
            half_width: CURSOR_DEFAULT_HALF_WIDTH,
        }
    }

    /// Cursor position in bins
    #[must_use]
    pub const fn position(&self) -> usize {
        self.x
    }

    /// Selection half-width in bins
    #[must_use]
    pub const fn half_width(&self) -> usize {
        self.half_width
    }

    /// Move one bin up or down, keeping the whole selection on screen
    ///
    /// Returns whether the cursor moved.
    pub fn move_by(&mut self, up: bool) -> bool {
        if up {
            if self.x + self.half_width < SPECTRUM_BINS - 1 {
                self.x += 1;
                return true;
            }
        } else if self.x > self.half_width {
            self.x -= 1;
            return true;
        }
        false
    }

    /// Grow or shrink the selection by one bin per side
    ///
    /// Returns whether the width changed.
    pub fn resize(&mut self, grow: bool) -> bool {
        if grow {
            if self.x + self.half_width < SPECTRUM_BINS - 1 && self.x > self.half_width {
                self.half_width += 1;
                return true;
            }
        } else if self.half_width > 1 {
            self.half_width -= 1;
            return true;
        }
        false
    }

    /// The selected frequency sub-span, rounded to `step_hz`
    #[must_use]
    pub fn selection(&self, bins: &SpectrumBins, step_hz: u32) -> (Frequency, Frequency) {
        let start = bins.bin_to_freq(self.x.saturating_sub(self.half_width));
        let end = bins.bin_to_freq(self.x + self.half_width);
        (start.round_to_step(step_hz), end.round_to_step(step_hz))
    }

    /// The selection center frequency, rounded to `step_hz`
    #[must_use]
    pub fn center(&self, bins: &SpectrumBins, step_hz: u32) -> Frequency {
        bins.bin_to_freq(self.x).round_to_step(step_hz)
    }

    /// Back to center position and default width
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Cursor {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Cursor(x={}, w={})", self.x, self.half_width);
    }
}
