//! Scan controller
//!
//! The cooperative state machine driving one scan session. Each external
//! tick takes one measurement, classifies it against the adaptive squelch,
//! feeds the spectrum bins and the loot catalog, and advances the sweep or
//! holds on an open signal.
//!
//! All session state (range stack, histogram, catalog, threshold) lives in
//! this object; there are no ambient globals. The surrounding scheduler,
//! key handling and rendering layers talk to it only through the operations
//! and read-only snapshots below.

use crate::config::{CALIBRATION_POINTS, DWELL_TIMES_MS};
use crate::scan::band::{Band, RangeStack, SpanError};
use crate::scan::loot::{LootCatalog, SortKind};
use crate::scan::spectrum::{Cursor, RollingGraph, SpectrumBins};
use crate::scan::squelch::SquelchCalibrator;
use crate::traits::{Clock, Sampler};
use crate::types::{Frequency, Measurement, SampleKind, ScanStep};

/// Scan state, one value per externally observable phase
///
/// The open-confirmation re-sample happens inside a single tick (it is a
/// blocking sampler call), so it does not need its own state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Session constructed but not started
    #[default]
    Idle,
    /// Sweeping: one frequency per tick
    Sampling,
    /// Parked on an open signal, receive audio enabled
    Hold,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ScanState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "IDLE"),
            Self::Sampling => defmt::write!(f, "SAMPLING"),
            Self::Hold => defmt::write!(f, "HOLD"),
        }
    }
}

/// Operator-tunable scan knobs
#[derive(Clone, Copy, Debug)]
pub struct ScanConfig {
    /// Which chip reading the sweep samples
    pub sample_kind: SampleKind,
    /// Dwell on an open signal before moving on; `None` holds until closed
    pub dwell_open_ms: Option<u32>,
    /// Dwell on a closed frequency before advancing
    pub dwell_closed_ms: u32,
    /// Force-closed spur grid; exact multiples always classify closed
    pub garbage_interval_hz: Option<u32>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sample_kind: SampleKind::Rssi,
            dwell_open_ms: None,
            dwell_closed_ms: DWELL_TIMES_MS[0],
            garbage_interval_hz: None,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ScanConfig {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ScanConfig({})", self.sample_kind);
    }
}

/// One scan session: state machine plus all owned scan state
pub struct ScanController {
    config: ScanConfig,
    ranges: RangeStack,
    squelch: SquelchCalibrator,
    spectrum: SpectrumBins,
    graph: RollingGraph,
    loot: LootCatalog,
    cursor: Cursor,
    state: ScanState,
    current: Frequency,
    /// The current open episode already survived its confirmation
    confirmed_episode: bool,
    /// When the dwell timer allows the next advance; `None` = no deadline
    dwell_deadline: Option<u32>,
    listening: bool,
    sweep_completed: bool,
}

impl ScanController {
    /// Create a session over `band`
    ///
    /// The band is pushed as the base of the range stack, marked detached
    /// (an ad-hoc scan span, not a persisted record). The session stays
    /// [`ScanState::Idle`] until [`Self::start`] runs calibration.
    #[must_use]
    pub fn new(mut band: Band, config: ScanConfig) -> Self {
        band.detach();
        let spectrum = SpectrumBins::new(&band);
        let current = band.start();
        let mut ranges = RangeStack::new();
        ranges.push(band);

        Self {
            config,
            ranges,
            squelch: SquelchCalibrator::new(),
            spectrum,
            graph: RollingGraph::new(),
            loot: LootCatalog::new(),
            cursor: Cursor::new(),
            state: ScanState::Idle,
            current,
            confirmed_episode: false,
            dwell_deadline: None,
            listening: false,
            sweep_completed: false,
        }
    }

    /// (Re)start scanning: calibrate the squelch and begin the sweep
    ///
    /// Restarting abandons any in-flight episode with no cleanup owed; all
    /// adaptive state is reseeded.
    pub fn start<S: Sampler, C: Clock>(&mut self, sampler: &mut S, clock: &C) {
        self.squelch.reset();
        self.calibrate(sampler);
        self.graph.clear();
        self.commit_band(sampler, clock);
    }

    /// Run one scan step; call once per scheduler tick
    pub fn tick<S: Sampler, C: Clock>(&mut self, sampler: &mut S, clock: &C) {
        match self.state {
            ScanState::Idle => {}
            ScanState::Sampling => self.tick_sweep(sampler, clock),
            ScanState::Hold => self.tick_hold(sampler, clock),
        }
    }

    // --- render surface ----------------------------------------------------

    /// The active scan band
    #[must_use]
    pub fn band(&self) -> &Band {
        // The stack is never empty after construction.
        self.ranges.current().unwrap()
    }

    /// Swept-mode histogram snapshot
    #[must_use]
    pub const fn spectrum(&self) -> &SpectrumBins {
        &self.spectrum
    }

    /// Rolling waveform of the held frequency
    #[must_use]
    pub const fn graph(&self) -> &RollingGraph {
        &self.graph
    }

    /// Loot catalog snapshot, in its current sort order
    #[must_use]
    pub const fn loot(&self) -> &LootCatalog {
        &self.loot
    }

    /// Zoom cursor snapshot
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Current squelch threshold in level units
    #[must_use]
    pub const fn threshold(&self) -> u16 {
        self.squelch.threshold()
    }

    /// Current scan state
    #[must_use]
    pub const fn state(&self) -> ScanState {
        self.state
    }

    /// The frequency the sweep is parked on or will sample next
    #[must_use]
    pub const fn current_frequency(&self) -> Frequency {
        self.current
    }

    /// Zoom depth of the range stack
    #[must_use]
    pub fn zoom_depth(&self) -> usize {
        self.ranges.depth()
    }

    /// Consume the sweep-completed event, if one is pending
    ///
    /// Latched when the sweep wraps from the span end back to the start;
    /// consumed by rendering, never by the state machine itself.
    pub fn take_sweep_completed(&mut self) -> bool {
        core::mem::take(&mut self.sweep_completed)
    }

    // --- input operations --------------------------------------------------

    /// Zoom into the cursor selection
    ///
    /// Pushes the selected sub-span (ring-evicting the oldest zoom level at
    /// capacity) and re-initializes the histogram and cursor. Returns
    /// `false` when the selection collapses to an invalid span at the
    /// current step.
    pub fn push_zoom<S: Sampler, C: Clock>(&mut self, sampler: &mut S, clock: &C) -> bool {
        let step_hz = self.band().step().as_hz();
        let (start, end) = self.cursor.selection(&self.spectrum, step_hz);

        let mut sub = *self.band();
        if sub.set_span(start, end).is_err() {
            return false;
        }
        sub.detach();
        self.ranges.push(sub);
        self.commit_band(sampler, clock);
        true
    }

    /// Zoom back out to the previous span
    ///
    /// A no-op at the base of the stack.
    pub fn pop_zoom<S: Sampler, C: Clock>(&mut self, sampler: &mut S, clock: &C) -> bool {
        if self.ranges.pop().is_none() {
            return false;
        }
        self.commit_band(sampler, clock);
        true
    }

    /// Move the zoom cursor one bin up or down
    pub fn move_cursor(&mut self, up: bool) -> bool {
        self.cursor.move_by(up)
    }

    /// Grow or shrink the zoom cursor selection
    pub fn resize_cursor(&mut self, grow: bool) -> bool {
        self.cursor.resize(grow)
    }

    /// Re-sort the loot catalog
    pub fn set_sort_order(&mut self, kind: SortKind, reverse: bool) {
        self.loot.sort_by(kind, reverse);
    }

    /// Toggle the blacklist flag of the most recently open loot entry
    pub fn blacklist_last(&mut self) {
        self.loot.blacklist_last();
    }

    /// Toggle the whitelist flag of the most recently open loot entry
    pub fn whitelist_last(&mut self) {
        self.loot.whitelist_last();
    }

    /// Mutable access to the loot catalog for list-view operations
    pub fn loot_mut(&mut self) -> &mut LootCatalog {
        &mut self.loot
    }

    /// Replace the active span, keeping the previous one on invalid input
    ///
    /// A committed change re-initializes the histogram and cursor, since
    /// the bin-to-frequency mapping depends on the span.
    pub fn set_span<S: Sampler, C: Clock>(
        &mut self,
        start: Frequency,
        end: Frequency,
        sampler: &mut S,
        clock: &C,
    ) -> Result<(), SpanError> {
        self.ranges
            .current_mut()
            .ok_or(SpanError::EmptySpan)?
            .set_span(start, end)?;
        self.commit_band(sampler, clock);
        Ok(())
    }

    /// Replace the scan step, with the same re-initialization contract
    pub fn set_step<S: Sampler, C: Clock>(
        &mut self,
        step: ScanStep,
        sampler: &mut S,
        clock: &C,
    ) -> Result<(), SpanError> {
        self.ranges
            .current_mut()
            .ok_or(SpanError::EmptySpan)?
            .set_step(step)?;
        self.commit_band(sampler, clock);
        Ok(())
    }

    /// Update the runtime knobs
    pub fn set_config(&mut self, config: ScanConfig) {
        self.config = config;
    }

    /// Current runtime knobs
    #[must_use]
    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    // --- internals ---------------------------------------------------------

    /// Five-point threshold calibration across the active span
    fn calibrate<S: Sampler>(&mut self, sampler: &mut S) {
        let points = SquelchCalibrator::calibration_points(self.band());
        let mut samples = [0u16; CALIBRATION_POINTS];
        for (sample, point) in samples.iter_mut().zip(points) {
            sampler.tune(point, true);
            *sample = sampler.read_level(self.config.sample_kind);
        }
        self.squelch.calibrate(samples);
    }

    /// Re-align everything that depends on the active span
    ///
    /// Hard contract: runs on every span commit (start, zoom push/pop,
    /// span/step edits). The squelch calibration survives a commit; only a
    /// session (re)start reseeds it.
    fn commit_band<S: Sampler, C: Clock>(&mut self, sampler: &mut S, clock: &C) {
        let band = *self.band();
        self.spectrum.reinit(&band);
        self.cursor.reset();
        self.current = band.start();
        sampler.enable_receive(false);
        sampler.tune(self.current, true);
        self.state = ScanState::Sampling;
        self.confirmed_episode = false;
        self.listening = false;
        self.sweep_completed = false;
        self.dwell_deadline = Some(clock.now_ms().saturating_add(self.config.dwell_closed_ms));
    }

    fn tick_sweep<S: Sampler, C: Clock>(&mut self, sampler: &mut S, clock: &C) {
        let f = self.current;
        sampler.tune(f, true);
        let level = sampler.read_level(self.config.sample_kind);

        let mut msm = Measurement::new(f, level);
        msm.open = self.squelch.classify(level);

        if self.is_garbage(f) {
            msm.open = false;
        } else if msm.open && !self.confirmed_episode && !sampler.is_receive_active() {
            // Really good level? Re-read with the long settle before
            // committing to an open episode.
            self.squelch.note_confirmation();
            let confirm = sampler.confirm_level(self.config.sample_kind);
            if self.squelch.classify(confirm) {
                self.confirmed_episode = true;
            } else {
                self.squelch.raise_floor();
                msm.open = false;
            }
        }

        let now = clock.now_ms();
        // A saturated catalog is a reported no-op, not a fault.
        let _ = self.loot.upsert(&msm, now);
        self.spectrum.add_point(&msm);
        sampler.enable_receive(msm.open);

        if msm.open {
            self.state = ScanState::Hold;
            self.set_listening(true, now);
        } else {
            self.confirmed_episode = false;
            self.squelch.closed_tick();
            self.set_listening(false, now);
            self.advance_if_due(now);
        }
    }

    fn tick_hold<S: Sampler, C: Clock>(&mut self, sampler: &mut S, clock: &C) {
        let f = self.current;
        let level = sampler.read_level(self.config.sample_kind);

        let mut msm = Measurement::new(f, level);
        msm.open = self.squelch.classify(level) && !self.is_garbage(f);

        let now = clock.now_ms();
        // Held frequency: catalog only, the histogram bin needs no re-max.
        let _ = self.loot.upsert(&msm, now);
        self.graph.push(level);

        if msm.open {
            // Still open; an expired open-dwell forces the sweep onward.
            if self.dwell_due(now) {
                sampler.enable_receive(false);
                self.leave_hold(now);
                self.advance(now);
            }
        } else {
            sampler.enable_receive(false);
            self.squelch.closed_tick();
            self.leave_hold(now);
            self.advance_if_due(now);
        }
    }

    fn leave_hold(&mut self, now: u32) {
        self.state = ScanState::Sampling;
        self.confirmed_episode = false;
        self.set_listening(false, now);
    }

    /// Reset the dwell deadline whenever the listen state flips
    fn set_listening(&mut self, listening: bool, now: u32) {
        if self.listening == listening {
            return;
        }
        self.listening = listening;
        self.dwell_deadline = if listening {
            self.config.dwell_open_ms.map(|ms| now.saturating_add(ms))
        } else {
            Some(now.saturating_add(self.config.dwell_closed_ms))
        };
    }

    fn dwell_due(&self, now: u32) -> bool {
        self.dwell_deadline.is_some_and(|deadline| now >= deadline)
    }

    fn advance_if_due(&mut self, now: u32) {
        if self.dwell_due(now) {
            self.advance(now);
        }
    }

    /// Step to the next frequency, wrapping at the span end
    fn advance(&mut self, now: u32) {
        let band = *self.band();
        let next = self.current.step_up(band.step());

        if next > band.end() || next == self.current {
            self.current = band.start();
            self.sweep_completed = true;
            self.spectrum.begin_sweep();
        } else {
            self.current = next;
        }
        self.dwell_deadline = Some(now.saturating_add(self.config.dwell_closed_ms));
    }

    fn is_garbage(&self, f: Frequency) -> bool {
        match self.config.garbage_interval_hz {
            Some(interval) if interval > 0 => f.as_hz() % interval == 0,
            _ => false,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ScanController {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Scan({}, {}, thr={})",
            self.state,
            self.current,
            self.squelch.threshold()
        );
    }
}
