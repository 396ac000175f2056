//! Tests for the scan controller state machine
//!
//! Drives whole scan sessions against a scripted sampler and clock:
//! calibration on start, sweep advancement and wrap, open-confirmation and
//! hold, dwell timing, garbage skipping and zoom navigation.

use std::cell::Cell;
use std::collections::HashMap;

use scanner_firmware::config::SQUELCH_MARGIN;
use scanner_firmware::scan::band::Band;
use scanner_firmware::scan::controller::{ScanConfig, ScanController, ScanState};
use scanner_firmware::traits::{Clock, Sampler};
use scanner_firmware::types::{Frequency, SampleKind, ScanStep};

/// Scripted level source keyed by tuned frequency
struct FakeSampler {
    noise: u16,
    levels: HashMap<u32, u16>,
    confirm_levels: HashMap<u32, u16>,
    tuned: u32,
    rx: bool,
}

impl FakeSampler {
    fn quiet(noise: u16) -> Self {
        Self {
            noise,
            levels: HashMap::new(),
            confirm_levels: HashMap::new(),
            tuned: 0,
            rx: false,
        }
    }

    fn with_signal(noise: u16, hz: u32, level: u16) -> Self {
        let mut sampler = Self::quiet(noise);
        sampler.levels.insert(hz, level);
        sampler
    }
}

impl Sampler for FakeSampler {
    fn tune(&mut self, frequency: Frequency, _precise: bool) {
        self.tuned = frequency.as_hz();
    }

    fn read_level(&mut self, _kind: SampleKind) -> u16 {
        self.levels.get(&self.tuned).copied().unwrap_or(self.noise)
    }

    fn confirm_level(&mut self, kind: SampleKind) -> u16 {
        match self.confirm_levels.get(&self.tuned) {
            Some(&level) => level,
            None => self.read_level(kind),
        }
    }

    fn enable_receive(&mut self, enabled: bool) {
        self.rx = enabled;
    }

    fn is_receive_active(&self) -> bool {
        self.rx
    }
}

/// Manually advanced millisecond clock
struct FakeClock {
    now: Cell<u32>,
}

impl FakeClock {
    fn new() -> Self {
        Self { now: Cell::new(0) }
    }

    fn advance(&self, ms: u32) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

fn freq(hz: u32) -> Frequency {
    Frequency::from_hz(hz).unwrap()
}

fn two_meter_band() -> Band {
    Band::new(freq(145_000_000), freq(146_000_000), ScanStep::KHz25).unwrap()
}

fn started(sampler: &mut FakeSampler, clock: &FakeClock) -> ScanController {
    let mut scan = ScanController::new(two_meter_band(), ScanConfig::default());
    scan.start(sampler, clock);
    scan
}

// ============================================================================
// Calibration Tests
// ============================================================================

#[test]
fn start_calibrates_from_five_points() {
    let mut sampler = FakeSampler::quiet(40);
    let clock = FakeClock::new();
    let scan = started(&mut sampler, &clock);

    assert_eq!(scan.threshold(), 40 + SQUELCH_MARGIN);
    assert_eq!(scan.state(), ScanState::Sampling);
    assert_eq!(scan.current_frequency().as_hz(), 145_000_000);
}

#[test]
fn calibration_ignores_one_active_carrier() {
    // The midpoint calibration sample lands on a strong signal; the
    // median keeps the threshold at the noise floor
    let mut sampler = FakeSampler::with_signal(40, 145_500_000, 300);
    let clock = FakeClock::new();
    let scan = started(&mut sampler, &clock);

    assert_eq!(scan.threshold(), 40 + SQUELCH_MARGIN);
}

// ============================================================================
// Sweep Tests
// ============================================================================

#[test]
fn sweep_advances_one_step_per_closed_tick() {
    let mut sampler = FakeSampler::quiet(10);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);

    scan.tick(&mut sampler, &clock);
    assert_eq!(scan.current_frequency().as_hz(), 145_025_000);

    scan.tick(&mut sampler, &clock);
    assert_eq!(scan.current_frequency().as_hz(), 145_050_000);
}

#[test]
fn sweep_wraps_at_span_end_and_signals_completion() {
    let mut sampler = FakeSampler::quiet(10);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);

    // 41 frequencies from 145.000 to 146.000 inclusive at 25 kHz
    for _ in 0..40 {
        scan.tick(&mut sampler, &clock);
        assert!(!scan.take_sweep_completed());
    }
    assert_eq!(scan.current_frequency().as_hz(), 146_000_000);

    scan.tick(&mut sampler, &clock);
    assert_eq!(scan.current_frequency().as_hz(), 145_000_000);
    assert!(scan.take_sweep_completed());
    assert!(!scan.take_sweep_completed(), "event is consumed once");
}

#[test]
fn sweep_paints_the_histogram() {
    let mut sampler = FakeSampler::quiet(25);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);

    for _ in 0..41 {
        scan.tick(&mut sampler, &clock);
    }
    assert!(scan.spectrum().filled() > 0);
    assert_eq!(scan.spectrum().peak(), 25);
}

// ============================================================================
// Open / Hold Tests
// ============================================================================

#[test]
fn open_signal_confirms_then_holds_with_receive_enabled() {
    let mut sampler = FakeSampler::with_signal(40, 145_500_000, 200);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);

    // 20 closed ticks bring the sweep to the signal
    for _ in 0..20 {
        scan.tick(&mut sampler, &clock);
    }
    assert_eq!(scan.current_frequency().as_hz(), 145_500_000);

    scan.tick(&mut sampler, &clock);
    assert_eq!(scan.state(), ScanState::Hold);
    assert!(sampler.is_receive_active());

    // Holding suppresses advancement while the signal stays open
    for _ in 0..5 {
        scan.tick(&mut sampler, &clock);
        assert_eq!(scan.current_frequency().as_hz(), 145_500_000);
        assert_eq!(scan.state(), ScanState::Hold);
    }

    // Carrier drops: back to the sweep, receive off
    sampler.levels.clear();
    scan.tick(&mut sampler, &clock);
    assert_eq!(scan.state(), ScanState::Sampling);
    assert!(!sampler.is_receive_active());
    assert_eq!(scan.current_frequency().as_hz(), 145_525_000);
}

#[test]
fn hold_catalogs_the_signal() {
    let mut sampler = FakeSampler::with_signal(40, 145_500_000, 200);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);

    for _ in 0..21 {
        scan.tick(&mut sampler, &clock);
    }
    assert_eq!(scan.state(), ScanState::Hold);

    let entry = scan.loot().last_active().unwrap();
    assert_eq!(entry.frequency().as_hz(), 145_500_000);
    assert!(entry.is_open());

    // Duration accumulates against the clock while held
    clock.advance(700);
    scan.tick(&mut sampler, &clock);
    assert_eq!(scan.loot().last_active().unwrap().duration_ms(), 700);
}

#[test]
fn hold_feeds_the_rolling_graph() {
    let mut sampler = FakeSampler::with_signal(40, 145_500_000, 200);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);

    for _ in 0..21 {
        scan.tick(&mut sampler, &clock);
    }
    assert_eq!(scan.graph().len(), 0);

    scan.tick(&mut sampler, &clock);
    scan.tick(&mut sampler, &clock);
    assert_eq!(scan.graph().len(), 2);
}

#[test]
fn failed_confirmation_raises_threshold_and_keeps_sweeping() {
    let mut sampler = FakeSampler::with_signal(40, 145_100_000, 200);
    // The longer-settled re-read sees only noise: a squelch tail artifact
    sampler.confirm_levels.insert(145_100_000, 40);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);
    let threshold_before = scan.threshold();

    for _ in 0..4 {
        scan.tick(&mut sampler, &clock);
    }
    scan.tick(&mut sampler, &clock);

    assert_eq!(scan.threshold(), threshold_before + 1);
    assert_eq!(scan.state(), ScanState::Sampling);
    assert!(!sampler.is_receive_active());
    assert!(scan.loot().is_empty(), "refuted open is not a discovery");
}

#[test]
fn open_dwell_expiry_forces_the_sweep_onward() {
    let mut sampler = FakeSampler::with_signal(40, 145_500_000, 200);
    let clock = FakeClock::new();
    let mut scan = ScanController::new(
        two_meter_band(),
        ScanConfig {
            dwell_open_ms: Some(100),
            ..ScanConfig::default()
        },
    );
    scan.start(&mut sampler, &clock);

    for _ in 0..21 {
        scan.tick(&mut sampler, &clock);
    }
    assert_eq!(scan.state(), ScanState::Hold);

    // Still open before the dwell deadline
    clock.advance(50);
    scan.tick(&mut sampler, &clock);
    assert_eq!(scan.state(), ScanState::Hold);

    // Deadline passed: leave the hold even though the carrier is open
    clock.advance(100);
    scan.tick(&mut sampler, &clock);
    assert_eq!(scan.state(), ScanState::Sampling);
    assert!(!sampler.is_receive_active());
    assert_eq!(scan.current_frequency().as_hz(), 145_525_000);
}

// ============================================================================
// Garbage Skip Tests
// ============================================================================

#[test]
fn garbage_multiples_never_open_regardless_of_level() {
    // 145.6 MHz is an exact multiple of the 1.3 MHz spur interval
    assert_eq!(145_600_000 % 1_300_000, 0);

    let mut sampler = FakeSampler::with_signal(40, 145_600_000, 300);
    let clock = FakeClock::new();
    let mut scan = ScanController::new(
        two_meter_band(),
        ScanConfig {
            garbage_interval_hz: Some(1_300_000),
            ..ScanConfig::default()
        },
    );
    scan.start(&mut sampler, &clock);

    for _ in 0..41 {
        scan.tick(&mut sampler, &clock);
        assert_eq!(scan.state(), ScanState::Sampling);
        assert!(!sampler.is_receive_active());
    }
    assert!(scan.loot().is_empty());
}

#[test]
fn same_signal_opens_with_garbage_skip_disabled() {
    let mut sampler = FakeSampler::with_signal(40, 145_600_000, 300);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);

    for _ in 0..25 {
        scan.tick(&mut sampler, &clock);
    }
    assert_eq!(scan.state(), ScanState::Hold);
    assert_eq!(scan.current_frequency().as_hz(), 145_600_000);
}

// ============================================================================
// Zoom Tests
// ============================================================================

#[test]
fn push_zoom_narrows_the_span_and_realigns_the_histogram() {
    let mut sampler = FakeSampler::quiet(40);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);

    assert!(scan.push_zoom(&mut sampler, &clock));

    assert_eq!(scan.zoom_depth(), 2);
    assert_eq!(scan.band().start().as_hz(), 145_375_000);
    assert_eq!(scan.band().end().as_hz(), 145_625_000);
    assert_eq!(scan.spectrum().start().as_hz(), 145_375_000);
    assert_eq!(scan.current_frequency().as_hz(), 145_375_000);
    assert_eq!(scan.state(), ScanState::Sampling);
}

#[test]
fn pop_zoom_restores_the_previous_span() {
    let mut sampler = FakeSampler::quiet(40);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);

    assert!(scan.push_zoom(&mut sampler, &clock));
    assert!(scan.pop_zoom(&mut sampler, &clock));

    assert_eq!(scan.zoom_depth(), 1);
    assert_eq!(scan.band().start().as_hz(), 145_000_000);
    assert_eq!(scan.band().end().as_hz(), 146_000_000);
    assert_eq!(scan.spectrum().start().as_hz(), 145_000_000);

    // At the base of the stack popping is a no-op
    assert!(!scan.pop_zoom(&mut sampler, &clock));
    assert_eq!(scan.zoom_depth(), 1);
}

#[test]
fn push_zoom_rejects_a_collapsed_selection() {
    let mut sampler = FakeSampler::quiet(40);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);

    // At a 500 kHz step the default cursor selection rounds to a point
    scan.set_step(ScanStep::KHz500, &mut sampler, &clock).unwrap();
    assert!(!scan.push_zoom(&mut sampler, &clock));
    assert_eq!(scan.zoom_depth(), 1);
}

#[test]
fn zoom_depth_is_capped_by_the_range_stack() {
    let mut sampler = FakeSampler::quiet(40);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);

    // A fine step keeps every nested selection a valid span
    scan.set_step(ScanStep::Hz20, &mut sampler, &clock).unwrap();
    for _ in 0..6 {
        assert!(scan.push_zoom(&mut sampler, &clock));
    }
    assert_eq!(scan.zoom_depth(), 5);
}

#[test]
fn cursor_moves_only_within_the_display() {
    let mut sampler = FakeSampler::quiet(40);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);

    assert!(scan.move_cursor(true));
    assert!(scan.resize_cursor(true));

    let mut moves = 0;
    while scan.move_cursor(false) {
        moves += 1;
        assert!(moves < 200, "cursor must stop at the edge");
    }
}

// ============================================================================
// Span Edit Tests
// ============================================================================

#[test]
fn set_span_commits_and_reinitializes() {
    let mut sampler = FakeSampler::quiet(40);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);

    scan.set_span(freq(430_000_000), freq(431_000_000), &mut sampler, &clock)
        .unwrap();
    assert_eq!(scan.band().start().as_hz(), 430_000_000);
    assert_eq!(scan.spectrum().start().as_hz(), 430_000_000);
    assert_eq!(scan.current_frequency().as_hz(), 430_000_000);
}

#[test]
fn set_span_keeps_previous_span_on_invalid_input() {
    let mut sampler = FakeSampler::quiet(40);
    let clock = FakeClock::new();
    let mut scan = started(&mut sampler, &clock);

    let err = scan.set_span(freq(431_000_000), freq(430_000_000), &mut sampler, &clock);
    assert!(err.is_err());
    assert_eq!(scan.band().start().as_hz(), 145_000_000);
    assert_eq!(scan.band().end().as_hz(), 146_000_000);
}
