//! Tests for the frequency catcher
//!
//! Covers broadcast-band rejection, the VHF/UHF filter, loot-flag
//! skipping and the two-hit confirmation.

use scanner_firmware::scan::catcher::{BandFilter, CatchOutcome, FrequencyCatcher};
use scanner_firmware::scan::loot::LootCatalog;
use scanner_firmware::types::{Frequency, Measurement};

fn freq(hz: u32) -> Frequency {
    Frequency::from_hz(hz).unwrap()
}

fn catalog_with_flagged(hz: u32, blacklist: bool) -> LootCatalog {
    let mut catalog = LootCatalog::new();
    let mut m = Measurement::new(freq(hz), 80);
    m.open = true;
    catalog.upsert(&m, 1000).unwrap();
    if blacklist {
        catalog.blacklist_last();
    } else {
        catalog.whitelist_last();
    }
    catalog
}

// ============================================================================
// Filtering Tests
// ============================================================================

#[test]
fn broadcast_fm_hits_are_ignored() {
    let mut catcher = FrequencyCatcher::new();
    let catalog = LootCatalog::new();

    assert_eq!(
        catcher.offer(freq(100_000_000), &catalog),
        CatchOutcome::Ignored
    );
    // An ignored hit does not arm the debouncer
    assert!(catcher.armed().is_none());
}

#[test]
fn band_filter_rejects_the_wrong_side() {
    let mut catcher = FrequencyCatcher::new();
    let catalog = LootCatalog::new();

    catcher.set_filter(BandFilter::Vhf);
    assert_eq!(
        catcher.offer(freq(433_000_000), &catalog),
        CatchOutcome::Ignored
    );
    assert_eq!(
        catcher.offer(freq(145_000_000), &catalog),
        CatchOutcome::Armed
    );

    catcher.set_filter(BandFilter::Uhf);
    assert_eq!(
        catcher.offer(freq(145_000_000), &catalog),
        CatchOutcome::Ignored
    );
    assert_eq!(
        catcher.offer(freq(433_000_000), &catalog),
        CatchOutcome::Armed
    );
}

#[test]
fn flagged_loot_frequencies_are_skipped() {
    let mut catcher = FrequencyCatcher::new();

    let blacklisted = catalog_with_flagged(145_500_000, true);
    assert_eq!(
        catcher.offer(freq(145_500_000), &blacklisted),
        CatchOutcome::Ignored
    );

    let whitelisted = catalog_with_flagged(145_500_000, false);
    assert_eq!(
        catcher.offer(freq(145_500_000), &whitelisted),
        CatchOutcome::Ignored
    );
}

#[test]
fn unflagged_loot_frequencies_still_catch() {
    let mut catcher = FrequencyCatcher::new();
    let mut catalog = LootCatalog::new();
    let mut m = Measurement::new(freq(145_500_000), 80);
    m.open = true;
    catalog.upsert(&m, 1000).unwrap();

    assert_eq!(
        catcher.offer(freq(145_500_000), &catalog),
        CatchOutcome::Armed
    );
}

// ============================================================================
// Debounce Tests
// ============================================================================

#[test]
fn two_close_hits_confirm_the_catch() {
    let mut catcher = FrequencyCatcher::new();
    let catalog = LootCatalog::new();

    assert_eq!(
        catcher.offer(freq(145_512_340), &catalog),
        CatchOutcome::Armed
    );
    assert_eq!(
        catcher.offer(freq(145_512_680), &catalog),
        CatchOutcome::Caught(freq(145_513_000))
    );
}

#[test]
fn distant_hits_rearm_instead_of_catching() {
    let mut catcher = FrequencyCatcher::new();
    let catalog = LootCatalog::new();

    assert_eq!(
        catcher.offer(freq(145_500_000), &catalog),
        CatchOutcome::Armed
    );
    // A hit a full step away re-arms on the new frequency
    assert_eq!(
        catcher.offer(freq(146_700_000), &catalog),
        CatchOutcome::Armed
    );
    assert_eq!(catcher.armed().unwrap().as_hz(), 146_700_000);

    // The next neighbor of the new frequency now catches
    assert_eq!(
        catcher.offer(freq(146_700_100), &catalog),
        CatchOutcome::Caught(freq(146_700_000))
    );
}

#[test]
fn caught_frequency_lands_on_the_catch_grid() {
    let mut catcher = FrequencyCatcher::new();
    let catalog = LootCatalog::new();

    catcher.offer(freq(433_123_700), &catalog);
    let outcome = catcher.offer(freq(433_123_600), &catalog);
    assert_eq!(outcome, CatchOutcome::Caught(freq(433_124_000)));
}

#[test]
fn filter_change_disarms() {
    let mut catcher = FrequencyCatcher::new();
    let catalog = LootCatalog::new();

    catcher.offer(freq(145_500_000), &catalog);
    assert!(catcher.armed().is_some());

    catcher.cycle_filter();
    assert_eq!(catcher.filter(), BandFilter::Vhf);
    assert!(catcher.armed().is_none());

    // The first hit after the change only arms again
    assert_eq!(
        catcher.offer(freq(145_500_010), &catalog),
        CatchOutcome::Armed
    );
}

#[test]
fn reset_disarms_without_changing_the_filter() {
    let mut catcher = FrequencyCatcher::new();
    let catalog = LootCatalog::new();

    catcher.set_filter(BandFilter::Uhf);
    catcher.offer(freq(433_000_000), &catalog);
    catcher.reset();

    assert_eq!(catcher.filter(), BandFilter::Uhf);
    assert!(catcher.armed().is_none());
}
