//! Frequency catcher
//!
//! Debounces raw hits from the hardware frequency counter into a confirmed
//! catch. The counter itself (and its scan windows) is a collaborator
//! concern; this logic only filters and correlates the frequencies it
//! reports:
//!
//! - FM broadcast carriers are ignored outright
//! - An optional VHF/UHF band filter rejects hits on the wrong side of the
//!   bound
//! - Frequencies the operator already triaged (black- or whitelisted loot)
//!   are skipped
//! - Two consecutive hits within one catch step confirm the catch

use crate::config::{BROADCAST_FM_HIGH_HZ, BROADCAST_FM_LOW_HZ, CATCH_STEP_HZ, FILTER_BOUND_HZ};
use crate::scan::loot::LootCatalog;
use crate::types::Frequency;

/// Which side of the VHF/UHF bound the catcher accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BandFilter {
    /// Accept everything
    #[default]
    Off,
    /// Accept only below the bound
    Vhf,
    /// Accept only at or above the bound
    Uhf,
}

impl BandFilter {
    /// Display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Off => "ALL",
            Self::Vhf => "VHF",
            Self::Uhf => "UHF",
        }
    }

    /// Cycle Off → Vhf → Uhf → Off
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Off => Self::Vhf,
            Self::Vhf => Self::Uhf,
            Self::Uhf => Self::Off,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BandFilter {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.label());
    }
}

/// Result of offering one detector hit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatchOutcome {
    /// Filtered out; the armed hit, if any, is kept
    Ignored,
    /// First plausible hit; waiting for a confirming neighbor
    Armed,
    /// Two consecutive hits agreed; tune here
    Caught(Frequency),
}

#[cfg(feature = "embedded")]
impl defmt::Format for CatchOutcome {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Ignored => defmt::write!(f, "ignored"),
            Self::Armed => defmt::write!(f, "armed"),
            Self::Caught(freq) => defmt::write!(f, "caught {}", freq),
        }
    }
}

/// Debouncer for hardware frequency-counter hits
#[derive(Clone, Copy, Debug, Default)]
pub struct FrequencyCatcher {
    filter: BandFilter,
    last_hit: Option<Frequency>,
}

impl FrequencyCatcher {
    /// Create a catcher with the band filter off
    #[must_use]
    pub const fn new() -> Self {
        Self {
            filter: BandFilter::Off,
            last_hit: None,
        }
    }

    /// Active band filter
    #[must_use]
    pub const fn filter(&self) -> BandFilter {
        self.filter
    }

    /// Cycle the band filter and disarm
    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.last_hit = None;
    }

    /// Set the band filter and disarm
    pub fn set_filter(&mut self, filter: BandFilter) {
        self.filter = filter;
        self.last_hit = None;
    }

    /// The hit waiting for confirmation, if any
    #[must_use]
    pub const fn armed(&self) -> Option<Frequency> {
        self.last_hit
    }

    /// Disarm without changing the filter
    pub fn reset(&mut self) {
        self.last_hit = None;
    }

    /// Offer one detector hit
    ///
    /// A hit matching the previous one within the catch step confirms the
    /// catch; the returned frequency is rounded onto the catch grid.
    pub fn offer(&mut self, f: Frequency, loot: &LootCatalog) -> CatchOutcome {
        let hz = f.as_hz();

        if (BROADCAST_FM_LOW_HZ..BROADCAST_FM_HIGH_HZ).contains(&hz) {
            return CatchOutcome::Ignored;
        }

        let wrong_side = match self.filter {
            BandFilter::Off => false,
            BandFilter::Vhf => hz >= FILTER_BOUND_HZ,
            BandFilter::Uhf => hz < FILTER_BOUND_HZ,
        };
        if wrong_side {
            return CatchOutcome::Ignored;
        }

        if loot
            .iter()
            .any(|e| e.frequency() == f && e.flag().is_flagged())
        {
            return CatchOutcome::Ignored;
        }

        let caught = self
            .last_hit
            .is_some_and(|prev| prev.distance_to(f) < CATCH_STEP_HZ);
        self.last_hit = Some(f);

        if caught {
            CatchOutcome::Caught(f.round_to_step(CATCH_STEP_HZ))
        } else {
            CatchOutcome::Armed
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for FrequencyCatcher {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Catcher({})", self.filter);
    }
}
